//! Pin computed styles inline for capture, and put the originals back.

use std::collections::BTreeMap;

use crate::dom::style::{StyleProperty, StyleRecord, ValueKind};
use crate::dom::{Document, NodeId};
use crate::Result;

/// Computed value browsers report for an unset background
pub const TRANSPARENT: &str = "rgba(0, 0, 0, 0)";

/// Whether a computed value is worth pinning inline.
///
/// Colors are skipped when empty or fully transparent; everything else only
/// when empty.
pub fn is_pinnable(prop: StyleProperty, computed: &str) -> bool {
    if computed.is_empty() {
        return false;
    }
    match prop.kind() {
        ValueKind::Color if prop != StyleProperty::Color => computed != TRANSPARENT,
        _ => true,
    }
}

/// Original inline values of the tracked properties, per element
#[derive(Debug, Default)]
pub struct StyleSnapshot {
    records: BTreeMap<NodeId, StyleRecord>,
}

impl StyleSnapshot {
    /// Record every element below `root`, then write its non-trivial computed
    /// values as inline styles. `root` itself is left untouched.
    pub fn capture(doc: &mut Document, root: NodeId) -> Result<Self> {
        let targets = doc.descendant_elements(root);

        // Resolve everything before mutating so pinned values never feed back
        // into the cascade of later elements.
        let mut computed = Vec::with_capacity(targets.len());
        let mut records = BTreeMap::new();
        for &id in &targets {
            computed.push(doc.computed_style(id)?);
            records.insert(id, doc.inline_style(id)?.clone());
        }

        let mut pinned = 0usize;
        for (id, style) in targets.into_iter().zip(computed) {
            for prop in StyleProperty::ALL {
                let value = style.get(prop);
                if is_pinnable(prop, value) {
                    doc.set_inline(id, prop, value)?;
                    pinned += 1;
                }
            }
        }
        log::debug!("captured {} elements, pinned {} inline values", records.len(), pinned);
        Ok(Self { records })
    }

    /// Write every recorded record back, removing overrides that were empty.
    pub fn restore(self, doc: &mut Document) -> Result<()> {
        let count = self.records.len();
        for (id, record) in self.records {
            doc.set_inline_record(id, record)?;
        }
        log::debug!("restored inline styles on {} elements", count);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&StyleRecord> {
        self.records.get(&id)
    }
}
