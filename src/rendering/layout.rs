//! Block and grid layout over a DOM subtree, driven by inline styles only

use crate::dom::style::{parse_width, is_invisible_line, Edge, StyleProperty, ValueKind};
use crate::dom::{Document, Element, NodeData, NodeId};

/// Width of one glyph cell in CSS pixels
pub const CHAR_WIDTH: u32 = 6;
/// Height of one text line in CSS pixels
pub const LINE_HEIGHT: u32 = 10;
/// Padding applied inside elements that draw a background or border
pub const BOX_PADDING: u32 = 4;
/// Largest border width honored on one edge, in CSS pixels
pub const MAX_BORDER_WIDTH: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Used border widths, in top, right, bottom, left order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BorderWidths {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl BorderWidths {
    pub fn get(&self, edge: Edge) -> u32 {
        match edge {
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
        }
    }

    pub fn any(&self) -> bool {
        (self.top | self.right | self.bottom | self.left) > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutKind {
    Block { borders: BorderWidths },
    Text { lines: Vec<String> },
}

/// A positioned box for one element or text run
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub node: NodeId,
    pub rect: Rect,
    pub kind: LayoutKind,
}

/// Inline value of an edge longhand, falling back to the inline shorthand.
pub fn inline_edge_value(el: &Element, edge: Edge, kind: ValueKind) -> &str {
    match el.style.get(StyleProperty::edge(edge, kind)) {
        "" => el.style.get(StyleProperty::shorthand(kind)),
        v => v,
    }
}

fn used_border_widths(el: &Element) -> BorderWidths {
    let width = |edge| {
        if is_invisible_line(inline_edge_value(el, edge, ValueKind::LineStyle)) {
            return 0;
        }
        parse_width(inline_edge_value(el, edge, ValueKind::Width))
            .map(|w| (w.round() as u32).min(MAX_BORDER_WIDTH))
            .unwrap_or(0)
    };
    BorderWidths {
        top: width(Edge::Top),
        right: width(Edge::Right),
        bottom: width(Edge::Bottom),
        left: width(Edge::Left),
    }
}

/// Column count from a `grid-cols-N` class when the element is a `grid`.
fn grid_columns(el: &Element) -> Option<u32> {
    if !el.has_class("grid") {
        return None;
    }
    let cols = el
        .classes
        .iter()
        .find_map(|c| c.strip_prefix("grid-cols-")?.parse::<u32>().ok())
        .unwrap_or(1);
    Some(cols.max(1))
}

fn wrap_text(text: &str, width: u32) -> Vec<String> {
    let per_line = (width / CHAR_WIDTH).max(1) as usize;
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if !cur.is_empty() && cur.chars().count() + word.chars().count() + 1 > per_line {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

fn clamp_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

struct LayoutContext<'a> {
    doc: &'a Document,
    filter: &'a dyn Fn(&Element) -> bool,
    out: Vec<LayoutNode>,
}

impl LayoutContext<'_> {
    /// Lay out `id` at (x, y) with the given width, returning its height.
    fn block(&mut self, id: NodeId, x: i32, y: i32, width: u32) -> u32 {
        let Ok(el) = self.doc.element(id) else {
            return 0;
        };
        if !(self.filter)(el) {
            return 0;
        }

        let borders = used_border_widths(el);
        let has_background = !el.style.get(StyleProperty::BackgroundColor).is_empty();
        let pad = if borders.any() || has_background { BOX_PADDING } else { 0 };

        let slot = self.out.len();
        self.out.push(LayoutNode {
            node: id,
            rect: Rect::default(),
            kind: LayoutKind::Block { borders },
        });

        let inner_x = x.saturating_add((borders.left + pad) as i32);
        let inner_w = width.saturating_sub(borders.left + borders.right + 2 * pad);
        let mut cursor = y.saturating_add((borders.top + pad) as i32);

        let children = self.doc.children(id).to_vec();
        match grid_columns(el) {
            Some(cols) => {
                let col_w = inner_w / cols;
                for row in children.chunks(cols as usize) {
                    let mut row_h = 0;
                    for (i, child) in row.iter().enumerate() {
                        let cx = inner_x.saturating_add((i as u32 * col_w) as i32);
                        row_h = row_h.max(self.child(*child, cx, cursor, col_w));
                    }
                    cursor = cursor.saturating_add(clamp_i32(row_h));
                }
            }
            None => {
                for child in children {
                    let h = self.child(child, inner_x, cursor, inner_w);
                    cursor = cursor.saturating_add(clamp_i32(h));
                }
            }
        }

        let height = (cursor.saturating_sub(y).max(0) as u32)
            .saturating_add(pad)
            .saturating_add(borders.bottom);
        self.out[slot].rect = Rect { x, y, width, height };
        height
    }

    fn child(&mut self, id: NodeId, x: i32, y: i32, width: u32) -> u32 {
        match self.doc.data(id) {
            Some(NodeData::Text(text)) => {
                let lines = wrap_text(text, width);
                let height = (lines.len() as u32).saturating_mul(LINE_HEIGHT);
                if !lines.is_empty() {
                    self.out.push(LayoutNode {
                        node: id,
                        rect: Rect { x, y, width, height },
                        kind: LayoutKind::Text { lines },
                    });
                }
                height
            }
            Some(NodeData::Element(_)) => self.block(id, x, y, width),
            None => 0,
        }
    }
}

/// Lay out `root` and its descendants into a flat list, parents before children.
///
/// Elements rejected by `filter` are skipped together with their subtree.
pub fn layout_subtree(
    doc: &Document,
    root: NodeId,
    width: u32,
    filter: &dyn Fn(&Element) -> bool,
) -> Vec<LayoutNode> {
    let mut ctx = LayoutContext {
        doc,
        filter,
        out: Vec::new(),
    };
    ctx.block(root, 0, 0, width);
    ctx.out
}
