//! Paint commands built from a layout and the elements' inline styles

use super::layout::{inline_edge_value, LayoutKind, LayoutNode};
use crate::dom::style::{parse_color, Edge, Rgba, StyleProperty, ValueKind};
use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: (u8, u8, u8, u8),
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        rgba: (u8, u8, u8, u8),
    },
}

fn rgba_tuple(c: Rgba) -> (u8, u8, u8, u8) {
    (c.0, c.1, c.2, c.3)
}

/// Nearest inline `color` on `node` or an ancestor, defaulting to black.
fn inline_text_color(doc: &Document, node: NodeId) -> Rgba {
    let mut cursor = Some(node);
    while let Some(id) = cursor {
        if let Ok(el) = doc.element(id) {
            if let Some(c) = parse_color(el.style.get(StyleProperty::Color)) {
                return c;
            }
        }
        cursor = doc.parent(id);
    }
    Rgba::BLACK
}

/// Build a display list in painting order. Only inline styles are consulted.
pub fn build_display_list(doc: &Document, layout: &[LayoutNode]) -> Vec<PaintCommand> {
    let mut cmds = Vec::new();
    for node in layout {
        let r = node.rect;
        match &node.kind {
            LayoutKind::Block { borders } => {
                let Ok(el) = doc.element(node.node) else {
                    continue;
                };
                if let Some(bg) = parse_color(el.style.get(StyleProperty::BackgroundColor)) {
                    if !bg.is_transparent() {
                        cmds.push(PaintCommand::SolidRect {
                            x: r.x,
                            y: r.y,
                            width: r.width,
                            height: r.height,
                            rgba: rgba_tuple(bg),
                        });
                    }
                }
                for edge in Edge::ALL {
                    let w = borders.get(edge);
                    if w == 0 {
                        continue;
                    }
                    let color = match parse_color(inline_edge_value(el, edge, ValueKind::Color)) {
                        Some(c) => c,
                        None => inline_text_color(doc, node.node),
                    };
                    if color.is_transparent() {
                        continue;
                    }
                    let (x, y, width, height) = match edge {
                        Edge::Top => (r.x, r.y, r.width, w),
                        Edge::Bottom => (r.x, r.y + r.height as i32 - w as i32, r.width, w),
                        Edge::Left => (r.x, r.y, w, r.height),
                        Edge::Right => (r.x + r.width as i32 - w as i32, r.y, w, r.height),
                    };
                    cmds.push(PaintCommand::SolidRect {
                        x,
                        y,
                        width,
                        height,
                        rgba: rgba_tuple(color),
                    });
                }
            }
            LayoutKind::Text { lines } => {
                let color = doc
                    .parent(node.node)
                    .map(|p| inline_text_color(doc, p))
                    .unwrap_or(Rgba::BLACK);
                for (i, line) in lines.iter().enumerate() {
                    cmds.push(PaintCommand::Text {
                        x: r.x,
                        y: r.y + (i as u32 * super::layout::LINE_HEIGHT) as i32,
                        text: line.clone(),
                        rgba: rgba_tuple(color),
                    });
                }
            }
        }
    }
    cmds
}
