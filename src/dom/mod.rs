//! Arena DOM with inline styles and a computed-style cascade.
//!
//! Documents are imported from HTML with `scraper` and styled by a
//! [`css::Stylesheet`]. Nodes are addressed by [`NodeId`], which stays stable
//! for the lifetime of the document; the export pipeline uses it as the key
//! of its style snapshot.

pub mod css;
pub mod style;

use scraper::{ElementRef, Html};

use crate::{Error, Result};
use css::{Compound, Stylesheet};
use style::{
    expand_declaration, format_px, is_current_color, is_invisible_line, parse_color, parse_width,
    Edge, InlineStyle, Rgba, StyleProperty, StyleRecord, ValueKind,
};

/// Stable handle to a node in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub style: InlineStyle,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
            style: InlineStyle::default(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn matches(&self, compound: &Compound) -> bool {
        compound.matches(&self.tag, self.id.as_deref(), &self.classes)
    }
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A styled node tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    stylesheet: Stylesheet,
}

impl Document {
    /// An empty document whose root is a `<body>` element.
    pub fn new(stylesheet: Stylesheet) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Element(Element::new("body")),
            }],
            stylesheet,
        }
    }

    /// Import an HTML fragment under a fresh `<body>` root.
    pub fn from_html(html: &str, css: &str) -> Self {
        let mut doc = Document::new(Stylesheet::parse(css));
        let fragment = Html::parse_fragment(html);

        let mut stack = vec![(fragment.root_element(), doc.root())];
        while let Some((element_ref, parent)) = stack.pop() {
            for child in element_ref.children() {
                match child.value() {
                    scraper::Node::Element(el) => {
                        let mut element = Element::new(el.name());
                        for (name, value) in el.attrs() {
                            match name {
                                "id" => element.id = Some(value.to_string()),
                                "class" => {
                                    element.classes =
                                        value.split_whitespace().map(str::to_string).collect()
                                }
                                "style" => element.style = InlineStyle::parse(value),
                                _ => element.attrs.push((name.to_string(), value.to_string())),
                            }
                        }
                        let id = doc.push(parent, NodeData::Element(element));
                        if let Some(child_ref) = ElementRef::wrap(child) {
                            stack.push((child_ref, id));
                        }
                    }
                    scraper::Node::Text(t) => {
                        let text: &str = t;
                        if !text.trim().is_empty() {
                            doc.push(parent, NodeData::Text(text.to_string()));
                        }
                    }
                    _ => {}
                }
            }
        }
        doc
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append a new element under `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId> {
        self.element(parent)?;
        Ok(self.push(parent, NodeData::Element(Element::new(tag))))
    }

    /// Append a text node under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        self.element(parent)?;
        Ok(self.push(parent, NodeData::Text(text.to_string())))
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).map(|n| &n.data)
    }

    pub fn element(&self, id: NodeId) -> Result<&Element> {
        match self.nodes.get(id.0).map(|n| &n.data) {
            Some(NodeData::Element(el)) => Ok(el),
            _ => Err(Error::UnknownNode(id.0)),
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => Ok(el),
            _ => Err(Error::UnknownNode(id.0)),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element descendants of `id` in document order, excluding `id` itself.
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            if matches!(self.nodes[n.0].data, NodeData::Element(_)) {
                out.push(n);
                stack.extend(self.children(n).iter().rev().copied());
            }
        }
        out
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| match &n.data {
            NodeData::Element(el) => el.id.as_deref() == Some(id),
            _ => false,
        })
        .map(NodeId)
    }

    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(&n.data, NodeData::Element(el) if el.has_class(class)))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            match &self.nodes[n.0].data {
                NodeData::Text(t) => out.push_str(t),
                NodeData::Element(_) => stack.extend(self.children(n).iter().rev().copied()),
            }
        }
        out
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        let el = self.element_mut(id)?;
        if !el.has_class(class) {
            el.classes.push(class.to_string());
        }
        Ok(())
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        self.element_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    /// Current inline values of the tracked properties.
    pub fn inline_style(&self, id: NodeId) -> Result<&StyleRecord> {
        Ok(&self.element(id)?.style.tracked)
    }

    pub fn set_inline(&mut self, id: NodeId, prop: StyleProperty, value: &str) -> Result<()> {
        self.element_mut(id)?.style.set(prop, value);
        Ok(())
    }

    /// Replace all tracked inline values at once.
    pub fn set_inline_record(&mut self, id: NodeId, record: StyleRecord) -> Result<()> {
        self.element_mut(id)?.style.tracked = record;
        Ok(())
    }

    fn matches_selector(&self, id: NodeId, selector: &css::Selector) -> bool {
        let Ok(el) = self.element(id) else {
            return false;
        };
        if !el.matches(selector.subject()) {
            return false;
        }
        let mut cursor = self.parent(id);
        for compound in selector.ancestors() {
            loop {
                let Some(anc) = cursor else {
                    return false;
                };
                cursor = self.parent(anc);
                if self.element(anc).map(|e| e.matches(compound)).unwrap_or(false) {
                    break;
                }
            }
        }
        true
    }

    /// Declared (cascaded) longhand values for `id`, before defaulting.
    fn cascaded(&self, id: NodeId) -> Result<StyleRecord> {
        let el = self.element(id)?;
        let mut winners: Vec<(&css::Rule, usize)> = self
            .stylesheet
            .rules()
            .iter()
            .filter(|r| self.matches_selector(id, &r.selector))
            .map(|r| (r, r.order))
            .collect();
        winners.sort_by_key(|(r, order)| (r.specificity, *order));

        let mut out = StyleRecord::default();
        for (rule, _) in winners {
            for (prop, value) in &rule.declarations {
                out.set(*prop, value.clone());
            }
        }
        for (name, value) in &el.style.other {
            for (p, v) in expand_declaration(name, value) {
                out.set(p, v);
            }
        }
        // Inline shorthands apply before inline longhands.
        let inline = &el.style.tracked;
        for (prop, value) in inline.iter().filter(|(p, _)| p.is_border_shorthand()) {
            for (p, v) in expand_declaration(prop.css_name(), value) {
                out.set(p, v);
            }
        }
        for (prop, value) in inline.iter().filter(|(p, _)| !p.is_border_shorthand()) {
            out.set(prop, value.to_ascii_lowercase());
        }
        Ok(out)
    }

    fn computed_color(&self, id: NodeId) -> Result<Rgba> {
        let declared = self.cascaded(id)?;
        let value = declared.get(StyleProperty::Color);
        if let Some(c) = parse_color(value) {
            return Ok(c);
        }
        match self.parent(id) {
            Some(parent) => self.computed_color(parent),
            None => Ok(Rgba::BLACK),
        }
    }

    /// Resolved values of all 17 tracked properties, formatted like a
    /// browser's computed style (`rgb()` colors, pixel widths).
    ///
    /// Shorthands report a single value when all edges agree and the four
    /// edge values otherwise.
    pub fn computed_style(&self, id: NodeId) -> Result<StyleRecord> {
        let declared = self.cascaded(id)?;
        let color = self.computed_color(id)?;

        let mut out = StyleRecord::default();
        out.set(StyleProperty::Color, color.to_css());
        let background = parse_color(declared.get(StyleProperty::BackgroundColor))
            .unwrap_or(Rgba::TRANSPARENT);
        out.set(StyleProperty::BackgroundColor, background.to_css());

        for edge in Edge::ALL {
            let style_prop = StyleProperty::edge(edge, ValueKind::LineStyle);
            let width_prop = StyleProperty::edge(edge, ValueKind::Width);
            let color_prop = StyleProperty::edge(edge, ValueKind::Color);

            let line = match declared.get(style_prop) {
                "" => "none",
                s => s,
            };
            let width = if is_invisible_line(line) {
                0.0
            } else {
                parse_width(declared.get(width_prop)).unwrap_or(3.0)
            };
            let edge_color = match declared.get(color_prop) {
                v if is_current_color(v) => color,
                v => parse_color(v).unwrap_or(color),
            };

            out.set(style_prop, line.to_string());
            out.set(width_prop, format_px(width));
            out.set(color_prop, edge_color.to_css());
        }

        for kind in [ValueKind::Color, ValueKind::Width, ValueKind::LineStyle] {
            let values: Vec<&str> = Edge::ALL
                .iter()
                .map(|e| out.get(StyleProperty::edge(*e, kind)))
                .collect();
            let collapsed = if values.iter().all(|v| *v == values[0]) {
                values[0].to_string()
            } else {
                values.join(" ")
            };
            out.set(StyleProperty::shorthand(kind), collapsed);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSS: &str = "
        .card { border-left: 4px solid; background-color: #eee }
        .muted { color: #6b7280 }
        #hot { color: red }
        .grid .cell { border-right: 1px solid #e5e7eb }
    ";

    fn sample() -> Document {
        Document::from_html(
            r##"<div id="schedule" class="grid">
                 <div class="cell muted"><span id="t">9:00 AM</span></div>
                 <div class="card" style="border-color: #3B82F6; background-color: #FFF2CC">Card</div>
                 <div id="hot" class="muted">Hot</div>
                 <svg class="icon"><path d="M0 0"/></svg>
               </div>"##,
            CSS,
        )
    }

    #[test]
    fn imports_elements_attributes_and_text() {
        let doc = sample();
        let schedule = doc.element_by_id("schedule").unwrap();
        assert_eq!(doc.element(schedule).unwrap().tag, "div");
        assert!(doc.element(schedule).unwrap().has_class("grid"));
        let desc = doc.descendant_elements(schedule);
        assert_eq!(desc.len(), 6);
        assert!(!desc.contains(&schedule));
        assert!(doc.text_content(schedule).contains("9:00 AM"));
        let svg = doc.elements_with_class("icon")[0];
        assert_eq!(doc.element(svg).unwrap().tag, "svg");
    }

    #[test]
    fn computed_defaults() {
        let doc = sample();
        let schedule = doc.element_by_id("schedule").unwrap();
        let cs = doc.computed_style(schedule).unwrap();
        assert_eq!(cs.get(StyleProperty::BackgroundColor), "rgba(0, 0, 0, 0)");
        assert_eq!(cs.get(StyleProperty::Color), "rgb(0, 0, 0)");
        assert_eq!(cs.get(StyleProperty::BorderWidth), "0px");
        assert_eq!(cs.get(StyleProperty::BorderStyle), "none");
    }

    #[test]
    fn color_inherits_and_specificity_orders_rules() {
        let doc = sample();
        let span = doc.element_by_id("t").unwrap();
        assert_eq!(doc.computed_style(span).unwrap().get(StyleProperty::Color), "rgb(107, 114, 128)");
        let hot = doc.element_by_id("hot").unwrap();
        assert_eq!(doc.computed_style(hot).unwrap().get(StyleProperty::Color), "rgb(255, 0, 0)");
    }

    #[test]
    fn descendant_rules_and_inline_shorthand() {
        let doc = sample();
        let cell = doc.elements_with_class("cell")[0];
        let cs = doc.computed_style(cell).unwrap();
        assert_eq!(cs.get(StyleProperty::BorderRightWidth), "1px");
        assert_eq!(cs.get(StyleProperty::BorderRightColor), "rgb(229, 231, 235)");
        assert_eq!(cs.get(StyleProperty::BorderWidth), "0px 1px 0px 0px");

        let card = doc.elements_with_class("card")[0];
        let cs = doc.computed_style(card).unwrap();
        assert_eq!(cs.get(StyleProperty::BackgroundColor), "rgb(255, 242, 204)");
        assert_eq!(cs.get(StyleProperty::BorderLeftWidth), "4px");
        assert_eq!(cs.get(StyleProperty::BorderLeftStyle), "solid");
        assert_eq!(cs.get(StyleProperty::BorderLeftColor), "rgb(59, 130, 246)");
        assert_eq!(cs.get(StyleProperty::BorderColor), "rgb(59, 130, 246)");
    }

    #[test]
    fn class_and_inline_mutation() {
        let mut doc = sample();
        let root = doc.element_by_id("schedule").unwrap();
        doc.add_class(root, "export-mode").unwrap();
        doc.add_class(root, "export-mode").unwrap();
        assert_eq!(doc.element(root).unwrap().classes.len(), 2);
        doc.remove_class(root, "export-mode").unwrap();
        assert!(!doc.element(root).unwrap().has_class("export-mode"));

        doc.set_inline(root, StyleProperty::Color, "rgb(1, 2, 3)").unwrap();
        assert_eq!(doc.inline_style(root).unwrap().get(StyleProperty::Color), "rgb(1, 2, 3)");
        assert_eq!(doc.computed_style(root).unwrap().get(StyleProperty::Color), "rgb(1, 2, 3)");
    }

    #[test]
    fn text_nodes_are_not_elements() {
        let mut doc = Document::new(Stylesheet::default());
        let root = doc.root();
        let text = doc.append_text(root, "hi").unwrap();
        assert!(matches!(doc.element(text), Err(Error::UnknownNode(_))));
        assert!(doc.append_element(text, "div").is_err());
    }
}
