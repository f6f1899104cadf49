//! Tracked style properties, CSS value helpers and inline style storage.

use std::fmt;

/// Border edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    /// CSS box order: top, right, bottom, left.
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    pub fn name(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Right => "right",
            Edge::Bottom => "bottom",
            Edge::Left => "left",
        }
    }
}

/// What kind of value a property holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Color,
    Width,
    LineStyle,
}

/// The 17 style properties the export pipeline reads, pins and restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProperty {
    BackgroundColor,
    Color,
    BorderColor,
    BorderWidth,
    BorderStyle,
    BorderLeftColor,
    BorderLeftWidth,
    BorderLeftStyle,
    BorderRightColor,
    BorderRightWidth,
    BorderRightStyle,
    BorderTopColor,
    BorderTopWidth,
    BorderTopStyle,
    BorderBottomColor,
    BorderBottomWidth,
    BorderBottomStyle,
}

pub const TRACKED_PROPERTY_COUNT: usize = 17;

impl StyleProperty {
    pub const ALL: [StyleProperty; TRACKED_PROPERTY_COUNT] = [
        StyleProperty::BackgroundColor,
        StyleProperty::Color,
        StyleProperty::BorderColor,
        StyleProperty::BorderWidth,
        StyleProperty::BorderStyle,
        StyleProperty::BorderLeftColor,
        StyleProperty::BorderLeftWidth,
        StyleProperty::BorderLeftStyle,
        StyleProperty::BorderRightColor,
        StyleProperty::BorderRightWidth,
        StyleProperty::BorderRightStyle,
        StyleProperty::BorderTopColor,
        StyleProperty::BorderTopWidth,
        StyleProperty::BorderTopStyle,
        StyleProperty::BorderBottomColor,
        StyleProperty::BorderBottomWidth,
        StyleProperty::BorderBottomStyle,
    ];

    pub fn css_name(self) -> &'static str {
        use StyleProperty::*;
        match self {
            BackgroundColor => "background-color",
            Color => "color",
            BorderColor => "border-color",
            BorderWidth => "border-width",
            BorderStyle => "border-style",
            BorderLeftColor => "border-left-color",
            BorderLeftWidth => "border-left-width",
            BorderLeftStyle => "border-left-style",
            BorderRightColor => "border-right-color",
            BorderRightWidth => "border-right-width",
            BorderRightStyle => "border-right-style",
            BorderTopColor => "border-top-color",
            BorderTopWidth => "border-top-width",
            BorderTopStyle => "border-top-style",
            BorderBottomColor => "border-bottom-color",
            BorderBottomWidth => "border-bottom-width",
            BorderBottomStyle => "border-bottom-style",
        }
    }

    pub fn from_css_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|p| p.css_name() == name)
    }

    /// Longhand for one edge and value kind.
    pub fn edge(edge: Edge, kind: ValueKind) -> Self {
        use StyleProperty::*;
        match (edge, kind) {
            (Edge::Left, ValueKind::Color) => BorderLeftColor,
            (Edge::Left, ValueKind::Width) => BorderLeftWidth,
            (Edge::Left, ValueKind::LineStyle) => BorderLeftStyle,
            (Edge::Right, ValueKind::Color) => BorderRightColor,
            (Edge::Right, ValueKind::Width) => BorderRightWidth,
            (Edge::Right, ValueKind::LineStyle) => BorderRightStyle,
            (Edge::Top, ValueKind::Color) => BorderTopColor,
            (Edge::Top, ValueKind::Width) => BorderTopWidth,
            (Edge::Top, ValueKind::LineStyle) => BorderTopStyle,
            (Edge::Bottom, ValueKind::Color) => BorderBottomColor,
            (Edge::Bottom, ValueKind::Width) => BorderBottomWidth,
            (Edge::Bottom, ValueKind::LineStyle) => BorderBottomStyle,
        }
    }

    /// The all-edges shorthand for a value kind.
    pub fn shorthand(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Color => StyleProperty::BorderColor,
            ValueKind::Width => StyleProperty::BorderWidth,
            ValueKind::LineStyle => StyleProperty::BorderStyle,
        }
    }

    pub fn kind(self) -> ValueKind {
        use StyleProperty::*;
        match self {
            BackgroundColor | Color | BorderColor | BorderLeftColor | BorderRightColor
            | BorderTopColor | BorderBottomColor => ValueKind::Color,
            BorderWidth | BorderLeftWidth | BorderRightWidth | BorderTopWidth
            | BorderBottomWidth => ValueKind::Width,
            BorderStyle | BorderLeftStyle | BorderRightStyle | BorderTopStyle
            | BorderBottomStyle => ValueKind::LineStyle,
        }
    }

    pub fn is_border_shorthand(self) -> bool {
        matches!(
            self,
            StyleProperty::BorderColor | StyleProperty::BorderWidth | StyleProperty::BorderStyle
        )
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

/// Fixed-shape record holding one value per tracked property.
///
/// An empty string means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleRecord {
    values: [String; TRACKED_PROPERTY_COUNT],
}

impl StyleRecord {
    pub fn get(&self, prop: StyleProperty) -> &str {
        &self.values[prop.index()]
    }

    pub fn set(&mut self, prop: StyleProperty, value: impl Into<String>) {
        self.values[prop.index()] = value.into();
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| v.is_empty())
    }

    /// Non-empty entries in property order.
    pub fn iter(&self) -> impl Iterator<Item = (StyleProperty, &str)> {
        StyleProperty::ALL
            .into_iter()
            .map(move |p| (p, self.get(p)))
            .filter(|(_, v)| !v.is_empty())
    }
}

/// An element's `style` attribute: tracked properties plus anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub tracked: StyleRecord,
    pub other: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn parse(attr: &str) -> Self {
        let mut style = InlineStyle::default();
        for (name, value) in parse_declarations(attr) {
            if let Some(prop) = StyleProperty::from_css_name(&name) {
                style.tracked.set(prop, value);
            } else if is_edge_shorthand(&name) {
                for (prop, v) in expand_declaration(&name, &value) {
                    style.tracked.set(prop, v);
                }
            } else {
                style.other.retain(|(n, _)| *n != name);
                style.other.push((name, value));
            }
        }
        style
    }

    pub fn get(&self, prop: StyleProperty) -> &str {
        self.tracked.get(prop)
    }

    /// Set a tracked property; an empty value removes the override.
    pub fn set(&mut self, prop: StyleProperty, value: &str) {
        self.tracked.set(prop, value.trim());
    }

    /// Declarations in cascade form: `other` first, then tracked properties.
    pub fn declarations(&self) -> Vec<(String, String)> {
        let mut out = self.other.clone();
        out.extend(
            self.tracked
                .iter()
                .map(|(p, v)| (p.css_name().to_string(), v.to_string())),
        );
        out
    }

    pub fn to_css(&self) -> String {
        self.declarations()
            .into_iter()
            .map(|(n, v)| format!("{}: {};", n, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `border` and `border-<edge>`, which expand onto tracked longhands.
fn is_edge_shorthand(name: &str) -> bool {
    name == "border" || Edge::ALL.iter().any(|e| name == format!("border-{}", e.name()))
}

/// Split `a: b; c: d` into trimmed, lowercased-name pairs.
pub fn parse_declarations(block: &str) -> Vec<(String, String)> {
    block
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().trim_end_matches("!important").trim();
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some((name, value.to_string()))
            }
        })
        .collect()
}

/// RGBA color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba(255, 255, 255, 255);

    /// Serialize the way computed styles report colors.
    pub fn to_css(self) -> String {
        let Rgba(r, g, b, a) = self;
        if a == 255 {
            format!("rgb({}, {}, {})", r, g, b)
        } else if a == 0 {
            format!("rgba({}, {}, {}, 0)", r, g, b)
        } else {
            let alpha = (a as f32 / 255.0 * 100.0).round() / 100.0;
            format!("rgba({}, {}, {}, {})", r, g, b, alpha)
        }
    }

    pub fn is_transparent(self) -> bool {
        self.3 == 0
    }
}

const NAMED_COLORS: &[(&str, Rgba)] = &[
    ("transparent", Rgba::TRANSPARENT),
    ("black", Rgba::BLACK),
    ("white", Rgba::WHITE),
    ("red", Rgba(255, 0, 0, 255)),
    ("green", Rgba(0, 128, 0, 255)),
    ("blue", Rgba(0, 0, 255, 255)),
    ("gray", Rgba(128, 128, 128, 255)),
    ("grey", Rgba(128, 128, 128, 255)),
    ("silver", Rgba(192, 192, 192, 255)),
    ("purple", Rgba(128, 0, 128, 255)),
    ("orange", Rgba(255, 165, 0, 255)),
    ("yellow", Rgba(255, 255, 0, 255)),
];

/// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()` or a named color.
pub fn parse_color(value: &str) -> Option<Rgba> {
    let v = value.trim().to_ascii_lowercase();
    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = v
        .strip_prefix("rgba(")
        .or_else(|| v.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<&str> = args.split(|c: char| c == ',' || c == '/' || c == ' ').filter(|p| !p.is_empty()).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let channel = |s: &str| s.parse::<f32>().ok().map(|n| n.clamp(0.0, 255.0).round() as u8);
        let alpha = match parts.get(3) {
            Some(a) => {
                let a: f32 = a.parse().ok()?;
                (a.clamp(0.0, 1.0) * 255.0).round() as u8
            }
            None => 255,
        };
        return Some(Rgba(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha));
    }
    NAMED_COLORS.iter().find(|(n, _)| *n == v).map(|(_, c)| *c)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba(nibble(0)?, nibble(1)?, nibble(2)?, 255)),
        4 => Some(Rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgba(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

pub fn is_current_color(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("currentcolor")
}

/// Parse a border width into CSS pixels.
pub fn parse_width(value: &str) -> Option<f32> {
    let v = value.trim().to_ascii_lowercase();
    match v.as_str() {
        "thin" => return Some(1.0),
        "medium" => return Some(3.0),
        "thick" => return Some(5.0),
        "0" => return Some(0.0),
        _ => {}
    }
    v.strip_suffix("px")?.trim().parse::<f32>().ok().filter(|w| *w >= 0.0)
}

/// Format pixels the way computed widths are reported ("4px", "0.5px").
pub fn format_px(px: f32) -> String {
    if px.fract() == 0.0 {
        format!("{}px", px as i64)
    } else {
        format!("{}px", px)
    }
}

const LINE_STYLES: &[&str] = &[
    "none", "hidden", "solid", "dashed", "dotted", "double", "groove", "ridge", "inset", "outset",
];

pub fn is_line_style(value: &str) -> bool {
    LINE_STYLES.contains(&value.trim().to_ascii_lowercase().as_str())
}

/// Styles that draw no border and force the used width to zero.
pub fn is_invisible_line(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "none" | "hidden" | "")
}

/// Expand one declaration into the tracked longhands it sets.
///
/// Border shorthands expand to per-edge longhands; components a shorthand
/// omits reset to their initial values. Unknown or unparsable declarations
/// expand to nothing.
pub fn expand_declaration(name: &str, value: &str) -> Vec<(StyleProperty, String)> {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();
    match name {
        "background-color" => vec![(StyleProperty::BackgroundColor, lower)],
        "background" => value
            .split_whitespace()
            .find(|t| parse_color(t).is_some())
            .map(|c| vec![(StyleProperty::BackgroundColor, c.to_ascii_lowercase())])
            .unwrap_or_default(),
        "color" => vec![(StyleProperty::Color, lower)],
        "border" => expand_border(&Edge::ALL, &lower),
        "border-color" => expand_box(ValueKind::Color, &lower),
        "border-width" => expand_box(ValueKind::Width, &lower),
        "border-style" => expand_box(ValueKind::LineStyle, &lower),
        _ => {
            if let Some(edge) = Edge::ALL
                .into_iter()
                .find(|e| name == format!("border-{}", e.name()))
            {
                return expand_border(&[edge], &lower);
            }
            match StyleProperty::from_css_name(name) {
                Some(p) if !p.is_border_shorthand() => vec![(p, lower)],
                _ => Vec::new(),
            }
        }
    }
}

fn expand_border(edges: &[Edge], value: &str) -> Vec<(StyleProperty, String)> {
    let mut width = "medium".to_string();
    let mut style = "none".to_string();
    let mut color = "currentcolor".to_string();
    for token in value.split_whitespace() {
        if is_line_style(token) {
            style = token.to_string();
        } else if parse_width(token).is_some() {
            width = token.to_string();
        } else if parse_color(token).is_some() || is_current_color(token) {
            color = token.to_string();
        }
    }
    let mut out = Vec::with_capacity(edges.len() * 3);
    for &edge in edges {
        out.push((StyleProperty::edge(edge, ValueKind::Width), width.clone()));
        out.push((StyleProperty::edge(edge, ValueKind::LineStyle), style.clone()));
        out.push((StyleProperty::edge(edge, ValueKind::Color), color.clone()));
    }
    out
}

/// 1-4 value box shorthand in top, right, bottom, left order.
fn expand_box(kind: ValueKind, value: &str) -> Vec<(StyleProperty, String)> {
    let tokens: Vec<&str> = split_values(value);
    let pick: [usize; 4] = match tokens.len() {
        1 => [0, 0, 0, 0],
        2 => [0, 1, 0, 1],
        3 => [0, 1, 2, 1],
        4 => [0, 1, 2, 3],
        _ => return Vec::new(),
    };
    Edge::ALL
        .into_iter()
        .zip(pick)
        .map(|(edge, i)| (StyleProperty::edge(edge, kind), tokens[i].to_string()))
        .collect()
}

/// Split on whitespace while keeping `rgb(1, 2, 3)` together.
fn split_values(value: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    out.push(&value[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push(&value[s..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_table_is_complete() {
        assert_eq!(StyleProperty::ALL.len(), 17);
        for p in StyleProperty::ALL {
            assert_eq!(StyleProperty::from_css_name(p.css_name()), Some(p));
        }
        assert_eq!(StyleProperty::edge(Edge::Left, ValueKind::Width), StyleProperty::BorderLeftWidth);
    }

    #[test]
    fn parses_colors() {
        assert_eq!(parse_color("#FFF2CC"), Some(Rgba(255, 242, 204, 255)));
        assert_eq!(parse_color("#fff"), Some(Rgba::WHITE));
        assert_eq!(parse_color("rgb(1, 2, 3)"), Some(Rgba(1, 2, 3, 255)));
        assert_eq!(parse_color("rgba(0, 0, 0, 0)"), Some(Rgba::TRANSPARENT));
        assert_eq!(parse_color("transparent"), Some(Rgba::TRANSPARENT));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("solid"), None);
    }

    #[test]
    fn serializes_like_computed_style() {
        assert_eq!(Rgba(59, 130, 246, 255).to_css(), "rgb(59, 130, 246)");
        assert_eq!(Rgba::TRANSPARENT.to_css(), "rgba(0, 0, 0, 0)");
        assert_eq!(Rgba(0, 0, 0, 128).to_css(), "rgba(0, 0, 0, 0.5)");
    }

    #[test]
    fn widths() {
        assert_eq!(parse_width("4px"), Some(4.0));
        assert_eq!(parse_width("0"), Some(0.0));
        assert_eq!(parse_width("medium"), Some(3.0));
        assert_eq!(parse_width("4em"), None);
        assert_eq!(format_px(4.0), "4px");
        assert_eq!(format_px(0.5), "0.5px");
    }

    #[test]
    fn expands_border_shorthands() {
        let left = expand_declaration("border-left", "4px solid #3B82F6");
        assert_eq!(
            left,
            vec![
                (StyleProperty::BorderLeftWidth, "4px".to_string()),
                (StyleProperty::BorderLeftStyle, "solid".to_string()),
                (StyleProperty::BorderLeftColor, "#3b82f6".to_string()),
            ]
        );
        assert_eq!(expand_declaration("border", "1px solid").len(), 12);

        let colors = expand_declaration("border-color", "red rgb(0, 0, 255)");
        assert_eq!(colors.len(), 4);
        assert_eq!(colors[1], (StyleProperty::BorderRightColor, "rgb(0, 0, 255)".to_string()));
        assert_eq!(colors[2], (StyleProperty::BorderBottomColor, "red".to_string()));

        assert_eq!(
            expand_declaration("background", "#FFF no-repeat"),
            vec![(StyleProperty::BackgroundColor, "#fff".to_string())]
        );
        assert!(expand_declaration("padding", "4px").is_empty());
        assert!(expand_declaration("border-color", "a b c d e").is_empty());
    }

    #[test]
    fn inline_style_keeps_untracked_declarations() {
        let mut s = InlineStyle::parse("background-color: #FFF2CC; padding: 4px; border-color: #3B82F6");
        assert_eq!(s.get(StyleProperty::BackgroundColor), "#FFF2CC");
        assert_eq!(s.get(StyleProperty::BorderColor), "#3B82F6");
        assert_eq!(s.other, vec![("padding".to_string(), "4px".to_string())]);
        s.set(StyleProperty::BackgroundColor, "");
        assert_eq!(s.to_css(), "padding: 4px; border-color: #3B82F6;");
    }
}
