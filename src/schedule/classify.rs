//! Keyword rules that pick display colors for activities.
//!
//! Background and border accent colors come from two separate ordered rule
//! lists. They are evaluated first-match-wins against the lowercased activity
//! name and intentionally disagree in places ("fruit" vs "fruit run").

use super::Activity;

/// A single first-match-wins rule: substring of the lowercased name to color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRule {
    pub keyword: &'static str,
    pub color: &'static str,
}

const fn rule(keyword: &'static str, color: &'static str) -> ColorRule {
    ColorRule { keyword, color }
}

pub const BACKGROUND_RULES: &[ColorRule] = &[
    rule("breakfast", "#FFF2CC"),
    rule("lunch", "#D1E3FF"),
    rule("dinner", "#FFCCDC"),
    rule("workshop", "#CDEAC0"),
    rule("promotion", "#E7D2F3"),
    rule("setup", "#FFE0B2"),
    rule("customer", "#D6DDE8"),
    rule("cleanup", "#E8E8E8"),
    rule("exploration", "#B2EBF2"),
    rule("museum", "#FFF59D"),
    rule("run", "#B3E5FC"),
    rule("venue", "#D4EDDA"),
    rule("fruit", "#FFE0B2"),
    rule("table", "#FFD6C4"),
    rule("arrive", "#D5F5E3"),
];

pub const BACKGROUND_FALLBACK: &str = "#F4F6F8";

pub const BORDER_RULES: &[ColorRule] = &[
    rule("fruit run", "#3B82F6"),
    rule("breakfast", "#F59E0B"),
    rule("setup", "#F97316"),
    rule("promotion", "#A855F7"),
    rule("customer", "#6366F1"),
    rule("cleanup", "#6B7280"),
    rule("venue", "#22C55E"),
    rule("museum", "#F87171"),
];

pub const BORDER_FALLBACK: &str = "#8B5CF6";

/// Evaluate `rules` in order against `name`, returning the first hit.
pub fn first_match(rules: &[ColorRule], name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();
    rules
        .iter()
        .find(|r| name.contains(r.keyword))
        .map(|r| r.color)
}

/// Background color for an activity card.
///
/// An explicit color from the feed wins when it parses as a CSS color;
/// otherwise the keyword table decides, falling back to a neutral gray.
pub fn activity_color(activity: &Activity) -> String {
    if let Some(explicit) = activity.explicit_background() {
        return explicit.to_string();
    }
    first_match(BACKGROUND_RULES, &activity.activity_name)
        .unwrap_or(BACKGROUND_FALLBACK)
        .to_string()
}

/// Left border accent color for an activity card. Explicit colors are ignored.
pub fn border_accent_color(activity: &Activity) -> &'static str {
    first_match(BORDER_RULES, &activity.activity_name).unwrap_or(BORDER_FALLBACK)
}
