//! A small stylesheet model: compound selectors joined by descendant
//! combinators, specificity ordering and tracked-property declarations.

use super::style::{expand_declaration, parse_declarations, StyleProperty};

/// `tag.class#id` style compound selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Compound {
    fn parse(text: &str) -> Option<Self> {
        let mut out = Compound::default();
        let mut rest = text;
        let head_len = rest.find(['.', '#']).unwrap_or(rest.len());
        let head = &rest[..head_len];
        if !head.is_empty() && head != "*" {
            if !head.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return None;
            }
            out.tag = Some(head.to_ascii_lowercase());
        }
        rest = &rest[head_len..];
        while !rest.is_empty() {
            let marker = rest.chars().next()?;
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty()
                || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return None;
            }
            match marker {
                '.' => out.classes.push(name.to_string()),
                '#' => out.id = Some(name.to_string()),
                _ => return None,
            }
            rest = &body[end..];
        }
        Some(out)
    }

    pub fn matches(&self, tag: &str, id: Option<&str>, classes: &[String]) -> bool {
        if let Some(t) = &self.tag {
            if t != tag {
                return false;
            }
        }
        if let Some(want) = &self.id {
            if id != Some(want.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| classes.contains(c))
    }

    fn specificity(&self) -> (u32, u32, u32) {
        (
            self.id.is_some() as u32,
            self.classes.len() as u32,
            self.tag.is_some() as u32,
        )
    }
}

/// Compounds from outermost ancestor to subject, joined by descendant combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub compounds: Vec<Compound>,
}

impl Selector {
    /// Parse a selector; combinators other than whitespace, pseudo-classes and
    /// attribute selectors are not supported and yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        if text.contains(['>', '+', '~', ':', '[', '(']) {
            return None;
        }
        let compounds = text
            .split_whitespace()
            .map(Compound::parse)
            .collect::<Option<Vec<_>>>()?;
        if compounds.is_empty() {
            return None;
        }
        Some(Self { compounds })
    }

    pub fn specificity(&self) -> (u32, u32, u32) {
        self.compounds.iter().fold((0, 0, 0), |acc, c| {
            let s = c.specificity();
            (acc.0 + s.0, acc.1 + s.1, acc.2 + s.2)
        })
    }

    pub fn subject(&self) -> &Compound {
        &self.compounds[self.compounds.len() - 1]
    }

    /// Ancestor compounds from nearest to outermost.
    pub fn ancestors(&self) -> impl Iterator<Item = &Compound> {
        self.compounds[..self.compounds.len() - 1].iter().rev()
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub selector: Selector,
    pub specificity: (u32, u32, u32),
    pub order: usize,
    pub declarations: Vec<(StyleProperty, String)>,
}

/// Parsed author stylesheet
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn parse(css: &str) -> Self {
        let css = strip_comments(css);
        let mut rules = Vec::new();
        let mut skipped = 0usize;
        for block in css.split('}') {
            let Some((selectors, body)) = block.split_once('{') else {
                continue;
            };
            let declarations: Vec<(StyleProperty, String)> = parse_declarations(body)
                .into_iter()
                .flat_map(|(name, value)| expand_declaration(&name, &value))
                .collect();
            if declarations.is_empty() {
                continue;
            }
            for text in selectors.split(',') {
                match Selector::parse(text.trim()) {
                    Some(selector) => {
                        let order = rules.len();
                        rules.push(Rule {
                            specificity: selector.specificity(),
                            selector,
                            order,
                            declarations: declarations.clone(),
                        });
                    }
                    None => skipped += 1,
                }
            }
        }
        if skipped > 0 {
            log::debug!("stylesheet: skipped {} unsupported selectors", skipped);
        }
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}
