//! Prompt templates with `$name` placeholders.
//!
//! Substitution is "safe": placeholders without a value are left as they
//! are instead of failing, so partially filled templates can be rendered
//! in stages. `$$` renders a literal `$`.

use std::collections::HashMap;

/// Generic assistant instruction used as the system message.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are an intelligent assistant.\n\
In your prompts, you will receive semantic requests to process.\n\
Your role is to understand what the user asks and rationalize over it.\n\
If a function is passed in the prompt, you should call it and return the result.\n";

/// Layout combining retrieved context, conversation history and the prompt.
pub const DEFAULT_PROMPT: &str = "Provided the following context:\n\
------------------------------\n\
$context\n\
------------------------------\n\
And the following history:\n\
$history\n\
------------------------------\n\
$prompt\n";

/// A text template with `$name` / `${name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for segment in Segments::new(&self.text) {
            if let Segment::Placeholder { name, .. } = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute every placeholder that has a value.
    pub fn render(&self, vars: &HashMap<&str, &str>) -> String {
        let mut out = String::with_capacity(self.text.len());
        for segment in Segments::new(&self.text) {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Dollar => out.push('$'),
                Segment::Placeholder { name, raw } => match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(raw),
                },
            }
        }
        out
    }
}

enum Segment<'a> {
    Literal(&'a str),
    /// An escaped `$$`.
    Dollar,
    Placeholder { name: &'a str, raw: &'a str },
}

struct Segments<'a> {
    rest: &'a str,
}

impl<'a> Segments<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let Some(stripped) = self.rest.strip_prefix('$') else {
            let end = self.rest.find('$').unwrap_or(self.rest.len());
            let (literal, rest) = self.rest.split_at(end);
            self.rest = rest;
            return Some(Segment::Literal(literal));
        };

        if let Some(rest) = stripped.strip_prefix('$') {
            self.rest = rest;
            return Some(Segment::Dollar);
        }

        if let Some(inner) = stripped.strip_prefix('{') {
            if let Some(close) = inner.find('}') {
                let name = &inner[..close];
                if is_identifier(name) {
                    let raw_len = close + 3;
                    let raw = &self.rest[..raw_len];
                    self.rest = &self.rest[raw_len..];
                    return Some(Segment::Placeholder { name, raw });
                }
            }
        } else {
            let len = identifier_len(stripped);
            if len > 0 {
                let name = &stripped[..len];
                let raw = &self.rest[..len + 1];
                self.rest = &self.rest[len + 1..];
                return Some(Segment::Placeholder { name, raw });
            }
        }

        // Lone `$` that starts no placeholder.
        let (literal, rest) = self.rest.split_at(1);
        self.rest = rest;
        Some(Segment::Literal(literal))
    }
}

fn identifier_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && identifier_len(name) == name.len()
}
