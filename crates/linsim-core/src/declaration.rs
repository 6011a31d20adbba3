//! Tokenizing of single declaration lines and `key=value` parameter maps.
//!
//! A declaration has the shape `<name> <field> <field> ... [key=value ...]`.
//! Text is lower-cased, whitespace adjacent to `=` and `,` is dropped, and the
//! line is split on whitespace that is not enclosed in parentheses, so
//! `table=(0 1e-1, 10 100)` stays a single parameter with the value
//! `(0 1e-1,10 100)`.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// A tokenized declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    /// First token (element name, or `.kind` for directives).
    pub head: String,
    /// Positional fields after the head.
    pub fields: Vec<String>,
    /// Trailing `key=value` pairs.
    pub params: Params,
}

impl Declaration {
    pub(crate) fn tokenize(text: &str) -> Result<Self> {
        let normalized = normalize(text);
        let mut tokens = split_tokens(&normalized)?.into_iter();

        let head = tokens
            .next()
            .ok_or_else(|| Error::Parse("empty declaration".to_string()))?;

        let mut fields = Vec::new();
        let mut params = Params::new();
        for token in tokens {
            match split_assignment(&token) {
                Some((key, value)) => {
                    if key.is_empty() {
                        return Err(Error::Parse(format!("missing parameter name in '{token}'")));
                    }
                    if value.is_empty() {
                        return Err(Error::Parse(format!("missing value for parameter '{key}'")));
                    }
                    params.set(key, value);
                }
                None => fields.push(token),
            }
        }

        Ok(Self {
            head,
            fields,
            params,
        })
    }
}

/// Lower-case the line and drop whitespace around `=` and `,`.
fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let sticky = |ch: Option<char>| matches!(ch, Some('=') | Some(','));

    let mut last = None;
    let mut chars = lowered.chars().peekable();
    while let Some(c) = chars.next() {
        if !c.is_whitespace() {
            out.push(c);
            last = Some(c);
            continue;
        }

        while chars.next_if(|next| next.is_whitespace()).is_some() {}
        if !sticky(last) && !sticky(chars.peek().copied()) {
            out.push(' ');
            last = Some(' ');
        }
    }

    out
}

/// Split on spaces outside parentheses.
fn split_tokens(text: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::Parse(format!("unbalanced ')' in '{text}'")))?;
                current.push(c);
            }
            ' ' if depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if depth != 0 {
        return Err(Error::Parse(format!("unbalanced '(' in '{text}'")));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Split `key=value` at the first `=` outside parentheses.
fn split_assignment(token: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in token.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => return Some((&token[..i], &token[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Named `key=value` parameters of a declaration.
///
/// Keys are case-insensitive. Assigning a blank value removes the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(IndexMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a parameter (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.trim().to_lowercase()).map(String::as_str)
    }

    /// Set a parameter, or remove it when `value` is blank.
    ///
    /// Returns the previous value, if any.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Option<String> {
        let key = key.as_ref().trim().to_lowercase();
        let value = value.as_ref().trim();
        if value.is_empty() {
            self.0.shift_remove(&key)
        } else {
            self.0.insert(key, value.to_lowercase())
        }
    }

    /// Remove a parameter, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(&key.trim().to_lowercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

/// Join the non-empty parts of a canonical line with single spaces.
pub(crate) fn join_line<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
