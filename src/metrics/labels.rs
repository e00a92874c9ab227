//! Label sets and name validation for exposition series

use std::fmt;

use crate::error::{AppError, Result};

/// Returns true if `name` matches `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn validate_metric_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(AppError::InvalidName(format!("metric name '{name}'")))
    }
}

/// Escapes a label value: backslash, double quote and newline
pub fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes HELP text: backslash and newline only
pub fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Sorted set of label pairs identifying one series of a metric
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct LabelSet {
    pairs: Vec<(String, String)>,
}

impl LabelSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a label set from borrowed pairs, validating label names.
    ///
    /// A repeated key keeps the last value given.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self> {
        let mut set = Self::new();
        for (key, value) in pairs {
            set = set.with(key, value)?;
        }
        Ok(set)
    }

    /// Returns a copy of the set with `key` bound to `value`
    pub fn with(mut self, key: &str, value: &str) -> Result<Self> {
        if !is_valid_name(key) || key.starts_with("__") {
            return Err(AppError::InvalidName(format!("label name '{key}'")));
        }
        match self.pairs.binary_search_by(|(k, _)| k.as_str().cmp(key)) {
            Ok(idx) => self.pairs[idx].1 = value.to_string(),
            Err(idx) => self.pairs.insert(idx, (key.to_string(), value.to_string())),
        }
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Canonical form `k1="v1",k2="v2"`, keys sorted, values escaped
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}=\"{}\"", escape_label_value(value))?;
        }
        Ok(())
    }
}
