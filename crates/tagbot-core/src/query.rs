//! Parsed query representation and tag-set arithmetic.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::fields::{FieldRegistry, EMOJI, TAGS};
use crate::models::TaggedDocument;

// =============================================================================
// WARNINGS
// =============================================================================

/// Non-fatal problem found while parsing a query.
///
/// Parsing never fails; every problem is reported as a warning and the
/// offending token is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryWarning {
    UnknownField { field: String },
    UnusedField { field: String },
    InvalidValue { field: String, value: String },
    AmbiguousValue {
        field: String,
        value: String,
        candidates: Vec<String>,
    },
    DuplicateValue { field: String, value: String },
    NegationNotAllowed { field: String, value: String },
    StrayColon,
}

impl fmt::Display for QueryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryWarning::UnknownField { field } => write!(f, "Unknown field \"{}\"", field),
            QueryWarning::UnusedField { field } => {
                write!(f, "Field \"{}\" is empty and was ignored", field)
            }
            QueryWarning::InvalidValue { field, value } => {
                write!(f, "Invalid value \"{}\" for field \"{}\"", value, field)
            }
            QueryWarning::AmbiguousValue {
                field,
                value,
                candidates,
            } => write!(
                f,
                "Ambiguous value \"{}\" for field \"{}\": could be {}",
                value,
                field,
                candidates.join(", ")
            ),
            QueryWarning::DuplicateValue { field, value } => write!(
                f,
                "Field \"{}\" specified more than once, ignoring \"{}\"",
                field, value
            ),
            QueryWarning::NegationNotAllowed { field, value } => write!(
                f,
                "Field \"{}\" cannot be negated, ignoring \"{}\"",
                field, value
            ),
            QueryWarning::StrayColon => write!(f, "Stray colon ignored"),
        }
    }
}

// =============================================================================
// PARSED QUERY
// =============================================================================

/// Mapping from `(field, negated)` to the ordered values given for it, plus
/// the warnings collected while parsing.
///
/// Keys exist only when at least one value is present. Values keep source
/// order and may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    fields: BTreeMap<(String, bool), Vec<String>>,
    warnings: Vec<QueryWarning>,
}

impl ParsedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, creating the key if needed.
    pub fn append(&mut self, field: &str, value: impl Into<String>, negated: bool) {
        self.fields
            .entry((field.to_string(), negated))
            .or_default()
            .push(value.into());
    }

    pub fn has(&self, field: &str, negated: bool) -> bool {
        self.fields.contains_key(&(field.to_string(), negated))
    }

    /// Values for a key; empty when the key is absent.
    pub fn get(&self, field: &str, negated: bool) -> &[String] {
        self.fields
            .get(&(field.to_string(), negated))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First value for a key, `None` when the key is absent.
    pub fn get_first(&self, field: &str, negated: bool) -> Option<&str> {
        self.get(field, negated).first().map(String::as_str)
    }

    /// Replace all values for a key. An empty list removes the key.
    pub fn replace(&mut self, field: &str, negated: bool, values: Vec<String>) {
        if values.is_empty() {
            self.remove(field, negated);
        } else {
            self.fields.insert((field.to_string(), negated), values);
        }
    }

    pub fn remove(&mut self, field: &str, negated: bool) -> Option<Vec<String>> {
        self.fields.remove(&(field.to_string(), negated))
    }

    /// True when no key carries a value.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether any of `fields` is present, in either polarity.
    pub fn has_any(&self, fields: &[&str]) -> bool {
        self.fields.keys().any(|(f, _)| fields.contains(&f.as_str()))
    }

    /// Iterate `(field, negated, values)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool, &[String])> {
        self.fields
            .iter()
            .map(|((field, negated), values)| (field.as_str(), *negated, values.as_slice()))
    }

    pub fn warnings(&self) -> &[QueryWarning] {
        &self.warnings
    }

    pub fn push_warning(&mut self, warning: QueryWarning) {
        self.warnings.push(warning);
    }

    /// Render back into query syntax that parses to the same fields.
    ///
    /// Fields come out in registry order, positive before negated. Fields
    /// without an alias (emoji) are written as bare tokens at the end.
    pub fn pretty(&self, registry: &FieldRegistry) -> String {
        let mut keyed = Vec::new();
        let mut bare = Vec::new();
        for (field, negated, values) in self.sorted(registry) {
            let bang = if negated { "!" } else { "" };
            let alias = registry.get(field).and_then(|f| f.display_alias());
            for value in values {
                match alias {
                    Some(alias) => keyed.push(format!("{}{}:{}", bang, alias, value)),
                    None => bare.push(format!("{}{}", bang, value)),
                }
            }
        }
        keyed.extend(bare);
        keyed.join(" ")
    }

    /// Human-readable breakdown of warnings and fields, one field per line.
    pub fn report(&self, registry: &FieldRegistry) -> String {
        let mut out = String::new();
        if !self.warnings.is_empty() {
            out.push_str("Errors:\n");
            for warning in &self.warnings {
                out.push_str(&format!("{}\n", warning));
            }
            out.push('\n');
        }
        out.push_str("Parsed fields:\n");
        let mut lines: Vec<(String, Vec<String>)> = Vec::new();
        for (field, negated, values) in self.sorted(registry) {
            let rendered = values
                .iter()
                .map(|v| if negated { format!("!{}", v) } else { v.clone() });
            let continues = matches!(lines.last(), Some((name, _)) if name == field);
            match lines.last_mut() {
                Some((_, items)) if continues => items.extend(rendered),
                _ => lines.push((field.to_string(), rendered.collect())),
            }
        }
        for (field, values) in lines {
            out.push_str(&format!("{}: {}\n", field, values.join(" ")));
        }
        out.trim_end().to_string()
    }

    fn sorted<'a>(&'a self, registry: &FieldRegistry) -> Vec<(&'a str, bool, &'a [String])> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by_key(|(field, negated, _)| (registry.position(field), *negated));
        entries
    }

    /// Apply the tag and emoji edits in this query to `document`.
    ///
    /// For both sets the result is `(old ∪ added) − removed`, keeping the
    /// order of first appearance.
    pub fn merge_into(&self, document: &TaggedDocument) -> TaggedDocument {
        let mut merged = document.clone();
        merged.tags = merge_values(
            &document.tags,
            self.get(TAGS, false),
            self.get(TAGS, true),
        );
        merged.emoji = merge_values(
            &document.emoji,
            self.get(EMOJI, false),
            self.get(EMOJI, true),
        );
        merged
    }
}

/// `(old ∪ added) − removed`, deduplicated in order of first appearance.
pub fn merge_values(old: &[String], added: &[String], removed: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(old.len() + added.len());
    for value in old.iter().chain(added) {
        if !removed.contains(value) && !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}
