//! Field registry for the query language.
//!
//! A [`FieldRegistry`] is the immutable table of every field a query may
//! address: its aliases, optional closed set of values, default, and how the
//! search compiler should match it. It is built once at startup and shared by
//! reference between the parser and the compiler.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::MediaType;

// =============================================================================
// FIELD NAMES
// =============================================================================

pub const TAGS: &str = "tags";
pub const FILENAME: &str = "filename";
pub const EXT: &str = "ext";
pub const PACK_NAME: &str = "pack_name";
pub const TYPE: &str = "type";
pub const IS_ANIMATED: &str = "is_animated";
pub const DELETE: &str = "delete";
pub const MARKED: &str = "marked";
pub const EMOJI: &str = "emoji";
pub const TITLE: &str = "title";

pub const YES: &str = "yes";
pub const NO: &str = "no";

// =============================================================================
// MATCH STRATEGY
// =============================================================================

/// How the search compiler turns a field's values into a backend clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Term filter on a boolean derived from "yes"/"no".
    ExactTerm,
    /// Fuzzy match on the field alone, without n-gram subfields.
    FuzzyText,
    /// Fuzzy match assisted by prefix and trigram subfields, over the field
    /// itself plus `extra_fields`.
    FuzzyNGram { extra_fields: Vec<String> },
    /// The document must contain any of the values, matched exactly.
    SetMembership,
}

// =============================================================================
// FIELD
// =============================================================================

/// Static descriptor of one query field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Canonical key, also the document attribute name.
    pub name: String,
    /// Tokens users type to switch to this field, lowercase.
    pub aliases: Vec<String>,
    /// Closed enumeration of values, `None` for free text.
    pub allowed_values: Option<Vec<String>>,
    /// Value used when a query never specifies this field.
    pub default: Option<String>,
    /// After one value the cursor returns to the default field.
    pub is_short: bool,
    /// Whether `!field:value` and `field:!value` are meaningful.
    pub allow_negation: bool,
    /// `None` for fields the compiler handles specially or ignores.
    pub strategy: Option<MatchStrategy>,
}

/// Outcome of matching a raw value against an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumMatch {
    /// Exactly one allowed value starts with the raw value.
    Matched(String),
    /// More than one allowed value starts with the raw value.
    Ambiguous(Vec<String>),
    /// No allowed value starts with the raw value.
    Invalid,
}

impl Field {
    /// Free-text field.
    pub fn text(name: &str, aliases: &[&str], strategy: MatchStrategy) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_lowercase()).collect(),
            allowed_values: None,
            default: None,
            is_short: false,
            allow_negation: true,
            strategy: Some(strategy),
        }
    }

    /// Field restricted to `values`; takes a single value per switch.
    pub fn enumerated(name: &str, aliases: &[&str], values: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_lowercase()).collect(),
            allowed_values: Some(values.iter().map(|v| v.to_string()).collect()),
            default: None,
            is_short: true,
            allow_negation: false,
            strategy: None,
        }
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn with_negation(mut self, allow: bool) -> Self {
        self.allow_negation = allow;
        self
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn is_enum(&self) -> bool {
        self.allowed_values.is_some()
    }

    /// Alias used when writing a query back out.
    pub fn display_alias(&self) -> Option<&str> {
        self.aliases.first().map(String::as_str)
    }

    /// Match `raw` against the allowed values by case-insensitive prefix.
    ///
    /// An exact match always wins over longer members sharing the prefix;
    /// this extends plain prefix matching so that a complete value is never
    /// reported as ambiguous.
    /// Free-text fields accept any value unchanged.
    pub fn match_value(&self, raw: &str) -> EnumMatch {
        let allowed = match &self.allowed_values {
            Some(allowed) => allowed,
            None => return EnumMatch::Matched(raw.to_string()),
        };
        let needle = raw.to_lowercase();
        if let Some(exact) = allowed.iter().find(|v| v.to_lowercase() == needle) {
            return EnumMatch::Matched(exact.clone());
        }
        let candidates: Vec<String> = allowed
            .iter()
            .filter(|v| v.to_lowercase().starts_with(&needle))
            .cloned()
            .collect();
        match candidates.len() {
            0 => EnumMatch::Invalid,
            1 => EnumMatch::Matched(candidates.into_iter().next().unwrap_or_default()),
            _ => EnumMatch::Ambiguous(candidates),
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Immutable table of known fields.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: Vec<Field>,
    aliases: HashMap<String, usize>,
    default_field: usize,
}

static STANDARD: Lazy<FieldRegistry> = Lazy::new(FieldRegistry::build_standard);

impl FieldRegistry {
    /// Build a registry, checking that aliases are disjoint across fields.
    pub fn new(fields: Vec<Field>, default_field: &str) -> Result<Self> {
        let mut aliases = HashMap::new();
        for (idx, field) in fields.iter().enumerate() {
            for alias in &field.aliases {
                if let Some(prev) = aliases.insert(alias.clone(), idx) {
                    return Err(Error::Config(format!(
                        "alias \"{}\" used by both \"{}\" and \"{}\"",
                        alias, fields[prev].name, field.name
                    )));
                }
            }
        }
        let default_field = fields
            .iter()
            .position(|f| f.name == default_field)
            .ok_or_else(|| {
                Error::Config(format!("default field \"{}\" is not registered", default_field))
            })?;
        Ok(Self {
            fields,
            aliases,
            default_field,
        })
    }

    /// The registry every tagbot process uses.
    pub fn standard() -> &'static FieldRegistry {
        &STANDARD
    }

    fn build_standard() -> FieldRegistry {
        let fields = vec![
            Field::text(
                TAGS,
                &["s"],
                MatchStrategy::FuzzyNGram {
                    extra_fields: vec![TITLE.to_string()],
                },
            ),
            Field::text(
                FILENAME,
                &["fn"],
                MatchStrategy::FuzzyNGram {
                    extra_fields: vec![TITLE.to_string()],
                },
            ),
            Field::text(EXT, &["ext", "e"], MatchStrategy::FuzzyText),
            Field::text(
                PACK_NAME,
                &["pack", "p"],
                MatchStrategy::FuzzyNGram {
                    extra_fields: Vec::new(),
                },
            ),
            Field::enumerated(TYPE, &["type", "t"], &MediaType::names())
                .with_default(MediaType::Sticker.as_str()),
            Field::enumerated(IS_ANIMATED, &["animated", "a"], &[YES, NO])
                .with_negation(true)
                .with_strategy(MatchStrategy::ExactTerm),
            Field::enumerated(DELETE, &["delete", "remove", "yeet"], &[YES]),
            Field::enumerated(MARKED, &["m", "marked"], &[YES, NO])
                .with_negation(true)
                .with_strategy(MatchStrategy::ExactTerm),
            Field::text(EMOJI, &[], MatchStrategy::SetMembership),
        ];
        match FieldRegistry::new(fields, TAGS) {
            Ok(registry) => registry,
            Err(e) => unreachable!("standard field table is inconsistent: {}", e),
        }
    }

    /// Look up the field an alias switches to (case-insensitive).
    pub fn resolve_alias(&self, token: &str) -> Option<&Field> {
        self.aliases
            .get(&token.to_lowercase())
            .map(|&idx| &self.fields[idx])
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field that bare values go to.
    pub fn default_field(&self) -> &Field {
        &self.fields[self.default_field]
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Enumerated fields in declaration order.
    pub fn enum_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_enum())
    }

    /// Position of a field in declaration order, unknown fields last.
    pub fn position(&self, name: &str) -> usize {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .unwrap_or(self.fields.len())
    }
}
