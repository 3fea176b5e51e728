//! Query language tokenizer and grammar.
//!
//! A query is a whitespace-separated sequence of tokens. `alias:` switches
//! the field that following values go to; a value glued directly to the
//! colon (`t:gif`) belongs to that field and keeps any further colons
//! verbatim. Leading `!` or `-` characters negate. A line break returns the
//! cursor to the default field. Emoji found anywhere in a value are moved
//! to the `emoji` field.
//!
//! Parsing never fails. Unknown fields, empty fields, and bad enumerated
//! values are reported as [`QueryWarning`]s and otherwise ignored.

use tracing::debug;

use crate::emoji::strip_emojis;
use crate::fields::{EnumMatch, Field, FieldRegistry, EMOJI};
use crate::query::{ParsedQuery, QueryWarning};

/// Parse a search query with the standard registry, filling field defaults.
pub fn parse_query(text: &str) -> ParsedQuery {
    QueryParser::new(FieldRegistry::standard()).parse(text)
}

/// Parse a tag edit with the standard registry.
///
/// Identical to [`parse_query`] except that field defaults are not filled
/// in, so an edit that never mentions `type` does not change it.
pub fn parse_tags(text: &str) -> ParsedQuery {
    QueryParser::new(FieldRegistry::standard())
        .without_defaults()
        .parse(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// `alias:` with its leading negation.
    Switch { name: &'a str, negated: bool },
    Value { text: &'a str, negated: bool },
    Newline,
    StrayColon,
}

fn is_negation(c: char) -> bool {
    c == '!' || c == '-'
}

/// Any non-empty run of negation characters negates.
fn take_negation(input: &str) -> (bool, &str) {
    let rest = input.trim_start_matches(is_negation);
    (rest.len() < input.len(), rest)
}

fn split_at_first(input: &str, stop: impl Fn(char) -> bool) -> (&str, &str) {
    match input.find(stop) {
        Some(idx) => input.split_at(idx),
        None => (input, ""),
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = text;
    loop {
        let trimmed = rest.trim_start_matches(|c: char| c.is_whitespace() && c != '\n');
        if let Some(after) = trimmed.strip_prefix('\n') {
            tokens.push(Token::Newline);
            rest = after;
            continue;
        }
        if trimmed.is_empty() {
            break;
        }

        let (negated, body) = take_negation(trimmed);
        let (word, after) = split_at_first(body, |c| c.is_whitespace() || c == ':');
        rest = after;

        let Some(after_colon) = after.strip_prefix(':') else {
            if !word.is_empty() {
                tokens.push(Token::Value {
                    text: word,
                    negated,
                });
            }
            continue;
        };
        rest = after_colon;
        if word.is_empty() {
            tokens.push(Token::StrayColon);
            continue;
        }
        tokens.push(Token::Switch {
            name: word,
            negated,
        });

        // Value glued to the colon, taken up to the next whitespace.
        if after_colon.starts_with(|c: char| !c.is_whitespace()) {
            let (value_negated, value_body) = take_negation(after_colon);
            let (value, after_value) = split_at_first(value_body, char::is_whitespace);
            if !value.is_empty() {
                tokens.push(Token::Value {
                    text: value,
                    negated: value_negated,
                });
            }
            rest = after_value;
        }
    }
    tokens
}

/// Grammar driver bound to a field registry.
#[derive(Debug, Clone, Copy)]
pub struct QueryParser<'r> {
    registry: &'r FieldRegistry,
    apply_defaults: bool,
}

struct Cursor<'r> {
    field: &'r Field,
    negated: bool,
    used: bool,
}

impl<'r> QueryParser<'r> {
    pub fn new(registry: &'r FieldRegistry) -> Self {
        Self {
            registry,
            apply_defaults: true,
        }
    }

    pub fn without_defaults(mut self) -> Self {
        self.apply_defaults = false;
        self
    }

    fn reset(&self) -> Cursor<'r> {
        Cursor {
            field: self.registry.default_field(),
            negated: false,
            used: true,
        }
    }

    pub fn parse(&self, text: &str) -> ParsedQuery {
        let mut query = ParsedQuery::new();
        let mut cursor = self.reset();

        for token in tokenize(text) {
            match token {
                Token::Newline => cursor = self.reset(),
                Token::StrayColon => query.push_warning(QueryWarning::StrayColon),
                Token::Switch { name, negated } => match self.registry.resolve_alias(name) {
                    Some(field) => {
                        if !cursor.used {
                            query.push_warning(QueryWarning::UnusedField {
                                field: cursor.field.name.clone(),
                            });
                        }
                        cursor = Cursor {
                            field,
                            negated: negated && field.allow_negation,
                            used: false,
                        };
                    }
                    None => query.push_warning(QueryWarning::UnknownField {
                        field: name.to_string(),
                    }),
                },
                Token::Value { text, negated } => {
                    self.push_value(&mut query, &cursor, text, negated);
                    cursor.used = true;
                    if cursor.field.is_short {
                        cursor = self.reset();
                    }
                }
            }
        }
        if !cursor.used {
            query.push_warning(QueryWarning::UnusedField {
                field: cursor.field.name.clone(),
            });
        }

        for field in self.registry.enum_fields() {
            self.normalize_enum(&mut query, field, false);
            self.normalize_enum(&mut query, field, true);
        }

        if !query.warnings().is_empty() {
            debug!(
                subsystem = "query",
                component = "parser",
                warning_count = query.warnings().len(),
                "Query parsed with warnings"
            );
        }
        query
    }

    fn push_value(&self, query: &mut ParsedQuery, cursor: &Cursor<'_>, text: &str, negated: bool) {
        let (residual, emoji) = strip_emojis(text);
        for e in emoji {
            query.append(EMOJI, e, negated);
        }
        if residual.is_empty() {
            return;
        }
        let field = cursor.field;
        if field.allow_negation {
            query.append(&field.name, residual, cursor.negated ^ negated);
        } else if negated {
            query.push_warning(QueryWarning::NegationNotAllowed {
                field: field.name.clone(),
                value: residual,
            });
        } else {
            query.append(&field.name, residual, false);
        }
    }

    /// Canonicalize an enumerated field down to its first valid value.
    fn normalize_enum(&self, query: &mut ParsedQuery, field: &Field, negated: bool) {
        let raw = query.remove(&field.name, negated).unwrap_or_default();
        let mut chosen: Option<String> = None;
        for value in raw {
            match field.match_value(&value) {
                EnumMatch::Matched(canonical) if chosen.is_none() => chosen = Some(canonical),
                EnumMatch::Matched(canonical) => query.push_warning(QueryWarning::DuplicateValue {
                    field: field.name.clone(),
                    value: canonical,
                }),
                EnumMatch::Ambiguous(candidates) => {
                    query.push_warning(QueryWarning::AmbiguousValue {
                        field: field.name.clone(),
                        value,
                        candidates,
                    })
                }
                EnumMatch::Invalid => query.push_warning(QueryWarning::InvalidValue {
                    field: field.name.clone(),
                    value,
                }),
            }
        }
        let value = match chosen {
            Some(value) => Some(value),
            None if !negated && self.apply_defaults => field.default.clone(),
            None => None,
        };
        if let Some(value) = value {
            query.replace(&field.name, negated, vec![value]);
        }
    }
}
