//! Compile a [`ParsedQuery`] into a backend search request.
//!
//! Every document is scoped to its owner with a term filter. The `type`
//! field becomes a filter (or, for `document`, an exclusion of photos); every
//! other field is dispatched on its [`MatchStrategy`]. Negated fields are
//! inverted before being ANDed into the query.

use tracing::trace;

use tagbot_core::defaults;
use tagbot_core::fields::{FieldRegistry, MatchStrategy, TYPE, YES};
use tagbot_core::models::MediaType;
use tagbot_core::ParsedQuery;

use crate::ast::{BoolQuery, Clause, MultiMatch, SearchRequest, SortKey};
use crate::pagination::Pagination;

/// Options that vary between callers of the compiler.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Sort by score, then most recently used.
    pub sort: bool,
    /// Restrict returned document attributes.
    pub includes: Vec<String>,
    pub page: Option<Pagination>,
}

impl CompileOptions {
    /// Options for an inline-query page.
    pub fn inline(page: Pagination) -> Self {
        Self {
            sort: true,
            includes: defaults::INLINE_RESULT_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            page: Some(page),
        }
    }
}

/// Turns parsed queries into backend requests using a field registry.
#[derive(Debug, Clone)]
pub struct SearchCompiler<'r> {
    registry: &'r FieldRegistry,
    fuzziness: String,
    prefix_length: u32,
}

impl<'r> SearchCompiler<'r> {
    pub fn new(registry: &'r FieldRegistry) -> Self {
        Self {
            registry,
            fuzziness: defaults::FUZZINESS.to_string(),
            prefix_length: defaults::FUZZY_PREFIX_LENGTH,
        }
    }

    /// Compiler over the standard registry.
    pub fn standard() -> SearchCompiler<'static> {
        SearchCompiler::new(FieldRegistry::standard())
    }

    pub fn compile(&self, owner: i64, query: &ParsedQuery, options: &CompileOptions) -> SearchRequest {
        let mut bool_query = BoolQuery::default();
        bool_query.filter(Clause::term("owner", owner));

        match query.get_first(TYPE, false) {
            Some(t) if t == MediaType::Document.as_str() => {
                bool_query.exclude(Clause::term(TYPE, MediaType::Photo.as_str()))
            }
            Some(t) => bool_query.filter(Clause::term(TYPE, t)),
            None => {}
        }

        for (field, negated, values) in query.iter() {
            let Some(strategy) = self.registry.get(field).and_then(|f| f.strategy.as_ref()) else {
                continue;
            };
            let Some(clause) = self.match_clause(strategy, field, values) else {
                continue;
            };
            trace!(
                subsystem = "search",
                component = "compiler",
                field = field,
                negated = negated,
                "Compiled field clause"
            );
            bool_query.and(if negated { clause.negate() } else { clause });
        }

        let sort = if options.sort {
            vec![SortKey::Score, SortKey::Desc("last_used".to_string())]
        } else {
            Vec::new()
        };
        let (from, size) = match options.page {
            Some(page) => (page.offset(), Some(u64::from(page.page_size))),
            None => (0, None),
        };

        SearchRequest {
            query: bool_query,
            sort,
            source_includes: options.includes.clone(),
            from,
            size,
        }
    }

    /// Build the clause for one field's values under `strategy`.
    ///
    /// Returns `None` when there is nothing to match.
    pub fn match_clause(
        &self,
        strategy: &MatchStrategy,
        field: &str,
        values: &[String],
    ) -> Option<Clause> {
        if values.is_empty() {
            return None;
        }
        let clause = match strategy {
            MatchStrategy::ExactTerm => {
                let wanted = values[0] == YES;
                Clause::Bool(BoolQuery {
                    filter: vec![Clause::term(field, wanted)],
                    ..Default::default()
                })
            }
            MatchStrategy::FuzzyText => self.fuzzy_match(vec![field.to_string()], values),
            MatchStrategy::FuzzyNGram { extra_fields } => {
                let fields = std::iter::once(field)
                    .chain(extra_fields.iter().map(String::as_str))
                    .flat_map(|f| {
                        [
                            format!("{}^{}", f, defaults::NGRAM_EXACT_BOOST),
                            format!("{}.prefix_ngram^{}", f, defaults::NGRAM_PREFIX_BOOST),
                            format!("{}.trigram", f),
                        ]
                    })
                    .collect();
                self.fuzzy_match(fields, values)
            }
            MatchStrategy::SetMembership => Clause::terms(field, values),
        };
        Some(clause)
    }

    fn fuzzy_match(&self, fields: Vec<String>, values: &[String]) -> Clause {
        Clause::MultiMatch(MultiMatch {
            query: values.join(" "),
            fields,
            fuzziness: self.fuzziness.clone(),
            prefix_length: self.prefix_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tagbot_core::parse_query;

    fn compile(text: &str) -> serde_json::Value {
        SearchCompiler::standard()
            .compile(7, &parse_query(text), &CompileOptions::default())
            .to_json()
    }

    #[test]
    fn test_owner_and_default_type_filters() {
        let body = compile("");
        assert_eq!(
            body,
            json!({"query": {"bool": {"filter": [
                {"term": {"owner": 7}},
                {"term": {"type": "sticker"}},
            ]}}})
        );
    }

    #[test]
    fn test_document_excludes_photos() {
        let body = compile("t:document");
        let bool_q = &body["query"]["bool"];
        assert_eq!(bool_q["must_not"], json!([{"term": {"type": "photo"}}]));
        assert_eq!(bool_q["filter"], json!([{"term": {"owner": 7}}]));
    }

    #[test]
    fn test_ext_uses_plain_fuzzy_match() {
        let body = compile("e:png");
        assert_eq!(
            body["query"]["bool"]["must"][0],
            json!({"multi_match": {
                "query": "png",
                "type": "most_fields",
                "fields": ["ext"],
                "operator": "and",
                "fuzziness": "AUTO:4,6",
                "prefix_length": 1,
            }})
        );
    }

    #[test]
    fn test_tags_use_ngram_fields_with_title() {
        let body = compile("cute cat");
        let mm = &body["query"]["bool"]["must"][0]["multi_match"];
        assert_eq!(mm["query"], "cute cat");
        assert_eq!(
            mm["fields"],
            json!([
                "tags^3",
                "tags.prefix_ngram^2",
                "tags.trigram",
                "title^3",
                "title.prefix_ngram^2",
                "title.trigram",
            ])
        );
    }

    #[test]
    fn test_negated_tags_go_to_must_not() {
        let body = compile("!dog");
        let must_not = &body["query"]["bool"]["must_not"];
        assert_eq!(must_not[0]["multi_match"]["query"], "dog");
        assert!(body["query"]["bool"].get("must").is_none());
    }

    #[test]
    fn test_animated_is_boolean_filter() {
        let body = compile("a:no");
        assert_eq!(
            body["query"]["bool"]["must"][0],
            json!({"bool": {"filter": [{"term": {"is_animated": false}}]}})
        );
    }

    #[test]
    fn test_negated_marked() {
        let body = compile("!m:yes");
        assert_eq!(
            body["query"]["bool"]["must_not"][0],
            json!({"bool": {"filter": [{"term": {"marked": true}}]}})
        );
    }

    #[test]
    fn test_emoji_terms() {
        let body = compile("😺 !🐶");
        let bool_q = &body["query"]["bool"];
        assert_eq!(bool_q["must"][0], json!({"terms": {"emoji": ["😺"]}}));
        assert_eq!(bool_q["must_not"][0], json!({"terms": {"emoji": ["🐶"]}}));
    }

    #[test]
    fn test_delete_field_is_ignored() {
        let body = compile("delete:yes");
        assert!(body["query"]["bool"].get("must").is_none());
    }

    #[test]
    fn test_inline_options() {
        let request = SearchCompiler::standard().compile(
            1,
            &parse_query("cat"),
            &CompileOptions::inline(Pagination::new(2, 50)),
        );
        let body = request.to_json();
        assert_eq!(body["from"], 100);
        assert_eq!(body["size"], 50);
        assert_eq!(body["sort"], json!(["_score", {"last_used": {"order": "desc"}}]));
        assert_eq!(
            body["_source"]["includes"],
            json!(["id", "access_hash", "type", "tags", "title"])
        );
    }
}
