//! Typed boolean query tree rendered to the backend's JSON query DSL.

use serde_json::{json, Value};

/// One node of a backend query.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Exact value of a keyword or boolean field.
    Term { field: String, value: Value },
    /// Field contains any of the values.
    Terms { field: String, values: Vec<String> },
    MultiMatch(MultiMatch),
    Bool(BoolQuery),
}

impl Clause {
    pub fn term(field: &str, value: impl Into<Value>) -> Self {
        Clause::Term {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn terms(field: &str, values: &[String]) -> Self {
        Clause::Terms {
            field: field.to_string(),
            values: values.to_vec(),
        }
    }

    /// Logical NOT.
    ///
    /// A bool node holding a single `must_not` is unwrapped instead of
    /// being wrapped again.
    pub fn negate(self) -> Self {
        match self {
            Clause::Bool(BoolQuery {
                must,
                filter,
                mut must_not,
            }) if must.is_empty() && filter.is_empty() && must_not.len() == 1 => must_not.remove(0),
            other => Clause::Bool(BoolQuery {
                must_not: vec![other],
                ..Default::default()
            }),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Clause::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Clause::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
            Clause::MultiMatch(m) => m.to_json(),
            Clause::Bool(b) => b.to_json(),
        }
    }
}

/// `multi_match` of type `most_fields` with every term required.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiMatch {
    pub query: String,
    /// Field names, optionally with `^boost` suffixes.
    pub fields: Vec<String>,
    pub fuzziness: String,
    pub prefix_length: u32,
}

impl MultiMatch {
    pub fn to_json(&self) -> Value {
        json!({
            "multi_match": {
                "query": self.query,
                "type": "most_fields",
                "fields": self.fields,
                "operator": "and",
                "fuzziness": self.fuzziness,
                "prefix_length": self.prefix_length,
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    /// Scored, all required.
    pub must: Vec<Clause>,
    /// Unscored, all required.
    pub filter: Vec<Clause>,
    pub must_not: Vec<Clause>,
}

impl BoolQuery {
    /// AND another clause into this query.
    ///
    /// Pure negations are merged into `must_not` rather than nested.
    pub fn and(&mut self, clause: Clause) {
        match clause {
            Clause::Bool(b) if b.must.is_empty() && b.filter.is_empty() => {
                self.must_not.extend(b.must_not)
            }
            other => self.must.push(other),
        }
    }

    pub fn filter(&mut self, clause: Clause) {
        self.filter.push(clause);
    }

    pub fn exclude(&mut self, clause: Clause) {
        self.must_not.push(clause);
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.filter.is_empty() && self.must_not.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut body = serde_json::Map::new();
        for (key, clauses) in [
            ("must", &self.must),
            ("filter", &self.filter),
            ("must_not", &self.must_not),
        ] {
            if !clauses.is_empty() {
                body.insert(
                    key.to_string(),
                    Value::Array(clauses.iter().map(Clause::to_json).collect()),
                );
            }
        }
        json!({ "bool": body })
    }
}

/// Sort key of a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Score,
    Asc(String),
    Desc(String),
}

impl SortKey {
    pub fn to_json(&self) -> Value {
        match self {
            SortKey::Score => json!("_score"),
            SortKey::Asc(field) => json!({ field.as_str(): { "order": "asc" } }),
            SortKey::Desc(field) => json!({ field.as_str(): { "order": "desc" } }),
        }
    }
}

/// A complete backend search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub query: BoolQuery,
    pub sort: Vec<SortKey>,
    /// Empty means the whole document.
    pub source_includes: Vec<String>,
    pub from: u64,
    pub size: Option<u64>,
}

impl SearchRequest {
    pub fn to_json(&self) -> Value {
        let mut body = serde_json::Map::new();
        body.insert("query".into(), self.query.to_json());
        if !self.sort.is_empty() {
            body.insert(
                "sort".into(),
                Value::Array(self.sort.iter().map(SortKey::to_json).collect()),
            );
        }
        if !self.source_includes.is_empty() {
            body.insert(
                "_source".into(),
                json!({ "includes": self.source_includes }),
            );
        }
        if let Some(size) = self.size {
            body.insert("from".into(), json!(self.from));
            body.insert("size".into(), json!(size));
        }
        Value::Object(body)
    }
}
