//! Projection of backend search responses into [`SearchPage`]s.

use serde::Deserialize;

use tagbot_core::models::{SearchPage, TaggedDocument};
use tagbot_core::{Error, Result};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    total: Total,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// Newer backends report `{"value": n}`, older ones a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Total {
    Object { value: u64 },
    Number(u64),
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: TaggedDocument,
}

/// Extract the total count and documents from a search response body.
pub fn parse_search_response(body: serde_json::Value) -> Result<SearchPage> {
    let response: SearchResponse = serde_json::from_value(body)
        .map_err(|e| Error::Backend(format!("unexpected search response: {}", e)))?;
    let total = match response.hits.total {
        Total::Object { value } => value,
        Total::Number(n) => n,
    };
    Ok(SearchPage {
        total,
        documents: response.hits.hits.into_iter().map(|h| h.source).collect(),
    })
}
