//! Elasticsearch-compatible document store over HTTP.
//!
//! Documents live in a single index keyed by [`DocumentId::pack`]. Searches
//! take request bodies produced by `tagbot-search`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use tagbot_core::models::{DocumentId, MediaType, SearchPage, TaggedDocument, TypeHistogram};
use tagbot_core::{Error, Limits, MediaStore, Result};
use tagbot_search::parse_search_response;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the document store.
#[derive(Debug, Clone)]
pub struct ElasticConfig {
    pub url: String,
    pub index: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl ElasticConfig {
    pub fn new(url: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            index: index.into(),
            username: None,
            password: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }
}

/// Index settings: text fields get an edge n-gram `prefix_ngram` subfield
/// and a `trigram` subfield for the fuzzy n-gram match strategy.
pub fn index_definition() -> Value {
    let ngram_text = json!({
        "type": "text",
        "fields": {
            "prefix_ngram": {
                "type": "text",
                "analyzer": "prefix_ngram",
                "search_analyzer": "lowercase_words"
            },
            "trigram": {"type": "text", "analyzer": "trigram"}
        }
    });
    json!({
        "settings": {
            "analysis": {
                "tokenizer": {
                    "prefix_ngram": {"type": "edge_ngram", "min_gram": 1, "max_gram": 20, "token_chars": ["letter", "digit"]},
                    "trigram": {"type": "ngram", "min_gram": 3, "max_gram": 3, "token_chars": ["letter", "digit"]}
                },
                "analyzer": {
                    "prefix_ngram": {"tokenizer": "prefix_ngram", "filter": ["lowercase"]},
                    "trigram": {"tokenizer": "trigram", "filter": ["lowercase"]},
                    "lowercase_words": {"tokenizer": "standard", "filter": ["lowercase"]}
                }
            }
        },
        "mappings": {
            "properties": {
                "owner": {"type": "long"},
                "id": {"type": "long"},
                "access_hash": {"type": "long"},
                "type": {"type": "keyword"},
                "ext": {"type": "text"},
                "is_animated": {"type": "boolean"},
                "marked": {"type": "boolean"},
                "pack_name": ngram_text,
                "pack_link": {"type": "keyword", "index": false},
                "filename": ngram_text,
                "title": ngram_text,
                "tags": ngram_text,
                "emoji": {"type": "keyword"},
                "created": {"type": "date", "format": "epoch_second"},
                "last_used": {"type": "date", "format": "epoch_second"}
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<TaggedDocument>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct UpdateByQueryResponse {
    #[serde(default)]
    updated: u64,
}

/// Painless script setting the transfer mark from `params.marked`.
const MARK_SCRIPT: &str = "ctx._source.marked = params.marked";

/// `_update_by_query` body marking documents of `owner` that match `query`.
pub fn mark_request(owner: i64, query: &Value, marked: bool) -> Value {
    json!({
        "query": {
            "bool": {
                "filter": [
                    {"term": {"owner": owner}},
                    query
                ]
            }
        },
        "script": {
            "source": MARK_SCRIPT,
            "lang": "painless",
            "params": {"marked": marked}
        }
    })
}

/// HTTP client for the document store.
#[derive(Debug, Clone)]
pub struct ElasticStore {
    client: reqwest::Client,
    config: ElasticConfig,
    limits: Limits,
}

impl ElasticStore {
    pub fn new(config: ElasticConfig, limits: Limits) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config,
            limits,
        })
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// `{url}/{index}/{segments...}` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.url)
            .map_err(|e| Error::Config(format!("invalid ELASTIC_URL: {}", e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Config("ELASTIC_URL cannot be a base URL".to_string()))?;
            path.pop_if_empty().push(&self.config.index);
            path.extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.config.username {
            Some(user) => builder.basic_auth(user, self.config.password.as_ref()),
            None => builder,
        }
    }

    /// Send and decode a JSON response, returning the status alongside.
    ///
    /// 404 is returned to the caller; other non-success statuses are errors.
    async fn send(&self, op: &str, builder: RequestBuilder) -> Result<(StatusCode, Value)> {
        let start = Instant::now();
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(
            subsystem = "db",
            component = "elastic",
            op = op,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Document store request complete"
        );
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            warn!(
                subsystem = "db",
                component = "elastic",
                op = op,
                status = status.as_u16(),
                "Document store request failed"
            );
            return Err(Error::Backend(format!("{} failed with {}: {}", op, status, text)));
        }
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        Ok((status, body))
    }

    /// Create the index with [`index_definition`] if it does not exist.
    ///
    /// Returns `true` when the index was created.
    pub async fn ensure_index(&self) -> Result<bool> {
        let url = self.url(&[])?;
        let (status, _) = self.send("index_exists", self.request(Method::HEAD, url.clone())).await?;
        if status != StatusCode::NOT_FOUND {
            return Ok(false);
        }
        self.send(
            "create_index",
            self.request(Method::PUT, url).json(&index_definition()),
        )
        .await?;
        info!(
            subsystem = "db",
            component = "elastic",
            op = "create_index",
            index = %self.config.index,
            "Created document index"
        );
        Ok(true)
    }
}

#[async_trait]
impl MediaStore for ElasticStore {
    async fn search(&self, body: &Value) -> Result<SearchPage> {
        let url = self.url(&["_search"])?;
        let (status, response) = self
            .send("search", self.request(Method::POST, url).json(body))
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("index {}", self.config.index)));
        }
        let page = parse_search_response(response)?;
        debug!(
            subsystem = "db",
            component = "elastic",
            op = "search",
            result_count = page.documents.len(),
            total_count = page.total,
            "Search complete"
        );
        Ok(page)
    }

    async fn get(&self, id: DocumentId) -> Result<Option<TaggedDocument>> {
        let url = self.url(&["_doc", &id.pack()])?;
        let (status, body) = self.send("get", self.request(Method::GET, url)).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response: GetResponse = serde_json::from_value(body)?;
        Ok(if response.found { response.source } else { None })
    }

    async fn upsert(&self, document: &TaggedDocument) -> Result<()> {
        self.limits.validate_document(document)?;
        let id = document.document_id();
        if self.get(id).await?.is_none() {
            let current = self.count_items(document.owner).await?;
            self.limits.check_capacity(current)?;
        }

        let mut url = self.url(&["_doc", &id.pack()])?;
        url.query_pairs_mut().append_pair("refresh", "wait_for");
        self.send("upsert", self.request(Method::PUT, url).json(document))
            .await?;
        debug!(
            subsystem = "db",
            component = "elastic",
            op = "upsert",
            owner_id = document.owner,
            media_id = document.id,
            "Document stored"
        );
        Ok(())
    }

    async fn delete(&self, id: DocumentId) -> Result<bool> {
        let mut url = self.url(&["_doc", &id.pack()])?;
        url.query_pairs_mut().append_pair("refresh", "wait_for");
        let (status, body) = self.send("delete", self.request(Method::DELETE, url)).await?;
        Ok(status != StatusCode::NOT_FOUND && body["result"] == "deleted")
    }

    async fn count_items(&self, owner: i64) -> Result<u64> {
        let url = self.url(&["_count"])?;
        let body = json!({"query": {"term": {"owner": owner}}});
        let (status, response) = self
            .send("count", self.request(Method::POST, url).json(&body))
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(0);
        }
        let response: CountResponse = serde_json::from_value(response)?;
        Ok(response.count)
    }

    async fn count_by_type(&self, owner: i64, only_marked: bool) -> Result<TypeHistogram> {
        let url = self.url(&["_search"])?;
        let types = json!({"terms": {"field": "type", "size": MediaType::ALL.len()}});
        let body = json!({
            "size": 0,
            "track_total_hits": true,
            "query": {"term": {"owner": owner}},
            "aggs": {
                "types": types,
                "marked": {
                    "filter": {"term": {"marked": true}},
                    "aggs": {"types": types}
                }
            }
        });
        let (status, response) = self
            .send("count_by_type", self.request(Method::POST, url).json(&body))
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(TypeHistogram::default());
        }
        histogram_from_response(&response, only_marked)
    }

    async fn touch(&self, id: DocumentId, at: i64) -> Result<()> {
        let url = self.url(&["_update", &id.pack()])?;
        let body = json!({"doc": {"last_used": at}});
        let (status, _) = self
            .send("touch", self.request(Method::POST, url).json(&body))
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("document {}", id)));
        }
        Ok(())
    }

    async fn mark(&self, id: DocumentId, marked: bool) -> Result<bool> {
        let mut url = self.url(&["_update", &id.pack()])?;
        url.query_pairs_mut().append_pair("refresh", "wait_for");
        let body = json!({"doc": {"marked": marked}});
        let (status, _) = self
            .send("mark", self.request(Method::POST, url).json(&body))
            .await?;
        Ok(status != StatusCode::NOT_FOUND)
    }

    async fn mark_matching(&self, owner: i64, query: &Value, marked: bool) -> Result<u64> {
        let mut url = self.url(&["_update_by_query"])?;
        url.query_pairs_mut()
            .append_pair("conflicts", "proceed")
            .append_pair("refresh", "true");
        let body = mark_request(owner, query, marked);
        let (status, response) = self
            .send("mark_matching", self.request(Method::POST, url).json(&body))
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(0);
        }
        let response: UpdateByQueryResponse = serde_json::from_value(response)?;
        debug!(
            subsystem = "db",
            component = "elastic",
            op = "mark_matching",
            owner_id = owner,
            marked = marked,
            result_count = response.updated,
            "Transfer marks updated"
        );
        Ok(response.updated)
    }
}

fn histogram_from_response(response: &Value, only_marked: bool) -> Result<TypeHistogram> {
    let total = response["hits"]["total"]["value"]
        .as_u64()
        .or_else(|| response["hits"]["total"].as_u64())
        .ok_or_else(|| Error::Backend("count response has no hit total".to_string()))?;
    let aggs = &response["aggregations"];
    let (sub_total, scope) = if only_marked {
        (aggs["marked"]["doc_count"].as_u64(), &aggs["marked"])
    } else {
        (None, aggs)
    };
    let counts = scope["types"]["buckets"]
        .as_array()
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|b| {
                    let media_type = b["key"].as_str()?.parse::<MediaType>().ok()?;
                    Some((media_type, b["doc_count"].as_u64()?))
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(TypeHistogram {
        total,
        sub_total: if only_marked { Some(sub_total.unwrap_or(0)) } else { None },
        counts,
    })
}
