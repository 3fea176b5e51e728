//! Route-level tests against an in-memory media store.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::Notify;
use tower::ServiceExt;

use tagbot_api::services::InlineResultId;
use tagbot_api::{router, ApiConfig, AppState};
use tagbot_core::{
    DocumentId, Error, Limits, MediaStore, MediaType, Result, SearchPage, TaggedDocument,
    TypeHistogram,
};
use tagbot_db::{CorrectionCache, MemoryTagVocabulary, TagCorrector};

#[derive(Default)]
struct MemoryStore {
    limits: Limits,
    documents: Mutex<HashMap<(i64, i64), TaggedDocument>>,
    searches: Mutex<Vec<Value>>,
    touched: Mutex<Vec<(DocumentId, i64)>>,
    /// `(owner, query clause, marked)` for each update by query.
    mark_queries: Mutex<Vec<(i64, Value, bool)>>,
    /// When set, the first search waits here until notified.
    gate: Option<Notify>,
    search_calls: AtomicUsize,
}

impl MemoryStore {
    fn with_documents(documents: Vec<TaggedDocument>) -> Self {
        let store = Self::default();
        {
            let mut map = store.documents.lock().unwrap();
            for doc in documents {
                map.insert((doc.owner, doc.id), doc);
            }
        }
        store
    }

    fn stored(&self, owner: i64, id: i64) -> Option<TaggedDocument> {
        self.documents.lock().unwrap().get(&(owner, id)).cloned()
    }
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn search(&self, body: &Value) -> Result<SearchPage> {
        let call = self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let (0, Some(gate)) = (call, &self.gate) {
            gate.notified().await;
        }
        self.searches.lock().unwrap().push(body.clone());
        let owner = body["query"]["bool"]["filter"][0]["term"]["owner"]
            .as_i64()
            .unwrap_or_default();
        let mut documents: Vec<TaggedDocument> = self
            .documents
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.owner == owner)
            .cloned()
            .collect();
        documents.sort_by_key(|d| d.id);
        Ok(SearchPage {
            total: documents.len() as u64,
            documents,
        })
    }

    async fn get(&self, id: DocumentId) -> Result<Option<TaggedDocument>> {
        Ok(self.stored(id.owner, id.media_id))
    }

    async fn upsert(&self, document: &TaggedDocument) -> Result<()> {
        self.limits.validate_document(document)?;
        let mut map = self.documents.lock().unwrap();
        if !map.contains_key(&(document.owner, document.id)) {
            let current = map.keys().filter(|(o, _)| *o == document.owner).count();
            self.limits.check_capacity(current as u64)?;
        }
        map.insert((document.owner, document.id), document.clone());
        Ok(())
    }

    async fn delete(&self, id: DocumentId) -> Result<bool> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .remove(&(id.owner, id.media_id))
            .is_some())
    }

    async fn count_items(&self, owner: i64) -> Result<u64> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .keys()
            .filter(|(o, _)| *o == owner)
            .count() as u64)
    }

    async fn count_by_type(&self, owner: i64, only_marked: bool) -> Result<TypeHistogram> {
        let map = self.documents.lock().unwrap();
        let total = map.values().filter(|d| d.owner == owner).count() as u64;
        let mut counts: Vec<(MediaType, u64)> = Vec::new();
        for doc in map
            .values()
            .filter(|d| d.owner == owner && (!only_marked || d.marked))
        {
            match counts.iter_mut().find(|(t, _)| *t == doc.media_type) {
                Some((_, n)) => *n += 1,
                None => counts.push((doc.media_type, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let counted: u64 = counts.iter().map(|(_, n)| n).sum();
        Ok(TypeHistogram {
            total,
            sub_total: only_marked.then_some(counted),
            counts,
        })
    }

    async fn touch(&self, id: DocumentId, at: i64) -> Result<()> {
        if self.stored(id.owner, id.media_id).is_none() {
            return Err(Error::NotFound(format!("document {}", id)));
        }
        self.touched.lock().unwrap().push((id, at));
        Ok(())
    }

    async fn mark(&self, id: DocumentId, marked: bool) -> Result<bool> {
        let mut map = self.documents.lock().unwrap();
        match map.get_mut(&(id.owner, id.media_id)) {
            Some(doc) => {
                doc.marked = marked;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Honours the `type` term filter of compiled queries; anything else
    /// matches every item of the owner.
    async fn mark_matching(&self, owner: i64, query: &Value, marked: bool) -> Result<u64> {
        self.mark_queries
            .lock()
            .unwrap()
            .push((owner, query.clone(), marked));
        let wanted_type = query["bool"]["filter"]
            .as_array()
            .and_then(|filters| filters.iter().find_map(|f| f["term"]["type"].as_str()))
            .map(str::to_string);
        let mut updated = 0;
        for doc in self
            .documents
            .lock()
            .unwrap()
            .values_mut()
            .filter(|d| d.owner == owner)
        {
            if wanted_type.as_deref().map_or(true, |t| t == doc.media_type.as_str()) {
                doc.marked = marked;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

fn document(owner: i64, id: i64, media_type: MediaType, tags: &[&str]) -> TaggedDocument {
    TaggedDocument {
        owner,
        id,
        access_hash: id * 100,
        media_type,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
}

fn app(store: Arc<MemoryStore>) -> Router {
    router(AppState::new(store, ApiConfig::default()))
}

fn app_with_corrector(store: Arc<MemoryStore>) -> Router {
    let corrector = TagCorrector::new(
        Arc::new(MemoryTagVocabulary::new()),
        CorrectionCache::new(64).unwrap(),
    );
    router(AppState::new(store, ApiConfig::default()).with_corrector(corrector))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let app = app(Arc::new(MemoryStore::default()));
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_inline_query_answers_with_documents() {
    let store = Arc::new(MemoryStore::with_documents(vec![
        document(1, 10, MediaType::Gif, &["cat", "dance"]),
        document(1, 11, MediaType::Gif, &[]),
        document(2, 12, MediaType::Gif, &["cat"]),
    ]));
    let app = app(store.clone());

    let (status, body) = call(
        &app,
        "POST",
        "/v1/inline",
        Some(json!({"owner": 1, "query": "cat t:gif"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cache_time"], 5);
    assert_eq!(body["private"], true);
    assert_eq!(body["next_offset"], Value::Null);
    assert_eq!(body["switch_pm"], Value::Null);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["kind"], "document");
    assert_eq!(results[0]["type"], "gif");
    assert_eq!(results[0]["title"], "cat dance");
    assert_eq!(results[1]["title"], "[gif]");
    assert_eq!(results[0]["access_hash"], 1000);

    let searches = store.searches.lock().unwrap();
    let search = &searches[0];
    assert_eq!(search["from"], 0);
    assert_eq!(search["size"], 50);
    assert_eq!(
        search["query"]["bool"]["filter"][1],
        json!({"term": {"type": "gif"}})
    );
}

#[tokio::test]
async fn test_inline_query_with_warnings_is_not_cached() {
    let app = app(Arc::new(MemoryStore::default()));
    let (status, body) = call(
        &app,
        "POST",
        "/v1/inline",
        Some(json!({"owner": 1, "query": "t:zz"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cache_time"], 0);
    assert_eq!(body["switch_pm"]["text"], "1 warnings");
    assert_eq!(body["switch_pm"]["param"], "parse");
}

#[tokio::test]
async fn test_inline_paging_uses_offset_token() {
    let documents = (0..3)
        .map(|i| document(1, i, MediaType::Sticker, &["x"]))
        .collect();
    let store = Arc::new(MemoryStore::with_documents(documents));
    let config = ApiConfig {
        inline_page_size: 2,
        ..ApiConfig::default()
    };
    let app = router(AppState::new(store.clone(), config));

    let (_, body) = call(
        &app,
        "POST",
        "/v1/inline",
        Some(json!({"owner": 1, "query": "x"})),
    )
    .await;
    assert_eq!(body["next_offset"], "1");

    let (_, body) = call(
        &app,
        "POST",
        "/v1/inline",
        Some(json!({"owner": 1, "query": "x", "offset": "1"})),
    )
    .await;
    assert_eq!(body["next_offset"], Value::Null);
    assert_eq!(store.searches.lock().unwrap()[1]["from"], 2);
}

#[tokio::test]
async fn test_whitelist_rejects_other_owners() {
    let config = ApiConfig {
        allowed_user_ids: HashSet::from([1]),
        ..ApiConfig::default()
    };
    let app = router(AppState::new(Arc::new(MemoryStore::default()), config));

    let (status, body) = call(
        &app,
        "POST",
        "/v1/inline",
        Some(json!({"owner": 2, "query": "cat"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("not allowed"));

    let (status, _) = call(&app, "GET", "/v1/stats/2", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, "GET", "/v1/stats/1", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_newer_inline_query_cancels_older() {
    let store = Arc::new(MemoryStore {
        gate: Some(Notify::new()),
        ..MemoryStore::default()
    });
    let app = app(store.clone());

    let first = {
        let app = app.clone();
        tokio::spawn(async move {
            call(
                &app,
                "POST",
                "/v1/inline",
                Some(json!({"owner": 1, "query": "ca"})),
            )
            .await
        })
    };
    while store.search_calls.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let (status, _) = call(
        &app,
        "POST",
        "/v1/inline",
        Some(json!({"owner": 1, "query": "cat"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = first.await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["outcome"]["kind"], "cancel");
    // Only the surviving query reached the end of its search.
    assert_eq!(store.searches.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_inline_selected_touches_unless_flagged() {
    let store = Arc::new(MemoryStore::with_documents(vec![document(
        1,
        10,
        MediaType::Sticker,
        &["cat"],
    )]));
    let app = app(store.clone());

    let id = InlineResultId::new(10, false).encode();
    let (status, body) = call(
        &app,
        "POST",
        "/v1/inline/selected",
        Some(json!({"owner": 1, "result_id": id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["touched"], true);
    assert_eq!(store.touched.lock().unwrap()[0].0, DocumentId::new(1, 10));

    let id = InlineResultId::new(10, true).encode();
    let (_, body) = call(
        &app,
        "POST",
        "/v1/inline/selected",
        Some(json!({"owner": 1, "result_id": id})),
    )
    .await;
    assert_eq!(body["touched"], false);
    assert_eq!(store.touched.lock().unwrap().len(), 1);

    let (status, _) = call(
        &app,
        "POST",
        "/v1/inline/selected",
        Some(json!({"owner": 1, "result_id": "???"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = InlineResultId::new(99, false).encode();
    let (status, _) = call(
        &app,
        "POST",
        "/v1/inline/selected",
        Some(json!({"owner": 1, "result_id": id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_flagged_results_skip_last_used() {
    let store = Arc::new(MemoryStore::with_documents(vec![document(
        1,
        10,
        MediaType::Sticker,
        &["cat"],
    )]));
    let app = app(store);
    let (_, body) = call(
        &app,
        "POST",
        "/v1/inline",
        Some(json!({"owner": 1, "query": "cat delete:yes"})),
    )
    .await;
    let id = body["results"][0]["id"].as_str().unwrap();
    assert!(InlineResultId::decode(id).unwrap().skip_last_used);
}

#[tokio::test]
async fn test_parse_explicit_and_last_query() {
    let app = app(Arc::new(MemoryStore::default()));

    let (status, _) = call(&app, "POST", "/v1/parse", Some(json!({"owner": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(
        &app,
        "POST",
        "/v1/parse",
        Some(json!({"owner": 1, "query": "foo !bar t:zz"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let report = body["report"].as_str().unwrap();
    assert!(report.starts_with("Errors:\n"));
    assert!(report.contains("tags: foo !bar"));
    assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
    assert!(body.get("corrected").is_none());

    call(
        &app,
        "POST",
        "/v1/inline",
        Some(json!({"owner": 1, "query": "p:cats"})),
    )
    .await;
    let (status, body) = call(&app, "POST", "/v1/parse", Some(json!({"owner": 1}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "p:cats");
    assert!(body["report"].as_str().unwrap().contains("pack_name: cats"));
}

#[tokio::test]
async fn test_tag_new_sticker_from_metadata() {
    let store = Arc::new(MemoryStore::default());
    let app = app(store.clone());

    let media = json!({
        "id": 77,
        "access_hash": 5,
        "mime_type": "image/webp",
        "sticker": {"pack_short_name": "Cats", "pack_title": "Cats", "emoji": "😺"}
    });
    let (status, body) = call(
        &app,
        "POST",
        "/v1/media/tag",
        Some(json!({"owner": 1, "media": media.clone(), "text": "cute !ugly"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["kind"], "continue");
    assert_eq!(body["document"]["type"], "sticker");

    let saved = store.stored(1, 77).unwrap();
    assert_eq!(saved.tags, vec!["cute"]);
    assert_eq!(saved.emoji, vec!["😺"]);
    assert_eq!(saved.pack_link, "https://t.me/addstickers/Cats");

    let (_, body) = call(
        &app,
        "POST",
        "/v1/media/tag",
        Some(json!({"owner": 1, "media": media, "text": "funny !cute"})),
    )
    .await;
    assert_eq!(body["document"]["tags"], json!(["funny"]));
    assert!(body["text"].as_str().unwrap().starts_with("Tags for 77:"));
}

#[tokio::test]
async fn test_tag_without_tags_saves_nothing() {
    let store = Arc::new(MemoryStore::default());
    let app = app(store.clone());
    let (status, body) = call(
        &app,
        "POST",
        "/v1/media/tag",
        Some(json!({"owner": 1, "media": {"id": 5, "is_photo": true}, "text": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("document").is_none());
    assert!(store.stored(1, 5).is_none());
}

#[tokio::test]
async fn test_tag_limit_failure_is_reported() {
    let store = Arc::new(MemoryStore {
        limits: Limits {
            max_tags_per_item: 1,
            ..Limits::default()
        },
        ..MemoryStore::default()
    });
    let app = app(store.clone());
    let (status, body) = call(
        &app,
        "POST",
        "/v1/media/tag",
        Some(json!({"owner": 1, "media": {"id": 5, "is_photo": true}, "text": "a b"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["outcome"]["kind"], "fail");
    assert!(body["outcome"]["reason"]
        .as_str()
        .unwrap()
        .contains("Too many tags"));
    assert!(store.stored(1, 5).is_none());
}

#[tokio::test]
async fn test_delete_via_tag_text_and_route() {
    let store = Arc::new(MemoryStore::with_documents(vec![
        document(1, 10, MediaType::Sticker, &["cat"]),
        document(1, 11, MediaType::Gif, &["dog"]),
    ]));
    let app = app(store.clone());

    let (status, body) = call(
        &app,
        "POST",
        "/v1/media/tag",
        Some(json!({"owner": 1, "media": {"id": 10}, "text": "delete:yes"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);
    assert!(store.stored(1, 10).is_none());

    let (status, body) = call(&app, "DELETE", "/v1/media/1/11", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, _) = call(&app, "DELETE", "/v1/media/1/11", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats() {
    let store = Arc::new(MemoryStore::with_documents(vec![
        document(1, 1, MediaType::Gif, &[]),
        document(1, 2, MediaType::Gif, &[]),
        document(1, 3, MediaType::Photo, &[]),
    ]));
    let app = app(store);

    let (_, body) = call(&app, "GET", "/v1/stats/1", None).await;
    assert_eq!(
        body["text"],
        "Here's a summary of what you have saved:\nTotal: 3\ngif: 2\nphoto: 1"
    );

    let (_, body) = call(&app, "GET", "/v1/stats/2?marked=true", None).await;
    assert_eq!(
        body["text"],
        "You have not saved any media. Send /start to get started."
    );
}

#[tokio::test]
async fn test_correct_requires_vocabulary() {
    let app = app(Arc::new(MemoryStore::default()));
    let (status, _) = call(
        &app,
        "POST",
        "/v1/correct",
        Some(json!({"owner": 1, "tags": ["cat"]})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_tagging_feeds_corrections() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with_corrector(store);

    call(
        &app,
        "POST",
        "/v1/media/tag",
        Some(json!({"owner": 1, "media": {"id": 5, "animated": true}, "text": "kitten"})),
    )
    .await;

    let (status, body) = call(
        &app,
        "POST",
        "/v1/correct",
        Some(json!({"owner": 1, "type": "gifs", "tags": ["kiten", "qqqq"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "gif");
    assert_eq!(body["accepted"], json!([{"input": "kiten", "corrected": "kitten"}]));
    assert_eq!(body["rejected"][0]["input"], "qqqq");

    let (_, body) = call(
        &app,
        "POST",
        "/v1/parse",
        Some(json!({"owner": 1, "query": "kiten qqqq t:gif"})),
    )
    .await;
    assert_eq!(body["corrected"], "s:kitten type:gif");
    assert_eq!(body["dropped"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_mark_item_and_marked_stats() {
    let store = Arc::new(MemoryStore::with_documents(vec![
        document(1, 10, MediaType::Gif, &["cat"]),
        document(1, 11, MediaType::Sticker, &["dog"]),
    ]));
    let app = app(store.clone());

    let (status, body) = call(
        &app,
        "POST",
        "/v1/mark/item",
        Some(json!({"owner": 1, "media_id": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["marked"], true);
    assert_eq!(body["histogram"]["sub_total"], 1);
    assert!(body["text"]
        .as_str()
        .unwrap()
        .starts_with("Selected 1 item(s) for export\nHere's a summary"));
    assert!(store.stored(1, 10).unwrap().marked);
    assert!(!store.stored(1, 11).unwrap().marked);

    let (status, body) = call(&app, "GET", "/v1/stats/1?marked=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["histogram"]["total"], 2);
    assert_eq!(body["histogram"]["sub_total"], 1);

    let (status, _) = call(
        &app,
        "POST",
        "/v1/mark/item",
        Some(json!({"owner": 1, "media_id": 99, "marked": false})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mark_query_compiles_the_inline_query() {
    let store = Arc::new(MemoryStore::with_documents(vec![
        document(1, 10, MediaType::Gif, &["cat"]),
        document(1, 11, MediaType::Gif, &["dog"]),
        document(1, 12, MediaType::Sticker, &["cat"]),
    ]));
    let app = app(store.clone());

    let (status, body) = call(
        &app,
        "POST",
        "/v1/mark/query",
        Some(json!({"owner": 1, "query": "t:gif"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["marked"], true);
    assert_eq!(body["updated"], 2);
    assert!(store.stored(1, 10).unwrap().marked);
    assert!(!store.stored(1, 12).unwrap().marked);

    {
        let queries = store.mark_queries.lock().unwrap();
        let (owner, clause, marked) = &queries[0];
        assert_eq!(*owner, 1);
        assert!(*marked);
        assert_eq!(clause["bool"]["filter"][0], json!({"term": {"owner": 1}}));
        assert_eq!(clause["bool"]["filter"][1], json!({"term": {"type": "gif"}}));
    }

    // delete:yes unselects
    let (_, body) = call(
        &app,
        "POST",
        "/v1/mark/query",
        Some(json!({"owner": 1, "query": "t:gif delete:yes"})),
    )
    .await;
    assert_eq!(body["marked"], false);
    assert!(!store.stored(1, 10).unwrap().marked);
    assert_eq!(
        body["text"],
        "Unselected 2 item(s) for export\nNo items are marked to be exported."
    );
}

#[tokio::test]
async fn test_mark_query_without_query_clears_everything() {
    let mut marked = document(1, 10, MediaType::Photo, &["cat"]);
    marked.marked = true;
    let store = Arc::new(MemoryStore::with_documents(vec![
        marked,
        document(2, 10, MediaType::Photo, &["cat"]),
    ]));
    let app = app(store.clone());

    let (status, body) = call(&app, "POST", "/v1/mark/query", Some(json!({"owner": 1}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["marked"], false);
    assert_eq!(body["updated"], 1);
    assert!(!store.stored(1, 10).unwrap().marked);
    assert_eq!(
        store.mark_queries.lock().unwrap()[0].1,
        json!({"match_all": {}})
    );
}

#[tokio::test]
async fn test_emoji_tags() {
    let app = app(Arc::new(MemoryStore::default()));
    let (status, body) = call(&app, "POST", "/v1/emoji_tags", Some(json!({"text": "💀"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestions"][0]["emoji"], "💀");
    assert_eq!(body["suggestions"][0]["keywords"], json!(["skull"]));
    assert_eq!(body["text"], "💀 skull");

    let (_, body) = call(&app, "POST", "/v1/emoji_tags", Some(json!({"text": "nothing"}))).await;
    assert_eq!(body["text"], "No keywords found.");
}
