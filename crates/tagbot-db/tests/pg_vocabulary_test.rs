//! PostgreSQL tag vocabulary tests.
//!
//! These need a database with the `pg_trgm` extension available and run
//! only with `cargo test -- --ignored`.

use sqlx::PgPool;
use tagbot_db::{
    create_pool, MediaType, PgTagVocabulary, TagVocabulary, DEFAULT_TEST_DATABASE_URL,
};

async fn setup_test_pool() -> PgPool {
    let _ = dotenvy::dotenv();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_TEST_DATABASE_URL.to_string());
    create_pool(&database_url)
        .await
        .expect("Failed to create test pool")
}

/// Owner id unlikely to collide with other test runs.
fn unique_owner() -> i64 {
    -(chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default().abs() % 1_000_000_000_000)
        - 1
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
#[ignore]
async fn test_apply_tags_reports_created_and_deleted() {
    let vocab = PgTagVocabulary::new(setup_test_pool().await);
    vocab.ensure_schema().await.expect("schema");
    let owner = unique_owner();

    let diff = vocab
        .apply_tags(owner, 1, MediaType::Sticker, &strings(&["cat", "cute"]))
        .await
        .expect("apply");
    assert_eq!(diff.created, strings(&["cat", "cute"]));

    let diff = vocab
        .apply_tags(owner, 2, MediaType::Sticker, &strings(&["cat"]))
        .await
        .expect("apply");
    assert!(diff.is_empty());

    let diff = vocab
        .apply_tags(owner, 1, MediaType::Sticker, &strings(&["dog"]))
        .await
        .expect("apply");
    assert_eq!(diff.created, strings(&["dog"]));
    assert_eq!(diff.deleted, strings(&["cute"]));

    let listed = vocab.list(owner, MediaType::Sticker).await.expect("list");
    assert_eq!(listed.len(), 2);

    vocab.forget(owner, 1, MediaType::Sticker).await.expect("forget");
    vocab.forget(owner, 2, MediaType::Sticker).await.expect("forget");
    assert!(vocab
        .list(owner, MediaType::Sticker)
        .await
        .expect("list")
        .is_empty());
}

#[tokio::test]
#[ignore]
async fn test_nearest_uses_trigram_distance_in_input_order() {
    let vocab = PgTagVocabulary::new(setup_test_pool().await);
    vocab.ensure_schema().await.expect("schema");
    let owner = unique_owner();

    vocab
        .apply_tags(owner, 1, MediaType::Gif, &strings(&["screaming", "dancing"]))
        .await
        .expect("apply");

    let found = vocab
        .nearest(owner, MediaType::Gif, &strings(&["dancng", "screamin"]))
        .await
        .expect("nearest");
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].matched.as_deref(), Some("dancing"));
    assert_eq!(found[1].matched.as_deref(), Some("screaming"));
    assert!(found.iter().all(|n| (0.0..=1.0).contains(&n.distance)));

    let other_type = vocab
        .nearest(owner, MediaType::Photo, &strings(&["dancing"]))
        .await
        .expect("nearest");
    assert_eq!(other_type[0].matched, None);
    assert_eq!(other_type[0].distance, 1.0);

    vocab.forget(owner, 1, MediaType::Gif).await.expect("forget");
}

#[tokio::test]
#[ignore]
async fn test_type_change_reports_previous_type_deletions() {
    let vocab = PgTagVocabulary::new(setup_test_pool().await);
    vocab.ensure_schema().await.expect("schema");
    let owner = unique_owner();

    vocab
        .apply_tags(owner, 1, MediaType::Sticker, &strings(&["kitten"]))
        .await
        .expect("apply");
    let diff = vocab
        .apply_tags(owner, 1, MediaType::Gif, &strings(&["kitten"]))
        .await
        .expect("apply");
    assert_eq!(diff.created, strings(&["kitten"]));
    assert_eq!(diff.deleted, strings(&["kitten"]));
    assert_eq!(diff.deleted_from, Some(MediaType::Sticker));
    assert!(vocab
        .list(owner, MediaType::Sticker)
        .await
        .expect("list")
        .is_empty());

    vocab.forget(owner, 1, MediaType::Gif).await.expect("forget");
}
