//! Per-owner tag vocabularies used by the fuzzy tag corrector.
//!
//! [`PgTagVocabulary`] keeps usage counts in PostgreSQL and ranks candidates
//! with `pg_trgm` distance. [`MemoryTagVocabulary`] is the in-process
//! equivalent used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tokio::sync::Mutex;
use tracing::debug;

use tagbot_core::correction::distance;
use tagbot_core::{Error, MediaType, NearestTag, Result, TagDiff, TagVocabulary};

const SCHEMA: &[&str] = &[
    "CREATE EXTENSION IF NOT EXISTS pg_trgm",
    r#"
    CREATE TABLE IF NOT EXISTS user_tag (
        owner BIGINT NOT NULL,
        media_type TEXT NOT NULL,
        name TEXT NOT NULL,
        usage_count INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (owner, media_type, name)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS user_tag_name_trgm ON user_tag USING gist (name gist_trgm_ops)",
    r#"
    CREATE TABLE IF NOT EXISTS media_tags (
        owner BIGINT NOT NULL,
        media_id BIGINT NOT NULL,
        media_type TEXT NOT NULL,
        tags TEXT[] NOT NULL DEFAULT '{}',
        PRIMARY KEY (owner, media_id)
    )
    "#,
];

/// Distinct values of `tags`, in first-seen order.
fn distinct(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(tag) {
            out.push(tag.clone());
        }
    }
    out
}

/// PostgreSQL vocabulary backed by `user_tag` and `media_tags`.
#[derive(Debug, Clone)]
pub struct PgTagVocabulary {
    pool: PgPool,
}

impl PgTagVocabulary {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the extension, tables, and trigram index if missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;
        }
        Ok(())
    }

    /// All tags an owner uses for a type with their usage counts, most used first.
    pub async fn list(&self, owner: i64, media_type: MediaType) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT name, usage_count::BIGINT AS usage_count
            FROM user_tag
            WHERE owner = $1 AND media_type = $2 AND usage_count > 0
            ORDER BY usage_count DESC, name
            "#,
        )
        .bind(owner)
        .bind(media_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("name"), row.get("usage_count")))
            .collect())
    }
}

#[async_trait]
impl TagVocabulary for PgTagVocabulary {
    async fn nearest(
        &self,
        owner: i64,
        media_type: MediaType,
        candidates: &[String],
    ) -> Result<Vec<NearestTag>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(
            r#"
            SELECT c.input, m.name AS matched, m.dist AS distance
            FROM unnest($3::text[]) WITH ORDINALITY AS c(input, ord)
            LEFT JOIN LATERAL (
                SELECT t.name, (t.name <-> c.input)::float8 AS dist
                FROM user_tag t
                WHERE t.owner = $1 AND t.media_type = $2 AND t.usage_count > 0
                ORDER BY t.name <-> c.input, t.name
                LIMIT 1
            ) m ON true
            ORDER BY c.ord
            "#,
        )
        .bind(owner)
        .bind(media_type.as_str())
        .bind(candidates)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let matched: Option<String> = row.get("matched");
                let dist: Option<f64> = row.get("distance");
                NearestTag {
                    input: row.get("input"),
                    distance: if matched.is_some() { dist.unwrap_or(1.0) } else { 1.0 },
                    matched,
                }
            })
            .collect())
    }

    async fn apply_tags(
        &self,
        owner: i64,
        media_id: i64,
        media_type: MediaType,
        tags: &[String],
    ) -> Result<TagDiff> {
        let new_tags = distinct(tags);
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Materialize the row first so FOR UPDATE always has something to lock.
        sqlx::query(
            r#"
            INSERT INTO media_tags (owner, media_id, media_type, tags)
            VALUES ($1, $2, $3, '{}')
            ON CONFLICT (owner, media_id) DO NOTHING
            "#,
        )
        .bind(owner)
        .bind(media_id)
        .bind(media_type.as_str())
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let row = sqlx::query(
            "SELECT media_type, tags FROM media_tags WHERE owner = $1 AND media_id = $2 FOR UPDATE",
        )
        .bind(owner)
        .bind(media_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;
        let old_type: String = row.get("media_type");
        let old_tags: Vec<String> = row.get("tags");

        // A type change moves every tag to the new type's vocabulary.
        let type_changed = old_type != media_type.as_str();
        let mut diff = TagDiff::default();
        if type_changed {
            diff.deleted_from = Some(old_type.parse()?);
        }

        for tag in old_tags
            .iter()
            .filter(|t| type_changed || !new_tags.contains(t))
        {
            let remaining: Option<i32> = sqlx::query_scalar(
                r#"
                UPDATE user_tag SET usage_count = usage_count - 1
                WHERE owner = $1 AND media_type = $2 AND name = $3
                RETURNING usage_count
                "#,
            )
            .bind(owner)
            .bind(&old_type)
            .bind(tag)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;
            if remaining.map_or(false, |n| n <= 0) {
                diff.deleted.push(tag.clone());
            }
        }

        for tag in new_tags
            .iter()
            .filter(|t| type_changed || !old_tags.contains(t))
        {
            let count: i32 = sqlx::query_scalar(
                r#"
                INSERT INTO user_tag (owner, media_type, name, usage_count)
                VALUES ($1, $2, $3, 1)
                ON CONFLICT (owner, media_type, name)
                DO UPDATE SET usage_count = user_tag.usage_count + 1
                RETURNING usage_count
                "#,
            )
            .bind(owner)
            .bind(media_type.as_str())
            .bind(tag)
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;
            if count == 1 {
                diff.created.push(tag.clone());
            }
        }

        sqlx::query("DELETE FROM user_tag WHERE owner = $1 AND usage_count <= 0")
            .bind(owner)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if new_tags.is_empty() {
            sqlx::query("DELETE FROM media_tags WHERE owner = $1 AND media_id = $2")
                .bind(owner)
                .bind(media_id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
        } else {
            sqlx::query(
                "UPDATE media_tags SET media_type = $3, tags = $4 WHERE owner = $1 AND media_id = $2",
            )
            .bind(owner)
            .bind(media_id)
            .bind(media_type.as_str())
            .bind(&new_tags)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "vocabulary",
            op = "apply_tags",
            owner_id = owner,
            media_id = media_id,
            created = diff.created.len(),
            deleted = diff.deleted.len(),
            "Tag vocabulary updated"
        );
        Ok(diff)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    /// (owner, type) -> tag -> usage count
    usage: HashMap<(i64, MediaType), HashMap<String, u32>>,
    /// (owner, media id) -> (type, tags)
    items: HashMap<(i64, i64), (MediaType, Vec<String>)>,
}

/// In-process vocabulary ranking candidates by [`distance`].
#[derive(Debug, Default)]
pub struct MemoryTagVocabulary {
    state: Mutex<MemoryState>,
}

impl MemoryTagVocabulary {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TagVocabulary for MemoryTagVocabulary {
    async fn nearest(
        &self,
        owner: i64,
        media_type: MediaType,
        candidates: &[String],
    ) -> Result<Vec<NearestTag>> {
        let state = self.state.lock().await;
        let known = state.usage.get(&(owner, media_type));
        Ok(candidates
            .iter()
            .map(|input| {
                let best = known.and_then(|tags| {
                    tags.keys()
                        .map(|name| (distance(input, name), name))
                        .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)))
                });
                match best {
                    Some((d, name)) => NearestTag {
                        input: input.clone(),
                        matched: Some(name.clone()),
                        distance: d,
                    },
                    None => NearestTag::unmatched(input.clone()),
                }
            })
            .collect())
    }

    async fn apply_tags(
        &self,
        owner: i64,
        media_id: i64,
        media_type: MediaType,
        tags: &[String],
    ) -> Result<TagDiff> {
        let new_tags = distinct(tags);
        let mut state = self.state.lock().await;
        let (old_type, old_tags) = state
            .items
            .remove(&(owner, media_id))
            .unwrap_or((media_type, Vec::new()));
        let type_changed = old_type != media_type;

        let mut diff = TagDiff {
            deleted_from: type_changed.then_some(old_type),
            ..TagDiff::default()
        };
        if let Some(usage) = state.usage.get_mut(&(owner, old_type)) {
            for tag in old_tags
                .iter()
                .filter(|t| type_changed || !new_tags.contains(t))
            {
                if let Some(count) = usage.get_mut(tag) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        usage.remove(tag);
                        diff.deleted.push(tag.clone());
                    }
                }
            }
        }

        let usage = state.usage.entry((owner, media_type)).or_default();
        for tag in new_tags
            .iter()
            .filter(|t| type_changed || !old_tags.contains(t))
        {
            let count = usage.entry(tag.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                diff.created.push(tag.clone());
            }
        }

        if !new_tags.is_empty() {
            state.items.insert((owner, media_id), (media_type, new_tags));
        }
        Ok(diff)
    }
}
