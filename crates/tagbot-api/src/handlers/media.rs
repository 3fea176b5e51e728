//! Tagging and deleting saved media.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use tagbot_core::fields::{DELETE, YES};
use tagbot_core::{parse_tags, DocumentId, Error, MediaInfo, TaggedDocument};

use crate::{ApiError, AppState, HandlerOutcome};

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub owner: i64,
    pub media: MediaInfo,
    /// Tag edits, e.g. `cat !dog 😺`, or `delete:yes`.
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub outcome: HandlerOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<TaggedDocument>,
    pub deleted: bool,
    /// Reply for the end user.
    pub text: String,
}

impl IntoResponse for TagResponse {
    fn into_response(self) -> Response {
        (self.outcome.status(), Json(self)).into_response()
    }
}

impl TagResponse {
    fn reply(outcome: HandlerOutcome, text: impl Into<String>) -> Self {
        Self {
            outcome,
            document: None,
            deleted: false,
            text: text.into(),
        }
    }
}

/// Summary of a stored document: metadata line, then tags and emoji.
pub fn describe_document(document: &TaggedDocument) -> String {
    let mut meta = vec![format!("t:{}", document.media_type)];
    if document.is_animated {
        meta.push("a:yes".to_string());
    }
    if !document.pack_name.is_empty() {
        meta.push(format!("p:{}", document.pack_name));
    }
    if !document.ext.is_empty() {
        meta.push(format!("e:{}", document.ext));
    }
    let tags: Vec<&str> = document
        .tags
        .iter()
        .chain(&document.emoji)
        .map(String::as_str)
        .collect();
    format!(
        "Tags for {}:\n[meta] {}\n{}",
        document.id,
        meta.join(" "),
        if tags.is_empty() {
            "<empty>".to_string()
        } else {
            tags.join(" ")
        }
    )
}

/// Apply tag edits to one item, creating it from the media metadata when it
/// is not saved yet.
pub async fn tag_media(
    State(state): State<AppState>,
    Json(req): Json<TagRequest>,
) -> Result<TagResponse, ApiError> {
    state.ensure_allowed(req.owner)?;
    let query = parse_tags(&req.text);
    let id = DocumentId::new(req.owner, req.media.id);
    let existing = state.store.get(id).await?;

    if query.get_first(DELETE, false) == Some(YES) {
        let deleted = state.store.delete(id).await?;
        if let (true, Some(old), Some(corrector)) = (deleted, &existing, &state.corrector) {
            corrector
                .forget(req.owner, req.media.id, old.media_type)
                .await?;
        }
        let text = if deleted { "Deleted" } else { "That item was not saved" };
        return Ok(TagResponse {
            deleted,
            ..TagResponse::reply(HandlerOutcome::Continue, text)
        });
    }

    let base = existing
        .clone()
        .unwrap_or_else(|| req.media.to_document(req.owner));
    let document = query.merge_into(&base);
    if existing.is_none() && !document.has_tags() {
        return Ok(TagResponse::reply(
            HandlerOutcome::Continue,
            "No tags given, nothing was saved",
        ));
    }

    match state.store.upsert(&document).await {
        Ok(()) => {}
        Err(Error::Validation(reason)) => {
            let reason = reason.to_string();
            return Ok(TagResponse::reply(
                HandlerOutcome::Fail(reason.clone()),
                format!("Error: {}", reason),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(corrector) = &state.corrector {
        corrector
            .apply_tags(req.owner, document.id, document.media_type, &document.tags)
            .await?;
    }

    info!(
        subsystem = "api",
        component = "media",
        op = "tag",
        owner_id = req.owner,
        media_id = document.id,
        media_type = %document.media_type,
        created = existing.is_none(),
        "Media tagged"
    );
    Ok(TagResponse {
        text: describe_document(&document),
        document: Some(document),
        ..TagResponse::reply(HandlerOutcome::Continue, "")
    })
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

pub async fn delete_media(
    State(state): State<AppState>,
    Path((owner, media_id)): Path<(i64, i64)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.ensure_allowed(owner)?;
    let id = DocumentId::new(owner, media_id);
    let existing = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("media {} is not saved", media_id)))?;

    let deleted = state.store.delete(id).await?;
    if let (true, Some(corrector)) = (deleted, &state.corrector) {
        corrector
            .forget(owner, media_id, existing.media_type)
            .await?;
    }
    Ok(Json(DeleteResponse { deleted }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagbot_core::MediaType;

    #[test]
    fn test_describe_document() {
        let mut doc = TaggedDocument::new(1, 42, 0, MediaType::Sticker);
        doc.pack_name = "Cats".into();
        doc.ext = "webp".into();
        doc.tags = vec!["cat".into(), "cute".into()];
        doc.emoji = vec!["😺".into()];
        assert_eq!(
            describe_document(&doc),
            "Tags for 42:\n[meta] t:sticker p:Cats e:webp\ncat cute 😺"
        );

        let bare = TaggedDocument::new(1, 7, 0, MediaType::Gif);
        assert_eq!(describe_document(&bare), "Tags for 7:\n[meta] t:gif\n<empty>");
    }
}
