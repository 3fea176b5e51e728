//! Turning transport-level media descriptions into tagged documents.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::defaults::STICKER_PACK_LINK_PREFIX;
use crate::emoji::strip_emojis;
use crate::models::{MediaType, TaggedDocument};

const ANIMATED_STICKER_MIME: &str = "application/x-tgsticker";
const VIDEO_STICKER_MIME: &str = "video/webm";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioAttributes {
    pub voice: bool,
    pub performer: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerAttributes {
    /// Short name used in pack links.
    pub pack_short_name: Option<String>,
    pub pack_title: Option<String>,
    /// Emoji the sticker was uploaded with.
    pub emoji: Option<String>,
}

/// Media as described by the chat transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaInfo {
    pub id: i64,
    pub access_hash: i64,
    pub is_photo: bool,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub audio: Option<AudioAttributes>,
    /// Marked as an animation (gif).
    pub animated: bool,
    pub video: bool,
    pub sticker: Option<StickerAttributes>,
}

impl MediaInfo {
    /// Classify the media.
    ///
    /// Stickers are checked before plain video so that video stickers stay
    /// stickers.
    pub fn media_type(&self) -> MediaType {
        if self.is_photo {
            MediaType::Photo
        } else if let Some(audio) = &self.audio {
            if audio.voice {
                MediaType::Voice
            } else {
                MediaType::Audio
            }
        } else if self.animated {
            MediaType::Gif
        } else if self.sticker.is_some() {
            MediaType::Sticker
        } else if self.video {
            MediaType::Video
        } else {
            MediaType::File
        }
    }

    /// Extension without the leading dot, from the file name or else the
    /// mime type.
    pub fn extension(&self) -> String {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());
        if let Some(ext) = from_name {
            return ext;
        }
        self.mime_type
            .as_deref()
            .and_then(mime_guess::get_mime_extensions_str)
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
            .unwrap_or_default()
    }

    pub fn is_animated(&self) -> bool {
        let mime = self.mime_type.as_deref().unwrap_or_default();
        self.animated
            || mime == ANIMATED_STICKER_MIME
            || (self.sticker.is_some() && mime == VIDEO_STICKER_MIME)
    }

    fn title(&self) -> String {
        let Some(audio) = &self.audio else {
            return String::new();
        };
        match (audio.performer.as_deref(), audio.title.as_deref()) {
            (Some(p), Some(t)) => format!("{} - {}", p, t),
            (None, Some(t)) => t.to_string(),
            (Some(p), None) => p.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Fresh, untagged document for `owner` describing this media.
    pub fn to_document(&self, owner: i64) -> TaggedDocument {
        let mut doc = TaggedDocument::new(owner, self.id, self.access_hash, self.media_type());
        doc.ext = self.extension();
        doc.is_animated = self.is_animated();
        doc.filename = self.file_name.clone().unwrap_or_default();
        doc.title = self.title();
        if let Some(sticker) = &self.sticker {
            doc.pack_name = sticker.pack_title.clone().unwrap_or_default();
            if let Some(short) = &sticker.pack_short_name {
                doc.pack_link = format!("{}{}", STICKER_PACK_LINK_PREFIX, short);
            }
            if let Some(emoji) = &sticker.emoji {
                doc.emoji = strip_emojis(emoji).1;
            }
        }
        doc
    }
}
