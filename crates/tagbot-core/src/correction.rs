//! Acceptance policy and result types for fuzzy tag correction.
//!
//! The nearest-neighbour lookup itself belongs to a [`TagVocabulary`]
//! implementation; this module decides what counts as a confident match.
//!
//! [`TagVocabulary`]: crate::traits::TagVocabulary

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::models::MediaType;

/// Nearest vocabulary entry for one candidate, before the policy is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestTag {
    pub input: String,
    /// `None` when the vocabulary is empty.
    pub matched: Option<String>,
    /// Normalized distance in `0.0..=1.0`; `1.0` when nothing matched.
    pub distance: f64,
}

impl NearestTag {
    pub fn unmatched(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            matched: None,
            distance: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedCorrection {
    pub input: String,
    pub corrected: String,
}

/// A candidate without a confident match, kept for "did you mean" feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCorrection {
    pub input: String,
    pub nearest: Option<String>,
    pub distance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionOutcome {
    pub accepted: Vec<AcceptedCorrection>,
    pub rejected: Vec<RejectedCorrection>,
}

impl CorrectionOutcome {
    /// Corrected values in input order, skipping rejected candidates.
    pub fn corrected_tags(&self) -> Vec<String> {
        self.accepted.iter().map(|a| a.corrected.clone()).collect()
    }
}

/// Threshold rule for accepting a nearest match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionPolicy {
    pub max_distance: f64,
    /// Minimum candidate length for the substring fallback.
    pub min_substring_len: usize,
}

impl Default for CorrectionPolicy {
    fn default() -> Self {
        Self {
            max_distance: defaults::CORRECTION_MAX_DISTANCE,
            min_substring_len: defaults::CORRECTION_MIN_SUBSTRING_LEN,
        }
    }
}

impl CorrectionPolicy {
    /// Accept when close enough, or when a long enough candidate is a
    /// literal substring of its match.
    pub fn accepts(&self, input: &str, matched: &str, distance: f64) -> bool {
        distance <= self.max_distance
            || (input.chars().count() >= self.min_substring_len && matched.contains(input))
    }

    /// Split nearest matches into accepted and rejected, keeping input order.
    pub fn judge(&self, matches: Vec<NearestTag>) -> CorrectionOutcome {
        let mut outcome = CorrectionOutcome::default();
        for m in matches {
            match m.matched {
                Some(matched) if self.accepts(&m.input, &matched, m.distance) => {
                    outcome.accepted.push(AcceptedCorrection {
                        input: m.input,
                        corrected: matched,
                    })
                }
                nearest => outcome.rejected.push(RejectedCorrection {
                    input: m.input,
                    nearest,
                    distance: m.distance,
                }),
            }
        }
        outcome
    }

    /// Resolve a media type name, exactly or by nearest neighbour.
    ///
    /// Only concrete types are considered; `document` is a search alias.
    pub fn resolve_media_type(&self, raw: &str) -> Result<MediaType, RejectedCorrection> {
        let needle = raw.trim().to_lowercase();
        let concrete = MediaType::ALL
            .iter()
            .copied()
            .filter(|t| *t != MediaType::Document);
        let mut best: Option<(MediaType, f64)> = None;
        for candidate in concrete {
            if candidate.as_str() == needle {
                return Ok(candidate);
            }
            let d = distance(&needle, candidate.as_str());
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((candidate, d));
            }
        }
        match best {
            Some((t, d)) if self.accepts(&needle, t.as_str(), d) => Ok(t),
            Some((t, d)) => Err(RejectedCorrection {
                input: raw.to_string(),
                nearest: Some(t.as_str().to_string()),
                distance: d,
            }),
            None => Err(RejectedCorrection {
                input: raw.to_string(),
                nearest: None,
                distance: 1.0,
            }),
        }
    }
}

/// Normalized string distance: `1 - Sørensen-Dice` over character bigrams.
pub fn distance(a: &str, b: &str) -> f64 {
    1.0 - strsim::sorensen_dice(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_close_match() {
        let policy = CorrectionPolicy::default();
        assert!(policy.accepts("cta", "cat", 0.5));
        assert!(!policy.accepts("xyz", "cat", 0.9));
    }

    #[test]
    fn test_substring_fallback_needs_min_length() {
        let policy = CorrectionPolicy::default();
        assert!(policy.accepts("anim", "animated_cat_stickers", 0.95));
        assert!(!policy.accepts("ani", "animated_cat_stickers", 0.95));
    }

    #[test]
    fn test_judge_keeps_rejections_with_distance() {
        let policy = CorrectionPolicy::default();
        let outcome = policy.judge(vec![
            NearestTag {
                input: "kitty".into(),
                matched: Some("kitten".into()),
                distance: 0.4,
            },
            NearestTag {
                input: "qq".into(),
                matched: Some("dog".into()),
                distance: 1.0,
            },
            NearestTag::unmatched("empty"),
        ]);
        assert_eq!(outcome.corrected_tags(), vec!["kitten".to_string()]);
        assert_eq!(outcome.rejected.len(), 2);
        assert_eq!(outcome.rejected[0].nearest.as_deref(), Some("dog"));
        assert_eq!(outcome.rejected[1].nearest, None);
        assert_eq!(outcome.rejected[1].distance, 1.0);
    }

    #[test]
    fn test_resolve_media_type() {
        let policy = CorrectionPolicy::default();
        assert_eq!(policy.resolve_media_type("Photo"), Ok(MediaType::Photo));
        assert_eq!(policy.resolve_media_type("stiker"), Ok(MediaType::Sticker));
        assert!(policy.resolve_media_type("document").is_err());
        let rejected = policy.resolve_media_type("zzzz").unwrap_err();
        assert!(rejected.nearest.is_some());
    }

    #[test]
    fn test_distance_bounds() {
        assert_eq!(distance("cat", "cat"), 0.0);
        assert_eq!(distance("ab", "yz"), 1.0);
    }
}
