// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Submission records as delivered by a [`DataSource`](crate::source::DataSource).
//!
//! A [`Submission`] is immutable from the engine's point of view. Only its
//! [`SubmissionId`] participates in identity tracking; `created_at` only
//! drives canonical ordering.

use alloc::string::String;
use core::fmt;

/// Maximum number of characters displayed for a tile message.
pub const MAX_MESSAGE_CHARS: usize = 80;

/// Stable unique identity of a submission.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(transparent))]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Creates an identity from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubmissionId {
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

impl fmt::Debug for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubmissionId({})", self.0)
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of message a submission carries.
///
/// Unknown category names are preserved in [`Category::Other`] and displayed
/// verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(from = "String"))]
pub enum Category {
    /// Challenge a harmful norm.
    Challenge,
    /// Promote a safe practice.
    Promote,
    /// Share a positive message.
    Share,
    /// Any category the wall has no styling for.
    Other(String),
}

/// Display styling for a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryStyle {
    /// Accent color as a CSS hex string.
    pub color: &'static str,
    /// Gradient start and end colors.
    pub gradient: (&'static str, &'static str),
}

const FALLBACK_STYLE: CategoryStyle = CategoryStyle {
    color: "#ffffff",
    gradient: ("#ffffff", "#ffffff"),
};

impl Category {
    /// Parses a category name. Never fails; unknown names become
    /// [`Category::Other`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        Self::known(name).unwrap_or_else(|| Self::Other(name.into()))
    }

    fn known(name: &str) -> Option<Self> {
        match name {
            "challenge" => Some(Self::Challenge),
            "promote" => Some(Self::Promote),
            "share" => Some(Self::Share),
            _ => None,
        }
    }

    /// Human-readable label shown next to the tile.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Challenge => "Challenge a harmful norm",
            Self::Promote => "Promote a safe practice",
            Self::Share => "Share a positive message",
            Self::Other(name) => name,
        }
    }

    /// Accent color and gradient for this category.
    #[must_use]
    pub fn style(&self) -> CategoryStyle {
        match self {
            Self::Challenge => CategoryStyle {
                color: "#3B82F6",
                gradient: ("#3B82F6", "#60A5FA"),
            },
            Self::Promote => CategoryStyle {
                color: "#A855F7",
                gradient: ("#A855F7", "#D8B4FE"),
            },
            Self::Share => CategoryStyle {
                color: "#22C55E",
                gradient: ("#22C55E", "#4ADE80"),
            },
            Self::Other(_) => FALLBACK_STYLE,
        }
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Self::known(&name).unwrap_or(Self::Other(name))
    }
}

/// One record from the data feed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Submission {
    /// Stable identity.
    pub id: SubmissionId,
    /// Free-text message; may exceed [`MAX_MESSAGE_CHARS`] on the wire.
    #[cfg_attr(feature = "serde", serde(default))]
    pub message: String,
    /// Message category.
    pub category: Category,
    /// Creation time in milliseconds since the Unix epoch.
    ///
    /// Decoded from either epoch milliseconds or an ISO 8601 timestamp.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "created_at::deserialize"))]
    pub created_at: i64,
}

impl Submission {
    /// Creates a submission record.
    #[must_use]
    pub fn new(
        id: impl Into<SubmissionId>,
        message: impl Into<String>,
        category: Category,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            category,
            created_at,
        }
    }

    /// The message as it will be displayed.
    #[must_use]
    pub fn display_text(&self) -> &str {
        truncate_message(&self.message)
    }
}

/// Truncates `text` to at most [`MAX_MESSAGE_CHARS`] characters, respecting
/// character boundaries.
#[must_use]
pub fn truncate_message(text: &str) -> &str {
    match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(feature = "serde")]
mod created_at {
    use alloc::string::String;

    use chrono::{DateTime, NaiveDateTime};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Millis(i64),
        Fractional(f64),
        Text(String),
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let millis = match Wire::deserialize(deserializer)? {
            Wire::Millis(millis) => Some(millis),
            Wire::Fractional(millis) => from_fractional(millis),
            Wire::Text(text) => parse(&text),
        };
        millis.ok_or_else(|| D::Error::custom("createdAt is not a timestamp"))
    }

    /// Epoch milliseconds from a numeric string, an RFC 3339 timestamp, or
    /// an offset-less ISO 8601 date-time read as UTC.
    pub(super) fn parse(text: &str) -> Option<i64> {
        let text = text.trim();
        if let Ok(millis) = text.parse::<i64>() {
            return Some(millis);
        }
        if let Ok(time) = DateTime::parse_from_rfc3339(text) {
            return Some(time.timestamp_millis());
        }
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|time| time.and_utc().timestamp_millis())
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "finite and inside the i64 range before conversion"
    )]
    fn from_fractional(millis: f64) -> Option<i64> {
        let range = -9.0e18..9.0e18;
        (millis.is_finite() && range.contains(&millis)).then(|| millis as i64)
    }
}
