//! Recommendation model shared by the store, the view and the page renderer.

use serde::{Deserialize, Serialize};

/// A book recommendation as stored in the reading list table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub author: String,
    /// Raw comma-separated tags as typed by the contributor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
    /// Set by moderators outside this service, never by it
    pub approved: bool,
    pub created_at: String,
}

impl Recommendation {
    /// Case-insensitive substring match over every searchable field.
    ///
    /// `needle` must already be lower-cased. Absent fields never match.
    pub fn matches(&self, needle: &str) -> bool {
        let contains = |field: &str| field.to_lowercase().contains(needle);

        contains(&self.title)
            || contains(&self.author)
            || self.tags.as_deref().is_some_and(contains)
            || self.notes.as_deref().is_some_and(contains)
            || self.contributor.as_deref().is_some_and(contains)
    }

    /// Display labels for this entry's tags.
    pub fn tag_labels(&self) -> Vec<String> {
        self.tags.as_deref().map(parse_tags).unwrap_or_default()
    }
}

/// Insert payload for a new recommendation.
///
/// Has no approval field: every insert lands unapproved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRecommendation {
    pub title: String,
    pub author: String,
    pub tags: Option<String>,
    pub notes: Option<String>,
    pub contributor: Option<String>,
}

impl NewRecommendation {
    /// Build an insert payload from raw form text. Blank optional fields become `None`.
    pub fn from_fields(
        title: &str,
        author: &str,
        tags: &str,
        notes: &str,
        contributor: &str,
    ) -> Self {
        Self {
            title: title.trim().to_string(),
            author: author.trim().to_string(),
            tags: non_blank(tags),
            notes: non_blank(notes),
            contributor: non_blank(contributor),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Split a raw tag string into trimmed, lower-cased labels.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}
