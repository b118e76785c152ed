//! Content node model (articles, press releases, pages).

use crate::model::entity::EntityId;
use serde::{Deserialize, Serialize};

/// Moderation state applied when a data row does not override it.
pub const DEFAULT_MODERATION_STATE: &str = "published";

/// Text format used for imported rich-text fields.
pub const BASIC_HTML_FORMAT: &str = "basic_html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeBundle {
    Article,
    PressRelease,
    Page,
}

impl NodeBundle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::PressRelease => "press_release",
            Self::Page => "page",
        }
    }
}

/// Text value with an optional text format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedText {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl FormattedText {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: None,
        }
    }

    pub fn basic_html(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: Some(BASIC_HTML_FORMAT.to_string()),
        }
    }
}

/// Reference to a file entity used as an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub target_id: EntityId,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub bundle: NodeBundle,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<FormattedText>,
    /// Alias including the leading slash, e.g. `/about-us`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_alias: Option<String>,
    /// Taxonomy term ids in the `tags` vocabulary.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<EntityId>,
    /// Author user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub moderation_state: String,
}

impl Node {
    /// Creates a published node with only the title set.
    pub fn new(bundle: NodeBundle, title: impl Into<String>) -> Self {
        Self {
            bundle,
            title: title.into(),
            body: None,
            path_alias: None,
            tags: Vec::new(),
            uid: None,
            image: None,
            moderation_state: DEFAULT_MODERATION_STATE.to_string(),
        }
    }

    /// Sets the alias from a bare slug (`about-us` -> `/about-us`).
    pub fn set_slug(&mut self, slug: &str) {
        self.path_alias = Some(format!("/{}", slug.trim_start_matches('/')));
    }
}
