//! Reusable block content model.

use crate::model::entity::EntityId;
use crate::model::node::FormattedText;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One typed block field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockField {
    Text(FormattedText),
    Link { uri: String, title: String },
    Image { target_id: EntityId, alt: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContent {
    /// Administrative description.
    pub info: String,
    pub bundle: String,
    pub fields: BTreeMap<String, BlockField>,
}

impl BlockContent {
    pub fn new(info: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            info: info.into(),
            bundle: bundle.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field, builder style.
    pub fn with_field(mut self, name: &str, value: BlockField) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }
}
