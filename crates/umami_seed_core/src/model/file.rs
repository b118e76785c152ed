//! Managed file model.

use serde::{Deserialize, Serialize};

/// File record pointing at a copy in public file storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedFile {
    /// Stream uri, e.g. `public://banner.jpg`.
    pub uri: String,
    pub filename: String,
    /// Permanent file flag.
    pub status: bool,
}

impl ManagedFile {
    pub fn permanent(uri: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            filename: filename.into(),
            status: true,
        }
    }
}
