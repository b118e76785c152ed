//! Resolves bundled data files and assets relative to the content root.

use std::path::{Path, PathBuf};

const DEFAULT_CONTENT_DIR: &str = "default_content";

pub const ARTICLES_CSV: &str = "articles.csv";
pub const PRESS_RELEASES_CSV: &str = "press-releases.csv";
pub const PAGES_CSV: &str = "pages.csv";

/// Asset sub-directories under `default_content/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetDir {
    ArticleBody,
    PressReleaseBody,
    Images,
}

impl AssetDir {
    fn dir_name(self) -> &'static str {
        match self {
            Self::ArticleBody => "article_body",
            Self::PressReleaseBody => "prs",
            Self::Images => "images",
        }
    }
}

/// Content root holding a `default_content/` directory.
#[derive(Debug, Clone)]
pub struct ContentLocator {
    root: PathBuf,
}

impl ContentLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Content shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("content"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_file(&self, name: &str) -> PathBuf {
        self.root.join(DEFAULT_CONTENT_DIR).join(name)
    }

    pub fn asset(&self, dir: AssetDir, name: &str) -> PathBuf {
        self.root
            .join(DEFAULT_CONTENT_DIR)
            .join(dir.dir_name())
            .join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetDir, ContentLocator, ARTICLES_CSV};
    use std::path::Path;

    #[test]
    fn paths_are_rooted_under_default_content() {
        let locator = ContentLocator::new("/srv/umami");
        assert_eq!(
            locator.data_file(ARTICLES_CSV),
            Path::new("/srv/umami/default_content/articles.csv")
        );
        assert_eq!(
            locator.asset(AssetDir::PressReleaseBody, "pr1.html"),
            Path::new("/srv/umami/default_content/prs/pr1.html")
        );
    }

    #[test]
    fn bundled_content_ships_every_data_file() {
        let locator = ContentLocator::bundled();
        for name in [super::ARTICLES_CSV, super::PRESS_RELEASES_CSV, super::PAGES_CSV] {
            assert!(locator.data_file(name).is_file(), "{name} missing");
        }
    }
}
