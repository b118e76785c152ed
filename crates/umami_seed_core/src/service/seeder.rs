//! Demo content seeding and teardown.
//!
//! # Responsibility
//! - Import editors, articles, press releases, pages and block content, in
//!   that order, from the bundled data files.
//! - Record every created entity in the ledger and delete exactly that set
//!   on teardown.
//!
//! # Invariants
//! - User and term lookups are get-or-create; they never duplicate.
//! - Every entity is ledgered right after it is saved; node uuids of one
//!   data file are ledgered as one batch, including when a row aborts the
//!   file.
//! - Block content needs the nodes it links to; a missing node aborts the
//!   import.
//! - Import is not transactional: a failed step leaves earlier records and
//!   their ledger entries in place.

use crate::files::{FileStoreError, PublicFiles, PUBLIC_SCHEME};
use crate::ledger::{ContentLedger, LedgerError};
use crate::model::entity::{Entity, EntityId, EntityPayload, EntityType};
use crate::model::file::ManagedFile;
use crate::model::node::{FormattedText, ImageRef, Node, NodeBundle};
use crate::model::term::{Term, TAGS_VOCABULARY};
use crate::model::user::{User, ROLE_AUTHOR, ROLE_EDITOR};
use crate::repo::alias_repo::AliasResolver;
use crate::repo::entity_repo::{EntityQuery, EntityStorage, RepoError};
use crate::repo::state_repo::StateStore;
use crate::source::csv_table::{CsvRow, CsvTable};
use crate::source::locator::{
    AssetDir, ContentLocator, ARTICLES_CSV, PAGES_CSV, PRESS_RELEASES_CSV,
};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use uuid::Uuid;

/// Editors have no content of their own, so they are created up front.
pub const EDITORS: [&str; 2] = ["Margaret Hopper", "Grace Hamilton"];

pub type SeedResult<T> = Result<T, SeedError>;

/// One entity group that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub entity_type: EntityType,
    pub message: String,
}

#[derive(Debug)]
pub enum SeedError {
    Repo(RepoError),
    Ledger(LedgerError),
    Files(FileStoreError),
    /// A data row could not be read or lacks a required column.
    MalformedRow {
        file: String,
        line: u64,
        message: String,
    },
    /// A block links to a node that does not exist (yet).
    MissingReference {
        block: &'static str,
        title: &'static str,
    },
    /// Teardown finished with failed groups; `summary` covers what was
    /// deleted anyway.
    DeleteFailed {
        failures: Vec<DeleteFailure>,
        summary: DeleteSummary,
    },
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Ledger(err) => write!(f, "{err}"),
            Self::Files(err) => write!(f, "{err}"),
            Self::MalformedRow {
                file,
                line,
                message,
            } => write!(f, "malformed row in {file} at line {line}: {message}"),
            Self::MissingReference { block, title } => write!(
                f,
                "block `{block}` links to node `{title}`, which does not exist"
            ),
            Self::DeleteFailed { failures, .. } => {
                let types = failures
                    .iter()
                    .map(|failure| failure.entity_type.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "failed to delete seeded content of type(s): {types}")
            }
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Ledger(err) => Some(err),
            Self::Files(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SeedError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<LedgerError> for SeedError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<FileStoreError> for SeedError {
    fn from(value: FileStoreError) -> Self {
        Self::Files(value)
    }
}

/// What to do when one data row fails to import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowErrorPolicy {
    /// Stop the import with the row's error.
    #[default]
    Abort,
    /// Log the error, count the row as skipped and continue.
    Skip,
}

impl FromStr for RowErrorPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!(
                "unsupported row error policy `{other}`; expected abort|skip"
            )),
        }
    }
}

/// Import pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    Editors,
    Articles,
    PressReleases,
    Pages,
    BlockContent,
}

impl ImportStep {
    pub const ALL: [ImportStep; 5] = [
        ImportStep::Editors,
        ImportStep::Articles,
        ImportStep::PressReleases,
        ImportStep::Pages,
        ImportStep::BlockContent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Editors => "editors",
            Self::Articles => "articles",
            Self::PressReleases => "press_releases",
            Self::Pages => "pages",
            Self::BlockContent => "block_content",
        }
    }
}

/// Outcome of one import step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: ImportStep,
    /// Primary records created by the step (users, nodes or blocks).
    pub created: usize,
    /// Rows skipped under `RowErrorPolicy::Skip`.
    pub skipped: usize,
    /// `false` when the step's data file was absent.
    pub source_found: bool,
}

impl StepReport {
    fn new(step: ImportStep) -> Self {
        Self {
            step,
            created: 0,
            skipped: 0,
            source_found: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub steps: Vec<StepReport>,
    /// Newly ledgered entities per type, lazily created ones included.
    pub created: BTreeMap<EntityType, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    pub deleted: BTreeMap<EntityType, usize>,
    /// Ledgered uuids that no longer existed in storage.
    pub missing: usize,
}

/// Result of deleting one ledger group.
struct GroupOutcome {
    deleted: usize,
    missing: usize,
    /// File entities kept because their managed copy could not be removed.
    retained: Vec<(Uuid, FileStoreError)>,
}

enum BodySource {
    Asset(AssetDir),
    Inline,
}

/// Per-bundle CSV import settings.
struct NodeImport {
    step: ImportStep,
    bundle: NodeBundle,
    data_file: &'static str,
    body: BodySource,
    with_tags: bool,
    with_image: bool,
}

const ARTICLE_IMPORT: NodeImport = NodeImport {
    step: ImportStep::Articles,
    bundle: NodeBundle::Article,
    data_file: ARTICLES_CSV,
    body: BodySource::Asset(AssetDir::ArticleBody),
    with_tags: true,
    with_image: true,
};

const PRESS_RELEASE_IMPORT: NodeImport = NodeImport {
    step: ImportStep::PressReleases,
    bundle: NodeBundle::PressRelease,
    data_file: PRESS_RELEASES_CSV,
    body: BodySource::Asset(AssetDir::PressReleaseBody),
    with_tags: false,
    with_image: false,
};

const PAGE_IMPORT: NodeImport = NodeImport {
    step: ImportStep::Pages,
    bundle: NodeBundle::Page,
    data_file: PAGES_CSV,
    body: BodySource::Inline,
    with_tags: false,
    with_image: false,
};

/// Seeds demo content into entity storage and removes it again.
pub struct ContentSeeder<E: EntityStorage, A: AliasResolver, S: StateStore> {
    pub(crate) storage: E,
    pub(crate) aliases: A,
    pub(crate) ledger: ContentLedger<S>,
    pub(crate) locator: ContentLocator,
    pub(crate) files: PublicFiles,
    row_error_policy: RowErrorPolicy,
}

impl<E: EntityStorage, A: AliasResolver, S: StateStore> ContentSeeder<E, A, S> {
    pub fn new(
        storage: E,
        aliases: A,
        ledger: ContentLedger<S>,
        locator: ContentLocator,
        files: PublicFiles,
    ) -> Self {
        Self {
            storage,
            aliases,
            ledger,
            locator,
            files,
            row_error_policy: RowErrorPolicy::default(),
        }
    }

    pub fn with_row_error_policy(mut self, policy: RowErrorPolicy) -> Self {
        self.row_error_policy = policy;
        self
    }

    pub fn ledger(&self) -> &ContentLedger<S> {
        &self.ledger
    }

    /// Runs every import step in order, stopping at the first failure.
    pub fn import_content(&self) -> SeedResult<ImportSummary> {
        let started_at = Instant::now();
        info!(
            "event=import_content module=seeder status=start content_root={}",
            self.locator.root().display()
        );
        let before = self.ledger.counts()?;

        let mut steps = Vec::with_capacity(ImportStep::ALL.len());
        for step in ImportStep::ALL {
            let report = self.run_step(step).map_err(|err| {
                error!(
                    "event=import_step module=seeder status=error step={} error={}",
                    step.as_str(),
                    err
                );
                err
            })?;
            info!(
                "event=import_step module=seeder status=ok step={} created={} skipped={} source_found={}",
                step.as_str(),
                report.created,
                report.skipped,
                report.source_found
            );
            steps.push(report);
        }

        let created = self
            .ledger
            .counts()?
            .into_iter()
            .filter_map(|(entity_type, count)| {
                let previous = before.get(&entity_type).copied().unwrap_or(0);
                (count > previous).then(|| (entity_type, count - previous))
            })
            .collect();

        info!(
            "event=import_content module=seeder status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(ImportSummary { steps, created })
    }

    fn run_step(&self, step: ImportStep) -> SeedResult<StepReport> {
        match step {
            ImportStep::Editors => self.import_editors(),
            ImportStep::Articles => self.import_articles(),
            ImportStep::PressReleases => self.import_press_releases(),
            ImportStep::Pages => self.import_pages(),
            ImportStep::BlockContent => self.import_block_content(),
        }
    }

    /// Creates the fixed editor accounts.
    pub fn import_editors(&self) -> SeedResult<StepReport> {
        let mut report = StepReport::new(ImportStep::Editors);
        for name in EDITORS {
            let mut entity = Entity::new(User::new(name, ROLE_EDITOR));
            self.storage.save(&mut entity)?;
            self.ledger.record([(entity.uuid, EntityType::User)])?;
            report.created += 1;
        }
        Ok(report)
    }

    pub fn import_articles(&self) -> SeedResult<StepReport> {
        self.import_nodes(&ARTICLE_IMPORT)
    }

    pub fn import_press_releases(&self) -> SeedResult<StepReport> {
        self.import_nodes(&PRESS_RELEASE_IMPORT)
    }

    pub fn import_pages(&self) -> SeedResult<StepReport> {
        self.import_nodes(&PAGE_IMPORT)
    }

    fn import_nodes(&self, import: &NodeImport) -> SeedResult<StepReport> {
        let mut report = StepReport::new(import.step);
        let path = self.locator.data_file(import.data_file);
        let Some(mut table) = CsvTable::open(&path) else {
            report.source_found = false;
            return Ok(report);
        };

        let mut created = Vec::new();
        let mut outcome = Ok(());
        for row in table.rows() {
            let result = row
                .map_err(|err| SeedError::MalformedRow {
                    file: import.data_file.to_string(),
                    line: err.line,
                    message: err.message,
                })
                .and_then(|row| self.create_node(import, &row));

            match result {
                Ok(uuid) => created.push(uuid),
                Err(err) if self.row_error_policy == RowErrorPolicy::Skip => {
                    warn!(
                        "event=import_row module=seeder status=skip step={} error={}",
                        import.step.as_str(),
                        err
                    );
                    report.skipped += 1;
                }
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }

        report.created = created.len();
        self.ledger
            .record(created.into_iter().map(|uuid| (uuid, EntityType::Node)))?;
        outcome.map(|()| report)
    }

    fn create_node(&self, import: &NodeImport, row: &CsvRow) -> SeedResult<Uuid> {
        let node = self.map_row(import, row)?;
        let mut entity = Entity::new(node);
        self.storage.save(&mut entity)?;
        debug!(
            "event=node_create module=seeder status=ok bundle={} uuid={}",
            import.bundle.as_str(),
            entity.uuid
        );
        Ok(entity.uuid)
    }

    /// Maps one data row onto a node of the import's bundle.
    fn map_row(&self, import: &NodeImport, row: &CsvRow) -> SeedResult<Node> {
        let title = row.get("title").ok_or_else(|| SeedError::MalformedRow {
            file: import.data_file.to_string(),
            line: row.line,
            message: "missing title".to_string(),
        })?;
        let mut node = Node::new(import.bundle, title);

        if let Some(body) = row.get("body") {
            node.body = match import.body {
                BodySource::Inline => Some(FormattedText::basic_html(body)),
                BodySource::Asset(dir) => self
                    .read_asset(&self.locator.asset(dir, body))
                    .map(FormattedText::basic_html),
            };
        }

        if let Some(slug) = row.get("slug") {
            node.set_slug(slug);
        }

        if import.with_tags {
            if let Some(tags) = row.get("tags") {
                for name in tags.split(',').filter(|name| !name.trim().is_empty()) {
                    node.tags.push(self.get_term(name, TAGS_VOCABULARY)?);
                }
            }
        }

        if let Some(author) = row.get("author") {
            node.uid = Some(self.get_user(author)?);
        }

        if import.with_image {
            if let Some(image) = row.get("image") {
                let path = self.locator.asset(AssetDir::Images, image);
                if let Some(target_id) = self.create_file_entity(&path)? {
                    node.image = Some(ImageRef {
                        target_id,
                        alt: row.raw("alt").unwrap_or_default().to_string(),
                    });
                }
            }
        }

        if let Some(state) = row.get("state") {
            node.moderation_state = state.to_string();
        }

        Ok(node)
    }

    fn read_asset(&self, path: &Path) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Some(contents),
            Err(err) => {
                warn!(
                    "event=asset_read module=seeder status=skip path={} error={}",
                    path.display(),
                    err
                );
                None
            }
        }
    }

    /// Looks a user up by exact name, creating an author account if absent.
    pub fn get_user(&self, name: &str) -> SeedResult<EntityId> {
        let existing = self
            .storage
            .load_by_properties(EntityType::User, &EntityQuery::by_label(name))?;
        if let Some(id) = existing.first().and_then(|user| user.id) {
            return Ok(id);
        }

        let mut entity = Entity::new(User::new(name, ROLE_AUTHOR));
        let id = self.storage.save(&mut entity)?;
        self.ledger.record([(entity.uuid, EntityType::User)])?;
        debug!("event=user_create module=seeder status=ok id={id}");
        Ok(id)
    }

    /// Looks a term up by trimmed name within `vid`, creating it if absent.
    pub fn get_term(&self, name: &str, vid: &str) -> SeedResult<EntityId> {
        let name = name.trim();
        let query = EntityQuery::by_label(name).in_bundle(vid);
        let existing = self
            .storage
            .load_by_properties(EntityType::TaxonomyTerm, &query)?;
        if let Some(id) = existing.first().and_then(|term| term.id) {
            return Ok(id);
        }

        let mut entity = Entity::new(Term::new(name, vid));
        let id = self.storage.save(&mut entity)?;
        self.ledger.record([(entity.uuid, EntityType::TaxonomyTerm)])?;
        debug!("event=term_create module=seeder status=ok vid={vid} id={id}");
        Ok(id)
    }

    /// Copies `path` into public files and wraps it in a file entity.
    ///
    /// Returns `Ok(None)` when the source file does not exist.
    pub fn create_file_entity(&self, path: &Path) -> SeedResult<Option<EntityId>> {
        let Some(uri) = self.files.copy_replace(path)? else {
            return Ok(None);
        };
        let filename = uri.strip_prefix(PUBLIC_SCHEME).unwrap_or(&uri).to_string();

        let mut entity = Entity::new(ManagedFile::permanent(uri, filename));
        let id = self.storage.save(&mut entity)?;
        self.ledger.record([(entity.uuid, EntityType::File)])?;
        Ok(Some(id))
    }

    /// Deletes everything the ledger lists, one entity type at a time.
    ///
    /// Every group is attempted. Deleted uuids leave the ledger; once all
    /// groups succeed the ledger key is gone. A file entity whose managed
    /// copy cannot be removed stays both stored and ledgered.
    pub fn delete_imported_content(&self) -> SeedResult<DeleteSummary> {
        let started_at = Instant::now();
        info!("event=delete_content module=seeder status=start");

        let mut summary = DeleteSummary::default();
        let mut failures = Vec::new();
        for (entity_type, uuids) in self.ledger.grouped()? {
            let outcome = match self.delete_group(entity_type, &uuids) {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(
                        "event=delete_group module=seeder status=error entity_type={entity_type} error={err}"
                    );
                    failures.push(DeleteFailure {
                        entity_type,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            summary.missing += outcome.missing;
            summary.deleted.insert(entity_type, outcome.deleted);

            let forgotten: Vec<Uuid> = uuids
                .iter()
                .copied()
                .filter(|uuid| !outcome.retained.iter().any(|(kept, _)| kept == uuid))
                .collect();
            if let Err(err) = self.ledger.forget(&forgotten) {
                error!(
                    "event=ledger_forget module=seeder status=error entity_type={entity_type} error={err}"
                );
                failures.push(DeleteFailure {
                    entity_type,
                    message: format!("deleted but still ledgered: {err}"),
                });
            }

            if let Some((_, err)) = outcome.retained.first() {
                failures.push(DeleteFailure {
                    entity_type,
                    message: format!(
                        "{} managed file(s) could not be removed: {err}",
                        outcome.retained.len()
                    ),
                });
            }

            info!(
                "event=delete_group module=seeder status=ok entity_type={entity_type} deleted={} retained={}",
                outcome.deleted,
                outcome.retained.len()
            );
        }

        if !failures.is_empty() {
            return Err(SeedError::DeleteFailed { failures, summary });
        }

        self.ledger.clear()?;
        info!(
            "event=delete_content module=seeder status=ok duration_ms={} missing={}",
            started_at.elapsed().as_millis(),
            summary.missing
        );
        Ok(summary)
    }

    /// Removes managed copies first so a failed removal keeps its entity.
    fn delete_group(&self, entity_type: EntityType, uuids: &[Uuid]) -> SeedResult<GroupOutcome> {
        let entities = self.storage.load_by_properties(
            entity_type,
            &EntityQuery::by_uuids(uuids.iter().copied()),
        )?;
        let missing = uuids.len().saturating_sub(entities.len());

        let mut removable = Vec::with_capacity(entities.len());
        let mut retained = Vec::new();
        for entity in entities {
            let removal = match &entity.payload {
                EntityPayload::File(file) => self.files.remove(&file.uri),
                _ => Ok(()),
            };
            match removal {
                Ok(()) => removable.push(entity),
                Err(err) => {
                    warn!(
                        "event=file_remove module=seeder status=error uuid={} error={}",
                        entity.uuid, err
                    );
                    retained.push((entity.uuid, err));
                }
            }
        }

        let deleted = self.storage.delete(entity_type, &removable)?;
        Ok(GroupOutcome {
            deleted,
            missing,
            retained,
        })
    }
}
