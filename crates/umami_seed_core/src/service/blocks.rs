//! Fixed block content instances.
//!
//! Two of the blocks link to nodes created by the CSV steps, so this step
//! runs last and fails when a linked node is missing.

use crate::model::block_content::{BlockContent, BlockField};
use crate::model::entity::{Entity, EntityType};
use crate::model::node::FormattedText;
use crate::repo::alias_repo::AliasResolver;
use crate::repo::entity_repo::{EntityQuery, EntityStorage};
use crate::repo::state_repo::StateStore;
use crate::service::seeder::{ContentSeeder, ImportStep, SeedError, SeedResult, StepReport};
use crate::source::locator::AssetDir;
use log::debug;
use uuid::{uuid, Uuid};

pub const RECIPES_BANNER_UUID: Uuid = uuid!("4c7d58a3-a45d-412d-9068-259c57e40541");
pub const DISCLAIMER_UUID: Uuid = uuid!("9b4dcd67-99f3-48d0-93c9-2c46648b29de");
pub const FOOTER_PROMO_UUID: Uuid = uuid!("924ab293-8f5f-45a1-9c7f-2423ae61a241");

/// Node the recipes banner links to.
pub const BANNER_LINK_TITLE: &str = "Dynamic intellectual capital";
/// Node the footer promo links to.
pub const FOOTER_PROMO_LINK_TITLE: &str = "About Bread & Butter";

const SUMMARY: &str =
    "Simplify your operations by combining point of sale, capital and payroll all in one place.";

impl<E: EntityStorage, A: AliasResolver, S: StateStore> ContentSeeder<E, A, S> {
    /// Creates the banner, disclaimer and footer promo blocks.
    pub fn import_block_content(&self) -> SeedResult<StepReport> {
        let blocks = [
            self.recipes_banner()?,
            Self::disclaimer(),
            self.footer_promo()?,
        ];

        let mut report = StepReport {
            step: ImportStep::BlockContent,
            created: 0,
            skipped: 0,
            source_found: true,
        };
        for mut entity in blocks {
            self.storage.save(&mut entity)?;
            self.ledger.record([(entity.uuid, EntityType::BlockContent)])?;
            debug!(
                "event=block_create module=seeder status=ok uuid={} info={}",
                entity.uuid,
                entity.label()
            );
            report.created += 1;
        }
        Ok(report)
    }

    fn recipes_banner(&self) -> SeedResult<Entity> {
        let link = self.internal_link("umami_recipes_banner", BANNER_LINK_TITLE)?;
        let mut block = BlockContent::new("B&B Banner", "banner_block")
            .with_field(
                "field_title",
                BlockField::Text(FormattedText::plain(
                    "Spend less time on operations, more time on your business",
                )),
            )
            .with_field(
                "field_content_link",
                BlockField::Link {
                    uri: link,
                    title: "Find your solution today".to_string(),
                },
            )
            .with_field(
                "field_summary",
                BlockField::Text(FormattedText::plain(format!(
                    "{SUMMARY} Find your solution today."
                ))),
            );

        let image = self.locator.asset(AssetDir::Images, "banner.jpg");
        if let Some(target_id) = self.create_file_entity(&image)? {
            block = block.with_field(
                "field_banner_image",
                BlockField::Image {
                    target_id,
                    alt: SUMMARY.trim_end_matches('.').to_string(),
                },
            );
        }

        Ok(Entity::with_uuid(RECIPES_BANNER_UUID, block))
    }

    fn disclaimer() -> Entity {
        let block = BlockContent::new("B&B disclaimer", "disclaimer_block")
            .with_field(
                "field_disclaimer",
                BlockField::Text(FormattedText::basic_html(
                    "<strong>Bread & Butter</strong> is a fictional organization for illustrative purposes only.",
                )),
            )
            .with_field(
                "field_copyright",
                BlockField::Text(FormattedText::basic_html(
                    "&copy; 2018 Terms & Conditions",
                )),
            );
        Entity::with_uuid(DISCLAIMER_UUID, block)
    }

    fn footer_promo(&self) -> SeedResult<Entity> {
        let link = self.internal_link("umami_footer_promo", FOOTER_PROMO_LINK_TITLE)?;
        let mut block = BlockContent::new("B&B footer promo", "footer_promo_block")
            .with_field(
                "field_title",
                BlockField::Text(FormattedText::plain("Bread & Butter")),
            )
            .with_field("field_summary", BlockField::Text(FormattedText::plain(SUMMARY)))
            .with_field(
                "field_content_link",
                BlockField::Link {
                    uri: link,
                    title: "Find your solution".to_string(),
                },
            );

        let image = self
            .locator
            .asset(AssetDir::Images, "bread_butter_logowhite.png");
        if let Some(target_id) = self.create_file_entity(&image)? {
            block = block.with_field(
                "field_promo_image",
                BlockField::Image {
                    target_id,
                    alt: "B&B - Find your solution".to_string(),
                },
            );
        }

        Ok(Entity::with_uuid(FOOTER_PROMO_UUID, block))
    }

    /// Builds `internal:<alias>` for the first node titled `title`.
    fn internal_link(&self, block: &'static str, title: &'static str) -> SeedResult<String> {
        let missing = || SeedError::MissingReference { block, title };
        let nodes = self
            .storage
            .load_by_properties(EntityType::Node, &EntityQuery::by_label(title))?;
        let path = nodes
            .first()
            .and_then(Entity::internal_path)
            .ok_or_else(missing)?;
        let alias = self.aliases.alias_by_path(&path)?;
        Ok(format!("internal:{alias}"))
    }
}
