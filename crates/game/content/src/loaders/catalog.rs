//! Catalog loader: tickets, models, tools, blocks, upgrade tracks, variants.

use std::collections::BTreeMap;
use std::path::Path;

use quest_core::{
    ContextBlock, ModelSpec, Ticket, ToolDefinition, Upgrade, UpgradeCatalogItem, Variant,
};
use serde::de::DeserializeOwned;

use crate::loaders::records::{
    BlocksFile, ModelsFile, TicketsFile, ToolsFile, TrackRecord, UpgradesFile, VariantRecord,
    VariantsFile,
};
use crate::loaders::{LoadResult, parse_tag, read_file};

/// A themed group of upgrades offered together in the shop.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeTrack {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub upgrades: Vec<Upgrade>,
}

impl UpgradeTrack {
    fn resolve(record: TrackRecord) -> LoadResult<Self> {
        Ok(Self {
            upgrades: record
                .upgrades
                .into_iter()
                .map(|upgrade| upgrade.resolve())
                .collect::<LoadResult<_>>()?,
            id: record.id,
            name: record.name,
            description: record.description,
        })
    }

    /// Shop entries for this track, tagged with the track name.
    pub fn catalog_items(&self) -> impl Iterator<Item = UpgradeCatalogItem> + '_ {
        self.upgrades
            .iter()
            .map(|upgrade| UpgradeCatalogItem::from_upgrade(upgrade, &self.name))
    }
}

/// Every piece of static content a session starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub tickets: Vec<Ticket>,
    pub models: Vec<ModelSpec>,
    pub tools: Vec<ToolDefinition>,
    pub blocks: Vec<ContextBlock>,
    pub upgrade_tracks: Vec<UpgradeTrack>,
    /// Two variants per ticket id.
    pub ticket_variants: BTreeMap<String, Vec<Variant>>,
}

impl Catalog {
    pub fn model(&self, model_id: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|model| model.id == model_id)
    }

    pub fn tool(&self, tool_id: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|tool| tool.id == tool_id)
    }

    /// Variants offered for `ticket_id`; empty when the ticket has none.
    pub fn variants_for(&self, ticket_id: &str) -> &[Variant] {
        self.ticket_variants
            .get(ticket_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Flattened shop catalog across all tracks, in track order.
    pub fn upgrade_catalog(&self) -> Vec<UpgradeCatalogItem> {
        self.upgrade_tracks
            .iter()
            .flat_map(UpgradeTrack::catalog_items)
            .collect()
    }

    fn resolve_variant(&self, record: VariantRecord) -> LoadResult<Variant> {
        let model = self.model(&record.model).cloned().ok_or_else(|| {
            anyhow::anyhow!(
                "Variant {} references unknown model {}",
                record.id,
                record.model
            )
        })?;
        let tools = record
            .tools
            .iter()
            .map(|tool_id| {
                self.tool(tool_id).cloned().ok_or_else(|| {
                    anyhow::anyhow!("Variant {} references unknown tool {}", record.id, tool_id)
                })
            })
            .collect::<LoadResult<_>>()?;
        Ok(Variant {
            kind: parse_tag("variant type", &record.kind)?,
            id: record.id,
            name: record.name,
            description: record.description,
            model,
            tools,
            upgrades: Vec::new(),
        })
    }
}

/// Raw RON sources for each catalog file.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSources<'a> {
    pub tickets: &'a str,
    pub models: &'a str,
    pub tools: &'a str,
    pub blocks: &'a str,
    pub upgrades: &'a str,
    pub variants: &'a str,
}

/// Loader for the catalog from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    pub const TICKETS_FILE: &'static str = "tickets.ron";
    pub const MODELS_FILE: &'static str = "models.ron";
    pub const TOOLS_FILE: &'static str = "tools.ron";
    pub const BLOCKS_FILE: &'static str = "blocks.ron";
    pub const UPGRADES_FILE: &'static str = "upgrades.ron";
    pub const VARIANTS_FILE: &'static str = "variants.ron";

    /// Load the catalog from the six RON files in `dir`.
    pub fn load(dir: &Path) -> LoadResult<Catalog> {
        let tickets = read_file(&dir.join(Self::TICKETS_FILE))?;
        let models = read_file(&dir.join(Self::MODELS_FILE))?;
        let tools = read_file(&dir.join(Self::TOOLS_FILE))?;
        let blocks = read_file(&dir.join(Self::BLOCKS_FILE))?;
        let upgrades = read_file(&dir.join(Self::UPGRADES_FILE))?;
        let variants = read_file(&dir.join(Self::VARIANTS_FILE))?;

        Self::parse(CatalogSources {
            tickets: &tickets,
            models: &models,
            tools: &tools,
            blocks: &blocks,
            upgrades: &upgrades,
            variants: &variants,
        })
    }

    /// Parse and resolve a catalog from in-memory RON sources.
    pub fn parse(sources: CatalogSources<'_>) -> LoadResult<Catalog> {
        let tickets: TicketsFile = parse_ron(Self::TICKETS_FILE, sources.tickets)?;
        let models: ModelsFile = parse_ron(Self::MODELS_FILE, sources.models)?;
        let tools: ToolsFile = parse_ron(Self::TOOLS_FILE, sources.tools)?;
        let blocks: BlocksFile = parse_ron(Self::BLOCKS_FILE, sources.blocks)?;
        let upgrades: UpgradesFile = parse_ron(Self::UPGRADES_FILE, sources.upgrades)?;
        let variants: VariantsFile = parse_ron(Self::VARIANTS_FILE, sources.variants)?;

        let mut catalog = Catalog {
            tickets: tickets
                .tickets
                .into_iter()
                .map(|ticket| ticket.resolve())
                .collect::<LoadResult<_>>()?,
            models: models
                .models
                .into_iter()
                .map(|model| model.resolve())
                .collect::<LoadResult<_>>()?,
            tools: tools
                .tools
                .into_iter()
                .map(|tool| tool.resolve())
                .collect::<LoadResult<_>>()?,
            blocks: blocks
                .blocks
                .into_iter()
                .map(|block| block.resolve())
                .collect::<LoadResult<_>>()?,
            upgrade_tracks: upgrades
                .tracks
                .into_iter()
                .map(UpgradeTrack::resolve)
                .collect::<LoadResult<_>>()?,
            ticket_variants: BTreeMap::new(),
        };

        for (ticket_id, records) in variants.variants {
            let resolved = records
                .into_iter()
                .map(|record| catalog.resolve_variant(record))
                .collect::<LoadResult<Vec<_>>>()?;
            catalog.ticket_variants.insert(ticket_id, resolved);
        }

        Ok(catalog)
    }
}

fn parse_ron<T: DeserializeOwned>(file: &str, content: &str) -> LoadResult<T> {
    ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", file, e))
}
