//! Authored record shapes as they appear in the RON files.

use std::collections::BTreeMap;

use quest_core::{
    ContextBlock, ModelSpec, Tag, Ticket, ToolDefinition, ToolSchema, ToolSchemaField, Upgrade,
    UpgradeEffect,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, parse_tag};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl From<TagRecord> for Tag {
    fn from(record: TagRecord) -> Self {
        Tag {
            id: record.id,
            label: record.label,
            color: record.color,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: String,
    pub provider: String,
    pub name: String,
    #[serde(default)]
    pub context_window: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
}

impl ModelRecord {
    pub fn resolve(self) -> LoadResult<ModelSpec> {
        Ok(ModelSpec {
            provider: parse_tag("model provider", &self.provider)?,
            id: self.id,
            name: self.name,
            context_window: self.context_window,
            temperature: self.temperature,
            top_p: self.top_p,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaRecord {
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl SchemaRecord {
    pub fn resolve(self) -> LoadResult<ToolSchema> {
        let mut properties = BTreeMap::new();
        for field in self.fields {
            let schema_field = ToolSchemaField {
                field_type: parse_tag("schema field type", &field.kind)?,
                description: field.description,
                ..ToolSchemaField::default()
            };
            properties.insert(field.name, schema_field);
        }
        Ok(ToolSchema {
            properties,
            required: self.required,
            ..ToolSchema::empty()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input: Option<SchemaRecord>,
    #[serde(default)]
    pub output: SchemaRecord,
}

impl ToolRecord {
    pub fn resolve(self) -> LoadResult<ToolDefinition> {
        Ok(ToolDefinition {
            input_schema: self.input.map(SchemaRecord::resolve).transpose()?,
            output_schema: self.output.resolve()?,
            id: self.id,
            name: self.name,
            description: self.description,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: String,
    pub kind: String,
    pub content: String,
    #[serde(default = "BlockRecord::unit")]
    pub width: u32,
    #[serde(default = "BlockRecord::unit")]
    pub height: u32,
    #[serde(default = "BlockRecord::full")]
    pub fidelity: f64,
    #[serde(default)]
    pub noise: f64,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
    #[serde(default)]
    pub token_estimate: Option<u32>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl BlockRecord {
    fn unit() -> u32 {
        1
    }

    fn full() -> f64 {
        1.0
    }

    pub fn resolve(self) -> LoadResult<ContextBlock> {
        let mut block = ContextBlock::new(
            self.id,
            parse_tag("block kind", &self.kind)?,
            self.content,
        )
        .with_size(self.width, self.height)
        .with_quality(self.fidelity, self.noise)
        .with_created_at(self.created_at);
        block.tags = self.tags.into_iter().map(Tag::from).collect();
        block.token_estimate = self.token_estimate;
        block.source = self.source;
        Ok(block)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl TicketRecord {
    pub fn resolve(self) -> LoadResult<Ticket> {
        Ok(Ticket {
            status: parse_tag("ticket status", &self.status)?,
            stage: self
                .stage
                .as_deref()
                .map(|stage| parse_tag("quest stage", stage))
                .transpose()?,
            id: self.id,
            title: self.title,
            description: self.description,
            tags: self.tags.into_iter().map(Tag::from).collect(),
            blocks: Vec::new(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectRecord {
    pub id: String,
    pub description: String,
    pub modifier: f64,
    pub target: String,
}

impl EffectRecord {
    pub fn resolve(self) -> LoadResult<UpgradeEffect> {
        Ok(UpgradeEffect {
            target: parse_tag("upgrade target", &self.target)?,
            id: self.id,
            description: self.description,
            modifier: self.modifier,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cost: u64,
    #[serde(default)]
    pub effects: Vec<EffectRecord>,
}

impl UpgradeRecord {
    pub fn resolve(self) -> LoadResult<Upgrade> {
        Ok(Upgrade {
            effects: self
                .effects
                .into_iter()
                .map(EffectRecord::resolve)
                .collect::<LoadResult<_>>()?,
            id: self.id,
            name: self.name,
            description: self.description,
            cost: self.cost,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub upgrades: Vec<UpgradeRecord>,
}

/// Variant with its model and tools referenced by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: String,
    pub model: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

// ===== file roots =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsFile {
    pub models: Vec<ModelRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsFile {
    pub tools: Vec<ToolRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocksFile {
    pub blocks: Vec<BlockRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketsFile {
    pub tickets: Vec<TicketRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradesFile {
    pub tracks: Vec<TrackRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantsFile {
    pub variants: BTreeMap<String, Vec<VariantRecord>>,
}
