//! Catalog records carried in engine state.
//!
//! Tickets, models, tools and upgrades are authored as static content and
//! copied into [`EngineState`](crate::EngineState) at session start. The
//! engine reads them to validate actions but never edits them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::block::{ContextBlock, Tag};

// ============================================================================
// Tickets
// ============================================================================

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TicketStatus {
    #[default]
    New,
    InProgress,
    Blocked,
    Completed,
    Archived,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum QuestStage {
    #[default]
    Backlog,
    Planning,
    Execution,
    Review,
    Completed,
}

/// A unit of work the player picks before starting a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<QuestStage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<ContextBlock>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

// ============================================================================
// Models
// ============================================================================

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ModelProvider {
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
    Anthropic,
    Google,
    #[default]
    Custom,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSpec {
    pub id: String,
    pub provider: ModelProvider,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

impl ModelSpec {
    /// Builds a bare custom-provider model whose name equals its id.
    pub fn custom(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            provider: ModelProvider::Custom,
            context_window: None,
            temperature: None,
            top_p: None,
        }
    }
}

// ============================================================================
// Tools
// ============================================================================

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SchemaFieldType {
    #[default]
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolSchemaField {
    #[serde(rename = "type")]
    pub field_type: SchemaFieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, ToolSchemaField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ToolSchemaField>>,
}

/// Object schema describing a tool's input or output record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Always `"object"`.
    #[serde(rename = "type", default = "ToolSchema::object_type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, ToolSchemaField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ToolSchema {
    fn object_type() -> String {
        "object".to_string()
    }

    /// An object schema with no properties.
    pub fn empty() -> Self {
        Self {
            schema_type: Self::object_type(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }
}

impl Default for ToolSchema {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<ToolSchema>,
    #[serde(default)]
    pub output_schema: ToolSchema,
}

impl ToolDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            input_schema: None,
            output_schema: ToolSchema::empty(),
        }
    }
}

// ============================================================================
// Upgrades
// ============================================================================

/// Economy or config field an upgrade effect adjusts.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UpgradeTarget {
    TokenBudget,
    Latency,
    Accuracy,
    Cost,
    ContextQuality,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeEffect {
    pub id: String,
    pub description: String,
    /// Fractional change, e.g. `0.15` for +15%.
    pub modifier: f64,
    pub target: UpgradeTarget,
}

/// Upgrade as authored in a track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cost: u64,
    pub effects: Vec<UpgradeEffect>,
}

/// Upgrade as offered in the shop, tagged with the track it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeCatalogItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cost: u64,
    pub tag: String,
    pub effects: Vec<UpgradeEffect>,
}

impl UpgradeCatalogItem {
    /// Flattens an authored upgrade into a shop entry for `track_name`.
    pub fn from_upgrade(upgrade: &Upgrade, track_name: &str) -> Self {
        Self {
            id: upgrade.id.clone(),
            title: upgrade.name.clone(),
            description: upgrade.description.clone().unwrap_or_default(),
            cost: upgrade.cost,
            tag: track_name.to_string(),
            effects: upgrade.effects.clone(),
        }
    }
}

// ============================================================================
// Variants
// ============================================================================

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum VariantType {
    #[default]
    Baseline,
    Experimental,
    Production,
}

/// One of the two configurations (model + tools) offered for a ticket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: VariantType,
    pub model: ModelSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upgrades: Vec<Upgrade>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&ModelProvider::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
        assert_eq!("openai".parse::<ModelProvider>().unwrap(), ModelProvider::OpenAi);
    }

    #[test]
    fn tool_definition_defaults_output_schema() {
        let tool: ToolDefinition =
            serde_json::from_str(r#"{"id":"tool-x","name":"x"}"#).unwrap();
        assert_eq!(tool.output_schema, ToolSchema::empty());
        assert!(tool.input_schema.is_none());
    }

    #[test]
    fn catalog_item_takes_track_name_as_tag() {
        let upgrade = Upgrade {
            id: "upgrade-1".into(),
            name: "Token Cache".into(),
            description: None,
            cost: 120,
            effects: Vec::new(),
        };
        let item = UpgradeCatalogItem::from_upgrade(&upgrade, "Throughput Boost");

        assert_eq!(item.title, "Token Cache");
        assert_eq!(item.tag, "Throughput Boost");
        assert_eq!(item.description, "");
    }
}
