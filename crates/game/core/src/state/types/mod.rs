pub mod block;
pub mod catalog;

// Re-export block types
pub use block::{ContextBlock, ContextBlockKind, Tag};

// Re-export catalog records
pub use catalog::{
    ModelProvider, ModelSpec, QuestStage, SchemaFieldType, Ticket, TicketStatus, ToolDefinition,
    ToolSchema, ToolSchemaField, Upgrade, UpgradeCatalogItem, UpgradeEffect, UpgradeTarget,
    Variant, VariantType,
};
