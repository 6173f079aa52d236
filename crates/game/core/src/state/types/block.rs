//! Context blocks: the placeable units packed onto the grid.

use serde::{Deserialize, Serialize};

/// Category of information a block carries.
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
pub enum ContextBlockKind {
    Narrative,
    System,
    User,
    Tool,
    Memory,
    /// Fallback kind for free-form reference material.
    #[default]
    Reference,
}

/// Free-form label attached to blocks and tickets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A unit of simulated information with size and quality attributes.
///
/// Blocks are immutable once placed; the engine only ever appends or removes
/// them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContextBlockKind,
    pub content: String,
    /// Width in grid cells.
    pub width: u32,
    /// Height in grid cells.
    pub height: u32,
    /// Quality in `[0, 1]`.
    pub fidelity: f64,
    /// Degradation in `[0, 1]`.
    pub noise: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_estimate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ContextBlock {
    /// Creates a 1x1 block with full fidelity and no noise.
    pub fn new(id: impl Into<String>, kind: ContextBlockKind, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
            width: 1,
            height: 1,
            fidelity: 1.0,
            noise: 0.0,
            tags: Vec::new(),
            token_estimate: None,
            source: None,
            created_at: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_quality(mut self, fidelity: f64, noise: f64) -> Self {
        self.fidelity = fidelity;
        self.noise = noise;
        self
    }

    #[must_use]
    pub fn with_token_estimate(mut self, tokens: u32) -> Self {
        self.token_estimate = Some(tokens);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: Option<String>) -> Self {
        self.created_at = created_at;
        self
    }
}
