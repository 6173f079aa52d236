//! First-fit grid packing with optional lossy compression.
//!
//! Blocks are placed in input order; earlier blocks win contested cells. The
//! packer is independent of [`EngineState`](crate::EngineState) so hosts can
//! preview layouts before dispatching `place_block` actions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::{ContextBlock, GridPosition};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub rows: i32,
    pub columns: i32,
}

impl GridDimensions {
    pub const fn new(rows: i32, columns: i32) -> Self {
        Self { rows, columns }
    }
}

/// Minimal block shape the packer needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridBlock {
    pub id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fidelity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<f64>,
}

impl GridBlock {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            fidelity: None,
            noise: None,
        }
    }

    #[must_use]
    pub fn with_quality(mut self, fidelity: f64, noise: f64) -> Self {
        self.fidelity = Some(fidelity);
        self.noise = Some(noise);
        self
    }
}

impl From<&ContextBlock> for GridBlock {
    fn from(block: &ContextBlock) -> Self {
        Self {
            id: block.id.clone(),
            width: block.width,
            height: block.height,
            fidelity: Some(block.fidelity),
            noise: Some(block.noise),
        }
    }
}

/// Shrinks blocks at the cost of fidelity and added noise.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionOptions {
    #[serde(default)]
    pub enabled: bool,
    /// Dimension multiplier, clamped to `[0.1, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fidelity_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_increase: Option<f64>,
}

impl CompressionOptions {
    pub const MIN_SCALE: f64 = 0.1;

    pub fn enabled(size_scale: f64, fidelity_loss: f64, noise_increase: f64) -> Self {
        Self {
            enabled: true,
            size_scale: Some(size_scale),
            fidelity_loss: Some(fidelity_loss),
            noise_increase: Some(noise_increase),
        }
    }
}

/// A block after compression, with its placement if it fit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedBlock {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub fidelity: f64,
    pub noise: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<GridPosition>,
    pub effective_width: u32,
    pub effective_height: u32,
    pub compressed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackResult {
    pub placements: BTreeMap<String, GridPosition>,
    /// One entry per input block, in input order.
    pub packed_blocks: Vec<PackedBlock>,
    /// Ids of blocks that could not be placed, in input order.
    pub overflow: Vec<String>,
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn scaled(dimension: u32, scale: f64) -> u32 {
    ((f64::from(dimension) * scale).round() as u32).max(1)
}

fn compress(block: &GridBlock, options: Option<&CompressionOptions>) -> PackedBlock {
    let fidelity = clamp_unit(block.fidelity.unwrap_or(1.0));
    let noise = clamp_unit(block.noise.unwrap_or(0.0));

    let mut packed = PackedBlock {
        id: block.id.clone(),
        width: block.width,
        height: block.height,
        fidelity,
        noise,
        position: None,
        effective_width: block.width,
        effective_height: block.height,
        compressed: false,
    };

    let Some(options) = options.filter(|options| options.enabled) else {
        return packed;
    };

    let scale = options
        .size_scale
        .unwrap_or(1.0)
        .clamp(CompressionOptions::MIN_SCALE, 1.0);
    let loss = clamp_unit(options.fidelity_loss.unwrap_or(0.0));
    let increase = clamp_unit(options.noise_increase.unwrap_or(0.0));

    packed.fidelity = clamp_unit(fidelity - loss);
    packed.noise = clamp_unit(noise + increase);
    packed.effective_width = scaled(block.width, scale);
    packed.effective_height = scaled(block.height, scale);
    packed.compressed = true;
    packed
}

/// Row-major cell ownership for a single packing pass.
struct Occupancy {
    rows: usize,
    columns: usize,
    cells: Vec<bool>,
}

impl Occupancy {
    fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![false; rows * columns],
        }
    }

    fn is_free(&self, row: usize, column: usize, width: usize, height: usize) -> bool {
        if row + height > self.rows || column + width > self.columns {
            return false;
        }
        (row..row + height).all(|r| {
            (column..column + width).all(|c| !self.cells[r * self.columns + c])
        })
    }

    fn occupy(&mut self, row: usize, column: usize, width: usize, height: usize) {
        for r in row..row + height {
            for c in column..column + width {
                self.cells[r * self.columns + c] = true;
            }
        }
    }

    fn first_fit(&self, width: usize, height: usize) -> Option<(usize, usize)> {
        (0..self.rows)
            .flat_map(|row| (0..self.columns).map(move |column| (row, column)))
            .find(|&(row, column)| self.is_free(row, column, width, height))
    }
}

/// Packs `blocks` onto a `dimensions` grid, first-fit in row-major order.
pub fn pack(
    dimensions: GridDimensions,
    blocks: &[GridBlock],
    compression: Option<&CompressionOptions>,
) -> PackResult {
    let mut result = PackResult::default();

    if dimensions.rows <= 0 || dimensions.columns <= 0 {
        result.packed_blocks = blocks
            .iter()
            .map(|block| compress(block, compression))
            .collect();
        result.overflow = blocks.iter().map(|block| block.id.clone()).collect();
        return result;
    }

    let rows = dimensions.rows as usize;
    let columns = dimensions.columns as usize;
    let mut occupancy = Occupancy::new(rows, columns);

    for block in blocks {
        let mut packed = compress(block, compression);
        let width = packed.effective_width as usize;
        let height = packed.effective_height as usize;

        let origin = if width <= columns && height <= rows {
            occupancy.first_fit(width, height)
        } else {
            None
        };

        match origin {
            Some((row, column)) => {
                occupancy.occupy(row, column, width, height);
                let position = GridPosition::new(row as i32, column as i32);
                result.placements.insert(packed.id.clone(), position);
                packed.position = Some(position);
            }
            None => result.overflow.push(packed.id.clone()),
        }

        result.packed_blocks.push(packed);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn packs_first_fit_row_major() {
        let blocks = vec![
            GridBlock::new("block-a", 2, 1).with_quality(1.0, 0.0),
            GridBlock::new("block-b", 2, 1).with_quality(1.0, 0.0),
            GridBlock::new("block-c", 2, 1).with_quality(1.0, 0.0),
        ];
        let result = pack(GridDimensions::new(2, 4), &blocks, None);

        assert!(result.overflow.is_empty());
        assert_eq!(result.placements["block-a"], GridPosition::new(0, 0));
        assert_eq!(result.placements["block-b"], GridPosition::new(0, 2));
        assert_eq!(result.placements["block-c"], GridPosition::new(1, 0));
    }

    #[test]
    fn oversized_block_overflows() {
        let blocks = vec![GridBlock::new("block-a", 3, 1)];
        let result = pack(GridDimensions::new(2, 2), &blocks, None);

        assert!(result.placements.is_empty());
        assert_eq!(result.overflow, vec!["block-a".to_string()]);
        assert_eq!(result.packed_blocks.len(), 1);
        assert!(result.packed_blocks[0].position.is_none());
    }

    #[test]
    fn compression_shrinks_and_degrades() {
        let blocks = vec![GridBlock::new("block-a", 3, 3).with_quality(0.9, 0.1)];
        let options = CompressionOptions::enabled(0.5, 0.2, 0.3);
        let result = pack(GridDimensions::new(2, 2), &blocks, Some(&options));

        assert!(result.overflow.is_empty());
        let packed = &result.packed_blocks[0];
        assert_eq!(packed.effective_width, 2);
        assert_eq!(packed.effective_height, 2);
        assert!((packed.fidelity - 0.7).abs() < EPSILON);
        assert!((packed.noise - 0.4).abs() < EPSILON);
        assert!(packed.compressed);
    }

    #[test]
    fn disabled_compression_only_clamps() {
        let blocks = vec![GridBlock::new("block-a", 3, 3).with_quality(1.4, -0.2)];
        let options = CompressionOptions {
            enabled: false,
            ..CompressionOptions::enabled(0.5, 0.2, 0.3)
        };
        let result = pack(GridDimensions::new(4, 4), &blocks, Some(&options));

        let packed = &result.packed_blocks[0];
        assert_eq!((packed.effective_width, packed.effective_height), (3, 3));
        assert_eq!(packed.fidelity, 1.0);
        assert_eq!(packed.noise, 0.0);
        assert!(!packed.compressed);
    }

    #[test]
    fn scale_is_clamped_and_never_below_one_cell() {
        let blocks = vec![GridBlock::new("tiny", 2, 2)];
        let options = CompressionOptions::enabled(0.0, 0.0, 0.0);
        let result = pack(GridDimensions::new(1, 1), &blocks, Some(&options));

        let packed = &result.packed_blocks[0];
        assert_eq!((packed.effective_width, packed.effective_height), (1, 1));
        assert_eq!(result.placements["tiny"], GridPosition::new(0, 0));
    }

    #[test]
    fn empty_grid_overflows_everything() {
        let blocks = vec![GridBlock::new("a", 1, 1), GridBlock::new("b", 1, 1)];
        let result = pack(GridDimensions::new(0, 3), &blocks, None);

        assert!(result.placements.is_empty());
        assert_eq!(result.overflow, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(result.packed_blocks.len(), 2);
    }

    #[test]
    fn later_block_fills_gap_left_by_earlier() {
        let blocks = vec![
            GridBlock::new("wide", 3, 1),
            GridBlock::new("tall", 1, 2),
            GridBlock::new("dot", 1, 1),
        ];
        let result = pack(GridDimensions::new(2, 3), &blocks, None);

        assert_eq!(result.placements["wide"], GridPosition::new(0, 0));
        assert_eq!(result.placements["dot"], GridPosition::new(1, 0));
        assert_eq!(result.overflow, vec!["tall".to_string()]);
    }
}
