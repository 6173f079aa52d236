//! Repository layer for save slots.
//!
//! Repositories hold data that changes as the player saves:
//! - The save slot payload (one JSON document)
//!
//! Static catalog content comes from `quest-content`, not from repositories.

mod error;
mod traits;

pub mod file;
pub mod memory;

pub use error::{RepositoryError, Result};
pub use file::FileSlotRepository;
pub use memory::InMemorySlotRepo;
pub use traits::SlotRepository;
