//! In-memory repository implementations for testing and development.

mod slots;

pub use slots::InMemorySlotRepo;
