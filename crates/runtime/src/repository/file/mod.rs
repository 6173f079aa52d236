//! File-based repository implementations.

mod slots;

pub use slots::FileSlotRepository;
