//! Session orchestration and persistence for ContextQuest.
//!
//! This crate drives the pure `quest-core` reducer for a single player and
//! keeps what the player saves. Consumers create a [`Session`] from
//! `quest-content` data and a [`RuntimeConfig`], dispatch actions into it, and
//! persist snapshots through a [`SlotRepository`].
//!
//! Modules are organized by responsibility:
//! - [`session`] owns the state, the event log and the host-side helpers
//! - [`slots`] defines the save slot payload and its tolerant decoding
//! - [`repository`] stores slot payloads on disk or in memory
//! - [`clock`], [`config`] and [`dirs`] provide the ambient environment
pub mod clock;
pub mod config;
pub mod dirs;
pub mod repository;
pub mod session;
pub mod slots;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::RuntimeConfig;
pub use repository::{FileSlotRepository, InMemorySlotRepo, RepositoryError, SlotRepository};
pub use session::{Session, SessionError, SessionOptions};
pub use slots::{
    SAVE_SLOTS_SCHEMA_VERSION, SaveSlot, SaveSlotsPayload, create_save_slot, restore_engine_state,
};
