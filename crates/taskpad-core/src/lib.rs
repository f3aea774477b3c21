//! Taskpad core: the task-collection state model behind the UI.
//!
//! The [`store::TaskStore`] owns the authoritative collection and mirrors
//! every mutation to [`storage::Storage`] (write-through). [`views`]
//! derives filtered, sorted, and aggregated projections from a store
//! snapshot without mutating it. [`settings::SettingsStore`] carries
//! display preferences and the dark-mode flag, persisted the same way.
//!
//! Everything is synchronous and single-threaded; there is no CLI,
//! network, or rendering in this crate.

pub mod settings;
pub mod storage;
pub mod store;
pub mod task;
pub mod views;
