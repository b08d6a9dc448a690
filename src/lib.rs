pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::RollcallConfig;

pub use adapters::{JsonFileStore, RosterSource, SeatingSource};
pub use core::{
    history::HistoryStore,
    rollcall::{HostOptions, PickOutcome, RollcallEngine},
    selection::{SelectionEngine, SelectionState},
};
pub use utils::error::{Result, RollcallError};
