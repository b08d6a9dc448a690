pub mod history;
pub mod links;
pub mod rollcall;
pub mod seating;
pub mod selection;
pub mod stats;

pub use crate::domain::model::{
    HistoryEntry, HostEvent, Neighbors, PickStats, RollcallEvent, Roster, SeatContext,
    SeatPosition, SeatingGrid, SettingsUpdate,
};
pub use crate::domain::ports::{EventSink, KeyValueStore, RosterProvider, SeatingProvider};
pub use crate::utils::error::Result;
