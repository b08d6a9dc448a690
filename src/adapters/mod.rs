// Adapters layer: concrete collaborators for the roll-call core (store, roster, seating, events).

pub mod events;
pub mod roster;
pub mod seating;
pub mod store;

pub use events::{StdoutEventSink, TracingEventSink};
pub use roster::{FileRosterProvider, HttpRosterProvider, RosterSource};
pub use seating::{FileSeatingProvider, HttpSeatingProvider, SeatingSource};
pub use store::JsonFileStore;
