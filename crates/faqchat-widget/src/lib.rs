//! Rendering-agnostic controller for the floating chat widget.

pub mod controller;
pub mod state;

pub use controller::{PendingQuery, SubmitOutcome, WidgetController};
pub use state::WidgetState;
