//! Event routing and membership lifecycle handlers.
//!
//! The coordination core: a typed guild event enum, an event router that
//! applies the catch-log-continue failure boundary once for every handler,
//! and the five lifecycle handlers (arrival, departure, nickname change,
//! promotion, startup role backfill).

pub mod events;
pub mod handlers;
pub mod router;

pub use events::GuildEvent;
pub use router::{EventHandler, EventRouter};
