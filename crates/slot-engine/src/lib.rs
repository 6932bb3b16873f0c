//! # slot-engine
//!
//! Deterministic free-slot search for meeting scheduling.
//!
//! Given a set of busy intervals pulled from a calendar and a search request
//! (meeting duration, daily window, date range, scan step, excluded weekdays),
//! the engine produces every candidate slot in chronological order and selects
//! the earliest one. The computation is pure: identical inputs always yield
//! identical output.
//!
//! ## Modules
//!
//! - [`interval`] — Half-open time intervals and the overlap rule
//! - [`busy`] — Busy-interval sets and their merged union
//! - [`request`] — Search request with defaults and validation
//! - [`search`] — The slot scan, slot checking and search results
//! - [`error`] — Error types

pub mod busy;
pub mod error;
pub mod interval;
pub mod request;
pub mod search;

pub use busy::BusySet;
pub use error::EngineError;
pub use interval::TimeInterval;
pub use request::AvailabilityRequest;
pub use search::{check_slot, check_window, find_slots, search_range, SlotSearchResult};
