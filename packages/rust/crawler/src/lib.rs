//! Roll-call detail page retrieval and extraction.
//!
//! This crate provides:
//! - [`roll`]: parser for the per-senator roll on a vote detail page
//! - [`engine`]: fetch + extract for one vote or an ordered batch of votes

pub mod engine;
pub mod roll;

pub use engine::{extract_all, extract_vote_records};
pub use roll::{RollUnit, parse_roll_call, parse_roll_units};
