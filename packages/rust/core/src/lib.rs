//! Core pipeline orchestration for RollCall.
//!
//! This crate ties together vote discovery, roll extraction, recoding and
//! clustering into one end-to-end run ([`pipeline::run_pipeline`]).

pub mod pipeline;
