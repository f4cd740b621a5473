//! insttally - instruction trace tally
//!
//! This library reads newline-delimited instruction traces and tallies, per
//! unique instruction, how often it occurred and (for key/duration paired
//! traces) how much time it accounted for. Keys keep their first-seen order.

pub mod cli;
pub mod config;
pub mod csv_output;
pub mod error;
pub mod input;
pub mod json_output;
pub mod tally;
