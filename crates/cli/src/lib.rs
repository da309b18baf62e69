//! Command-line front end: argument parsing and command wiring.

pub mod app;
pub mod args;
