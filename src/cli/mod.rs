//! Command-line interface

pub mod args;
pub mod run;

pub use args::Cli;
