//! Command-line front end of layerbalancer.
//!
//! `lb bump` brings every region of a Lambda layer up to the greatest
//! published version; `lb verify` checks that no region drifted.

pub mod cli;
pub mod commands;
pub mod progress;

pub use cli::{Cli, Commands, TargetArgs, VERSION};
