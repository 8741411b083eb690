#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! Runtime and terminal player for SVNM narratives.

pub const SVNM_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod builtin;
pub mod config;
pub mod data_paths;
pub mod loader;
pub mod player;
pub mod runtime;
pub mod scheduler;
pub mod style;
pub mod timing;

pub use config::{EngineConfig, load_config};
pub use loader::load_narrative;
pub use player::run_player;
pub use runtime::{Arg, DispatchFailure, DispatchFailures, RuntimeConfig, RuntimeError, SvnmRuntime};
