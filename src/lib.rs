//! Fabula – a reactive, command-driven runtime for branching-narrative scripts
//!
//! This crate drives a branching-narrative script interpreter step by step:
//! - Caller actions (continue / choose) are processed strictly one at a time
//! - The interpreter advances inside a per-tick time budget so it never
//!   starves the host's frame loop
//! - Commands embedded in step text or tags are discovered and executed
//!   concurrently, then their follow-up requests are reconciled into a
//!   single deterministic decision
//! - Script variables are exposed as multicast streams that replay their
//!   latest value to new subscribers
//!
//! The script interpreter itself is external: implement [`StoryInterpreter`]
//! to plug one in.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Command discovery, invocation, and handler plumbing
pub mod commands;
/// Engine core: dispatcher, driver, executor, reconciler, variable hub
pub mod engine;
/// The seam to the external script interpreter
pub mod interpreter;

// Re-export key types for convenience
pub use engine::{Engine, EngineBuilder, EngineConfig, EngineError};
pub use engine::{StoryAction, StoryChoice, StoryStep};
pub use interpreter::{ScriptValue, StoryInterpreter};

/// Current version of the fabula runtime
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
