//! Shared test utilities for Codeword test suites
//!
//! This crate provides common testing utilities to eliminate code duplication
//! across test suites and ensure consistent test environments.
//!
//! # Modules
//!
//! - [`workspace`]: Temp directories holding a `.codeword/config.toml`
//! - [`fixtures`]: Ready-made configurations for engines and sessions
//! - [`cli`]: Command builders with pre-configured environments
//! - [`logging`]: Test logging configuration
//! - [`assertions`]: Domain-specific assertion helpers
//!
//! # Example
//!
//! ```rust
//! use cw_test_helpers::prelude::*;
//!
//! fn my_test() {
//!     let workspace = workspace_with_config(SMALL_BOARD_TOML);
//!
//!     codeword_command()
//!         .current_dir(workspace.path())
//!         .arg("config")
//!         .assert()
//!         .success();
//! }
//! ```

pub mod assertions;
pub mod cli;
pub mod fixtures;
pub mod logging;
pub mod workspace;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::cli::{codeword_command, command_for};
    pub use crate::fixtures::{fast_config, small_board_config, SMALL_BOARD_TOML};
    pub use crate::logging::{init_test_logging, suppress_logs};
    pub use crate::workspace::{temp_dir, workspace_with_config};
}
