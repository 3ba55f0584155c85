//! Temp directories holding a Codeword config
//!
//! The directory is removed when the returned `TempDir` is dropped.

use assert_fs::prelude::*;
use assert_fs::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// A temp directory with `.codeword/config.toml` containing `toml`
///
/// ```rust
/// use cw_test_helpers::workspace::workspace_with_config;
///
/// let workspace = workspace_with_config("[player]\nname = \"Ada\"\n");
/// assert!(workspace.path().join(".codeword/config.toml").exists());
/// ```
pub fn workspace_with_config(toml: &str) -> TempDir {
    let temp = temp_dir();
    temp.child(cw_config::CONFIG_FILE)
        .write_str(toml)
        .expect("Failed to write config file");
    temp
}
