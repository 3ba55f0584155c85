//! CLI command builders for tests
//!
//! Commands run with `RUST_LOG=error` so that stderr only carries real
//! failures, and without any user config override.

use assert_cmd::Command;

/// The `codeword` binary with a clean environment
pub fn codeword_command() -> Command {
    command_for("codeword")
}

/// Any workspace binary with a clean environment
#[allow(deprecated)]
pub fn command_for(bin_name: &str) -> Command {
    let mut cmd = Command::cargo_bin(bin_name)
        .unwrap_or_else(|_| panic!("Failed to find {} binary", bin_name));
    cmd.env("RUST_LOG", "error");
    cmd.env_remove("CODEWORD_CONFIG");
    cmd
}
