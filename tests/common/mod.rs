//! Common test utilities for deckhand integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's real data directory.

#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with an isolated data directory.
///
/// The `dh()` method returns a `Command` that sets `DH_DATA_DIR`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the dh binary with an isolated data directory.
    pub fn dh(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_dh"));
        cmd.env("DH_DATA_DIR", self.data_dir.path());
        cmd
    }

    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }

    /// Write a file under the data directory, creating parent directories.
    pub fn write_data_file(&self, relative: &str, contents: &str) {
        let path = self.data_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
