//! Shared test utilities for emacros-cli integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Get a Command for the emacros binary.
#[allow(deprecated)]
pub fn emacros_cmd() -> Command {
    Command::cargo_bin("emacros").expect("emacros binary should exist")
}

/// A fake home holding the global root and a config file, plus a project
/// directory to edit in.
pub struct Sandbox {
    pub home: TempDir,
    pub work: TempDir,
    pub config: PathBuf,
}

impl Sandbox {
    /// Sandbox using the hidden flat file layout.
    pub fn new() -> Self {
        Self::with_config("subdir: null\n")
    }

    /// Sandbox with extra YAML appended to the config.
    pub fn with_config(extra: &str) -> Self {
        let home = TempDir::new().expect("create home dir");
        let work = TempDir::new().expect("create work dir");
        let config = home.path().join("config.yaml");
        fs::write(
            &config,
            format!("global_dir: {}\n{}", home.path().display(), extra),
        )
        .expect("write config");
        Self { home, work, config }
    }

    /// An `emacros` command for python mode in the work directory.
    pub fn cmd(&self) -> Command {
        self.cmd_in(self.work.path())
    }

    /// An `emacros` command for python mode editing in `dir`.
    pub fn cmd_in(&self, dir: &Path) -> Command {
        let mut cmd = emacros_cmd();
        cmd.env("HOME", self.home.path())
            .env_remove("EMACROS_MODE")
            .env_remove("EMACROS_DIR")
            .env_remove("EMACROS_VERBOSE")
            .env("NO_COLOR", "1")
            .arg("--config")
            .arg(&self.config)
            .arg("--mode")
            .arg("python-mode")
            .arg("--dir")
            .arg(dir);
        cmd
    }

    pub fn local_file(&self) -> PathBuf {
        self.work.path().join(".emacros-for-python.el")
    }

    pub fn global_file(&self) -> PathBuf {
        self.home.path().join(".emacros-for-python.el")
    }
}

/// File content, empty when missing.
pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}
