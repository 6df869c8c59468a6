//! Deployment hand-off
//!
//! Writes each assembled stack as a declaration document the deployment
//! tool diffs against live state. One file per stack, named after the
//! stack id.

use crate::stack::AssembledStack;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Encoding of declaration documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    pub fn render(&self, stack: &AssembledStack) -> Result<String> {
        match self {
            Self::Json => stack.to_json().context("Failed to serialize stack as JSON"),
            Self::Yaml => stack.to_yaml().context("Failed to serialize stack as YAML"),
        }
    }
}

/// Receives assembled stacks
pub trait DeploymentTarget {
    fn register(&mut self, stack: &AssembledStack) -> Result<()>;
}

/// Writes `<dir>/<StackId>.<ext>` for every registered stack
#[derive(Debug, Clone)]
pub struct OutputDirectory {
    dir: PathBuf,
    format: OutputFormat,
    written: Vec<PathBuf>,
}

impl OutputDirectory {
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
            written: Vec::new(),
        }
    }

    pub fn path_for(&self, stack: &AssembledStack) -> PathBuf {
        self.dir
            .join(format!("{}.{}", stack.stack_id, self.format.extension()))
    }

    /// Files written so far, in registration order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DeploymentTarget for OutputDirectory {
    fn register(&mut self, stack: &AssembledStack) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output directory {}", self.dir.display()))?;

        let path = self.path_for(stack);
        let mut content = self.format.render(stack)?;
        if !content.ends_with('\n') {
            content.push('\n');
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!("Wrote {} to {}", stack.stack_id, path.display());
        self.written.push(path);
        Ok(())
    }
}
