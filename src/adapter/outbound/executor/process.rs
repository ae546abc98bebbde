//! Process executor for packaged bundles.
//!
//! The bundle is an executable on disk. Each run spawns it, writes the input
//! as JSON to stdin, closes stdin and reads one JSON document from stdout.
//! Empty stdout maps to `null`. The child is killed if the run is dropped
//! before it finishes (for example on timeout).

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::domain::record::{SourceDescriptor, SourceKind};
use crate::error::{ActivationError, ExecutionError};
use crate::port::outbound::executor::Executor;

/// Longest stderr excerpt carried in a failure.
const STDERR_EXCERPT: usize = 512;

#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl ProcessExecutor {
    /// Build from a descriptor.
    ///
    /// `location` is required; relative paths resolve against `shelf_root`.
    /// An optional `args` array of strings is passed to the program.
    pub async fn initialize(
        source: &SourceDescriptor,
        shelf_root: &Path,
    ) -> Result<Self, ActivationError> {
        let location =
            source
                .location
                .as_deref()
                .ok_or_else(|| ActivationError::InvalidDescriptor {
                    reason: "process source requires a location".to_string(),
                })?;

        let program = resolve(location, shelf_root);
        let metadata = tokio::fs::metadata(&program).await.map_err(|_| {
            ActivationError::MissingSource {
                location: program.display().to_string(),
            }
        })?;
        if !metadata.is_file() {
            return Err(ActivationError::InvalidDescriptor {
                reason: format!("{} is not a file", program.display()),
            });
        }

        let args = parse_args(source.extra.get("args"))?;
        let working_dir = program
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| shelf_root.to_path_buf());

        Ok(Self {
            program,
            args,
            working_dir,
        })
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

fn resolve(location: &str, shelf_root: &Path) -> PathBuf {
    let path = Path::new(location);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        shelf_root.join(path)
    }
}

fn parse_args(raw: Option<&Value>) -> Result<Vec<String>, ActivationError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let invalid = || ActivationError::InvalidDescriptor {
        reason: "args must be an array of strings".to_string(),
    };
    raw.as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_str().map(ToOwned::to_owned).ok_or_else(invalid))
        .collect()
}

#[async_trait]
impl Executor for ProcessExecutor {
    fn kind(&self) -> SourceKind {
        SourceKind::Process
    }

    async fn run(&self, input: Value) -> Result<Value, ExecutionError> {
        let payload = serde_json::to_vec(&input).map_err(ExecutionError::InvalidInput)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // Feed stdin concurrently so a chatty child cannot deadlock us.
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&payload).await {
                    debug!(error = %e, "Process executor closed stdin before reading its input");
                }
            });
        }

        let output = child.wait_with_output().await?;
        debug!(
            program = %self.program.display(),
            status = %output.status,
            "Process executor finished"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT).collect();
            return Err(ExecutionError::Failed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                excerpt
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(stdout.trim()).map_err(ExecutionError::InvalidOutput)
    }
}
