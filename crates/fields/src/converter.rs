use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use logging::trace_convert;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};

use crate::{
    ChildMessage, ConversionError, ConversionJob, ConverterCommand, HARNESS_FILE_NAME,
    HARNESS_SOURCE,
};

/// Default upper bound on one conversion.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs fields modules in isolated child processes.
///
/// Each conversion spawns one child, reads its stdout line by line until a
/// terminal [`ChildMessage`] arrives, and kills the child afterwards. Lines
/// that are not protocol messages are ignored. The child is also killed when
/// the conversion future is dropped or times out.
#[derive(Clone, Debug)]
pub struct FieldsConverter {
    command: ConverterCommand,
    timeout: Duration,
}

impl Default for FieldsConverter {
    fn default() -> Self {
        Self::new(ConverterCommand::default())
    }
}

impl FieldsConverter {
    /// Creates a converter launching `command`.
    pub fn new(command: ConverterCommand) -> Self {
        Self {
            command,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the per-job timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command launched for each job.
    pub fn command(&self) -> &ConverterCommand {
        &self.command
    }

    /// Per-job timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Converts `source_path` and writes the document to
    /// `write_dir/<source dir relative to project_root>/fields.json`.
    ///
    /// Never fails: every error yields a rejected job.
    pub async fn convert(
        &self,
        project_root: &Path,
        source_path: &Path,
        write_dir: &Path,
        field_options: &str,
    ) -> ConversionJob {
        match self
            .run(project_root, source_path, write_dir, field_options)
            .await
        {
            Ok(output) => {
                trace_convert!(
                    "converted {} to {}",
                    source_path.display(),
                    output.display()
                );
                ConversionJob::resolved(project_root, source_path, write_dir, field_options, output)
            }
            Err(error) => {
                tracing::warn!(
                    target: "hsync::convert",
                    "skipping {}: {error}",
                    source_path.display()
                );
                ConversionJob::rejected(
                    project_root,
                    source_path,
                    write_dir,
                    field_options,
                    error.to_string(),
                )
            }
        }
    }

    async fn run(
        &self,
        project_root: &Path,
        source_path: &Path,
        write_dir: &Path,
        field_options: &str,
    ) -> Result<PathBuf, ConversionError> {
        if !source_path.is_file() {
            return Err(ConversionError::io(
                source_path,
                "read",
                io::Error::from(io::ErrorKind::NotFound),
            ));
        }
        let source_dir = source_path.parent().unwrap_or_else(|| Path::new("."));
        let relative_dir = source_dir.strip_prefix(project_root).unwrap_or(Path::new(""));
        let output_dir = write_dir.join(relative_dir);

        let mut command = Command::new(self.command.program());
        command.args(self.command.args());
        if self.command.uses_embedded_harness() {
            command.arg(install_harness(write_dir).await?);
        }
        command
            .current_dir(source_dir)
            .env("dirName", source_dir)
            .env("filePath", source_path)
            .env("writeDir", &output_dir)
            .env("fieldOptions", field_options)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| ConversionError::Spawn {
            program: self.command.program().to_string_lossy().into_owned(),
            source,
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ConversionError::Protocol("child stdout is not piped".into()))?;

        let received = tokio::time::timeout(self.timeout, read_terminal_message(stdout)).await;
        let result = match received {
            Err(_) => Err(ConversionError::Timeout(self.timeout)),
            Ok(Err(source)) => Err(ConversionError::io(source_path, "read converter output of", source)),
            Ok(Ok(Some(ChildMessage::Error { message }))) => Err(ConversionError::Script(message)),
            Ok(Ok(Some(ChildMessage::Complete { final_path }))) => {
                if final_path.is_file() {
                    Ok(final_path)
                } else {
                    Err(ConversionError::Protocol(format!(
                        "reported output {} does not exist",
                        final_path.display()
                    )))
                }
            }
            Ok(Ok(None)) => Err(ConversionError::NoResult {
                code: child.wait().await.ok().and_then(|status| status.code()),
            }),
        };
        reap(&mut child).await;
        result
    }
}

async fn install_harness(write_dir: &Path) -> Result<PathBuf, ConversionError> {
    tokio::fs::create_dir_all(write_dir)
        .await
        .map_err(|source| ConversionError::io(write_dir, "create", source))?;
    let harness = write_dir.join(HARNESS_FILE_NAME);
    if !harness.is_file() {
        tokio::fs::write(&harness, HARNESS_SOURCE)
            .await
            .map_err(|source| ConversionError::io(&harness, "write", source))?;
    }
    Ok(harness)
}

async fn read_terminal_message(stdout: ChildStdout) -> io::Result<Option<ChildMessage>> {
    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines.next_line().await? {
        match serde_json::from_str::<ChildMessage>(line.trim()) {
            Ok(message) => return Ok(Some(message)),
            Err(_) => trace_convert!(line = %line, "ignoring converter output"),
        }
    }
    Ok(None)
}

/// Kills the child if it is still running and waits for it.
async fn reap(child: &mut Child) {
    if matches!(child.try_wait(), Ok(None)) {
        if let Err(error) = child.start_kill() {
            trace_convert!("failed to kill converter: {error}");
        }
    }
    if let Err(error) = child.wait().await {
        trace_convert!("failed to reap converter: {error}");
    }
}
