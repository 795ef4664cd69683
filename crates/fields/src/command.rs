use std::env;
use std::ffi::{OsStr, OsString};

/// Environment variable naming the JavaScript runtime.
pub const NODE_ENV_VAR: &str = "HSSYNC_NODE";

/// File name the embedded harness is written under.
pub const HARNESS_FILE_NAME: &str = "hsync-fields-harness.mjs";

/// Source of the harness that evaluates a fields module in the child.
pub const HARNESS_SOURCE: &str = include_str!("harness.mjs");

/// Program the converter launches for every job.
///
/// The child receives `filePath`, `dirName`, `writeDir` and `fieldOptions`
/// in its environment and must print one terminal JSON line on stdout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterCommand {
    program: OsString,
    args: Vec<OsString>,
    embedded_harness: bool,
}

impl Default for ConverterCommand {
    fn default() -> Self {
        Self::node()
    }
}

impl ConverterCommand {
    /// Runs the embedded harness with `node`, or the program named by
    /// [`NODE_ENV_VAR`].
    pub fn node() -> Self {
        let program = env::var_os(NODE_ENV_VAR)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| OsString::from("node"));
        Self::node_at(program)
    }

    /// Runs the embedded harness with the given runtime.
    pub fn node_at(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            embedded_harness: true,
        }
    }

    /// Runs `program` as the complete harness.
    pub fn custom(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            embedded_harness: false,
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Program path or name.
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments before the harness path.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Whether the embedded harness path is appended to the arguments.
    pub fn uses_embedded_harness(&self) -> bool {
        self.embedded_harness
    }
}
