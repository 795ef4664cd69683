use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Behaviour of the fake fields harness.
///
/// The script reads the same environment as the real harness (`filePath`,
/// `writeDir`, `fieldOptions`) and speaks the same stdout protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FakeConverter {
    /// Writes `[{"source":"<file name>","options":"<fieldOptions>"}]` to
    /// `writeDir/fields.json` and reports `COMPLETE`.
    Succeed,
    /// Reports `ERROR` with the given message.
    ReportError(String),
    /// Exits without a terminal message.
    ExitSilently,
    /// Never answers.
    Hang,
}

impl FakeConverter {
    /// Writes the script into `dir` and returns its path. Run it with `sh`.
    pub fn install(&self, dir: &Path) -> io::Result<PathBuf> {
        let body = match self {
            Self::Succeed => concat!(
                "mkdir -p \"$writeDir\" || exit 1\n",
                "name=$(basename \"$filePath\")\n",
                "printf '[{\"source\":\"%s\",\"options\":\"%s\"}]' \"$name\" \"$fieldOptions\" ",
                "> \"$writeDir/fields.json\" || exit 1\n",
                "echo 'harness log line'\n",
                "printf '{\"action\":\"COMPLETE\",\"finalPath\":\"%s\"}\\n' \"$writeDir/fields.json\"\n",
            )
            .to_owned(),
            Self::ReportError(message) => format!(
                "printf '{{\"action\":\"ERROR\",\"message\":\"%s\"}}\\n' '{}'\nexit 1\n",
                message.replace('\'', "")
            ),
            Self::ExitSilently => "exit 3\n".to_owned(),
            Self::Hang => "sleep 30\n".to_owned(),
        };
        let path = dir.join("fake-fields-harness.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}"))?;
        Ok(path)
    }
}
