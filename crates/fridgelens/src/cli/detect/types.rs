//! CLI enum types shared by `detect` and `serve`.

use clap::ValueEnum;
use fridgelens_core::config::ServerMode;
use fridgelens_core::OutputFormat as CoreOutputFormat;

/// Supported detection backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Roboflow hosted object detection (boxes and confidences)
    Roboflow,
    /// Gemini generative model (names only)
    Gemini,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Roboflow => "roboflow",
            BackendKind::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-image output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One report object with results and summary
    Json,
    /// One result per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Server response modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Fixed sample answer
    Stub,
    /// Real detection on the upload
    Detect,
}

impl From<Mode> for ServerMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Stub => ServerMode::Stub,
            Mode::Detect => ServerMode::Detect,
        }
    }
}
