//! Transcript export and diagnostic logging setup.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Appends every rendered log line to a plain-text file.
#[derive(Debug)]
pub struct TranscriptLog {
    file_path: PathBuf,
}

impl TranscriptLog {
    /// Opens (creating if needed) the file up front so a bad path fails at startup
    /// instead of on the first message.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let file_path = path.into();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;
        file.flush()?;
        Ok(Self { file_path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn append_line(&self, content: &str) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        let mut writer = BufWriter::new(file);
        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        writer.flush()
    }
}

/// Where `tracing` output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticsTarget {
    /// One-shot commands: stderr, quiet by default.
    Stderr,
    /// Full-screen mode: a file, so the terminal screen stays intact.
    File(PathBuf),
}

impl DiagnosticsTarget {
    fn default_level(&self) -> &'static str {
        match self {
            DiagnosticsTarget::Stderr => "warn",
            DiagnosticsTarget::File(_) => "info",
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default level.
pub fn init_diagnostics(target: &DiagnosticsTarget) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(target.default_level()));

    match target {
        DiagnosticsTarget::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr))
            .try_init()?,
        DiagnosticsTarget::File(path) => {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
                .try_init()?
        }
    }

    Ok(())
}
