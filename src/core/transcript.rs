use tracing::warn;

use crate::utils::logging::TranscriptLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    You,
    Bot,
    Exercise,
    Quiz,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::You => "You",
            EntryKind::Bot => "Bot",
            EntryKind::Exercise => "Exercise",
            EntryKind::Quiz => "Quiz",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: EntryKind,
    pub body: String,
}

impl LogEntry {
    pub fn new(kind: EntryKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            body: body.into(),
        }
    }

    /// The line exactly as shown in the message log.
    pub fn line(&self) -> String {
        format!("{}: {}", self.kind.label(), self.body)
    }
}

/// Append-only, chronologically ordered message log. Entries are never
/// removed or reordered.
#[derive(Default)]
pub struct Transcript {
    entries: Vec<LogEntry>,
    export: Option<TranscriptLog>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_export(export: TranscriptLog) -> Self {
        Self {
            entries: Vec::new(),
            export: Some(export),
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if let Some(export) = &self.export {
            if let Err(err) = export.append_line(&entry.line()) {
                warn!(error = %err, "failed to write transcript export");
            }
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(LogEntry::line).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }
}

/// A single overwritable line of text, e.g. the progress summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProgressRegion {
    text: Option<String>,
}

impl ProgressRegion {
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Where the session adapter renders its output. Owned by the surrounding
/// front end (terminal screen, one-shot command, tests).
pub trait DisplaySurface {
    fn append(&mut self, entry: LogEntry);

    /// `None` when the front end provides no progress region.
    fn progress_region(&mut self) -> Option<&mut ProgressRegion>;
}

/// A surface that just keeps everything in memory.
#[derive(Default)]
pub struct MemorySurface {
    pub transcript: Transcript,
    pub progress: Option<ProgressRegion>,
}

impl MemorySurface {
    pub fn new(transcript: Transcript, show_progress: bool) -> Self {
        Self {
            transcript,
            progress: show_progress.then(ProgressRegion::default),
        }
    }

    pub fn progress_text(&self) -> Option<&str> {
        self.progress.as_ref().and_then(ProgressRegion::text)
    }
}

impl DisplaySurface for MemorySurface {
    fn append(&mut self, entry: LogEntry) {
        self.transcript.push(entry);
    }

    fn progress_region(&mut self) -> Option<&mut ProgressRegion> {
        self.progress.as_mut()
    }
}
