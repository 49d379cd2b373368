//! JSON file backend with atomic replacement

use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::document::LevelDocument;
use super::traits::{LevelStore, StorageError, StorageResult};
use crate::pipeline::{RunOutcome, RunReport};
use crate::reuse::ReuseLedger;

/// Write `value` as pretty JSON, replacing `path` only once fully written
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    Staged::write(path, value)?.persist()
}

/// A fully written temp file next to its destination, not yet moved into place
///
/// Dropping it without `persist` removes the temp file and leaves the
/// destination untouched.
struct Staged<'p> {
    temp_file: NamedTempFile,
    path: &'p Path,
}

impl<'p> Staged<'p> {
    fn write<T: Serialize>(path: &'p Path, value: &T) -> StorageResult<Self> {
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let temp_file = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        Ok(Self { temp_file, path })
    }

    fn persist(self) -> StorageResult<()> {
        let path = self.path;
        self.temp_file.persist(path).map_err(|e| StorageError::Persist {
            path: path.display().to_string(),
            source: e.error,
        })?;
        Ok(())
    }
}

/// Level document and ledger stored as JSON files
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    levels_path: PathBuf,
    ledger_path: Option<PathBuf>,
}

impl JsonFileStore {
    pub fn new(levels_path: impl Into<PathBuf>) -> Self {
        Self {
            levels_path: levels_path.into(),
            ledger_path: None,
        }
    }

    /// Also persist the reuse ledger at `path`
    pub fn with_ledger(mut self, path: impl Into<PathBuf>) -> Self {
        self.ledger_path = Some(path.into());
        self
    }

    pub fn levels_path(&self) -> &Path {
        &self.levels_path
    }

    pub fn ledger_path(&self) -> Option<&Path> {
        self.ledger_path.as_deref()
    }
}

impl LevelStore for JsonFileStore {
    fn commit(&self, report: &RunReport, ledger: &ReuseLedger) -> StorageResult<LevelDocument> {
        if report.outcome != RunOutcome::Committed {
            tracing::warn!(outcome = %report.outcome, "refusing to write uncommitted run");
            return Err(StorageError::NotCommittable(report.outcome));
        }

        let document = LevelDocument::from_report(report)?;

        // Both files are fully written before either is moved into place.
        // The ledger goes first: a ledger ahead of the levels only blocks
        // phrases, while levels ahead of the ledger would allow reuse.
        let staged_levels = Staged::write(&self.levels_path, &document)?;
        let staged_ledger = match &self.ledger_path {
            Some(path) => Some(Staged::write(path, ledger)?),
            None => None,
        };
        if let Some(staged) = staged_ledger {
            staged.persist()?;
        }
        staged_levels.persist()?;

        tracing::info!(
            path = %self.levels_path.display(),
            levels = document.levels.len(),
            "levels committed"
        );
        Ok(document)
    }

    fn load_levels(&self) -> StorageResult<Option<LevelDocument>> {
        if !self.levels_path.exists() {
            return Ok(None);
        }
        LevelDocument::load_json(&self.levels_path).map(Some)
    }

    fn load_ledger(&self) -> StorageResult<ReuseLedger> {
        let Some(path) = &self.ledger_path else {
            return Ok(ReuseLedger::default());
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no reuse ledger yet");
            return Ok(ReuseLedger::default());
        }
        let text = std::fs::read_to_string(path)?;
        let ledger: ReuseLedger = serde_json::from_str(&text)?;
        tracing::info!(path = %path.display(), phrases = ledger.len(), "loaded reuse ledger");
        Ok(ledger)
    }
}
