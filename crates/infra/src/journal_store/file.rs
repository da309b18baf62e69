use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;

use invoicer_invoicing::{HistoryJournal, JournalEntry};

use super::r#trait::{JournalError, JournalStore};

/// JSON file journal (`{"entries": [...]}`, 4-space indent).
///
/// Every append rewrites the whole document through a temporary file in the
/// same directory which is then renamed over the journal, so a crash leaves
/// either the previous or the new journal on disk, never a truncated one.
#[derive(Debug, Clone)]
pub struct FileJournal {
    path: PathBuf,
}

impl FileJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> JournalError {
        JournalError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn replace(&self, journal: &HistoryJournal) -> Result<(), JournalError> {
        let mut bytes = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"    "));
        journal
            .serialize(&mut serializer)
            .map_err(|e| self.io_error(io::Error::other(e)))?;
        bytes.push(b'\n');

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&bytes).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }
}

impl JournalStore for FileJournal {
    /// A journal that was never written loads as empty.
    fn load(&self) -> Result<HistoryJournal, JournalError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HistoryJournal::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&raw).map_err(|source| JournalError::Corruption {
            path: self.path.clone(),
            source,
        })
    }

    fn append(&self, entry: JournalEntry) -> Result<(), JournalError> {
        let mut journal = self.load()?;
        journal.append(entry);
        self.replace(&journal)?;

        tracing::info!(
            path = %self.path.display(),
            entries = journal.len(),
            "appended journal entry"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use invoicer_invoicing::ServiceLine;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn entry(alias: &str, units: u32) -> JournalEntry {
        JournalEntry::new(
            alias,
            NaiveDate::from_ymd_opt(2023, 2, 10).unwrap(),
            vec![ServiceLine::new("Audit", units, Decimal::new(5000, 1))],
        )
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let journal = FileJournal::new(dir.path().join("history.json"));

        assert!(journal.load().unwrap().is_empty());
    }

    #[test]
    fn append_creates_and_extends_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history").join("history.json");
        let journal = FileJournal::new(&path);

        journal.append(entry("acme", 10)).unwrap();
        journal.append(entry("globex", 2)).unwrap();

        let loaded = journal.load().unwrap();
        assert_eq!(loaded.entries(), &[entry("acme", 10), entry("globex", 2)]);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("{\n    \"entries\": ["));
        assert!(raw.contains("\"invoice_date\": \"2023-02-10\""));
        assert!(raw.contains("\"rate\": 500.0"));
    }

    #[test]
    fn no_temporary_files_are_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let journal = FileJournal::new(dir.path().join("history.json"));

        journal.append(entry("acme", 1)).unwrap();
        journal.append(entry("acme", 2)).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["history.json"]);
    }

    #[test]
    fn malformed_journal_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, r#"{"entries": [{"client_alias": 3}]}"#).unwrap();
        let journal = FileJournal::new(&path);

        let err = journal.load().unwrap_err();
        assert!(matches!(err, JournalError::Corruption { path: p, .. } if p == path));

        // Appending to a corrupted journal must not overwrite it.
        assert!(journal.append(entry("acme", 1)).is_err());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"entries": [{"client_alias": 3}]}"#
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32,
            ..ProptestConfig::default()
        })]

        /// Property: `load()` after a series of appends returns the prior
        /// entries followed by the appended ones, in order.
        #[test]
        fn appends_preserve_order(prior in 0usize..4, units in prop::collection::vec(0u32..100, 1..6)) {
            let dir = tempfile::tempdir().unwrap();
            let journal = FileJournal::new(dir.path().join("history.json"));

            let mut expected = Vec::new();
            for i in 0..prior {
                let e = entry("prior", i as u32);
                journal.append(e.clone()).unwrap();
                expected.push(e);
            }
            for u in units {
                let e = entry("new", u);
                journal.append(e.clone()).unwrap();
                expected.push(e);
            }

            let loaded = journal.load().unwrap();
            prop_assert_eq!(loaded.entries(), expected.as_slice());
        }
    }
}
