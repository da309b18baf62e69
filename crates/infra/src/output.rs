//! The invoice output directory: listing, zip backup, clearing.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use invoicer_invoicing::InvoiceNumber;

/// Prefix of every backup archive name.
pub const BACKUP_FILE_PREFIX: &str = "backup_";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("writing archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

fn io_at(path: &Path) -> impl FnOnce(io::Error) -> OutputError + '_ {
    move |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where rendered invoices land, and where they are archived before being
/// wiped.
#[derive(Debug, Clone)]
pub struct OutputDirectory {
    root: PathBuf,
    backup_dir: PathBuf,
}

impl OutputDirectory {
    pub fn new(root: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// `invoice_{number}.{extension}` inside the output directory.
    pub fn artifact_path(&self, number: &InvoiceNumber, extension: &str) -> PathBuf {
        self.root.join(format!("invoice_{number}.{extension}"))
    }

    /// Every file below the output directory, as (archive name, path), sorted.
    pub fn artifacts(&self) -> Result<Vec<(String, PathBuf)>, OutputError> {
        let mut found = Vec::new();
        if self.root.exists() {
            collect_files(&self.root, "", &mut found)?;
        }
        found.sort();
        Ok(found)
    }

    /// Archive the current artifacts as `backup_YYYYMMDD_HHMMSS.zip`.
    ///
    /// Returns `None` without writing anything when the output is empty. Two
    /// backups within the same second get a `_1`, `_2`, ... suffix rather than
    /// overwriting each other.
    pub fn backup(&self, at: NaiveDateTime) -> Result<Option<PathBuf>, OutputError> {
        let artifacts = self.artifacts()?;
        if artifacts.is_empty() {
            tracing::warn!(output = %self.root.display(), "output empty, nothing to back up");
            return Ok(None);
        }

        fs::create_dir_all(&self.backup_dir).map_err(io_at(&self.backup_dir))?;
        let stem = format!("{BACKUP_FILE_PREFIX}{}", at.format("%Y%m%d_%H%M%S"));
        let (path, file) = self.create_archive_file(&stem)?;

        if let Err(e) = write_archive(file, &artifacts, &path) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        tracing::info!(
            archive = %path.display(),
            files = artifacts.len(),
            "backed up invoice output"
        );
        Ok(Some(path))
    }

    /// Delete every artifact. Returns the number of top-level entries removed.
    pub fn clear(&self) -> Result<usize, OutputError> {
        if !self.root.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&self.root).map_err(io_at(&self.root))? {
            let path = entry.map_err(io_at(&self.root))?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path).map_err(io_at(&path))?;
            } else {
                fs::remove_file(&path).map_err(io_at(&path))?;
            }
            removed += 1;
        }

        tracing::info!(output = %self.root.display(), removed, "cleared invoice output");
        Ok(removed)
    }

    fn create_archive_file(&self, stem: &str) -> Result<(PathBuf, File), OutputError> {
        let mut attempt = 0u32;
        loop {
            let name = match attempt {
                0 => format!("{stem}.zip"),
                n => format!("{stem}_{n}.zip"),
            };
            let path = self.backup_dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(source) => return Err(OutputError::Io { path, source }),
            }
        }
    }
}

fn collect_files(
    dir: &Path,
    prefix: &str,
    found: &mut Vec<(String, PathBuf)>,
) -> Result<(), OutputError> {
    for entry in fs::read_dir(dir).map_err(io_at(dir))? {
        let entry = entry.map_err(io_at(dir))?;
        let path = entry.path();
        let name = format!("{prefix}{}", entry.file_name().to_string_lossy());
        if path.is_dir() {
            collect_files(&path, &format!("{name}/"), found)?;
        } else {
            found.push((name, path));
        }
    }
    Ok(())
}

fn write_archive(
    file: File,
    artifacts: &[(String, PathBuf)],
    archive: &Path,
) -> Result<(), OutputError> {
    let zip_error = |source: zip::result::ZipError| OutputError::Archive {
        path: archive.to_path_buf(),
        source,
    };

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, path) in artifacts {
        zip.start_file(name.as_str(), options).map_err(zip_error)?;
        let mut source = File::open(path).map_err(io_at(path))?;
        io::copy(&mut source, &mut zip).map_err(io_at(archive))?;
    }

    let file = zip.finish().map_err(zip_error)?;
    file.sync_all().map_err(io_at(archive))
}
