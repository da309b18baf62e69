//! Emission of rendered invoices to disk.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::render::RenderedDocument;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("running {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{program} failed with {status}: {stderr}")]
    Converter {
        program: PathBuf,
        status: String,
        stderr: String,
    },
}

/// Writes a rendered document to its destination.
pub trait ArtifactWriter {
    /// File extension of the produced artifacts, without the dot.
    fn extension(&self) -> &'static str;

    fn write(&self, document: &RenderedDocument, destination: &Path) -> Result<(), EmitError>;
}

/// Writes the HTML as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlWriter;

impl ArtifactWriter for HtmlWriter {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn write(&self, document: &RenderedDocument, destination: &Path) -> Result<(), EmitError> {
        fs::write(destination, document.as_bytes()).map_err(|source| EmitError::Io {
            path: destination.to_path_buf(),
            source,
        })
    }
}

/// Converts the HTML to PDF by piping it through `wkhtmltopdf - <destination>`.
#[derive(Debug, Clone)]
pub struct PdfWriter {
    program: PathBuf,
}

impl PdfWriter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn spawn_error(&self, source: io::Error) -> EmitError {
        EmitError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl ArtifactWriter for PdfWriter {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn write(&self, document: &RenderedDocument, destination: &Path) -> Result<(), EmitError> {
        let mut child = Command::new(&self.program)
            .arg("--quiet")
            .arg("-")
            .arg(destination)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(document.as_bytes())
                .map_err(|e| self.spawn_error(e))?;
        }

        let output = child.wait_with_output().map_err(|e| self.spawn_error(e))?;
        if !output.status.success() {
            return Err(EmitError::Converter {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
