//! Render + emit, keyed by invoice number.

use std::path::PathBuf;

use thiserror::Error;

use invoicer_invoicing::{Client, Consultant, Invoice};

use crate::artifact::{ArtifactWriter, EmitError};
use crate::output::OutputDirectory;
use crate::render::{RenderError, Renderer};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Turns invoices into artifacts inside the output directory.
pub struct Publisher {
    output: OutputDirectory,
    renderer: Box<dyn Renderer>,
    writer: Box<dyn ArtifactWriter>,
}

impl Publisher {
    pub fn new(
        output: OutputDirectory,
        renderer: impl Renderer + 'static,
        writer: impl ArtifactWriter + 'static,
    ) -> Self {
        Self {
            output,
            renderer: Box::new(renderer),
            writer: Box::new(writer),
        }
    }

    pub fn output(&self) -> &OutputDirectory {
        &self.output
    }

    /// Render `invoice` and write it as `invoice_{number}.{ext}`.
    pub fn publish(
        &self,
        consultant: &Consultant,
        client: &Client,
        invoice: &Invoice,
    ) -> Result<PathBuf, PublishError> {
        let document = self.renderer.render(consultant, client, invoice)?;
        let destination = self
            .output
            .artifact_path(&invoice.number, self.writer.extension());

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|source| EmitError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.writer.write(&document, &destination)?;

        tracing::info!(
            number = %invoice.number,
            artifact = %destination.display(),
            "published invoice"
        );
        Ok(destination)
    }
}

impl core::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Publisher")
            .field("output", &self.output)
            .field("extension", &self.writer.extension())
            .finish_non_exhaustive()
    }
}
