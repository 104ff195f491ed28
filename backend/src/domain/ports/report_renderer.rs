//! Driven port for rendering printable report documents.
use async_trait::async_trait;

use crate::domain::ReportDocument;

use super::define_port_error;

define_port_error! {
    /// Errors raised while rendering a report document.
    pub enum ReportRenderError {
        /// The renderer could not lay out or serialise the document.
        Render { message: String } => "report rendering failed: {message}",
    }
}

/// Renders a [`ReportDocument`] to PDF bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportPdfRenderer: Send + Sync {
    /// Render the document.
    async fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, ReportRenderError>;
}
