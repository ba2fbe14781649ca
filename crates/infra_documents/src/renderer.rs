//! Markdown invoice renderer with best-effort PDF conversion

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use core_kernel::{DomainPort, PortError};
use domain_billing::{Invoice, InvoiceRenderer};
use domain_student::Student;

/// Renders invoices as Markdown files, converting to PDF via `pandoc`
///
/// The returned artifact path is the PDF when conversion succeeds. When
/// `pandoc` is missing or fails, the Markdown content is copied to the PDF
/// path so an attachable file always exists.
#[derive(Debug, Clone)]
pub struct MarkdownInvoiceRenderer {
    output_dir: PathBuf,
}

impl MarkdownInvoiceRenderer {
    /// Creates a renderer writing into the given directory
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn markdown_for(invoice: &Invoice, student: &Student) -> String {
        let mut content = String::new();

        content.push_str("# Invoice\n\n");
        content.push_str(&format!("**Invoice #** {}\n\n", invoice.invoice_number));
        content.push_str(&format!("**Billed to** {}\n\n", student.id));
        content.push_str(&format!(
            "**Generated** {}\n\n",
            invoice.generated_date.format("%d/%m/%Y")
        ));
        if let Some(due) = invoice.due_date {
            content.push_str(&format!("**Due** {}\n\n", due.format("%d/%m/%Y")));
        }

        content.push_str("| Description | Qty | Unit price | Total |\n");
        content.push_str("| --- | ---: | ---: | ---: |\n");
        for item in &invoice.items {
            content.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                item.description,
                item.quantity,
                item.unit_price,
                item.total()
            ));
        }
        content.push_str(&format!("\n**Total due: {}**\n", invoice.total_amount));

        content
    }

    async fn copy_as_pdf(md_path: &Path, pdf_path: &Path) -> Result<(), PortError> {
        let content = tokio::fs::read(md_path)
            .await
            .map_err(|e| PortError::internal(format!("reading rendered markdown: {e}")))?;
        tokio::fs::write(pdf_path, content)
            .await
            .map_err(|e| PortError::internal(format!("writing pdf substitute: {e}")))?;
        Ok(())
    }
}

impl DomainPort for MarkdownInvoiceRenderer {}

#[async_trait]
impl InvoiceRenderer for MarkdownInvoiceRenderer {
    async fn render_invoice(
        &self,
        invoice: &Invoice,
        student: &Student,
    ) -> Result<String, PortError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| PortError::internal(format!("creating output directory: {e}")))?;

        let md_path = self
            .output_dir
            .join(format!("invoice-{}.md", invoice.invoice_number));
        let pdf_path = self
            .output_dir
            .join(format!("invoice-{}.pdf", invoice.invoice_number));

        let markdown = Self::markdown_for(invoice, student);
        tokio::fs::write(&md_path, markdown)
            .await
            .map_err(|e| PortError::internal(format!("writing invoice markdown: {e}")))?;

        match Command::new("pandoc")
            .arg(&md_path)
            .arg("-o")
            .arg(&pdf_path)
            .output()
            .await
        {
            Ok(output) if output.status.success() => {
                debug!(invoice = %invoice.invoice_number, "converted invoice to pdf");
            }
            Ok(output) => {
                warn!(
                    invoice = %invoice.invoice_number,
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "pandoc conversion failed, using markdown copy"
                );
                Self::copy_as_pdf(&md_path, &pdf_path).await?;
            }
            Err(e) => {
                warn!(
                    invoice = %invoice.invoice_number,
                    error = %e,
                    "pandoc unavailable, using markdown copy"
                );
                Self::copy_as_pdf(&md_path, &pdf_path).await?;
            }
        }

        Ok(pdf_path.to_string_lossy().into_owned())
    }
}
