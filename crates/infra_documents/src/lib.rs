//! Invoice Document Rendering
//!
//! This crate implements the `InvoiceRenderer` port: it writes a Markdown
//! invoice into an output directory and converts it to PDF with `pandoc`
//! when the tool is available, falling back to a plain copy when it is not.
//! The billing service treats rendering as best-effort, so failures here
//! never abort an invoice write.

pub mod renderer;

pub use renderer::MarkdownInvoiceRenderer;
