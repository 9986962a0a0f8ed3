//! Paginated security report: layout engine, tables, and PDF/JSON encoding.

pub mod artifact;
pub mod generator;
pub mod layout;
pub mod pdf;
pub mod table;
pub mod text;

pub use artifact::{artifact_name, OutputFormat, ReportArtifact};
pub use generator::{severity_legend, severity_pie, PieSlice, ReportGenerator, REPORT_TITLE};
pub use layout::{Block, Document, Font, LayoutState, Page, PageKind, PageSetup, TextAlign};
pub use pdf::encode_pdf;
