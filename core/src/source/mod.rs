//! Data sources feeding the dashboard and the report generator.
//!
//! Every lookup is keyed only by its arguments and either yields a typed
//! record or fails with a [`SourceError`]. Callers treat failures as transient
//! notices and skip rendering; nothing here retries.

pub mod mock;

use crate::model::{
    DashboardStats, FileContent, IssueRecord, RecentScan, ScanReport, UploadedFile, User,
};
use async_trait::async_trait;

pub use mock::{Latency, MockDataSource};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email already in use: {0}")]
    EmailInUse(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

#[async_trait]
pub trait ScanDataSource: Send + Sync {
    async fn dashboard_stats(&self) -> SourceResult<DashboardStats>;

    /// Most recent scans, newest first.
    async fn recent_scans(&self) -> SourceResult<Vec<RecentScan>>;

    async fn scan_result(&self, scan_id: &str) -> SourceResult<ScanReport>;

    async fn file_content(&self, file_id: &str) -> SourceResult<FileContent>;

    async fn file_issues(&self, file_id: &str) -> SourceResult<Vec<IssueRecord>>;

    /// Suggested fix for an issue, as markdown.
    async fn ai_fix(&self, issue_id: &str) -> SourceResult<String>;

    async fn ai_explanation(&self, issue_id: &str) -> SourceResult<String>;

    /// Submits files for scanning and returns the new scan id.
    async fn upload_files(&self, files: Vec<UploadedFile>, language: &str) -> SourceResult<String>;

    /// Requests a scan of a remote repository and returns the new scan id.
    async fn scan_repository(&self, repo_url: &str, language: &str) -> SourceResult<String>;

    async fn login(&self, email: &str, password: &str) -> SourceResult<User>;

    /// Creates a regular user; fails with [`SourceError::EmailInUse`] on duplicates.
    async fn register(&self, name: &str, email: &str, password: &str) -> SourceResult<User>;
}
