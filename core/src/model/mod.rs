pub mod chart;
pub mod dashboard;
pub mod scan;

pub use chart::{ChartDataset, ChartSlice};
pub use dashboard::{DashboardStats, FileContent, RecentScan, UploadedFile, User, UserRole};
pub use scan::{IssueRecord, IssueReference, IssueStatus, ScanReport, Severity, SeverityCount};
