use crate::math::score::Score;
use crate::model::chart::ChartDataset;
use crate::model::scan::SeverityCount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate numbers shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub security_score: Score,
    pub security_score_trend: i32,
    pub total_issues: u32,
    pub total_issues_trend: i32,
    pub scanned_files: u32,
    pub scanned_files_trend: i32,
    pub resolved_issues: u32,
    pub resolved_issues_trend: i32,
    pub critical_issues: u32,
    pub high_issues: u32,
    pub medium_issues: u32,
    pub low_issues: u32,
    pub issue_types: ChartDataset,
}

impl DashboardStats {
    pub fn severity_counts(&self) -> SeverityCount {
        SeverityCount::new(
            self.critical_issues,
            self.high_issues,
            self.medium_issues,
            self.low_issues,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentScan {
    pub id: String,
    pub project_id: String,
    pub project_name: String,
    pub date: DateTime<Utc>,
    pub language: String,
    pub security_score: Score,
    pub total_issues: u32,
    pub critical_issues: u32,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    pub file_path: String,
    pub content: String,
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

/// Authenticated account as handed back to callers; never carries a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// File submitted through the upload flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub contents: Vec<u8>,
}
