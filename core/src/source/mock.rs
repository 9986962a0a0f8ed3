use crate::model::{
    DashboardStats, FileContent, IssueRecord, RecentScan, ScanReport, UploadedFile, User,
    UserRole,
};
use crate::source::{ScanDataSource, SourceError, SourceResult};
use crate::telemetry::log::LogManager;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

const DASHBOARD_STATS: &str = include_str!("../../fixtures/dashboard_stats.json");
const RECENT_SCANS: &str = include_str!("../../fixtures/recent_scans.json");
const SCAN_RESULT: &str = include_str!("../../fixtures/scan_result.json");
const FILE_ISSUES: &str = include_str!("../../fixtures/file_issues.json");
const USERS: &str = include_str!("../../fixtures/users.json");
const LOGIN_FORM: &str = include_str!("../../fixtures/login_form.js");
const AI_FIX_XSS: &str = include_str!("../../fixtures/ai_fix_issue1.md");
const AI_FIX_GENERIC: &str = include_str!("../../fixtures/ai_fix_default.md");
const AI_EXPLANATION_XSS: &str = include_str!("../../fixtures/ai_explanation_issue1.md");
const AI_EXPLANATION_GENERIC: &str = include_str!("../../fixtures/ai_explanation_default.md");

pub const UPLOAD_SCAN_ID: &str = "scan123";
pub const REPOSITORY_SCAN_ID: &str = "scan456";

/// Simulated response delays per operation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub lookup: Duration,
    pub scan_result: Duration,
    pub ai: Duration,
    pub upload: Duration,
    pub repository: Duration,
}

impl Latency {
    pub const NONE: Latency = Latency::uniform(Duration::ZERO);

    pub const fn uniform(delay: Duration) -> Self {
        Self {
            lookup: delay,
            scan_result: delay,
            ai: delay,
            upload: delay,
            repository: delay,
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            lookup: Duration::from_millis(800),
            scan_result: Duration::from_millis(1000),
            ai: Duration::from_millis(1200),
            upload: Duration::from_millis(1500),
            repository: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Account {
    id: String,
    name: String,
    email: String,
    password: String,
    role: UserRole,
}

impl Account {
    fn user(&self) -> User {
        User {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Fixture-backed source answering every lookup after a fixed delay.
#[derive(Debug)]
pub struct MockDataSource {
    latency: Latency,
    accounts: RwLock<Vec<Account>>,
    logger: LogManager,
}

fn parse<T: DeserializeOwned>(name: &str, raw: &str) -> SourceResult<T> {
    serde_json::from_str(raw)
        .map_err(|err| SourceError::Unavailable(format!("fixture {name}: {err}")))
}

fn require(field: &str, value: &str) -> SourceResult<()> {
    if value.trim().is_empty() {
        Err(SourceError::InvalidInput(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

impl MockDataSource {
    pub fn new(latency: Latency) -> Self {
        let logger = LogManager::new("source");
        let accounts = parse::<Vec<Account>>("users", USERS).unwrap_or_else(|err| {
            logger.notice(&err.to_string());
            Vec::new()
        });
        Self {
            latency,
            accounts: RwLock::new(accounts),
            logger,
        }
    }

    /// Source that answers immediately.
    pub fn instant() -> Self {
        Self::new(Latency::NONE)
    }

    pub fn latency(&self) -> Latency {
        self.latency
    }

    async fn delay(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    fn poisoned(&self) -> SourceError {
        SourceError::Unavailable("account store lock poisoned".into())
    }
}

impl Default for MockDataSource {
    fn default() -> Self {
        Self::new(Latency::default())
    }
}

#[async_trait]
impl ScanDataSource for MockDataSource {
    async fn dashboard_stats(&self) -> SourceResult<DashboardStats> {
        self.delay(self.latency.lookup).await;
        parse("dashboard_stats", DASHBOARD_STATS)
    }

    async fn recent_scans(&self) -> SourceResult<Vec<RecentScan>> {
        self.delay(self.latency.lookup).await;
        parse("recent_scans", RECENT_SCANS)
    }

    async fn scan_result(&self, scan_id: &str) -> SourceResult<ScanReport> {
        require("scan id", scan_id)?;
        self.delay(self.latency.scan_result).await;
        let mut report: ScanReport = parse("scan_result", SCAN_RESULT)?;
        report.id = scan_id.to_string();
        self.logger.trace(&format!(
            "scan {} resolved with {} issues",
            scan_id,
            report.issues.len()
        ));
        Ok(report)
    }

    async fn file_content(&self, file_id: &str) -> SourceResult<FileContent> {
        require("file id", file_id)?;
        self.delay(self.latency.lookup).await;
        let content = if file_id == "file1" {
            FileContent {
                file_path: "src/components/auth/LoginForm.js".into(),
                content: LOGIN_FORM.to_string(),
                language: "JavaScript".into(),
            }
        } else {
            FileContent {
                file_path: "src/sample/File.js".into(),
                content: "// This is a sample file\nconsole.log(\"Hello World\");".into(),
                language: "JavaScript".into(),
            }
        };
        Ok(content)
    }

    async fn file_issues(&self, file_id: &str) -> SourceResult<Vec<IssueRecord>> {
        require("file id", file_id)?;
        self.delay(self.latency.lookup).await;
        let mut by_file: HashMap<String, Vec<IssueRecord>> = parse("file_issues", FILE_ISSUES)?;
        Ok(by_file.remove(file_id).unwrap_or_default())
    }

    async fn ai_fix(&self, issue_id: &str) -> SourceResult<String> {
        require("issue id", issue_id)?;
        self.delay(self.latency.ai).await;
        let text = if issue_id == "issue1" {
            AI_FIX_XSS
        } else {
            AI_FIX_GENERIC
        };
        Ok(text.trim_end().to_string())
    }

    async fn ai_explanation(&self, issue_id: &str) -> SourceResult<String> {
        require("issue id", issue_id)?;
        self.delay(self.latency.ai).await;
        let text = if issue_id == "issue1" {
            AI_EXPLANATION_XSS
        } else {
            AI_EXPLANATION_GENERIC
        };
        Ok(text.trim_end().to_string())
    }

    async fn upload_files(&self, files: Vec<UploadedFile>, language: &str) -> SourceResult<String> {
        if files.is_empty() {
            return Err(SourceError::InvalidInput("no files to upload".into()));
        }
        require("language", language)?;
        self.delay(self.latency.upload).await;
        let bytes: usize = files.iter().map(|file| file.contents.len()).sum();
        self.logger.record(&format!(
            "accepted {} files ({} bytes) for {} scan",
            files.len(),
            bytes,
            language
        ));
        Ok(UPLOAD_SCAN_ID.to_string())
    }

    async fn scan_repository(&self, repo_url: &str, language: &str) -> SourceResult<String> {
        require("repository url", repo_url)?;
        require("language", language)?;
        self.delay(self.latency.repository).await;
        self.logger
            .record(&format!("queued repository scan of {repo_url} ({language})"));
        Ok(REPOSITORY_SCAN_ID.to_string())
    }

    async fn login(&self, email: &str, password: &str) -> SourceResult<User> {
        self.delay(self.latency.lookup).await;
        let accounts = self.accounts.read().map_err(|_| self.poisoned())?;
        accounts
            .iter()
            .find(|account| account.email == email && account.password == password)
            .map(Account::user)
            .ok_or(SourceError::InvalidCredentials)
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> SourceResult<User> {
        require("name", name)?;
        require("email", email)?;
        require("password", password)?;
        self.delay(self.latency.lookup).await;

        let mut accounts = self.accounts.write().map_err(|_| self.poisoned())?;
        if accounts.iter().any(|account| account.email == email) {
            return Err(SourceError::EmailInUse(email.to_string()));
        }
        let account = Account {
            id: (accounts.len() + 1).to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: UserRole::User,
        };
        let user = account.user();
        accounts.push(account);
        self.logger.record(&format!("registered user {}", user.id));
        Ok(user)
    }
}
