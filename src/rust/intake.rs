//! Complaint intake around the triage pipeline.
//!
//! Submitting a complaint triages it, appends it to a repository with status
//! `Pending`, and notifies an administrator when the urgency is `High`. The
//! repository and the notifier are traits; this module ships a CSV flat-file
//! repository and a notifier that writes to the log.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::Category;
use crate::pipeline::TriagePipeline;
use crate::urgency::UrgencyLevel;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Complaint text cannot be empty")]
    EmptyComplaint,
    #[error("Username cannot be empty")]
    EmptyUsername,
    #[error("No complaint with ID {0}")]
    NotFound(u64),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Notification failed: {0}")]
    NotificationError(String),
}

/// Resolution state of a complaint. Complaints start as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Solved,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 3] = [Self::Pending, Self::InProgress, Self::Solved];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Solved => "Solved",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "pending" => Ok(Self::Pending),
            "inprogress" => Ok(Self::InProgress),
            "solved" => Ok(Self::Solved),
            _ => Err(format!("Unknown complaint status: {}", s.trim())),
        }
    }
}

/// Column layout of the complaint log, in [`ComplaintRecord`] field order.
pub const LOG_COLUMNS: [&str; 6] = ["ID", "Username", "Complaint", "Category", "Urgency", "Status"];

/// One row of the complaint log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    #[serde(rename = "ID")]
    pub id: u64,
    /// Older logs were written without this column.
    #[serde(rename = "Username", default)]
    pub username: String,
    #[serde(rename = "Complaint")]
    pub complaint: String,
    #[serde(rename = "Category")]
    pub category: Category,
    #[serde(rename = "Urgency")]
    pub urgency: UrgencyLevel,
    #[serde(rename = "Status")]
    pub status: ComplaintStatus,
}

/// A triaged complaint that has not been assigned an ID yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComplaint {
    pub username: String,
    pub complaint: String,
    pub category: Category,
    pub urgency: UrgencyLevel,
}

/// Persistent storage for complaint records.
pub trait ComplaintRepository: Send + Sync {
    fn load_all(&self) -> Result<Vec<ComplaintRecord>, IntakeError>;

    /// Stores a new complaint as `Pending` under the next free ID.
    fn append(&self, complaint: NewComplaint) -> Result<ComplaintRecord, IntakeError>;

    fn update_by_id(&self, id: u64, status: ComplaintStatus) -> Result<ComplaintRecord, IntakeError>;
}

/// Complaint log kept in a single CSV file with the columns
/// `ID,Username,Complaint,Category,Urgency,Status`.
///
/// A missing file reads as an empty log and is created on first append.
/// Columns are matched by name on read, so older logs without `Username` or
/// with columns in another order still load; the first append to such a log
/// rewrites it with the [`LOG_COLUMNS`] layout. Updates rewrite the whole file
/// through a uniquely named temporary sibling that is then renamed into place.
#[derive(Debug)]
pub struct CsvComplaintRepository {
    path: PathBuf,
    guard: Mutex<()>,
}

impl CsvComplaintRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> Result<Vec<ComplaintRecord>, IntakeError> {
        Ok(self.read_log()?.0)
    }

    /// Reads every record, and reports whether the file's header is exactly
    /// [`LOG_COLUMNS`] so a new row can be appended in place.
    fn read_log(&self) -> Result<(Vec<ComplaintRecord>, bool), IntakeError> {
        if !self.path.exists() {
            return Ok((Vec::new(), false));
        }
        let mut reader = ReaderBuilder::new().from_path(&self.path)?;
        let in_order = reader.headers()?.iter().eq(LOG_COLUMNS.iter().copied());
        let records = reader
            .deserialize()
            .collect::<Result<Vec<ComplaintRecord>, csv::Error>>()?;
        Ok((records, in_order))
    }

    /// Replaces the whole file with `records` under the [`LOG_COLUMNS`] header.
    fn write_records(&self, records: &[ComplaintRecord]) -> Result<(), IntakeError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "complaints.csv".to_string());
        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name))
            .suffix(".tmp")
            .tempfile_in(parent)?;

        {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .from_writer(temp.as_file_mut());
            writer.write_record(LOG_COLUMNS)?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        temp.persist(&self.path)
            .map_err(|e| IntakeError::IoError(e.error))?;
        Ok(())
    }
}

impl ComplaintRepository for CsvComplaintRepository {
    fn load_all(&self) -> Result<Vec<ComplaintRecord>, IntakeError> {
        let _lock = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_records()
    }

    fn append(&self, complaint: NewComplaint) -> Result<ComplaintRecord, IntakeError> {
        let _lock = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut existing, in_order) = self.read_log()?;
        let id = existing.iter().map(|record| record.id).max().unwrap_or(0) + 1;
        let record = ComplaintRecord {
            id,
            username: complaint.username,
            complaint: complaint.complaint,
            category: complaint.category,
            urgency: complaint.urgency,
            status: ComplaintStatus::Pending,
        };

        if in_order {
            let file = OpenOptions::new().append(true).open(&self.path)?;
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
            writer.serialize(&record)?;
            writer.flush()?;
        } else {
            // New, empty, or laid out differently: rewrite with the canonical header.
            existing.push(record.clone());
            self.write_records(&existing)?;
        }

        debug!("Appended complaint {} to {:?}", id, self.path);
        Ok(record)
    }

    fn update_by_id(&self, id: u64, status: ComplaintStatus) -> Result<ComplaintRecord, IntakeError> {
        let _lock = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records = self.read_records()?;
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(IntakeError::NotFound(id))?;
        record.status = status;
        let updated = record.clone();
        self.write_records(&records)?;
        Ok(updated)
    }
}

/// Delivers high-urgency alerts to an administrator.
pub trait Notifier: Send + Sync {
    fn notify(&self, record: &ComplaintRecord) -> Result<(), IntakeError>;
}

/// Writes high-urgency alerts to the log at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, record: &ComplaintRecord) -> Result<(), IntakeError> {
        warn!(
            "High urgency complaint #{} from '{}' [{}]: {}",
            record.id, record.username, record.category, record.complaint
        );
        Ok(())
    }
}

/// Whether a submission triggered an administrator alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    NotRequired,
    Sent,
    /// The complaint was stored but the alert could not be delivered.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub record: ComplaintRecord,
    pub notification: NotificationOutcome,
}

/// Counts over the complaint log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintSummary {
    pub total: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub by_status: BTreeMap<ComplaintStatus, usize>,
    pub by_urgency: BTreeMap<UrgencyLevel, usize>,
    pub high_urgency: Vec<ComplaintRecord>,
}

impl ComplaintSummary {
    pub fn from_records(records: &[ComplaintRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };
        for record in records {
            *summary.by_category.entry(record.category.clone()).or_insert(0) += 1;
            *summary.by_status.entry(record.status).or_insert(0) += 1;
            *summary.by_urgency.entry(record.urgency).or_insert(0) += 1;
            if record.urgency == UrgencyLevel::High {
                summary.high_urgency.push(record.clone());
            }
        }
        summary
    }
}

/// Submit, track and summarize complaints.
pub struct IntakeService<R, N> {
    pipeline: TriagePipeline,
    repository: R,
    notifier: N,
}

impl<R: ComplaintRepository, N: Notifier> IntakeService<R, N> {
    pub fn new(pipeline: TriagePipeline, repository: R, notifier: N) -> Self {
        Self {
            pipeline,
            repository,
            notifier,
        }
    }

    /// Triages and stores a complaint, alerting on `High` urgency.
    ///
    /// Blank text or usernames are rejected here; the triage pipeline itself
    /// accepts any input. A failed alert does not undo the stored complaint.
    pub fn submit(&self, username: &str, complaint: &str) -> Result<Submission, IntakeError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(IntakeError::EmptyUsername);
        }
        if complaint.trim().is_empty() {
            return Err(IntakeError::EmptyComplaint);
        }

        let triage = self.pipeline.triage(complaint);
        let record = self.repository.append(NewComplaint {
            username: username.to_string(),
            complaint: complaint.to_string(),
            category: triage.category,
            urgency: triage.urgency,
        })?;
        info!(
            "Complaint {} filed as {} with {} urgency",
            record.id, record.category, record.urgency
        );

        let notification = if record.urgency == UrgencyLevel::High {
            match self.notifier.notify(&record) {
                Ok(()) => NotificationOutcome::Sent,
                Err(e) => {
                    error!("Could not notify about complaint {}: {}", record.id, e);
                    NotificationOutcome::Failed(e.to_string())
                }
            }
        } else {
            NotificationOutcome::NotRequired
        };

        Ok(Submission {
            record,
            notification,
        })
    }

    pub fn update_status(&self, id: u64, status: ComplaintStatus) -> Result<ComplaintRecord, IntakeError> {
        let record = self.repository.update_by_id(id, status)?;
        info!("Complaint {} is now {}", id, status);
        Ok(record)
    }

    pub fn all_complaints(&self) -> Result<Vec<ComplaintRecord>, IntakeError> {
        self.repository.load_all()
    }

    pub fn complaints_for(&self, username: &str) -> Result<Vec<ComplaintRecord>, IntakeError> {
        let username = username.trim();
        Ok(self
            .repository
            .load_all()?
            .into_iter()
            .filter(|record| record.username == username)
            .collect())
    }

    pub fn summary(&self) -> Result<ComplaintSummary, IntakeError> {
        Ok(ComplaintSummary::from_records(&self.repository.load_all()?))
    }

    pub fn pipeline(&self) -> &TriagePipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, category: &str, urgency: UrgencyLevel, status: ComplaintStatus) -> ComplaintRecord {
        ComplaintRecord {
            id,
            username: "asha".to_string(),
            complaint: "text".to_string(),
            category: Category::parse(category).unwrap(),
            urgency,
            status,
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("In Progress".parse::<ComplaintStatus>(), Ok(ComplaintStatus::InProgress));
        assert_eq!("in-progress".parse::<ComplaintStatus>(), Ok(ComplaintStatus::InProgress));
        assert_eq!(" solved ".parse::<ComplaintStatus>(), Ok(ComplaintStatus::Solved));
        assert!("closed".parse::<ComplaintStatus>().is_err());
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            record(1, "IT", UrgencyLevel::High, ComplaintStatus::Pending),
            record(2, "IT", UrgencyLevel::Low, ComplaintStatus::Solved),
            record(3, "Mess", UrgencyLevel::Medium, ComplaintStatus::Pending),
        ];
        let summary = ComplaintSummary::from_records(&records);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_category.get("IT"), Some(&2));
        assert_eq!(summary.by_status[&ComplaintStatus::Pending], 2);
        assert_eq!(summary.by_urgency[&UrgencyLevel::Medium], 1);
        assert_eq!(summary.high_urgency.len(), 1);
        assert_eq!(summary.high_urgency[0].id, 1);
    }

    #[test]
    fn test_csv_repository_assigns_ids_and_updates() {
        let dir = tempfile::tempdir().unwrap();
        let repository = CsvComplaintRepository::new(dir.path().join("log.csv"));
        assert!(repository.load_all().unwrap().is_empty());

        let new = |text: &str| NewComplaint {
            username: "asha".to_string(),
            complaint: text.to_string(),
            category: Category::parse("IT").unwrap(),
            urgency: UrgencyLevel::Low,
        };
        let first = repository.append(new("Wifi is slow, again")).unwrap();
        let second = repository.append(new("Printer offline")).unwrap();
        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(first.status, ComplaintStatus::Pending);

        let updated = repository.update_by_id(2, ComplaintStatus::InProgress).unwrap();
        assert_eq!(updated.status, ComplaintStatus::InProgress);

        let all = repository.load_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].complaint, "Wifi is slow, again");
        assert_eq!(all[1].status, ComplaintStatus::InProgress);

        let contents = fs::read_to_string(repository.path()).unwrap();
        assert!(contents.starts_with("ID,Username,Complaint,Category,Urgency,Status\n"));
        assert!(contents.contains("In Progress"));

        assert!(matches!(
            repository.update_by_id(9, ComplaintStatus::Solved),
            Err(IntakeError::NotFound(9))
        ));
    }

    #[test]
    fn test_log_without_username_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        fs::write(
            &path,
            "ID,Complaint,Category,Urgency,Status\n1,Tap leaking,Maintenance,Medium,Pending\n",
        )
        .unwrap();
        let records = CsvComplaintRepository::new(&path).load_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username, "");
        assert_eq!(records[0].urgency, UrgencyLevel::Medium);
    }

    fn maintenance(text: &str) -> NewComplaint {
        NewComplaint {
            username: "ravi".to_string(),
            complaint: text.to_string(),
            category: Category::parse("Maintenance").unwrap(),
            urgency: UrgencyLevel::High,
        }
    }

    #[test]
    fn test_append_to_log_without_username_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        fs::write(
            &path,
            "ID,Complaint,Category,Urgency,Status\n1,Tap leaking,Maintenance,Medium,Pending\n",
        )
        .unwrap();
        let repository = CsvComplaintRepository::new(&path);

        let appended = repository.append(maintenance("No water since morning")).unwrap();
        assert_eq!(appended.id, 2);

        let records = repository.load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].complaint, "Tap leaking");
        assert_eq!(records[0].username, "");
        assert_eq!(records[1].username, "ravi");
        assert_eq!(records[1].status, ComplaintStatus::Pending);

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("ID,Username,Complaint,Category,Urgency,Status\n"));
    }

    #[test]
    fn test_append_to_log_with_username_last() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reordered.csv");
        fs::write(
            &path,
            "ID,Complaint,Category,Urgency,Status,Username\n1,Tap leaking,Maintenance,Medium,Solved,asha\n",
        )
        .unwrap();
        let repository = CsvComplaintRepository::new(&path);

        repository.append(maintenance("Fan not working")).unwrap();
        repository.append(maintenance("Door lock broken")).unwrap();

        let records = repository.load_all().unwrap();
        let ids: Vec<u64> = records.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(records[0].username, "asha");
        assert_eq!(records[0].status, ComplaintStatus::Solved);
        assert_eq!(records[2].complaint, "Door lock broken");
    }

    #[test]
    fn test_writes_leave_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let repository = CsvComplaintRepository::new(dir.path().join("log.csv"));
        repository.append(maintenance("Fan not working")).unwrap();
        repository.append(maintenance("Door lock broken")).unwrap();
        repository.update_by_id(1, ComplaintStatus::Solved).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["log.csv".to_string()]);
    }
}
