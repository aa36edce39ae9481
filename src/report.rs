use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Settings;

pub const HEADER: [&str; 3] = ["ApplicationName", "Status", "Reason"];
pub const SUCCESS_REASON: &str = "Application processed successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed,
    Failed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Passed => "Passed",
            Status::Failed => "Failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome for one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub application_name: String,
    pub status: Status,
    pub reason: String,
}

impl ResultRecord {
    pub fn passed(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            status: Status::Passed,
            reason: SUCCESS_REASON.to_string(),
        }
    }

    pub fn failed(application_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            status: Status::Failed,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.application_name, self.status, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unable to create {path}: {source}")]
    Create { path: PathBuf, source: io::Error },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("text write failed: {0}")]
    Io(#[from] io::Error),
}

/// Output file locations for one run, stamped with the run's start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub txt: PathBuf,
    pub log: PathBuf,
}

impl ReportPaths {
    pub fn new(settings: &Settings, stamp: &str) -> Self {
        Self {
            csv: settings
                .output_csv_dir
                .join(format!("AIP_Analysis_Results_{stamp}.csv")),
            txt: settings
                .output_txt_dir
                .join(format!("AIP_Analysis_Results_{stamp}.txt")),
            log: settings
                .output_log_dir
                .join(format!("AIP_Analysis_Log_{stamp}.log")),
        }
    }
}

fn create(path: &Path) -> Result<File, ReportError> {
    File::create(path).map_err(|source| ReportError::Create {
        path: path.to_path_buf(),
        source,
    })
}

/// Single writer for the CSV and text reports. Both files are truncated on creation.
pub struct ResultWriter {
    csv: csv::Writer<File>,
    txt: File,
}

impl ResultWriter {
    pub fn create(csv_path: &Path, txt_path: &Path) -> Result<Self, ReportError> {
        let mut csv = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(create(csv_path)?);
        csv.write_record(HEADER)?;
        csv.flush()?;

        let mut txt = create(txt_path)?;
        writeln!(txt, "{}", HEADER.join(","))?;

        Ok(Self { csv, txt })
    }

    /// Appends one record to both files and flushes, so partial runs keep what they wrote.
    pub fn write(&mut self, record: &ResultRecord) -> Result<(), ReportError> {
        self.csv.write_record([
            record.application_name.as_str(),
            record.status.as_str(),
            record.reason.as_str(),
        ])?;
        self.csv.flush()?;
        writeln!(self.txt, "{record}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_headers_and_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let csv_path = dir.path().join("r.csv");
        let txt_path = dir.path().join("r.txt");
        fs::write(&csv_path, "stale contents\n").expect("seed");

        let mut writer = ResultWriter::create(&csv_path, &txt_path).expect("create");
        writer.write(&ResultRecord::passed("Billing")).expect("write");
        writer
            .write(&ResultRecord::failed("CRM", "Upload Error, see output"))
            .expect("write");
        drop(writer);

        let csv = fs::read_to_string(&csv_path).expect("read csv");
        assert_eq!(
            csv,
            "ApplicationName,Status,Reason\n\
             Billing,Passed,Application processed successfully\n\
             CRM,Failed,\"Upload Error, see output\"\n"
        );
        let txt = fs::read_to_string(&txt_path).expect("read txt");
        assert_eq!(
            txt,
            "ApplicationName,Status,Reason\n\
             Billing: Passed - Application processed successfully\n\
             CRM: Failed - Upload Error, see output\n"
        );
    }

    #[test]
    fn creation_fails_for_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope").join("r.csv");
        let err = ResultWriter::create(&missing, &dir.path().join("r.txt")).err();
        assert!(matches!(err, Some(ReportError::Create { .. })));
    }
}
