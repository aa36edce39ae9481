use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

const HEADER_NAME: &str = "application_name";
const HEADER_DOMAIN: &str = "domain_name";

/// One entry of the application list, as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub name: String,
    pub domain: String,
}

impl Application {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApplicationListError {
    #[error("unable to read application list {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("line {line}: expected name:domain, got '{content}'")]
    Malformed { line: usize, content: String },
}

pub fn read_applications(path: &Path) -> Result<Vec<Application>, ApplicationListError> {
    let text = fs::read_to_string(path).map_err(|source| ApplicationListError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_applications(&text)
}

pub fn parse_applications(text: &str) -> Result<Vec<Application>, ApplicationListError> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split(':');
        let (Some(name), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ApplicationListError::Malformed {
                line: idx + 1,
                content: line.to_string(),
            });
        };
        let (name, domain) = (name.trim(), domain.trim());
        if name == HEADER_NAME && domain == HEADER_DOMAIN {
            continue;
        }
        out.push(Application::new(name, domain));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_header_and_keeps_order() {
        let apps = parse_applications(
            "application_name:domain_name\nBilling : Finance\nCRM:Sales\nBilling:Finance\n",
        )
        .expect("parses");
        assert_eq!(
            apps,
            vec![
                Application::new("Billing", "Finance"),
                Application::new("CRM", "Sales"),
                Application::new("Billing", "Finance"),
            ]
        );
    }

    #[test]
    fn ignores_blank_lines() {
        let apps = parse_applications("\napp1:d1\n\n   \napp2:d2").expect("parses");
        assert_eq!(apps.len(), 2);
    }

    #[test]
    fn rejects_lines_without_exactly_one_colon() {
        for (text, bad_line) in [("app1:d1\napp2\n", 2), ("a:b:c\n", 1)] {
            match parse_applications(text) {
                Err(ApplicationListError::Malformed { line, .. }) => assert_eq!(line, bad_line),
                other => panic!("expected malformed line error, got {other:?}"),
            }
        }
    }
}
