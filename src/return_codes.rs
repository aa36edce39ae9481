//! Exit-code taxonomy of the AIP Console CLI.
//!
//! The default table is static data; callers can layer extra or replacement
//! messages on top of it (see `return_code.<N>` in the config file). Codes not
//! present in either fall back to [`Category::Unknown`].

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Success,
    ApiKeyMissing,
    LoginError,
    UploadError,
    AddVersionJobError,
    JobTerminated,
    ApplicationMissing,
    ApplicationNotFound,
    SourceFolderNotFound,
    NoVersion,
    VersionNotFound,
    Unexpected,
    /// Supplied through configuration rather than the built-in table.
    Configured,
    Unknown,
}

struct Entry {
    code: i32,
    category: Category,
    message: &'static str,
}

const DEFAULT_ENTRIES: &[Entry] = &[
    Entry {
        code: 0,
        category: Category::Success,
        message: "No errors, processing was completed correctly. This is also the return code for --help and --version parameters.",
    },
    Entry {
        code: 1,
        category: Category::ApiKeyMissing,
        message: "API key missing. No API key was provided either in the prompt or in the environment variable.",
    },
    Entry {
        code: 2,
        category: Category::LoginError,
        message: "Login Error. Unable to login to AIP Console with the given API key. Please check that you provide the proper value.",
    },
    Entry {
        code: 3,
        category: Category::UploadError,
        message: "Upload Error. An error occurred during upload to AIP Console. Check the standard output to see more details.",
    },
    Entry {
        code: 4,
        category: Category::AddVersionJobError,
        message: "Add Version Job Error. Creation of the Add Version job failed, or AIP CLI is unable to get the status of the running job. Please see the standard output for more details regarding this error.",
    },
    Entry {
        code: 5,
        category: Category::JobTerminated,
        message: "Job terminated. The Add Version job did not finish in an expected state. Check the standard output or AIP Console for more details about the state of the job.",
    },
    Entry {
        code: 6,
        category: Category::ApplicationMissing,
        message: "Application name or GUID missing. The AddVersion job cannot run due to a missing application name or missing application guid.",
    },
    Entry {
        code: 7,
        category: Category::ApplicationNotFound,
        message: "Application Not Found. The given Application Name or GUID could not be found.",
    },
    Entry {
        code: 8,
        category: Category::SourceFolderNotFound,
        message: "Source Folder Not Found. The given source folder could not be found on the AIP Node where the application version is delivered.",
    },
    Entry {
        code: 9,
        category: Category::NoVersion,
        message: "No Version. Application has no version and the provided command cannot be run.",
    },
    Entry {
        code: 10,
        category: Category::VersionNotFound,
        message: "Version Not Found. The given version could not be found OR no version matches the requested command (i.e. No delivered version exists to be used for analysis)",
    },
    Entry {
        code: 1000,
        category: Category::Unexpected,
        message: "Unexpected error. This can occur for various reasons, and the standard output should be checked for more information.",
    },
];

/// Classification of one CLI exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub code: Option<i32>,
    pub category: Category,
    pub message: String,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(Debug, Clone)]
pub struct ReturnCodeTable {
    entries: BTreeMap<i32, (Category, String)>,
}

impl Default for ReturnCodeTable {
    fn default() -> Self {
        let entries = DEFAULT_ENTRIES
            .iter()
            .map(|e| (e.code, (e.category, e.message.to_string())))
            .collect();
        Self { entries }
    }
}

impl ReturnCodeTable {
    /// Default table with `overrides` replacing or adding messages. Code 0 stays a success.
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = &'a (i32, String)>) -> Self {
        let mut table = Self::default();
        for (code, message) in overrides {
            let category = match table.entries.get(code) {
                Some((category, _)) => *category,
                None => Category::Configured,
            };
            table.entries.insert(*code, (category, message.clone()));
        }
        table
    }

    /// `None` means the process ended without an exit code (e.g. killed by a signal).
    pub fn classify(&self, code: Option<i32>) -> Outcome {
        let Some(code) = code else {
            return Outcome {
                code: None,
                category: Category::Unknown,
                message: "Process terminated without an exit code".to_string(),
            };
        };
        match self.entries.get(&code) {
            Some((category, message)) => Outcome {
                code: Some(code),
                category: if code == 0 { Category::Success } else { *category },
                message: message.clone(),
            },
            None => Outcome {
                code: Some(code),
                category: Category::Unknown,
                message: format!("Unknown return code: {code}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_success() {
        let outcome = ReturnCodeTable::default().classify(Some(0));
        assert!(outcome.is_success());
        assert_eq!(outcome.category, Category::Success);
    }

    #[test]
    fn known_codes_use_table_messages() {
        let table = ReturnCodeTable::default();
        let expected = [
            (1, Category::ApiKeyMissing, "API key missing."),
            (2, Category::LoginError, "Login Error."),
            (3, Category::UploadError, "Upload Error."),
            (4, Category::AddVersionJobError, "Add Version Job Error."),
            (5, Category::JobTerminated, "Job terminated."),
            (6, Category::ApplicationMissing, "Application name or GUID missing."),
            (7, Category::ApplicationNotFound, "Application Not Found."),
            (8, Category::SourceFolderNotFound, "Source Folder Not Found."),
            (9, Category::NoVersion, "No Version."),
            (10, Category::VersionNotFound, "Version Not Found."),
            (1000, Category::Unexpected, "Unexpected error."),
        ];
        for (code, category, prefix) in expected {
            let outcome = table.classify(Some(code));
            assert!(!outcome.is_success(), "code {code}");
            assert_eq!(outcome.category, category, "code {code}");
            assert!(
                outcome.message.starts_with(prefix),
                "code {code}: {}",
                outcome.message
            );
        }
    }

    #[test]
    fn unknown_codes_mention_the_code() {
        let table = ReturnCodeTable::default();
        for code in [-1, 11, 42, 999, 1001] {
            let outcome = table.classify(Some(code));
            assert_eq!(outcome.category, Category::Unknown);
            assert!(outcome.message.contains(&code.to_string()), "{}", outcome.message);
        }
    }

    #[test]
    fn missing_exit_code_is_a_failure() {
        let outcome = ReturnCodeTable::default().classify(None);
        assert!(!outcome.is_success());
        assert_eq!(outcome.category, Category::Unknown);
    }

    #[test]
    fn overrides_extend_and_replace_messages() {
        let overrides = vec![(42, "Quota exceeded".to_string()), (7, "No such app".to_string())];
        let table = ReturnCodeTable::with_overrides(&overrides);

        let custom = table.classify(Some(42));
        assert_eq!(custom.category, Category::Configured);
        assert_eq!(custom.message, "Quota exceeded");

        let replaced = table.classify(Some(7));
        assert_eq!(replaced.category, Category::ApplicationNotFound);
        assert_eq!(replaced.message, "No such app");
    }
}
