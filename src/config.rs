use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const DEFAULT_EXCLUDE_PATTERNS: &str =
    "tmp/, temp/, *test, tests, target/, .svn/, .git/, _Macosx/, test/";

const RETURN_CODE_PREFIX: &str = "return_code.";

/// Keys that must be present before any work starts, in the order they are checked.
pub const REQUIRED_KEYS: [&str; 9] = [
    "console_url",
    "console_api_key",
    "console_cli_path",
    "source_code_path",
    "max_batches",
    "applications_file",
    "output_csv_file_path",
    "output_txt_file_path",
    "output_log_file_path",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("line {line}: expected key=value, got '{content}'")]
    MalformedLine { line: usize, content: String },

    #[error("required parameter '{0}' is not in the config file")]
    MissingKey(&'static str),

    #[error("max_batches must be a positive integer, got '{0}'")]
    InvalidMaxBatches(String),

    #[error("java_command could not be parsed (check shell quoting): {0}")]
    InvalidJavaCommand(String),

    #[error("'{key}' must name an integer exit code")]
    InvalidReturnCodeKey { key: String },
}

/// Raw `key=value` pairs read from a properties file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: BTreeMap<String, String>,
}

impl Properties {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut values = BTreeMap::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::MalformedLine {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn require(&self, key: &'static str) -> Result<&str, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingKey(key))
    }
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub console_url: String,
    pub console_api_key: String,
    pub console_cli_path: PathBuf,
    pub source_code_path: PathBuf,
    pub max_batches: usize,
    pub applications_file: PathBuf,
    pub output_csv_dir: PathBuf,
    pub output_txt_dir: PathBuf,
    pub output_log_dir: PathBuf,
    /// Launcher tokens placed before `-jar`, e.g. `["java", "-Xmx2g"]`.
    pub java_command: Vec<String>,
    pub exclude_patterns: String,
    pub return_code_overrides: Vec<(i32, String)>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_properties(&Properties::load(path)?)
    }

    pub fn from_properties(props: &Properties) -> Result<Self, ConfigError> {
        for key in REQUIRED_KEYS {
            props.require(key)?;
        }

        let max_batches_raw = props.require("max_batches")?;
        let max_batches = match max_batches_raw.parse::<usize>() {
            Ok(n) if n >= 1 => n,
            _ => return Err(ConfigError::InvalidMaxBatches(max_batches_raw.to_string())),
        };

        let java_raw = props.get("java_command").unwrap_or("java");
        let java_command = match shlex::split(java_raw) {
            Some(parts) if !parts.is_empty() => parts,
            _ => return Err(ConfigError::InvalidJavaCommand(java_raw.to_string())),
        };

        let mut return_code_overrides = Vec::new();
        for (key, message) in &props.values {
            let Some(code) = key.strip_prefix(RETURN_CODE_PREFIX) else {
                continue;
            };
            let code = code
                .parse::<i32>()
                .map_err(|_| ConfigError::InvalidReturnCodeKey { key: key.clone() })?;
            return_code_overrides.push((code, message.clone()));
        }

        Ok(Self {
            console_url: props.require("console_url")?.to_string(),
            console_api_key: props.require("console_api_key")?.to_string(),
            console_cli_path: PathBuf::from(props.require("console_cli_path")?),
            source_code_path: PathBuf::from(props.require("source_code_path")?),
            max_batches,
            applications_file: PathBuf::from(props.require("applications_file")?),
            output_csv_dir: PathBuf::from(props.require("output_csv_file_path")?),
            output_txt_dir: PathBuf::from(props.require("output_txt_file_path")?),
            output_log_dir: PathBuf::from(props.require("output_log_file_path")?),
            java_command,
            exclude_patterns: props
                .get("exclude_patterns")
                .unwrap_or(DEFAULT_EXCLUDE_PATTERNS)
                .to_string(),
            return_code_overrides,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = "\
[console]
# AIP Console connection
console_url = http://console:8081
console_api_key=secret=with=equals
console_cli_path=/opt/aip/aip-console-tools-cli.jar
source_code_path=/srv/sources

[run]
max_batches=3
applications_file=apps.txt
output_csv_file_path=out
output_txt_file_path=out
output_log_file_path=logs
";

    #[test]
    fn parses_complete_config_with_defaults() {
        let props = Properties::parse(COMPLETE).expect("parses");
        let settings = Settings::from_properties(&props).expect("valid");
        assert_eq!(settings.console_url, "http://console:8081");
        assert_eq!(settings.console_api_key, "secret=with=equals");
        assert_eq!(settings.max_batches, 3);
        assert_eq!(settings.java_command, vec!["java".to_string()]);
        assert_eq!(settings.exclude_patterns, DEFAULT_EXCLUDE_PATTERNS);
        assert!(settings.return_code_overrides.is_empty());
    }

    #[test]
    fn reports_first_missing_key() {
        let text = COMPLETE.replace("console_api_key=secret=with=equals\n", "");
        let props = Properties::parse(&text).expect("parses");
        let err = Settings::from_properties(&props).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey("console_api_key")));
    }

    #[test]
    fn rejects_line_without_equals() {
        let err = Properties::parse("console_url=x\njust some words\n").unwrap_err();
        match err {
            ConfigError::MalformedLine { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "just some words");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_zero_or_non_numeric_max_batches() {
        for bad in ["0", "two", "-1"] {
            let text = COMPLETE.replace("max_batches=3", &format!("max_batches={bad}"));
            let props = Properties::parse(&text).expect("parses");
            assert!(matches!(
                Settings::from_properties(&props),
                Err(ConfigError::InvalidMaxBatches(_))
            ));
        }
    }

    #[test]
    fn reads_optional_launcher_and_return_code_overrides() {
        let text = format!(
            "{COMPLETE}java_command=\"/opt/jdk 17/bin/java\" -Xmx2g\nreturn_code.42=Custom failure\n"
        );
        let props = Properties::parse(&text).expect("parses");
        let settings = Settings::from_properties(&props).expect("valid");
        assert_eq!(settings.java_command, vec!["/opt/jdk 17/bin/java", "-Xmx2g"]);
        assert_eq!(
            settings.return_code_overrides,
            vec![(42, "Custom failure".to_string())]
        );
    }

    #[test]
    fn rejects_non_numeric_return_code_key() {
        let text = format!("{COMPLETE}return_code.abc=nope\n");
        let props = Properties::parse(&text).expect("parses");
        assert!(matches!(
            Settings::from_properties(&props),
            Err(ConfigError::InvalidReturnCodeKey { .. })
        ));
    }
}
