use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file structure for archive-tally.
///
/// Every value has a compiled-in default matching the reference deployment,
/// so a configuration file is only needed to point at another server or
/// another set of projects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Upstream Bitbucket server settings
    #[serde(default)]
    pub bitbucket: BitbucketConfig,

    /// Probing and retry parameters
    #[serde(default)]
    pub scan: ScanConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BitbucketConfig {
    /// Bitbucket server base URL (without the `/rest/api/1.0` suffix)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Project keys to report on, scanned in this order
    #[serde(default = "default_projects")]
    pub projects: Vec<String>,

    /// Per-request network timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScanConfig {
    /// Maximum in-flight repository probes per project
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Total attempts per request when rate limited
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff in seconds, doubled on every retry
    #[serde(default = "default_backoff_factor_secs")]
    pub backoff_factor_secs: f64,

    /// Case-insensitive substring marking a repository label as "migrated"
    #[serde(default = "default_migration_label")]
    pub migration_label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,

    /// Print a per-project table to stderr after the run
    #[serde(default)]
    pub summary: bool,
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            projects: default_projects(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_attempts: default_max_attempts(),
            backoff_factor_secs: default_backoff_factor_secs(),
            migration_label: default_migration_label(),
        }
    }
}

const DEFAULT_PROJECTS: [&str; 31] = [
    "XPCLOUD",
    "XPLIBRARIES",
    "XPACL",
    "XPDAT",
    "XPPOC",
    "XPBAC",
    "XPTC",
    "XPNDC",
    "XPMIC",
    "XPD2DEFFICIENTINFO",
    "XPBC",
    "XPOCORP",
    "XPST",
    "XPOEN",
    "XPMOBILE",
    "XPTES",
    "XPOFUL",
    "XPINFRA",
    "XPOOF",
    "XPUPC",
    "XPDPRE",
    "XPOOR",
    "XPOORC",
    "XPAF",
    "XPDINC",
    "XPEWAL",
    "XPOAWARDS",
    "XPCONFIG",
    "PRIN",
    "XPARQ",
    "SL",
];

fn default_base_url() -> String {
    "https://coderepo.appslatam.com".to_string()
}

fn default_projects() -> Vec<String> {
    DEFAULT_PROJECTS.iter().map(ToString::to_string).collect()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_concurrency() -> usize {
    7
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_factor_secs() -> f64 {
    1.0
}

fn default_migration_label() -> String {
    "gitlab".to_string()
}

const CONFIG_CANDIDATES: [&str; 4] = [
    "archive-tally.toml",
    "archive-tally.json",
    "archive-tally.yaml",
    "archive-tally.yml",
];

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path (must exist)
    /// 2. ./archive-tally.{toml,json,yaml,yml}
    /// 3. `<user config dir>/archive-tally/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        for candidate in &CONFIG_CANDIDATES {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(path) = user_config_path().filter(|p| p.exists()) {
            return Self::load_from_path(&path);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let config: Self = match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values that would make a scan meaningless or hang forever.
    pub fn validate(&self) -> Result<()> {
        if self.bitbucket.projects.is_empty() {
            bail!("At least one project key must be configured");
        }
        if self.bitbucket.projects.iter().any(|p| p.trim().is_empty()) {
            bail!("Project keys must not be blank");
        }
        if self.scan.concurrency == 0 {
            bail!("Scan concurrency must be at least 1");
        }
        if self.scan.max_attempts == 0 {
            bail!("Max attempts must be at least 1");
        }
        if Duration::try_from_secs_f64(self.scan.backoff_factor_secs).is_err() {
            bail!(
                "Backoff factor must be a non-negative number of seconds that fits a duration, got {}",
                self.scan.backoff_factor_secs
            );
        }
        if self.scan.migration_label.is_empty() {
            bail!("Migration label marker must not be empty");
        }
        Ok(())
    }

    pub fn backoff_factor(&self) -> Duration {
        Duration::from_secs_f64(self.scan.backoff_factor_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.bitbucket.request_timeout_secs)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("archive-tally").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bitbucket.base_url, "https://coderepo.appslatam.com");
        assert_eq!(config.bitbucket.projects.len(), 31);
        assert_eq!(config.bitbucket.projects[0], "XPCLOUD");
        assert_eq!(config.scan.concurrency, 7);
        assert_eq!(config.scan.max_attempts, 5);
        assert_eq!(config.backoff_factor(), Duration::from_secs(1));
        assert_eq!(config.scan.migration_label, "gitlab");
        assert!(!config.output.pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[bitbucket]
base-url = "https://bitbucket.example.com"
projects = ["CORE", "WEB"]

[scan]
concurrency = 3
backoff-factor-secs = 0.5

[output]
pretty = true
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = Config::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.bitbucket.base_url, "https://bitbucket.example.com");
        assert_eq!(config.bitbucket.projects, vec!["CORE", "WEB"]);
        assert_eq!(config.bitbucket.request_timeout_secs, 30);
        assert_eq!(config.scan.concurrency, 3);
        assert_eq!(config.scan.max_attempts, 5);
        assert_eq!(config.backoff_factor(), Duration::from_millis(500));
        assert!(config.output.pretty);
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        let yaml_content = r#"
scan:
  max-attempts: 2
  migration-label: migrated
"#;
        write!(temp_file, "{}", yaml_content).unwrap();

        let config = Config::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.scan.max_attempts, 2);
        assert_eq!(config.scan.migration_label, "migrated");
        assert_eq!(config.bitbucket.projects.len(), 31);
    }

    #[test]
    fn test_load_json_without_extension() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"{{"bitbucket": {{"projects": ["ONE"]}}}}"#).unwrap();

        let config = Config::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.bitbucket.projects, vec!["ONE"]);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some(Path::new("definitely-not-here.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.scan.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scan.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.bitbucket.projects.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scan.backoff_factor_secs = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scan.backoff_factor_secs = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_backoff_beyond_duration_range() {
        let mut config = Config::default();
        config.scan.backoff_factor_secs = 1e20;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Backoff factor"));
    }
}
