use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error_handling::TestError;

/// Environment variable whose presence turns on query truncation in the result log.
pub const TRUNCATE_QUERIES_ENV: &str = "SQLLOGICTEST_TRUNCATE_QUERIES";

const CONFIG_FILE_NAME: &str = ".logictestrc";

/// Runner configuration loaded from ~/.logictestrc
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub suite: SuiteConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Shorten long queries in log lines
    #[serde(default)]
    pub truncate_queries: bool,

    /// Write the execution time of each record
    #[serde(default)]
    pub durations: bool,

    /// Append log lines to this file instead of writing them to stdout
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuiteConfig {
    /// Extension of test files collected from directories
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Directory name where test paths in log lines are cut off
    #[serde(default = "default_root_dir")]
    pub root_dir: String,

    /// Suffix appended to a test file name for its regenerated copy
    #[serde(default = "default_generated_suffix")]
    pub generated_suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Overrides `hash-threshold` for every query (0 = never hash)
    #[serde(default)]
    pub hash_threshold: Option<usize>,
}

// Default value functions
fn default_extension() -> String {
    ".test".to_string()
}

fn default_root_dir() -> String {
    "test".to_string()
}

fn default_generated_suffix() -> String {
    ".generated".to_string()
}

impl Default for SuiteConfig {
    fn default() -> Self {
        SuiteConfig {
            extension: default_extension(),
            root_dir: default_root_dir(),
            generated_suffix: default_generated_suffix(),
        }
    }
}

impl SuiteConfig {
    /// Path of the regenerated copy of `test_file`.
    pub fn generated_path(&self, test_file: &Path) -> PathBuf {
        let mut name = test_file.as_os_str().to_owned();
        name.push(&self.generated_suffix);
        PathBuf::from(name)
    }
}

impl Config {
    /// Load configuration from ~/.logictestrc, falling back to defaults when it is absent.
    pub fn load() -> Result<Self, TestError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                let mut config = Config::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    /// Load configuration from the given file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, TestError> {
        let content = fs_err::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| TestError::Config(format!("{}: {e}", path.display())))?;
        config.apply_env();
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Get the configuration file path (~/.logictestrc)
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Applies overrides from the environment.
    pub fn apply_env(&mut self) {
        if std::env::var_os(TRUNCATE_QUERIES_ENV).is_some() {
            self.log.truncate_queries = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.log.durations);
        assert_eq!(config.log.file, None);
        assert_eq!(config.suite.extension, ".test");
        assert_eq!(config.suite.root_dir, "test");
        assert_eq!(config.suite.generated_suffix, ".generated");
        assert_eq!(config.engine.hash_threshold, None);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml_str = r#"
[log]
truncate_queries = true
durations = true
file = "/tmp/results.log"

[suite]
extension = ".slt"

[engine]
hash_threshold = 8
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.log.truncate_queries);
        assert!(config.log.durations);
        assert_eq!(config.log.file, Some(PathBuf::from("/tmp/results.log")));
        assert_eq!(config.suite.extension, ".slt");
        // unspecified fields keep their defaults
        assert_eq!(config.suite.root_dir, "test");
        assert_eq!(config.engine.hash_threshold, Some(8));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs_err::write(&path, "[suite]\ngenerated_suffix = \".out\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.suite.generated_suffix, ".out");

        fs_err::write(&path, "[suite\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(TestError::Config(_))));
    }

    #[test]
    fn test_generated_path() {
        let suite = SuiteConfig::default();
        assert_eq!(
            suite.generated_path(Path::new("test/select1.test")),
            PathBuf::from("test/select1.test.generated")
        );
    }
}
