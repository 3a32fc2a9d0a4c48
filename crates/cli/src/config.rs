//! Configuration file support for deduplication runs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sheetdedup_core::{BatchOptions, KeySpec, NormalizeOptions, DEFAULT_JOBS};
use sheetdedup_formats::OutputLayout;
use std::path::{Path, PathBuf};

/// Defaults for the `dedup` command, read from a YAML or TOML file.
///
/// ```yaml
/// key: "1,3-5"
/// jobs: 4
/// case_sensitive: false
/// require_key: true
/// output:
///   output_dir: results
///   unique_suffix: _clean
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DedupConfig {
    /// Key columns, in the same syntax as `--key`
    pub key: Option<String>,
    pub jobs: Option<usize>,
    pub case_sensitive: Option<bool>,
    pub require_key: Option<bool>,
    pub output: OutputLayout,
}

impl DedupConfig {
    /// Load configuration from a file (YAML or TOML)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            _ => Err(anyhow::anyhow!(
                "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                extension
            )),
        }
    }

    /// Combine file values with command-line flags; flags win
    pub fn resolve(self, overrides: Overrides) -> Result<BatchOptions> {
        let key_spec = match (overrides.key, self.key) {
            (Some(key), _) => key,
            (None, Some(key)) => key
                .parse::<KeySpec>()
                .with_context(|| format!("Invalid key in config file: {:?}", key))?,
            (None, None) => KeySpec::empty(),
        };

        let case_sensitive = !overrides.case_insensitive && self.case_sensitive.unwrap_or(true);

        let mut layout = self.output;
        if let Some(dir) = overrides.output_dir {
            layout.output_dir = Some(dir);
        }
        if let Some(suffix) = overrides.unique_suffix {
            layout.unique_suffix = suffix;
        }
        if let Some(suffix) = overrides.duplicate_suffix {
            layout.duplicate_suffix = suffix;
        }
        if layout.unique_suffix == layout.duplicate_suffix {
            anyhow::bail!(
                "Unique and duplicate suffixes must differ (both are {:?})",
                layout.unique_suffix
            );
        }

        Ok(BatchOptions {
            key_spec,
            normalize: NormalizeOptions { case_sensitive },
            layout,
            jobs: overrides.jobs.or(self.jobs).unwrap_or(DEFAULT_JOBS),
            require_key: overrides.require_key || self.require_key.unwrap_or(false),
            write_outputs: !overrides.dry_run,
        })
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub key: Option<KeySpec>,
    pub case_insensitive: bool,
    pub jobs: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub unique_suffix: Option<String>,
    pub duplicate_suffix: Option<String>,
    pub require_key: bool,
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn config_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(suffix).tempfile().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_load_yaml() {
        let file = config_file(
            ".yaml",
            "key: \"1,3-4\"\njobs: 2\ncase_sensitive: false\noutput:\n  unique_suffix: _clean\n",
        );
        let config = DedupConfig::load(file.path()).unwrap();

        assert_eq!(config.key.as_deref(), Some("1,3-4"));
        assert_eq!(config.jobs, Some(2));
        assert_eq!(config.output.unique_suffix, "_clean");
        assert_eq!(config.output.duplicate_suffix, "_duplicates");
    }

    #[test]
    fn test_load_toml() {
        let file = config_file(
            ".toml",
            "key = \"2\"\nrequire_key = true\n\n[output]\noutput_dir = \"results\"\n",
        );
        let config = DedupConfig::load(file.path()).unwrap();

        assert_eq!(config.require_key, Some(true));
        assert_eq!(config.output.output_dir, Some(PathBuf::from("results")));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let file = config_file(".yaml", "treshold: 0.8\n");
        assert!(DedupConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_unsupported_format() {
        let file = config_file(".json", "{}");
        assert!(DedupConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_defaults_without_file() {
        let options = DedupConfig::default().resolve(Overrides::default()).unwrap();

        assert!(options.key_spec.is_empty());
        assert!(options.normalize.case_sensitive);
        assert_eq!(options.jobs, DEFAULT_JOBS);
        assert!(options.write_outputs);
        assert!(!options.require_key);
        assert_eq!(options.layout, OutputLayout::default());
    }

    #[test]
    fn test_flags_override_file() {
        let config = DedupConfig {
            key: Some("1".to_string()),
            jobs: Some(2),
            case_sensitive: Some(true),
            ..Default::default()
        };
        let overrides = Overrides {
            key: Some("2-3".parse().unwrap()),
            case_insensitive: true,
            jobs: Some(8),
            output_dir: Some(PathBuf::from("out")),
            dry_run: true,
            ..Default::default()
        };
        let options = config.resolve(overrides).unwrap();

        assert_eq!(options.key_spec.to_string(), "2,3");
        assert!(!options.normalize.case_sensitive);
        assert_eq!(options.jobs, 8);
        assert_eq!(options.layout.output_dir, Some(PathBuf::from("out")));
        assert!(!options.write_outputs);
    }

    #[test]
    fn test_file_key_used_when_flag_absent() {
        let config = DedupConfig {
            key: Some("3,1".to_string()),
            ..Default::default()
        };
        let options = config.resolve(Overrides::default()).unwrap();
        assert_eq!(options.key_spec.to_string(), "1,3");
    }

    #[test]
    fn test_invalid_file_key() {
        let config = DedupConfig {
            key: Some("0".to_string()),
            ..Default::default()
        };
        assert!(config.resolve(Overrides::default()).is_err());
    }

    #[test]
    fn test_equal_suffixes_rejected() {
        let overrides = Overrides {
            unique_suffix: Some("_x".to_string()),
            duplicate_suffix: Some("_x".to_string()),
            ..Default::default()
        };
        assert!(DedupConfig::default().resolve(overrides).is_err());
    }
}
