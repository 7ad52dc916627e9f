use serde::Deserialize;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

/// Settings for randomly generated samples
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RandomSettings {
    /// Number of samples generated by `-r`
    pub count: usize,
    /// Seed of the first sample
    pub seed: u64,
    /// Minimum number of code points per sample
    pub min_length: usize,
    /// Maximum number of code points per sample
    pub max_length: usize,
}

/// Settings for timing runs
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TimingSettings {
    /// How many times each validator runs per item when timing
    pub repeat: usize,
}

/// Harness configuration, built from the embedded defaults plus overrides.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HarnessConfig {
    pub random: RandomSettings,
    pub timing: TimingSettings,
}

impl HarnessConfig {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn default_table() -> Result<Table, toml::de::Error> {
        toml::from_str(include_str!("../../harness.toml"))
    }

    pub fn load_default() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::from_table(Self::default_table()?)?)
    }

    fn from_table(table: Table) -> Result<Self, toml::de::Error> {
        Value::Table(table).try_into()
    }

    fn read_table(path: &Path) -> Result<Table, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from a single file, on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut table = Self::default_table()?;
        merge_tables(&mut table, Self::read_table(path)?);
        Ok(Self::from_table(table)?)
    }

    /// Load configuration with user overrides from standard locations
    /// 1. Start with the built-in defaults
    /// 2. Override with ~/.config/utf8-lanes/harness.toml if it exists
    /// 3. Override with ./harness.toml if it exists in current directory
    /// 4. Override with `explicit` if given (errors are not skipped here)
    pub fn load_with_overrides(explicit: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut candidates = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("utf8-lanes").join("harness.toml"));
        }
        candidates.push(PathBuf::from("harness.toml"));

        Self::load_layers(&candidates, explicit)
    }

    /// Defaults, then each existing candidate in order, then `explicit`.
    /// A candidate that fails to load is logged and skipped.
    fn load_layers(candidates: &[PathBuf], explicit: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut table = Self::default_table()?;

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::read_table(path) {
                Ok(user) => {
                    tracing::debug!(path = %path.display(), "merging config overrides");
                    merge_tables(&mut table, user);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load config, skipping");
                }
            }
        }

        if let Some(path) = explicit {
            merge_tables(&mut table, Self::read_table(path)?);
        }

        Ok(Self::from_table(table)?)
    }
}

/// Merge `over` into `base`, recursing into nested tables
pub fn merge_tables(base: &mut Table, over: Table) {
    for (key, value) in over {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(existing)), Value::Table(nested)) => merge_tables(existing, nested),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
