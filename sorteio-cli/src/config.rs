use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DATABASE_FILE: &str = "sorteio.db";
pub const PROFILES_DIR: &str = "profiles";
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    /// Local storage profile, one per simulated browser
    pub profile: String,
    pub verbose: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("sorteio"),
            profile: DEFAULT_PROFILE.to_string(),
            verbose: false,
        }
    }
}

impl CliConfig {
    pub fn new(data_dir: Option<PathBuf>, profile: Option<String>, verbose: bool) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: data_dir.unwrap_or(defaults.data_dir),
            profile: profile
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.profile),
            verbose,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.data_dir.join(PROFILES_DIR)
    }

    pub fn profile_path(&self) -> PathBuf {
        self.profiles_dir().join(format!("{}.json", self.profile))
    }

    pub fn log_filter(&self) -> String {
        let level = if self.verbose { "debug" } else { "info" };
        format!(
            "sorteio={},sorteio_core={},sorteio_raffle={}",
            level, level, level
        )
    }
}
