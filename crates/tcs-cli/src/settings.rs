//! Optional TOML settings file.
//!
//! ```toml
//! catalog = "fixtures/library.json"
//! case_library = "archived"
//! search_method = "semantic"
//! output = "out"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use tcs_catalog::SearchMethod;

pub const DEFAULT_CASE_LIBRARY: &str = "all";

/// Defaults for command flags. Flags always win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Case library fixture (JSON). Without one the built-in catalog is used.
    pub catalog: Option<PathBuf>,
    pub case_library: Option<String>,
    pub search_method: Option<SearchMethod>,
    /// Directory for exported files.
    pub output: Option<PathBuf>,
}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse settings")
    }

    /// Settings at `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let settings =
            Self::from_toml(&text).with_context(|| format!("load {}", path.display()))?;
        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn case_library(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.case_library.clone())
            .unwrap_or_else(|| DEFAULT_CASE_LIBRARY.to_string())
    }

    pub fn search_method(&self, flag: Option<SearchMethod>) -> SearchMethod {
        flag.or(self.search_method).unwrap_or_default()
    }

    pub fn catalog(&self, flag: Option<&Path>) -> Option<PathBuf> {
        flag.map(Path::to_path_buf).or_else(|| self.catalog.clone())
    }

    /// `flag` as given, else `file_name` inside the configured output
    /// directory, else `file_name` in the working directory.
    pub fn output_path(&self, flag: Option<&Path>, file_name: &str) -> PathBuf {
        match (flag, &self.output) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(dir)) => dir.join(file_name),
            (None, None) => PathBuf::from(file_name),
        }
    }
}
