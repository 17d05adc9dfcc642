use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use projtree_utils::{DEFAULT_EXCLUDED_DIRS, DEFAULT_EXCLUDED_FILES};

/// Project-level settings file, looked up in the directory being printed.
pub const PROJECT_SETTINGS_FILE: &str = ".projtree.json";

// ---------------------------------------------------------------------------
// TreeConfig
// ---------------------------------------------------------------------------

/// Immutable exclusion sets handed to the tree printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    /// Directories whose own line and subtree are suppressed.
    pub excluded_dirs: BTreeSet<String>,
    /// Entries skipped by exact name.
    pub excluded_files: BTreeSet<String>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            excluded_files: DEFAULT_EXCLUDED_FILES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl TreeConfig {
    /// A config with no exclusions besides dot-prefixed names.
    pub fn empty() -> Self {
        Self {
            excluded_dirs: BTreeSet::new(),
            excluded_files: BTreeSet::new(),
        }
    }

    pub fn with_excluded_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_dirs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_excluded_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_files.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.contains(name)
    }

    pub fn is_excluded_file(&self, name: &str) -> bool {
        self.excluded_files.contains(name)
    }
}

// ---------------------------------------------------------------------------
// Settings files
// ---------------------------------------------------------------------------

/// Composable merge for layered configuration.
pub trait Mergeable {
    fn merge(self, other: Self) -> Self;
}

/// On-disk settings. Every field is optional in the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Start from the built-in exclusion lists.
    pub use_default_exclusions: bool,
    pub excluded_dirs: BTreeSet<String>,
    pub excluded_files: BTreeSet<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_default_exclusions: true,
            excluded_dirs: BTreeSet::new(),
            excluded_files: BTreeSet::new(),
        }
    }
}

impl Mergeable for Settings {
    fn merge(mut self, other: Self) -> Self {
        self.use_default_exclusions &= other.use_default_exclusions;
        self.excluded_dirs.extend(other.excluded_dirs);
        self.excluded_files.extend(other.excluded_files);
        self
    }
}

impl Settings {
    pub fn into_tree_config(self) -> TreeConfig {
        let base = if self.use_default_exclusions {
            TreeConfig::default()
        } else {
            TreeConfig::empty()
        };

        base.with_excluded_dirs(self.excluded_dirs)
            .with_excluded_files(self.excluded_files)
    }
}

/// Directory holding the global settings file. Not created if missing.
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join("projtree"))
}

/// Load settings by merging two layers (exclusions from both are combined):
///
/// 1. `{config_dir}/projtree/settings.json` — global user settings
/// 2. `{project_dir}/.projtree.json` — project settings
pub fn load_settings(project_dir: &Path) -> Settings {
    let paths: Vec<PathBuf> = vec![
        config_dir().ok().map(|d| d.join("settings.json")),
        Some(project_dir.join(PROJECT_SETTINGS_FILE)),
    ]
    .into_iter()
    .flatten()
    .collect();

    load_settings_from_paths(&paths)
}

/// Load and merge settings from an explicit list of file paths (in order).
/// Missing files are skipped silently, malformed ones with a warning.
pub fn load_settings_from_paths(paths: &[PathBuf]) -> Settings {
    paths
        .iter()
        .filter_map(|p| load_settings_file(p))
        .reduce(Mergeable::merge)
        .unwrap_or_default()
}

fn load_settings_file(path: &Path) -> Option<Settings> {
    let contents = fs::read_to_string(path).ok()?;

    match serde_json::from_str(&contents) {
        Ok(settings) => {
            debug!(path = %path.display(), "loaded settings");
            Some(settings)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // -----------------------------------------------------------------------
    // TreeConfig
    // -----------------------------------------------------------------------

    #[test]
    fn default_config_uses_builtin_lists() {
        let config = TreeConfig::default();

        assert!(config.is_excluded_dir("node_modules"));
        assert!(config.is_excluded_file("package-lock.json"));
        assert!(!config.is_excluded_dir("src"));
    }

    #[test]
    fn builders_extend_sets() {
        let config = TreeConfig::empty()
            .with_excluded_dirs(["vendor"])
            .with_excluded_files(vec![String::from("notes.txt")]);

        assert_eq!(config.excluded_dirs, set(&["vendor"]));
        assert_eq!(config.excluded_files, set(&["notes.txt"]));
    }

    // -----------------------------------------------------------------------
    // Mergeable — Settings
    // -----------------------------------------------------------------------

    #[test]
    fn merge_two_defaults() {
        let merged = Settings::default().merge(Settings::default());

        assert_eq!(merged, Settings::default());
    }

    #[test]
    fn merge_unions_exclusions() {
        let a = Settings {
            excluded_dirs: set(&["vendor"]),
            excluded_files: set(&["a.log"]),
            ..Default::default()
        };
        let b = Settings {
            excluded_dirs: set(&["tmp", "vendor"]),
            excluded_files: set(&["b.log"]),
            ..Default::default()
        };

        let merged = a.merge(b);

        assert!(merged.use_default_exclusions);
        assert_eq!(merged.excluded_dirs, set(&["tmp", "vendor"]));
        assert_eq!(merged.excluded_files, set(&["a.log", "b.log"]));
    }

    #[test]
    fn any_layer_can_drop_defaults() {
        let global = Settings::default();
        let project = Settings {
            use_default_exclusions: false,
            ..Default::default()
        };

        assert!(!global.clone().merge(project.clone()).use_default_exclusions);
        assert!(!project.merge(global).use_default_exclusions);
    }

    #[test]
    fn into_tree_config_without_defaults() {
        let settings = Settings {
            use_default_exclusions: false,
            excluded_dirs: set(&["vendor"]),
            excluded_files: BTreeSet::new(),
        };

        let config = settings.into_tree_config();

        assert_eq!(config.excluded_dirs, set(&["vendor"]));
        assert!(config.excluded_files.is_empty());
    }

    #[test]
    fn into_tree_config_keeps_defaults() {
        let settings = Settings {
            excluded_files: set(&["notes.txt"]),
            ..Default::default()
        };

        let config = settings.into_tree_config();

        assert!(config.is_excluded_dir("__pycache__"));
        assert!(config.is_excluded_file("yarn.lock"));
        assert!(config.is_excluded_file("notes.txt"));
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    #[test]
    fn load_from_no_paths_is_default() {
        assert_eq!(load_settings_from_paths(&[]), Settings::default());
    }

    #[test]
    fn load_skips_missing_and_malformed_files() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        fs::write(&good, r#"{ "excluded_dirs": ["vendor"] }"#).unwrap();
        fs::write(&bad, "{ not json").unwrap();

        let settings = load_settings_from_paths(&[
            dir.path().join("missing.json"),
            bad,
            good,
        ]);

        assert!(settings.use_default_exclusions);
        assert_eq!(settings.excluded_dirs, set(&["vendor"]));
    }

    #[test]
    fn load_merges_in_order() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        fs::write(&first, r#"{ "excluded_files": ["a.log"] }"#).unwrap();
        fs::write(
            &second,
            r#"{ "use_default_exclusions": false, "excluded_files": ["b.log"] }"#,
        )
        .unwrap();

        let config = load_settings_from_paths(&[first, second]).into_tree_config();

        assert!(config.excluded_dirs.is_empty());
        assert_eq!(config.excluded_files, set(&["a.log", "b.log"]));
    }

    #[test]
    fn load_settings_reads_project_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(PROJECT_SETTINGS_FILE),
            r#"{ "excluded_dirs": ["fixtures"] }"#,
        )
        .unwrap();

        let settings = load_settings(dir.path());

        assert!(settings.excluded_dirs.contains("fixtures"));
    }
}
