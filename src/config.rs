//! Directory layout, persisted settings, and output path conventions.
//!
//! The batch workflow is directory-driven: input files are picked up from
//! a data directory, clean output goes to an export directory, diagnostics
//! to a bad directory. Each directory can be redirected with an
//! environment variable, which is how deployments point the tool at
//! network shares without a config file edit.

use crate::error::{Result, ResultExt as _, ScrubError};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Working directories for one deployment.
///
/// Defaults are relative to the process working directory; each one can
/// be overridden with the environment variable of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Input files (`DATA_DIR`, default `./data`)
    pub data_dir: PathBuf,
    /// Clean output files (`EXPORT_DIR`, default `./export`)
    pub export_dir: PathBuf,
    /// Bad and bad-raw files (`BAD_DIR`, default `./bad`)
    pub bad_dir: PathBuf,
    /// Rotating log files (`LOGS_DIR`, default `./logs`)
    pub logs_dir: PathBuf,
}

impl Paths {
    pub fn from_env() -> Self {
        Self {
            data_dir: dir_from_env("DATA_DIR", "data"),
            export_dir: dir_from_env("EXPORT_DIR", "export"),
            bad_dir: dir_from_env("BAD_DIR", "bad"),
            logs_dir: dir_from_env("LOGS_DIR", "logs"),
        }
    }

    /// Creates any of the four directories that do not exist yet.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            &self.data_dir,
            &self.export_dir,
            &self.bad_dir,
            &self.logs_dir,
        ] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }
}

fn dir_from_env(var: &str, default: &str) -> PathBuf {
    env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Persisted defaults for the processing knobs the CLI can override.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Output delimiter for the clean and bad files
    pub export_delimiter: char,
    /// Line budget for the column statistics sample
    pub analysis_sample_lines: usize,
    /// Byte sample size for encoding detection
    pub encoding_sample_bytes: usize,
    /// Progress log cadence in classified rows (0 disables)
    pub progress_every: u64,
    /// Abort when the header disagrees with the modal column count
    pub strict_structure_check: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            export_delimiter: '~',
            analysis_sample_lines: 10_000,
            encoding_sample_bytes: 10_000,
            progress_every: 5_000,
            strict_structure_check: false,
        }
    }
}

/// Platform-specific settings file location, e.g.
/// `~/.local/share/csvscrub/settings.json` on Linux.
pub fn settings_path() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .ok_or_else(|| ScrubError::Config("no platform data directory".to_owned()))?;
    Ok(base.join("csvscrub").join("settings.json"))
}

/// Loads persisted settings, falling back to defaults when the file is
/// missing or malformed. Never fails: bad settings must not block a run.
pub fn load_settings() -> AppSettings {
    if let Ok(path) = settings_path() {
        if let Ok(content) = std::fs::read_to_string(path) {
            if let Ok(settings) = serde_json::from_str::<AppSettings>(&content) {
                return settings;
            }
        }
    }
    AppSettings::default()
}

pub fn save_settings(settings: &AppSettings) -> Result<()> {
    let path = settings_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Timestamp embedded in default output file names, so repeated runs on
/// the same input never overwrite each other.
pub fn run_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Default clean output path: `{export_dir}/{stem}_clean_{ts}.csv`.
pub fn clean_output_path(export_dir: &Path, input: &Path, timestamp: &str) -> PathBuf {
    export_dir.join(format!("{}_clean_{timestamp}.csv", input_stem(input)))
}

/// Default bad output path: `{bad_dir}/{stem}_bad_{ts}.csv`.
pub fn bad_output_path(bad_dir: &Path, input: &Path, timestamp: &str) -> PathBuf {
    bad_dir.join(format!("{}_bad_{timestamp}.csv", input_stem(input)))
}

/// The bad-raw companion sits next to the bad file:
/// `{bad_stem}_raw.txt`. Derived from the bad path, not the input, so an
/// explicit `--bad` override carries its companion along.
pub fn derive_bad_raw_path(bad_path: &Path) -> PathBuf {
    let stem = bad_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bad".to_owned());
    bad_path.with_file_name(format!("{stem}_raw.txt"))
}

fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_owned())
}

/// First regular file in the data directory, in lexicographic order.
/// This is the batch default when no input path is given.
pub fn default_input_file(data_dir: &Path) -> Result<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(data_dir)
        .with_context(|| format!("failed to read data directory {}", data_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files.into_iter().next().ok_or_else(|| {
        ScrubError::Config(format!("no input files in {}", data_dir.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_redirects_a_directory() {
        // A unique variable name keeps this safe under parallel tests.
        env::set_var("CSVSCRUB_TEST_DIR_OVERRIDE", "/srv/landing");
        assert_eq!(
            dir_from_env("CSVSCRUB_TEST_DIR_OVERRIDE", "data"),
            PathBuf::from("/srv/landing")
        );
        env::remove_var("CSVSCRUB_TEST_DIR_OVERRIDE");
        assert_eq!(
            dir_from_env("CSVSCRUB_TEST_DIR_OVERRIDE", "data"),
            PathBuf::from("data")
        );
    }

    #[test]
    fn output_paths_embed_stem_and_timestamp() {
        let input = Path::new("/incoming/customers.csv");
        assert_eq!(
            clean_output_path(Path::new("export"), input, "20260828_101500"),
            PathBuf::from("export/customers_clean_20260828_101500.csv")
        );
        assert_eq!(
            bad_output_path(Path::new("bad"), input, "20260828_101500"),
            PathBuf::from("bad/customers_bad_20260828_101500.csv")
        );
    }

    #[test]
    fn bad_raw_path_follows_the_bad_file() {
        assert_eq!(
            derive_bad_raw_path(Path::new("bad/customers_bad_20260828_101500.csv")),
            PathBuf::from("bad/customers_bad_20260828_101500_raw.txt")
        );
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = AppSettings {
            export_delimiter: ';',
            analysis_sample_lines: 500,
            encoding_sample_bytes: 2_048,
            progress_every: 100,
            strict_structure_check: true,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let back: AppSettings = serde_json::from_str(r#"{"progress_every": 42}"#).unwrap();
        assert_eq!(back.progress_every, 42);
        assert_eq!(back.export_delimiter, '~');
        assert_eq!(back.analysis_sample_lines, 10_000);
    }

    #[test]
    fn default_input_picks_first_file_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "x").unwrap();
        std::fs::write(dir.path().join("a.csv"), "x").unwrap();
        std::fs::create_dir(dir.path().join("0-subdir")).unwrap();
        let picked = default_input_file(dir.path()).unwrap();
        assert_eq!(picked.file_name().unwrap(), "a.csv");
    }

    #[test]
    fn empty_data_dir_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = default_input_file(dir.path()).unwrap_err();
        assert!(matches!(err, ScrubError::Config(_)));
    }
}
