// Configuration loading and parsing (tracker.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("no config/tracker.toml or defaults/tracker.toml under {}", base.display())]
    NoConfig { base: PathBuf },

    #[error("cannot seed {}: {source}", path.display())]
    SeedFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot resolve the working directory: {0}")]
    WorkingDir(std::io::Error),
}

const CONFIG_FILE: &str = "tracker.toml";

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub roster: RosterLimits,
    pub training: TrainingLimits,
    pub db_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            roster: RosterLimits::default(),
            training: TrainingLimits::default(),
            db_path: "pitch-tracker.db".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// tracker.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire tracker.toml file.
#[derive(Debug, Clone, Deserialize)]
struct TrackerFile {
    roster: RosterLimits,
    training: TrainingLimits,
    database: DatabaseSection,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

/// Cardinality and workload limits enforced by the roster manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RosterLimits {
    pub max_teams: usize,
    pub max_pitchers_per_team: usize,
    /// Pitch budget a new pitcher starts with.
    pub daily_pitch_budget: i32,
}

impl Default for RosterLimits {
    fn default() -> Self {
        RosterLimits {
            max_teams: 5,
            max_pitchers_per_team: 15,
            daily_pitch_budget: 85,
        }
    }
}

/// Session-length rules for practice sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TrainingLimits {
    /// Sessions under this many pitches cannot be saved.
    pub min_pitches: usize,
    /// Hard ceiling; the session finalizes itself on this pitch.
    pub max_pitches: usize,
    /// Pitch count that triggers the one-time "consider ending" advisory.
    pub advisory_at: usize,
    pub default_target: usize,
    pub notes_max_chars: usize,
}

impl Default for TrainingLimits {
    fn default() -> Self {
        TrainingLimits {
            min_pitches: 15,
            max_pitches: 60,
            advisory_at: 45,
            default_target: 25,
            notes_max_chars: 500,
        }
    }
}

impl TrainingLimits {
    /// Clamp a requested target into `[min_pitches, max_pitches]`.
    pub fn clamp_target(&self, requested: usize) -> usize {
        requested.clamp(self.min_pitches, self.max_pitches)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/tracker.toml` relative to the
/// given `base_dir`.
///
/// Does not seed anything; `load_config` does that first.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    let file: TrackerFile = toml::from_str(text)?;
    Ok(Config {
        roster: file.roster,
        training: file.training,
        db_path: file.database.path,
    })
}

/// Seed `config/tracker.toml` from `defaults/tracker.toml` when it is missing.
/// Returns the seeded path, or `None` when a copy already exists; an existing
/// copy is never overwritten.
pub fn seed_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }
    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::NoConfig {
            base: base_dir.to_path_buf(),
        });
    }

    let config_dir = base_dir.join("config");
    std::fs::create_dir_all(&config_dir).map_err(|source| ConfigError::SeedFailed {
        path: config_dir.clone(),
        source,
    })?;
    std::fs::copy(&source, &target).map_err(|source| ConfigError::SeedFailed {
        path: target.clone(),
        source,
    })?;
    Ok(Some(target))
}

/// Load config relative to the working directory, seeding it on first run.
pub fn load_config() -> Result<Config, ConfigError> {
    let base = std::env::current_dir().map_err(ConfigError::WorkingDir)?;
    seed_config(&base)?;
    load_config_from(&base)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let roster = &config.roster;
    let training = &config.training;

    let positive_fields: &[(&str, usize)] = &[
        ("roster.max_teams", roster.max_teams),
        ("roster.max_pitchers_per_team", roster.max_pitchers_per_team),
        ("training.min_pitches", training.min_pitches),
        ("training.max_pitches", training.max_pitches),
        ("training.notes_max_chars", training.notes_max_chars),
    ];
    for (name, val) in positive_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    if roster.daily_pitch_budget <= 0 {
        return Err(ConfigError::ValidationError {
            field: "roster.daily_pitch_budget".into(),
            message: format!("must be > 0, got {}", roster.daily_pitch_budget),
        });
    }

    if training.min_pitches > training.max_pitches {
        return Err(ConfigError::ValidationError {
            field: "training.min_pitches".into(),
            message: format!(
                "must not exceed training.max_pitches ({} > {})",
                training.min_pitches, training.max_pitches
            ),
        });
    }

    let range = training.min_pitches..=training.max_pitches;
    if !range.contains(&training.default_target) {
        return Err(ConfigError::ValidationError {
            field: "training.default_target".into(),
            message: format!(
                "must be between {} and {} inclusive, got {}",
                training.min_pitches, training.max_pitches, training.default_target
            ),
        });
    }
    if !range.contains(&training.advisory_at) {
        return Err(ConfigError::ValidationError {
            field: "training.advisory_at".into(),
            message: format!(
                "must be between {} and {} inclusive, got {}",
                training.min_pitches, training.max_pitches, training.advisory_at
            ),
        });
    }

    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    /// Helper: returns the path to the pitch-tracker project root
    /// (works whether `cargo test` runs from the crate root or repo root).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("pitch-tracker/defaults").exists() {
            cwd.join("pitch-tracker")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    /// Helper: fresh temp dir with a config/ subdirectory.
    fn temp_base(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(format!("{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        tmp
    }

    fn default_text() -> String {
        fs::read_to_string(project_root().join("defaults/tracker.toml")).unwrap()
    }

    #[test]
    fn defaults_file_matches_builtin_defaults() {
        let config = parse_config(&default_text()).expect("defaults should parse");
        assert_eq!(config, Config::default());
        validate(&config).expect("defaults should validate");
    }

    #[test]
    fn load_copies_defaults_then_parses() {
        let tmp = temp_base("tracker_config_copy");
        fs::remove_dir_all(tmp.join("config")).unwrap();
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults/tracker.toml"), default_text()).unwrap();

        let seeded = seed_config(&tmp).unwrap();
        assert_eq!(seeded, Some(tmp.join("config/tracker.toml")));

        // Second call leaves the existing copy alone.
        assert_eq!(seed_config(&tmp).unwrap(), None);

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.roster.max_teams, 5);
        assert_eq!(config.training.max_pitches, 60);
        assert_eq!(config.db_path, "pitch-tracker.db");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_reports_path() {
        let tmp = temp_base("tracker_config_missing");
        let err = load_config_from(&tmp).unwrap_err();
        match err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("tracker.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_defaults_and_config_is_an_error() {
        let tmp = std::env::temp_dir().join(format!("tracker_config_empty_{}", std::process::id()));
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        match seed_config(&tmp) {
            Err(ConfigError::NoConfig { base }) => assert_eq!(base, tmp),
            other => panic!("expected NoConfig, got: {other:?}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn seeding_keeps_an_edited_config() {
        let tmp = temp_base("tracker_config_edited");
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults/tracker.toml"), default_text()).unwrap();
        let edited = default_text().replace("max_teams = 5", "max_teams = 3");
        fs::write(tmp.join("config/tracker.toml"), &edited).unwrap();

        assert_eq!(seed_config(&tmp).unwrap(), None);
        assert_eq!(fs::read_to_string(tmp.join("config/tracker.toml")).unwrap(), edited);
        assert_eq!(load_config_from(&tmp).unwrap().roster.max_teams, 3);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let tmp = temp_base("tracker_config_malformed");
        fs::write(tmp.join("config/tracker.toml"), "[roster\nmax_teams = ").unwrap();
        assert!(matches!(load_config_from(&tmp), Err(ConfigError::ParseError { .. })));
        let _ = fs::remove_dir_all(&tmp);
    }

    fn expect_field_error(name: &str, from: &str, to: &str, field: &str) {
        let tmp = temp_base(name);
        let modified = default_text().replace(from, to);
        assert_ne!(modified, default_text(), "replacement did not apply");
        fs::write(tmp.join("config/tracker.toml"), modified).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field: f, .. } => assert_eq!(f, field),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_max_teams() {
        expect_field_error(
            "tracker_config_zero_teams",
            "max_teams = 5",
            "max_teams = 0",
            "roster.max_teams",
        );
    }

    #[test]
    fn rejects_non_positive_budget() {
        expect_field_error(
            "tracker_config_budget",
            "daily_pitch_budget = 85",
            "daily_pitch_budget = 0",
            "roster.daily_pitch_budget",
        );
    }

    #[test]
    fn rejects_min_above_max() {
        expect_field_error(
            "tracker_config_min_max",
            "min_pitches = 15",
            "min_pitches = 70",
            "training.min_pitches",
        );
    }

    #[test]
    fn rejects_advisory_outside_range() {
        expect_field_error(
            "tracker_config_advisory",
            "advisory_at = 45",
            "advisory_at = 61",
            "training.advisory_at",
        );
    }

    #[test]
    fn rejects_target_outside_range() {
        expect_field_error(
            "tracker_config_target",
            "default_target = 25",
            "default_target = 10",
            "training.default_target",
        );
    }

    #[test]
    fn clamp_target_to_session_bounds() {
        let limits = TrainingLimits::default();
        assert_eq!(limits.clamp_target(5), 15);
        assert_eq!(limits.clamp_target(30), 30);
        assert_eq!(limits.clamp_target(100), 60);
    }
}
