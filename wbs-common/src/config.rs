//! Configuration loading and credential resolution
//!
//! The people directory, status partition table, and business area list are
//! explicit configuration, resolved once at startup and passed into the
//! item builder and classifier by reference. No lookup table lives in
//! process-wide state.

use crate::model::{StatusGroup, UNASSIGNED};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Environment variable carrying the Notion integration secret
pub const API_KEY_ENV: &str = "WBS_NOTION_API_KEY";

/// Environment variable overriding the configured database id
pub const DATABASE_ID_ENV: &str = "WBS_DATABASE_ID";

/// Environment variable pointing at an alternate config file
pub const CONFIG_PATH_ENV: &str = "WBS_SYNC_CONFIG";

/// On-disk TOML configuration schema
///
/// Every field is optional with a usable default, so a missing or partial
/// file degrades rather than terminating. Only the credential and database
/// id are ultimately required, and both may come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Notion integration secret (environment takes priority)
    pub api_key: Option<String>,
    /// Source database id (environment takes priority)
    pub database_id: Option<String>,
    /// Notion user id -> display name
    pub people: HashMap<Uuid, String>,
    /// Free-text status label partition
    pub status_groups: StatusPartition,
    /// Top-level categories classified as `WbsType::Management`
    pub management_categories: Vec<String>,
    /// Business areas echoed into snapshot metadata
    pub business_areas: Vec<String>,
    pub output: OutputConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            database_id: None,
            people: HashMap::new(),
            status_groups: StatusPartition::default(),
            management_categories: vec![
                "Project Management/Governance".to_string(),
                "Milestone".to_string(),
            ],
            business_areas: Vec::new(),
            output: OutputConfig::default(),
        }
    }
}

/// Snapshot and fingerprint file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub snapshot_path: PathBuf,
    pub fingerprint_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("data/wbs-data.json"),
            fingerprint_path: PathBuf::from("data/.wbs-fingerprint"),
        }
    }
}

/// Partition of the source's free-text status vocabulary into the three
/// coarse groups
///
/// Labels match exactly (no case folding). A label found in no list, and an
/// empty or absent label, classifies into `fallback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusPartition {
    pub to_do: Vec<String>,
    pub in_progress: Vec<String>,
    pub complete: Vec<String>,
    /// Group for unrecognized, empty, and absent labels
    pub fallback: StatusGroup,
}

impl Default for StatusPartition {
    fn default() -> Self {
        fn labels(names: &[&str]) -> Vec<String> {
            names.iter().map(|n| n.to_string()).collect()
        }
        Self {
            to_do: labels(&["Not started", "Waiting"]),
            in_progress: labels(&[
                "In progress",
                "Coordinating",
                "Contract in progress",
                "Drafting",
                "Responding",
                "Procurement",
                "Contracted",
                "Build",
                "Disbursement",
                "Testing",
            ]),
            complete: labels(&[
                "Done",
                "Contract complete",
                "Draft complete",
                "Approved",
                "Work complete",
                "Closed",
                "Suspended",
            ]),
            fallback: StatusGroup::ToDo,
        }
    }
}

impl StatusPartition {
    /// Collapse a free-text status label into its coarse group
    pub fn classify(&self, label: &str) -> StatusGroup {
        let label = label.trim();
        if label.is_empty() {
            return self.fallback;
        }
        if self.to_do.iter().any(|l| l == label) {
            StatusGroup::ToDo
        } else if self.in_progress.iter().any(|l| l == label) {
            StatusGroup::InProgress
        } else if self.complete.iter().any(|l| l == label) {
            StatusGroup::Complete
        } else {
            self.fallback
        }
    }
}

/// Notion user id -> display name lookup for person references
#[derive(Debug, Clone, Default)]
pub struct PeopleDirectory {
    names: HashMap<Uuid, String>,
}

impl PeopleDirectory {
    pub fn new(names: HashMap<Uuid, String>) -> Self {
        Self { names }
    }

    /// Resolve a raw person reference to a display name
    ///
    /// Falls back to the inline name the source attached to the reference,
    /// then to the `"unassigned"` sentinel.
    pub fn resolve(&self, id: &str, inline_name: Option<&str>) -> String {
        if let Ok(user_id) = Uuid::parse_str(id) {
            if let Some(name) = self.names.get(&user_id) {
                return name.clone();
            }
        }
        inline_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| UNASSIGNED.to_string())
    }
}

/// Fully-resolved runtime configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub api_key: String,
    pub database_id: String,
    pub people: PeopleDirectory,
    pub status_groups: StatusPartition,
    pub management_categories: Vec<String>,
    pub business_areas: Vec<String>,
    pub snapshot_path: PathBuf,
    pub fingerprint_path: PathBuf,
}

impl SyncConfig {
    /// Resolve configuration from the TOML file and environment
    ///
    /// Credential resolution fails before any network call is attempted.
    pub fn resolve(cli_config: Option<&Path>) -> Result<Self> {
        let toml_config = load_toml_config(cli_config)?;
        let api_key = resolve_api_key(&toml_config)?;
        let database_id = resolve_database_id(&toml_config)?;
        Ok(Self {
            api_key,
            database_id,
            people: PeopleDirectory::new(toml_config.people),
            status_groups: toml_config.status_groups,
            management_categories: toml_config.management_categories,
            business_areas: toml_config.business_areas,
            snapshot_path: toml_config.output.snapshot_path,
            fingerprint_path: toml_config.output.fingerprint_path,
        })
    }
}

/// Load the TOML config file, degrading to defaults when only the default
/// path is missing
///
/// An explicitly requested file (CLI flag or environment variable) that does
/// not exist or does not parse is a fatal configuration error.
pub fn load_toml_config(cli_config: Option<&Path>) -> Result<TomlConfig> {
    let Some((path, explicit)) = config_file_path(cli_config) else {
        warn!("No config directory available; using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        if explicit {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        warn!(
            "Config file {} not found; using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Config file location: CLI flag, then environment variable, then the
/// platform config directory. The bool marks explicitly-requested paths.
fn config_file_path(cli_config: Option<&Path>) -> Option<(PathBuf, bool)> {
    if let Some(path) = cli_config {
        return Some((path.to_path_buf(), true));
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some((PathBuf::from(path), true));
    }
    dirs::config_dir().map(|dir| (dir.join("wbs-sync").join("config.toml"), false))
}

/// Resolve the Notion API key from 2-tier configuration
///
/// **Priority:** ENV -> TOML
pub fn resolve_api_key(toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config.api_key.clone().filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Notion API key found in both environment and TOML config. \
             Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("Notion API key loaded from environment variable");
        return Ok(key);
    }
    if let Some(key) = toml_key {
        info!("Notion API key loaded from TOML config");
        return Ok(key);
    }

    Err(Error::Config(format!(
        "Notion API key not configured. Please configure using one of:\n\
         1. Environment: {}=secret_xxx\n\
         2. TOML config: api_key = \"secret_xxx\"\n\
         \n\
         Create an integration and obtain a key at: https://www.notion.so/my-integrations",
        API_KEY_ENV
    )))
}

/// Resolve the source database id from 2-tier configuration
///
/// **Priority:** ENV -> TOML
pub fn resolve_database_id(toml_config: &TomlConfig) -> Result<String> {
    let env_id = std::env::var(DATABASE_ID_ENV)
        .ok()
        .filter(|id| !id.trim().is_empty());
    if let Some(id) = env_id {
        info!("Database id loaded from environment variable");
        return Ok(id);
    }
    if let Some(id) = toml_config
        .database_id
        .clone()
        .filter(|id| !id.trim().is_empty())
    {
        return Ok(id);
    }

    Err(Error::Config(format!(
        "Source database id not configured. Set database_id in the config \
         file or export {}.",
        DATABASE_ID_ENV
    )))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
