use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const LEAGUE_CONFIG_FILE: &str = "league_config.json";
const SCRIPT_PARAMS_FILE: &str = "script_params.json";

/// Per-site locations under the project root:
/// `config/<site>/` for settings and `public/data/<site>/` for data files
#[derive(Debug, Clone, PartialEq)]
pub struct SitePaths {
    pub site_key: String,
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl SitePaths {
    pub fn new(project_root: &Path, site_key: &str) -> Result<Self> {
        validate_site_key(site_key)?;

        Ok(Self {
            site_key: site_key.to_string(),
            config_dir: project_root.join("config").join(site_key),
            data_dir: project_root.join("public").join("data").join(site_key),
        })
    }
}

/// `config/<site>/league_config.json`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueConfig {
    #[serde(default)]
    pub club_id: String,
}

/// `config/<site>/script_params.json` (optional)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptParams {
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Load the site's league config; the club id is required
pub fn load_league_config(paths: &SitePaths) -> Result<LeagueConfig> {
    let path = paths.config_dir.join(LEAGUE_CONFIG_FILE);
    if !path.exists() {
        bail!(
            "{} not found for site {}: {}",
            LEAGUE_CONFIG_FILE,
            paths.site_key,
            path.display()
        );
    }

    let config: LeagueConfig = read_json(&path)?;
    if config.club_id.trim().is_empty() {
        bail!("clubId missing from {} for site {}", LEAGUE_CONFIG_FILE, paths.site_key);
    }

    Ok(config)
}

pub fn load_script_params(paths: &SitePaths) -> Result<ScriptParams> {
    let path = paths.config_dir.join(SCRIPT_PARAMS_FILE);
    if !path.exists() {
        return Ok(ScriptParams::default());
    }
    read_json(&path)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

fn validate_site_key(site_key: &str) -> Result<()> {
    let valid = !site_key.is_empty()
        && site_key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !valid {
        bail!("Invalid site key: {:?}", site_key);
    }
    Ok(())
}
