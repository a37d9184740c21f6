use anyhow::Result;
use log::info;

use crate::cli::DetectArgs;
use crate::config::site::{SitePaths, load_league_config, load_script_params};

pub const DEFAULT_USER_AGENT: &str = "ChessLeagueTracker/1.0";

#[derive(Debug, Clone)]
pub struct DetectionSettings {
    /// Max half-move count still considered "early"
    pub threshold: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self { threshold: 2 }
    }
}

#[derive(Debug, Clone)]
pub struct FetcherSettings {
    pub rate_limit_ms: u64,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub retries: u32,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            rate_limit_ms: 200,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 15,
            retries: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Club whose players are tracked
    pub club_id: String,
    pub detection: DetectionSettings,
    pub fetcher: FetcherSettings,
    pub paths: SitePaths,
    pub dry_run: bool,
}

impl AppConfig {
    pub fn new(club_id: &str, paths: SitePaths) -> Self {
        Self {
            club_id: club_id.to_string(),
            detection: DetectionSettings::default(),
            fetcher: FetcherSettings::default(),
            paths,
            dry_run: false,
        }
    }

    /// Resolve the configuration of a `detect` run.
    ///
    /// User agent precedence: flag/env, then script_params.json, then default.
    pub fn from_args(args: &DetectArgs) -> Result<Self> {
        let paths = SitePaths::new(&args.site.project_root, &args.site.site_key)?;
        let league_config = load_league_config(&paths)?;
        let params = load_script_params(&paths)?;

        let user_agent = args
            .user_agent
            .clone()
            .or(params.user_agent)
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let config = Self {
            club_id: league_config.club_id,
            detection: DetectionSettings {
                threshold: args.threshold,
            },
            fetcher: FetcherSettings {
                rate_limit_ms: args.rate_limit_ms,
                user_agent,
                timeout_secs: args.timeout,
                retries: args.retries,
            },
            paths,
            dry_run: args.dry_run,
        };

        info!(
            "Configured site={} club={} threshold={} timeout={}s retries={}",
            config.paths.site_key,
            config.club_id,
            config.detection.threshold,
            config.fetcher.timeout_secs,
            config.fetcher.retries
        );
        Ok(config)
    }
}
