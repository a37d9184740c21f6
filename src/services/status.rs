use colored::Colorize;
use std::fmt;

use crate::cache::{CacheSummary, DataStore, ResolutionCache};
use crate::config::SitePaths;
use crate::results::{RESULTS_FILE, ResultSet};

/// What the persisted files of a site currently hold
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub site_key: String,
    pub cache: CacheSummary,
    pub recorded_resignations: usize,
    pub last_updated: Option<String>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", "Site:".bold(), self.site_key)?;
        writeln!(f, "{}", "Resolution cache".bold())?;
        writeln!(f, "  resolved matches:  {}", self.cache.resolved_matches.to_string().green())?;
        writeln!(f, "  resolved boards:   {}", self.cache.resolved_boards)?;
        writeln!(
            f,
            "  resolved players:  {} (in {} unpromoted match(es))",
            self.cache.resolved_players, self.cache.matches_with_resolved_players
        )?;
        writeln!(f, "  indexed matches:   {}", self.cache.indexed_matches)?;
        writeln!(f, "{}", "Early resignations".bold())?;
        writeln!(
            f,
            "  recorded:          {}",
            self.recorded_resignations.to_string().yellow()
        )?;
        write!(
            f,
            "  last updated:      {}",
            self.last_updated.as_deref().unwrap_or("never")
        )
    }
}

/// Read-only view of a site's cache and results
pub struct StatusService {
    paths: SitePaths,
    store: DataStore,
}

impl StatusService {
    pub fn new(paths: SitePaths) -> Self {
        let store = DataStore::new(&paths.data_dir);
        Self { paths, store }
    }

    pub fn report(&self) -> StatusReport {
        let cache = ResolutionCache::load(&self.store);
        let results: ResultSet = self.store.load_or_default(RESULTS_FILE);

        StatusReport {
            site_key: self.paths.site_key.clone(),
            cache: cache.summary(),
            recorded_resignations: results.record_count(),
            last_updated: results.last_updated,
        }
    }

    pub fn run(&self) {
        println!("{}", self.report());
    }
}
