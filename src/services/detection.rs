use anyhow::{Result, anyhow};
use log::info;

use crate::api::RemoteFetcher;
use crate::cache::{DataStore, ResolutionCache};
use crate::config::AppConfig;
use crate::domain::LeagueData;
use crate::results::{RESULTS_FILE, ResultSet};
use crate::services::classifier::ResignationClassifier;
use crate::services::collector::{CandidateCollector, CollectionStats};

pub const LEAGUE_DATA_FILE: &str = "leagueData.json";

/// Counters of one detection run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionSummary {
    pub collection: CollectionStats,
    pub boards_fetched: usize,
    pub boards_skipped: usize,
    pub boards_failed: usize,
    pub players_pending: usize,
    pub records_emitted: usize,
    pub records_appended: usize,
    pub matches_promoted: usize,
}

impl DetectionSummary {
    /// Remote calls issued during the run
    pub fn remote_calls(&self) -> usize {
        self.collection.details_fetched
            + self.collection.details_failed
            + self.boards_fetched
            + self.boards_failed
    }
}

/// One incremental pass over a site's matches
pub struct DetectionService {
    config: AppConfig,
    store: DataStore,
}

impl DetectionService {
    pub fn new(config: AppConfig) -> Self {
        let store = DataStore::new(&config.paths.data_dir);
        Self { config, store }
    }

    pub async fn run<F>(&self, fetcher: &mut F) -> Result<DetectionSummary>
    where
        F: RemoteFetcher + ?Sized,
    {
        info!("=== Starting Early Resignation Detection ===\n");

        let data = self.load_league_data()?;
        let mut results: ResultSet = self.store.load_or_default(RESULTS_FILE);
        let mut cache = ResolutionCache::load(&self.store);
        Self::absorb_recorded(&mut cache, &results);

        // Step 1: Work out which boards still need a look
        info!("Step 1: Collecting candidates...");
        let collector = CandidateCollector::new(&self.config.club_id);
        let plan = collector.collect(&data, &mut cache, fetcher).await;

        // Step 2: Fetch boards and classify games
        info!("Step 2: Classifying games (threshold {})...", self.config.detection.threshold);
        let classifier = ResignationClassifier::new(&self.config.detection)?;
        let report = classifier.run(&plan, &mut cache, fetcher).await;

        // Step 3: Promote fully resolved matches
        info!("Step 3: Promoting resolved matches...");
        let promoted = cache.promote(&plan.footprints);
        info!("  → Promoted {} match(es)\n", promoted.len());

        // Step 4: Merge with the persisted history
        info!("Step 4: Merging results...");
        let records_emitted = report.records.len();
        let records_appended = results.merge_and_stamp(report.records);
        info!("  → {} new record(s), {} total\n", records_appended, results.record_count());

        // Step 5: Persist everything once
        if self.config.dry_run {
            info!("Step 5: Dry run, nothing written");
        } else {
            info!("Step 5: Saving results and cache...");
            self.store.save(RESULTS_FILE, &results)?;
            cache.save(&self.store)?;
        }

        let summary = DetectionSummary {
            collection: plan.stats,
            boards_fetched: report.boards_fetched,
            boards_skipped: report.boards_skipped,
            boards_failed: report.boards_failed,
            players_pending: report.players_pending,
            records_emitted,
            records_appended,
            matches_promoted: promoted.len(),
        };

        info!("=== Detection Complete ===");
        info!("{:?}", summary);
        Ok(summary)
    }

    fn load_league_data(&self) -> Result<LeagueData> {
        self.store.load(LEAGUE_DATA_FILE)?.ok_or_else(|| {
            anyhow!(
                "{} not found for site {}: {}",
                LEAGUE_DATA_FILE,
                self.config.paths.site_key,
                self.store.path(LEAGUE_DATA_FILE).display()
            )
        })
    }

    /// Recorded resignations are settled; never look at them again
    fn absorb_recorded(cache: &mut ResolutionCache, results: &ResultSet) {
        for (match_id, player) in results.recorded_players() {
            cache.mark_pmc_resolved(match_id, &player);
        }
    }
}
