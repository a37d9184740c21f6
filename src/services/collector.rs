use log::{debug, info, warn};
use std::collections::BTreeMap;

use crate::api::{RemoteFetcher, TeamPlayer};
use crate::cache::{MatchFootprint, ResolutionCache};
use crate::domain::{LeagueData, MatchContext, MatchRecord, PlayerColor};

type BoardAssignment = (PlayerColor, Option<String>);

/// A player/color whose game still has to be looked up on a board
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub player: PlayerColor,
    pub context: MatchContext,
}

impl Candidate {
    pub fn match_id(&self) -> &str {
        &self.context.match_url
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub matches_scanned: usize,
    pub matches_cached: usize,
    pub matches_auto_resolved: usize,
    pub details_fetched: usize,
    pub details_reused: usize,
    pub details_failed: usize,
}

/// Work for the classifier plus what promotion needs to know
#[derive(Debug, Default)]
pub struct WorkPlan {
    /// Board URL → outstanding candidates on that board
    pub boards: BTreeMap<String, Vec<Candidate>>,
    /// Match identifier → every player/color discovered this run
    pub footprints: BTreeMap<String, MatchFootprint>,
    pub stats: CollectionStats,
}

impl WorkPlan {
    pub fn candidate_count(&self) -> usize {
        self.boards.values().map(Vec::len).sum()
    }
}

/// Walks the league data set and works out which boards need a fetch
pub struct CandidateCollector {
    club_id: String,
}

impl CandidateCollector {
    pub fn new(club_id: &str) -> Self {
        Self {
            club_id: club_id.to_string(),
        }
    }

    pub async fn collect<F>(
        &self,
        data: &LeagueData,
        cache: &mut ResolutionCache,
        fetcher: &mut F,
    ) -> WorkPlan
    where
        F: RemoteFetcher + ?Sized,
    {
        let mut plan = WorkPlan::default();

        for (league, sub_league, record) in data.matches() {
            if !record.status.has_started() {
                continue;
            }

            let Some(match_id) = record.identifier() else {
                debug!("Skipping match without identifier in {} / {}", league, sub_league);
                continue;
            };
            plan.stats.matches_scanned += 1;

            if cache.is_match_resolved(match_id) {
                debug!("Skipping fully-cached match: {}", match_id);
                plan.stats.matches_cached += 1;
                continue;
            }

            if record.has_no_games() {
                info!(
                    "Auto-resolving no-games match: {} (result: {})",
                    match_id,
                    Self::describe_result(record)
                );
                cache.mark_match_resolved(match_id);
                plan.stats.matches_auto_resolved += 1;
                continue;
            }

            let Some(assignments) = self
                .board_assignments(match_id, cache, fetcher, &mut plan.stats)
                .await
            else {
                continue;
            };

            let context = MatchContext::new(league, sub_league, match_id, record);
            Self::enqueue(&mut plan, cache, &context, assignments);
        }

        info!(
            "Collected {} candidate(s) on {} board(s) from {} match(es)",
            plan.candidate_count(),
            plan.boards.len(),
            plan.footprints.len()
        );
        plan
    }

    /// Player → board assignments of a match, from the cached index or a detail fetch.
    ///
    /// `None` leaves the match untouched until the next run.
    async fn board_assignments<F>(
        &self,
        match_id: &str,
        cache: &mut ResolutionCache,
        fetcher: &mut F,
        stats: &mut CollectionStats,
    ) -> Option<Vec<BoardAssignment>>
    where
        F: RemoteFetcher + ?Sized,
    {
        if let Some(index) = cache.boards_for_match(match_id) {
            debug!("Using cached board map for match {}", match_id);
            stats.details_reused += 1;
            return Some(
                index
                    .iter()
                    .map(|(player, board)| (player.clone(), Some(board.clone())))
                    .collect(),
            );
        }

        let detail = match fetcher.fetch_match(match_id).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!("Failed to fetch match detail {}: {}; will retry next run", match_id, e);
                stats.details_failed += 1;
                return None;
            }
        };
        stats.details_fetched += 1;

        let Some(team) = detail.team_for_club(&self.club_id) else {
            warn!("Could not identify club {} in match {}; skipping", self.club_id, match_id);
            return None;
        };

        let assignments: Vec<BoardAssignment> = team
            .players
            .iter()
            .flat_map(TeamPlayer::recorded_games)
            .collect();

        Self::cache_board_index(match_id, &assignments, cache);
        Some(assignments)
    }

    /// The index is only cached when complete, otherwise later runs would
    /// never rediscover the players that lacked a board URL.
    fn cache_board_index(
        match_id: &str,
        assignments: &[BoardAssignment],
        cache: &mut ResolutionCache,
    ) {
        if assignments.iter().any(|(_, board)| board.is_none()) {
            warn!("Match {} has games without a board URL; board map not cached", match_id);
            return;
        }

        for (player, board) in assignments {
            if let Some(board_url) = board {
                cache.record_board_for_pmc(match_id, player, board_url);
            }
        }
    }

    fn enqueue(
        plan: &mut WorkPlan,
        cache: &mut ResolutionCache,
        context: &MatchContext,
        assignments: Vec<BoardAssignment>,
    ) {
        let match_id = context.match_url.as_str();
        let footprint = plan
            .footprints
            .entry(match_id.to_string())
            .or_insert_with(MatchFootprint::default);

        for (player, board) in assignments {
            footprint.players.insert(player.clone());

            let Some(board_url) = board else {
                debug!("No board URL for {} in match {}", player, match_id);
                continue;
            };
            footprint.boards.insert(board_url.clone());

            if cache.is_pmc_resolved(match_id, &player) {
                debug!("Skipping already-done player {} in match {}", player, match_id);
                continue;
            }

            if cache.is_board_resolved(&board_url) {
                debug!("Board {} already resolved; marking {} done", board_url, player);
                cache.mark_pmc_resolved(match_id, &player);
                continue;
            }

            plan.boards.entry(board_url).or_default().push(Candidate {
                player,
                context: context.clone(),
            });
        }
    }

    fn describe_result(record: &MatchRecord) -> String {
        let result = record.result_text();
        if result.is_empty() {
            "empty playerStats".to_string()
        } else {
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BoardDetail, MatchDetail};
    use crate::errors::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    #[derive(Default)]
    struct StubFetcher {
        matches: HashMap<String, serde_json::Value>,
        calls: Vec<String>,
    }

    #[async_trait]
    impl RemoteFetcher for StubFetcher {
        async fn fetch_match(&mut self, url: &str) -> Result<MatchDetail, FetchError> {
            self.calls.push(url.to_string());
            match self.matches.get(url) {
                Some(value) => Ok(serde_json::from_value(value.clone()).unwrap()),
                None => Err(FetchError::from_status(url, 404)),
            }
        }

        async fn fetch_board(&mut self, url: &str) -> Result<BoardDetail, FetchError> {
            self.calls.push(url.to_string());
            Err(FetchError::from_status(url, 404))
        }
    }

    fn league_data(rounds: serde_json::Value) -> LeagueData {
        serde_json::from_value(serde_json::json!({
            "leagues": { "League": { "subLeagues": { "A": { "rounds": rounds } } } }
        }))
        .unwrap()
    }

    fn match_detail(players: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "teams": {
                "team1": { "@id": "https://api.chess.com/pub/club/club", "players": players },
                "team2": { "@id": "https://api.chess.com/pub/club/rivals", "players": [] }
            }
        })
    }

    #[tokio::test]
    async fn test_collects_candidates_and_caches_board_index() {
        let data = league_data(serde_json::json!([
            { "status": "finished", "matchUrl": "m1", "matchWebUrl": "w1",
              "playerStats": { "alice": { "games": 2 } } },
            { "status": "open", "matchUrl": "m2" }
        ]));
        let mut fetcher = StubFetcher::default();
        fetcher.matches.insert(
            "m1".to_string(),
            match_detail(serde_json::json!([
                { "username": "Alice", "board": "b1",
                  "played_as_white": "resigned", "played_as_black": "win" }
            ])),
        );

        let mut cache = ResolutionCache::default();
        let collector = CandidateCollector::new("club");
        let plan = collector.collect(&data, &mut cache, &mut fetcher).await;

        assert_eq!(fetcher.calls, vec!["m1"]);
        assert_eq!(plan.candidate_count(), 2);
        assert_eq!(plan.boards["b1"][0].context.match_web_url.as_deref(), Some("w1"));
        assert_eq!(plan.footprints["m1"].players.len(), 2);
        assert_eq!(plan.footprints["m1"].boards.len(), 1);
        assert_eq!(cache.boards_for_match("m1").unwrap().len(), 2);

        // second pass reuses the cached index
        let plan = collector.collect(&data, &mut cache, &mut fetcher).await;
        assert_eq!(fetcher.calls.len(), 1);
        assert_eq!(plan.stats.details_reused, 1);
        assert_eq!(plan.candidate_count(), 2);
    }

    #[tokio::test]
    async fn test_resolved_players_are_expected_but_not_enqueued() {
        let data = league_data(serde_json::json!([
            { "status": "in_progress", "matchUrl": "m1" }
        ]));
        let mut cache = ResolutionCache::default();
        cache.record_board_for_pmc("m1", &"alice:white".parse().unwrap(), "b1");
        cache.record_board_for_pmc("m1", &"bob:white".parse().unwrap(), "b2");
        cache.record_board_for_pmc("m1", &"carol:white".parse().unwrap(), "b3");
        cache.mark_pmc_resolved("m1", &"alice:white".parse().unwrap());
        cache.mark_board_resolved("b2");

        let mut fetcher = StubFetcher::default();
        let plan = CandidateCollector::new("club")
            .collect(&data, &mut cache, &mut fetcher)
            .await;

        assert!(fetcher.calls.is_empty());
        assert_eq!(plan.footprints["m1"].players.len(), 3);
        assert_eq!(plan.boards.keys().collect::<Vec<_>>(), vec!["b3"]);
        assert!(cache.is_pmc_resolved("m1", &"bob:white".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_failed_or_foreign_detail_commits_nothing() {
        let data = league_data(serde_json::json!([
            { "status": "finished", "matchUrl": "missing" },
            { "status": "finished", "matchUrl": "foreign" }
        ]));
        let mut fetcher = StubFetcher::default();
        fetcher.matches.insert(
            "foreign".to_string(),
            serde_json::json!({
                "teams": { "t": { "@id": "https://api.chess.com/pub/club/other" } }
            }),
        );

        let mut cache = ResolutionCache::default();
        let plan = CandidateCollector::new("club")
            .collect(&data, &mut cache, &mut fetcher)
            .await;

        assert_eq!(plan.stats.details_failed, 1);
        assert_eq!(plan.stats.details_fetched, 1);
        assert!(plan.footprints.is_empty());
        assert_eq!(cache, ResolutionCache::default());
    }

    #[tokio::test]
    async fn test_forfeit_resolves_without_fetch() {
        let data = league_data(serde_json::json!([
            { "status": "finished", "matchUrl": "m1",
              "matchResult": { "result": "forfeit" }, "playerStats": {} }
        ]));
        let mut cache = ResolutionCache::default();
        let mut fetcher = StubFetcher::default();

        let plan = CandidateCollector::new("club")
            .collect(&data, &mut cache, &mut fetcher)
            .await;

        assert!(fetcher.calls.is_empty());
        assert_eq!(plan.stats.matches_auto_resolved, 1);
        assert!(cache.is_match_resolved("m1"));
    }

    #[tokio::test]
    async fn test_missing_board_url_keeps_index_uncached() {
        let data = league_data(serde_json::json!([
            { "status": "finished", "matchUrl": "m1" }
        ]));
        let mut fetcher = StubFetcher::default();
        fetcher.matches.insert(
            "m1".to_string(),
            match_detail(serde_json::json!([
                { "username": "alice", "board": "b1", "played_as_white": "win" },
                { "username": "bob", "played_as_black": "win" }
            ])),
        );

        let mut cache = ResolutionCache::default();
        let plan = CandidateCollector::new("club")
            .collect(&data, &mut cache, &mut fetcher)
            .await;

        assert!(cache.boards_for_match("m1").is_none());
        assert_eq!(plan.footprints["m1"].players.len(), 2);
        assert_eq!(plan.candidate_count(), 1);
    }
}
