use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::cache::DataStore;
use crate::domain::{Color, PlayerColor};

pub const CACHE_FILE: &str = "early_resignations_cache.json";

/// Everything the current run learned about one match's players.
///
/// Built by the collector; used by [`ResolutionCache::promote`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchFootprint {
    pub players: BTreeSet<PlayerColor>,
    pub boards: BTreeSet<String>,
}

/// Counts per cache tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheSummary {
    pub resolved_players: usize,
    pub matches_with_resolved_players: usize,
    pub resolved_boards: usize,
    pub resolved_matches: usize,
    pub indexed_matches: usize,
}

/// Three-tier memory of prior runs: player-in-match, board, match.
///
/// Entries only move upwards. Once a match is promoted its player and board
/// entries are dropped and the match entry alone answers every lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionCache {
    #[serde(default)]
    resolved_pmc: BTreeMap<String, BTreeSet<PlayerColor>>,
    #[serde(default)]
    resolved_board: BTreeSet<String>,
    #[serde(default)]
    resolved_match: BTreeSet<String>,
    #[serde(default)]
    board_of_pmc: BTreeMap<String, BTreeMap<PlayerColor, String>>,
}

impl ResolutionCache {
    /// Load the cache; a missing or corrupt file yields an empty cache
    pub fn load(store: &DataStore) -> Self {
        store.load_or_default(CACHE_FILE)
    }

    /// Persist with sorted keys; promoted matches carry no lower-tier entries
    pub fn save(&self, store: &DataStore) -> Result<()> {
        store.save(CACHE_FILE, &self.compacted())
    }

    // --- Lookups ---

    pub fn is_match_resolved(&self, match_id: &str) -> bool {
        self.resolved_match.contains(match_id)
    }

    pub fn is_board_resolved(&self, board_url: &str) -> bool {
        self.resolved_board.contains(board_url)
    }

    pub fn is_pmc_resolved(&self, match_id: &str, player: &PlayerColor) -> bool {
        self.is_match_resolved(match_id)
            || self
                .resolved_pmc
                .get(match_id)
                .is_some_and(|players| players.contains(player))
    }

    pub fn is_resolved(&self, match_id: &str, username: &str, color: Color) -> bool {
        self.is_pmc_resolved(match_id, &PlayerColor::new(username, color))
    }

    /// Cached player → board index of a match, if its detail was fetched before
    pub fn boards_for_match(&self, match_id: &str) -> Option<&BTreeMap<PlayerColor, String>> {
        self.board_of_pmc.get(match_id).filter(|boards| !boards.is_empty())
    }

    // --- Updates ---

    pub fn mark_pmc_resolved(&mut self, match_id: &str, player: &PlayerColor) {
        if self.is_match_resolved(match_id) {
            return;
        }

        self.resolved_pmc
            .entry(match_id.to_string())
            .or_default()
            .insert(player.clone());
    }

    pub fn mark_resolved(&mut self, match_id: &str, username: &str, color: Color) {
        self.mark_pmc_resolved(match_id, &PlayerColor::new(username, color));
    }

    pub fn mark_board_resolved(&mut self, board_url: &str) {
        self.resolved_board.insert(board_url.to_string());
    }

    /// Resolve a whole match at once and drop its lower-tier entries
    pub fn mark_match_resolved(&mut self, match_id: &str) {
        let boards = self
            .board_of_pmc
            .get(match_id)
            .map(|index| index.values().cloned().collect::<BTreeSet<_>>())
            .unwrap_or_default();

        self.release_match(match_id, &boards);
        self.resolved_match.insert(match_id.to_string());
    }

    pub fn record_board_for_pmc(&mut self, match_id: &str, player: &PlayerColor, board_url: &str) {
        self.board_of_pmc
            .entry(match_id.to_string())
            .or_default()
            .insert(player.clone(), board_url.to_string());
    }

    /// Promote every match whose known players are all resolved.
    ///
    /// Returns the identifiers of the matches promoted by this call.
    pub fn promote(&mut self, footprints: &BTreeMap<String, MatchFootprint>) -> Vec<String> {
        let mut promoted = Vec::new();

        for (match_id, footprint) in footprints {
            if !self.is_promotable(match_id, footprint) {
                continue;
            }

            let mut boards = footprint.boards.clone();
            if let Some(index) = self.board_of_pmc.get(match_id) {
                boards.extend(index.values().cloned());
            }

            self.release_match(match_id, &boards);
            self.resolved_match.insert(match_id.clone());
            info!("Match fully resolved, promoted: {}", match_id);
            promoted.push(match_id.clone());
        }

        promoted
    }

    pub fn summary(&self) -> CacheSummary {
        CacheSummary {
            resolved_players: self.resolved_pmc.values().map(BTreeSet::len).sum(),
            matches_with_resolved_players: self.resolved_pmc.len(),
            resolved_boards: self.resolved_board.len(),
            resolved_matches: self.resolved_match.len(),
            indexed_matches: self.board_of_pmc.len(),
        }
    }

    // --- Helper Methods ---

    fn is_promotable(&self, match_id: &str, footprint: &MatchFootprint) -> bool {
        if footprint.players.is_empty() || self.is_match_resolved(match_id) {
            return false;
        }

        self.resolved_pmc
            .get(match_id)
            .is_some_and(|resolved| footprint.players.is_subset(resolved))
    }

    fn release_match(&mut self, match_id: &str, boards: &BTreeSet<String>) {
        self.resolved_pmc.remove(match_id);
        self.board_of_pmc.remove(match_id);

        for board_url in boards {
            if self.resolved_board.remove(board_url) {
                debug!("Released board from cache (match complete): {}", board_url);
            }
        }
    }

    fn compacted(&self) -> Self {
        let mut compacted = self.clone();
        let resolved_match = &compacted.resolved_match;

        compacted
            .board_of_pmc
            .retain(|match_id, index| !index.is_empty() && !resolved_match.contains(match_id));
        compacted
            .resolved_pmc
            .retain(|match_id, players| !players.is_empty() && !resolved_match.contains(match_id));
        compacted
    }
}
