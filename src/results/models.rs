use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Color, MatchContext, PlayerColor};

pub const RESULTS_FILE: &str = "earlyResignations.json";

/// Persisted history of detected early resignations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    #[serde(default)]
    pub leagues: BTreeMap<String, LeagueResults>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueResults {
    #[serde(default)]
    pub sub_leagues: BTreeMap<String, SubLeagueResults>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubLeagueResults {
    #[serde(default)]
    pub matches: Vec<MatchResults>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResults {
    pub match_url: String,
    #[serde(default)]
    pub match_web_url: Option<String>,
    #[serde(default)]
    pub players: Vec<EarlyResignation>,
}

/// One game a tracked player resigned within the move threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarlyResignation {
    pub username: String,
    pub color: Color,
    pub move_count: u32,
    pub game_reference: String,
    pub board_reference: String,
}

impl EarlyResignation {
    /// Identity of a record inside its match
    pub fn dedup_key(&self) -> (String, Color, String) {
        (
            self.username.to_lowercase(),
            self.color,
            self.game_reference.clone(),
        )
    }

    pub fn player(&self) -> PlayerColor {
        PlayerColor::new(&self.username, self.color)
    }
}

/// A freshly detected early resignation and the match it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub context: MatchContext,
    pub resignation: EarlyResignation,
}

impl ResultSet {
    /// Every (match, player) pair already recorded
    pub fn recorded_players(&self) -> impl Iterator<Item = (&str, PlayerColor)> {
        self.leagues
            .values()
            .flat_map(|league| league.sub_leagues.values())
            .flat_map(|sub| sub.matches.iter())
            .flat_map(|m| {
                m.players
                    .iter()
                    .filter(|p| !p.username.trim().is_empty())
                    .map(move |p| (m.match_url.as_str(), p.player()))
            })
    }

    pub fn record_count(&self) -> usize {
        self.leagues
            .values()
            .flat_map(|league| league.sub_leagues.values())
            .flat_map(|sub| sub.matches.iter())
            .map(|m| m.players.len())
            .sum()
    }
}
