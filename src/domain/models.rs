use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Side of the board a player had in one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "white" => Ok(Color::White),
            "black" => Ok(Color::Black),
            other => Err(format!("unknown color: {other}")),
        }
    }
}

/// A player and the color they played inside one match.
///
/// Together with the match identifier this is the unit of classification
/// work. Usernames are stored lower-cased; the persisted form is
/// `"username:color"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerColor {
    pub username: String,
    pub color: Color,
}

impl PlayerColor {
    pub fn new(username: &str, color: Color) -> Self {
        Self {
            username: username.trim().to_lowercase(),
            color,
        }
    }

    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.username, self.color)
    }
}

impl FromStr for PlayerColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (username, color) = s
            .split_once(':')
            .ok_or_else(|| format!("player key without color: {s}"))?;

        if username.trim().is_empty() {
            return Err(format!("player key without username: {s}"));
        }

        Ok(Self::new(username, color.parse()?))
    }
}

impl TryFrom<String> for PlayerColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlayerColor> for String {
    fn from(value: PlayerColor) -> Self {
        value.key()
    }
}

// --- League data set (read-only input) ---

/// Root of `leagueData.json` as produced by the ingestion pipeline
#[derive(Debug, Default, Deserialize)]
pub struct LeagueData {
    #[serde(default)]
    pub leagues: BTreeMap<String, League>,
}

impl LeagueData {
    /// Every match record in the data set with its league and sub-league names
    pub fn matches(&self) -> impl Iterator<Item = (&str, &str, &MatchRecord)> {
        self.leagues.iter().flat_map(|(league_name, league)| {
            league.sub_leagues.iter().flat_map(move |(sub_name, sub)| {
                sub.rounds
                    .iter()
                    .map(move |record| (league_name.as_str(), sub_name.as_str(), record))
            })
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    #[serde(default)]
    pub sub_leagues: BTreeMap<String, SubLeague>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubLeague {
    #[serde(default, alias = "matches")]
    pub rounds: Vec<MatchRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Open,
    InProgress,
    Finished,
    #[default]
    #[serde(other)]
    Unknown,
}

impl MatchStatus {
    /// Games exist only once a match has started
    pub fn has_started(&self) -> bool {
        matches!(self, MatchStatus::InProgress | MatchStatus::Finished)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchResult {
    #[serde(default)]
    pub result: Option<String>,
}

/// One team match (a "round") inside a sub-league
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub match_url: Option<String>,
    #[serde(default)]
    pub match_id: Option<String>,
    #[serde(default)]
    pub match_web_url: Option<String>,
    #[serde(default)]
    pub match_result: Option<MatchResult>,
    #[serde(default)]
    /// Only emptiness matters; per-player values are kept opaque
    pub player_stats: Option<BTreeMap<String, serde_json::Value>>,
}

impl MatchRecord {
    /// Stable identifier of the match: its API URL, or its id when the URL is absent
    pub fn identifier(&self) -> Option<&str> {
        self.match_url
            .as_deref()
            .or(self.match_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn result_text(&self) -> String {
        self.match_result
            .as_ref()
            .and_then(|r| r.result.as_deref())
            .unwrap_or_default()
            .to_lowercase()
    }

    /// True when the match was decided without any game being played:
    /// a forfeit/walkover, or a finished match with no player statistics.
    pub fn has_no_games(&self) -> bool {
        if self.result_text().contains("forfeit") {
            return true;
        }

        self.status == MatchStatus::Finished
            && self.player_stats.as_ref().is_some_and(|stats| stats.is_empty())
    }
}

/// Where a match lives in the data set, carried along with every candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchContext {
    pub league: String,
    pub sub_league: String,
    pub match_url: String,
    pub match_web_url: Option<String>,
}

impl MatchContext {
    pub fn new(league: &str, sub_league: &str, match_url: &str, record: &MatchRecord) -> Self {
        Self {
            league: league.to_string(),
            sub_league: sub_league.to_string(),
            match_url: match_url.to_string(),
            match_web_url: record.match_web_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_color_key_roundtrip() {
        let player = PlayerColor::new("Alice", Color::White);
        assert_eq!(player.key(), "alice:white");

        let parsed: PlayerColor = "Bob:black".parse().unwrap();
        assert_eq!(parsed, PlayerColor::new("bob", Color::Black));

        assert!("nocolor".parse::<PlayerColor>().is_err());
        assert!("carol:green".parse::<PlayerColor>().is_err());
        assert!(":white".parse::<PlayerColor>().is_err());
    }

    #[test]
    fn test_league_data_accepts_rounds_and_matches() {
        let json = r#"{
            "leagues": {
                "Open League": {
                    "subLeagues": {
                        "A": { "rounds": [ { "status": "finished", "matchUrl": "m1" } ] },
                        "B": { "matches": [ { "status": "registered", "matchId": "m2" } ] }
                    }
                }
            }
        }"#;

        let data: LeagueData = serde_json::from_str(json).unwrap();
        let matches: Vec<_> = data.matches().collect();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].1, "A");
        assert_eq!(matches[0].2.status, MatchStatus::Finished);
        assert_eq!(matches[1].2.status, MatchStatus::Unknown);
        assert_eq!(matches[1].2.identifier(), Some("m2"));
    }

    #[test]
    fn test_no_games_detection() {
        let forfeit: MatchRecord = serde_json::from_str(
            r#"{ "status": "in_progress", "matchResult": { "result": "Won by Forfeit" } }"#,
        )
        .unwrap();
        assert!(forfeit.has_no_games());

        let empty_finished: MatchRecord =
            serde_json::from_str(r#"{ "status": "finished", "playerStats": {} }"#).unwrap();
        assert!(empty_finished.has_no_games());

        let empty_in_progress: MatchRecord =
            serde_json::from_str(r#"{ "status": "in_progress", "playerStats": {} }"#).unwrap();
        assert!(!empty_in_progress.has_no_games());

        let played: MatchRecord = serde_json::from_str(
            r#"{ "status": "finished", "matchResult": { "result": "win" },
                 "playerStats": { "alice": { "games": 2, "wins": 1, "losses": 1 } } }"#,
        )
        .unwrap();
        assert!(!played.has_no_games());
    }

    #[test]
    fn test_irregular_player_stats_still_load() {
        let record: MatchRecord = serde_json::from_str(
            r#"{ "status": "finished",
                 "playerStats": { "alice": { "games": "two", "wins": -1 }, "bob": null } }"#,
        )
        .unwrap();

        assert_eq!(record.player_stats.as_ref().map(BTreeMap::len), Some(2));
        assert!(!record.has_no_games());
    }
}
