use serde::Deserialize;
use std::collections::BTreeMap;

use crate::domain::{Color, PlayerColor};

// --- Match detail (`/pub/match/<id>`) ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchDetail {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub teams: BTreeMap<String, TeamDetail>,
}

impl MatchDetail {
    /// The team whose `@id` URL ends in `club_id`
    pub fn team_for_club(&self, club_id: &str) -> Option<&TeamDetail> {
        self.teams
            .values()
            .find(|team| team.club_slug().eq_ignore_ascii_case(club_id.trim()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamDetail {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub players: Vec<TeamPlayer>,
}

impl TeamDetail {
    /// Last path segment of the club URL, e.g. `team-usa` for `.../pub/club/team-usa`
    pub fn club_slug(&self) -> &str {
        self.id.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamPlayer {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub played_as_white: Option<String>,
    #[serde(default)]
    pub played_as_black: Option<String>,
}

impl TeamPlayer {
    /// Colors this player has a recorded game for, each with the player's board URL
    pub fn recorded_games(&self) -> Vec<(PlayerColor, Option<String>)> {
        if self.username.trim().is_empty() {
            return Vec::new();
        }

        Color::ALL
            .into_iter()
            .filter(|color| self.outcome(*color).is_some())
            .map(|color| {
                let board = self.board.clone().filter(|url| !url.is_empty());
                (PlayerColor::new(&self.username, color), board)
            })
            .collect()
    }

    pub fn outcome(&self, color: Color) -> Option<&str> {
        let outcome = match color {
            Color::White => self.played_as_white.as_deref(),
            Color::Black => self.played_as_black.as_deref(),
        };
        outcome.filter(|code| !code.is_empty())
    }
}

// --- Board detail (`/pub/match/<id>/<board>`) ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardDetail {
    #[serde(default)]
    pub games: Vec<BoardGame>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardGame {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pgn: Option<String>,
    #[serde(default)]
    pub white: Option<GameSide>,
    #[serde(default)]
    pub black: Option<GameSide>,
}

impl BoardGame {
    pub fn side(&self, color: Color) -> Option<&GameSide> {
        match color {
            Color::White => self.white.as_ref(),
            Color::Black => self.black.as_ref(),
        }
    }

    /// The side `player` played in this game, if they played their color here
    pub fn side_of(&self, player: &PlayerColor) -> Option<&GameSide> {
        self.side(player.color)
            .filter(|side| side.username.eq_ignore_ascii_case(&player.username))
    }

    pub fn pgn(&self) -> &str {
        self.pgn.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameSide {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub result: Option<String>,
}

impl GameSide {
    /// Lower-cased result code of this side, empty while the game is running
    pub fn result_code(&self) -> String {
        self.result.as_deref().unwrap_or_default().trim().to_lowercase()
    }
}
