use chrono::{SecondsFormat, Utc};
use log::debug;

use super::models::{MatchResults, ResultRecord, ResultSet};

impl ResultSet {
    /// Append records that are not already present.
    ///
    /// Records are keyed by (league, sub-league, match) and then by
    /// (username, color, game reference) inside the match. Nothing is ever
    /// removed. Returns the number of records appended.
    pub fn merge(&mut self, records: impl IntoIterator<Item = ResultRecord>) -> usize {
        let mut appended = 0;

        for record in records {
            if self.insert(record) {
                appended += 1;
            }
        }

        appended
    }

    /// Merge and refresh `lastUpdated` when anything changed or the set is new
    pub fn merge_and_stamp(&mut self, records: impl IntoIterator<Item = ResultRecord>) -> usize {
        let appended = self.merge(records);

        if appended > 0 || self.last_updated.is_none() {
            self.last_updated = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }

        appended
    }

    fn insert(&mut self, record: ResultRecord) -> bool {
        let ResultRecord {
            context,
            resignation,
        } = record;

        let matches = &mut self
            .leagues
            .entry(context.league)
            .or_default()
            .sub_leagues
            .entry(context.sub_league)
            .or_default()
            .matches;

        let position = matches.iter().position(|m| m.match_url == context.match_url);
        let match_results = match position {
            Some(idx) => &mut matches[idx],
            None => {
                matches.push(MatchResults {
                    match_url: context.match_url,
                    match_web_url: context.match_web_url,
                    players: Vec::new(),
                });
                let last = matches.len() - 1;
                &mut matches[last]
            }
        };

        let key = resignation.dedup_key();
        if match_results.players.iter().any(|p| p.dedup_key() == key) {
            debug!(
                "Skipping already recorded resignation {}:{} in {}",
                resignation.username, resignation.color, match_results.match_url
            );
            return false;
        }

        match_results.players.push(resignation);
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{Color, MatchContext};
    use crate::results::{EarlyResignation, ResultRecord, ResultSet};

    fn record(league: &str, match_url: &str, username: &str, game: &str) -> ResultRecord {
        ResultRecord {
            context: MatchContext {
                league: league.to_string(),
                sub_league: "Division A".to_string(),
                match_url: match_url.to_string(),
                match_web_url: Some(format!("{}/web", match_url)),
            },
            resignation: EarlyResignation {
                username: username.to_string(),
                color: Color::White,
                move_count: 1,
                game_reference: game.to_string(),
                board_reference: "b1".to_string(),
            },
        }
    }

    #[test]
    fn test_merge_creates_hierarchy() {
        let mut results = ResultSet::default();
        let appended = results.merge(vec![
            record("League", "m1", "alice", "g1"),
            record("League", "m1", "bob", "g2"),
            record("Other", "m2", "carol", "g3"),
        ]);

        assert_eq!(appended, 3);
        assert_eq!(results.leagues.len(), 2);

        let matches = &results.leagues["League"].sub_leagues["Division A"].matches;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].players.len(), 2);
        assert_eq!(matches[0].match_web_url.as_deref(), Some("m1/web"));
    }

    #[test]
    fn test_merge_never_duplicates() {
        let mut results = ResultSet::default();
        results.merge(vec![record("League", "m1", "alice", "g1")]);

        let appended = results.merge(vec![
            record("League", "m1", "Alice", "g1"),
            record("League", "m1", "alice", "g1"),
        ]);

        assert_eq!(appended, 0);
        assert_eq!(results.record_count(), 1);
    }

    #[test]
    fn test_merge_keeps_existing_records() {
        let mut results = ResultSet::default();
        results.merge(vec![record("League", "m1", "alice", "g1")]);
        results.merge(vec![record("League", "m1", "alice", "g9")]);

        let players = &results.leagues["League"].sub_leagues["Division A"].matches[0].players;
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].game_reference, "g1");
    }

    #[test]
    fn test_stamp_only_changes_when_something_is_new() {
        let mut results = ResultSet::default();
        results.merge_and_stamp(Vec::new());
        assert!(results.last_updated.is_some());

        results.last_updated = Some("2024-01-01T00:00:00Z".to_string());
        results.merge_and_stamp(vec![]);
        assert_eq!(results.last_updated.as_deref(), Some("2024-01-01T00:00:00Z"));

        results.merge_and_stamp(vec![record("League", "m1", "alice", "g1")]);
        assert_ne!(results.last_updated.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_recorded_players() {
        let mut results = ResultSet::default();
        results.merge(vec![
            record("League", "m1", "Alice", "g1"),
            record("Other", "m2", "bob", "g2"),
        ]);

        let recorded: Vec<_> = results
            .recorded_players()
            .map(|(m, p)| format!("{}/{}", m, p))
            .collect();
        assert_eq!(recorded, vec!["m1/alice:white", "m2/bob:white"]);
    }
}
