use anyhow::Result;
use log::{debug, info, warn};

use crate::api::{BoardDetail, BoardGame, RemoteFetcher};
use crate::cache::ResolutionCache;
use crate::config::DetectionSettings;
use crate::domain::{FetchProgress, MoveCounter};
use crate::results::{EarlyResignation, ResultRecord};
use crate::services::collector::{Candidate, WorkPlan};

/// Result codes after which a side's game can no longer change
pub const DEFINITIVE_RESULTS: [&str; 13] = [
    "win",
    "loss",
    "lose",
    "checkmated",
    "resigned",
    "timeout",
    "abandoned",
    "agreed",
    "stalemate",
    "repetition",
    "insufficient",
    "50move",
    "timevsinsufficient",
];

const RESIGNED: &str = "resigned";

/// What one game tells us about one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Still running within the threshold; look again next run
    Pending,
    /// Settled, not an early resignation
    Resolved,
    /// Settled as the candidate's own resignation within the threshold
    EarlyResignation,
}

impl Verdict {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Verdict::Pending)
    }
}

/// Decide a candidate from their own side's result code and the game's move count
pub fn assess(result_code: &str, move_count: u32, threshold: u32) -> Verdict {
    let definitive = DEFINITIVE_RESULTS.contains(&result_code);
    let above_threshold = move_count > threshold;

    if !definitive && !above_threshold {
        return Verdict::Pending;
    }

    if result_code == RESIGNED && !above_threshold {
        Verdict::EarlyResignation
    } else {
        Verdict::Resolved
    }
}

#[derive(Debug, Default)]
pub struct ClassificationReport {
    pub records: Vec<ResultRecord>,
    pub boards_fetched: usize,
    pub boards_skipped: usize,
    pub boards_failed: usize,
    pub boards_resolved: usize,
    pub players_resolved: usize,
    pub players_pending: usize,
}

#[derive(Debug, Default)]
pub struct BoardOutcome {
    pub records: Vec<ResultRecord>,
    pub resolved: usize,
    pub pending: usize,
}

/// Fetches outstanding boards and settles as many candidates as possible
pub struct ResignationClassifier {
    threshold: u32,
    move_counter: MoveCounter,
}

impl ResignationClassifier {
    pub fn new(settings: &DetectionSettings) -> Result<Self> {
        Ok(Self {
            threshold: settings.threshold,
            move_counter: MoveCounter::new()?,
        })
    }

    pub async fn run<F>(
        &self,
        plan: &WorkPlan,
        cache: &mut ResolutionCache,
        fetcher: &mut F,
    ) -> ClassificationReport
    where
        F: RemoteFetcher + ?Sized,
    {
        let mut report = ClassificationReport::default();
        let mut progress = FetchProgress::new(plan.boards.len());

        for (board_url, candidates) in &plan.boards {
            let outstanding: Vec<&Candidate> = candidates
                .iter()
                .filter(|c| !cache.is_pmc_resolved(c.match_id(), &c.player))
                .collect();

            if outstanding.is_empty() {
                debug!("All players already done for board: {}", board_url);
                progress.increment_skipped();
                continue;
            }

            debug!("Board {} has {} candidate(s)", board_url, outstanding.len());
            let board = match fetcher.fetch_board(board_url).await {
                Ok(board) => board,
                Err(e) => {
                    warn!("Failed to fetch board {}: {}; will retry next run", board_url, e);
                    progress.increment_failed();
                    continue;
                }
            };
            progress.increment_fetched();

            let outcome = self.classify_board(board_url, &board, &outstanding, cache);
            report.records.extend(outcome.records);
            report.players_resolved += outcome.resolved;
            report.players_pending += outcome.pending;

            if candidates.iter().all(|c| cache.is_pmc_resolved(c.match_id(), &c.player)) {
                debug!("All players done for board, cached: {}", board_url);
                cache.mark_board_resolved(board_url);
                report.boards_resolved += 1;
            }
        }

        report.boards_fetched = progress.fetched();
        report.boards_skipped = progress.skipped();
        report.boards_failed = progress.failed();

        info!(
            "Classified {} board(s): {} player(s) resolved, {} pending, {} early resignation(s)",
            report.boards_fetched,
            report.players_resolved,
            report.players_pending,
            report.records.len()
        );
        report
    }

    /// Evaluate every game of a fetched board against its candidates
    pub fn classify_board(
        &self,
        board_url: &str,
        board: &BoardDetail,
        candidates: &[&Candidate],
        cache: &mut ResolutionCache,
    ) -> BoardOutcome {
        let mut outcome = BoardOutcome::default();
        let mut remaining: Vec<&Candidate> = candidates.to_vec();

        for (idx, game) in board.games.iter().enumerate() {
            if remaining.is_empty() {
                break;
            }

            let move_count = self.move_counter.count(game.pgn());

            remaining.retain(|candidate| {
                let Some(side) = game.side_of(&candidate.player) else {
                    return true;
                };

                let verdict = assess(&side.result_code(), move_count, self.threshold);
                if !verdict.is_resolved() {
                    debug!(
                        "Leaving {} uncached in match {} (moves={}, in progress, within threshold)",
                        candidate.player,
                        candidate.match_id(),
                        move_count
                    );
                    return true;
                }

                if verdict == Verdict::EarlyResignation {
                    info!(
                        "Early resignation: {} in match {} after {} half-move(s)",
                        candidate.player,
                        candidate.match_id(),
                        move_count
                    );
                    outcome
                        .records
                        .push(Self::build_record(candidate, board_url, idx, game, move_count));
                }

                cache.mark_pmc_resolved(candidate.match_id(), &candidate.player);
                outcome.resolved += 1;
                debug!(
                    "Marked {} done in match {} (moves={}, verdict={:?})",
                    candidate.player,
                    candidate.match_id(),
                    move_count,
                    verdict
                );
                false
            });
        }

        outcome.pending = remaining.len();
        outcome
    }

    fn build_record(
        candidate: &Candidate,
        board_url: &str,
        idx: usize,
        game: &BoardGame,
        move_count: u32,
    ) -> ResultRecord {
        let game_reference = game
            .url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| format!("{}#index={}", board_url, idx));

        ResultRecord {
            context: candidate.context.clone(),
            resignation: EarlyResignation {
                username: candidate.player.username.clone(),
                color: candidate.player.color,
                move_count,
                game_reference,
                board_reference: board_url.to_string(),
            },
        }
    }
}
