//! Tournament ranking.
//!
//! Standings are recomputed wholesale from the match list on every call.
//! Order is descending by:
//! 1. score (match wins)
//! 2. TB: head-to-head wins against players on the same score
//! 3. Buchholz: opponents' scores, cutting the best and worst when more
//!    than two opponents were met
//! 4. points differential
//!
//! The sort is stable, so players tied on every key keep their order of
//! first appearance in the match list.

mod history;

pub use history::RankHistory;

use std::collections::HashMap;

use tracing::debug;

use crate::config::FinishPoints;
use crate::models::{LeaderboardEntry, MatchRecord, Scope};

/// Head-to-head win counts between players.
///
/// Players are indexed in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct HeadToHead {
    players: Vec<String>,
    wins: HashMap<(usize, usize), u32>,
}

impl HeadToHead {
    fn record(&mut self, winner: usize, loser: usize) {
        *self.wins.entry((winner, loser)).or_default() += 1;
    }

    /// Wins of player `a` over player `b`, by index.
    pub fn wins(&self, a: usize, b: usize) -> u32 {
        self.wins.get(&(a, b)).copied().unwrap_or(0)
    }

    /// Wins of `winner` over `loser`, by name.
    pub fn wins_between(&self, winner: &str, loser: &str) -> u32 {
        match (self.index_of(winner), self.index_of(loser)) {
            (Some(a), Some(b)) => self.wins(a, b),
            _ => 0,
        }
    }

    pub fn index_of(&self, player: &str) -> Option<usize> {
        self.players.iter().position(|p| p == player)
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }
}

/// Per-player running totals within a scope.
#[derive(Debug, Clone, Default)]
struct Line {
    player: String,
    wins: u32,
    losses: u32,
    points_for: u32,
    points_against: u32,
    /// Distinct opponents in order of first meeting
    opponents: Vec<usize>,
}

/// Computes leaderboards from match records.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingEngine {
    points: FinishPoints,
}

impl RankingEngine {
    pub fn new(points: FinishPoints) -> Self {
        Self { points }
    }

    /// Rank every player of `scope` and update `history`.
    ///
    /// `matches` must already be restricted to `scope`. The history is
    /// reset first if it belongs to a different scope, and replaced with
    /// the new ranks once every entry has been computed.
    pub fn rank<'m, I>(
        &self,
        scope: &Scope,
        matches: I,
        history: &mut RankHistory,
    ) -> Vec<LeaderboardEntry>
    where
        I: IntoIterator<Item = &'m MatchRecord>,
    {
        let (lines, h2h) = self.tally(matches);

        let scores: Vec<u32> = lines.iter().map(|l| l.wins).collect();
        let mut entries: Vec<LeaderboardEntry> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| LeaderboardEntry {
                rank: 0,
                player: line.player.clone(),
                wins: line.wins,
                losses: line.losses,
                score: line.wins,
                tb: tie_break(i, &scores, &h2h),
                buchholz: buchholz(&line.opponents, &scores),
                points_for: line.points_for,
                points_against: line.points_against,
                point_diff: line.points_for as i64 - line.points_against as i64,
                movement: None,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.tb.cmp(&a.tb))
                .then_with(|| b.buchholz.cmp(&a.buchholz))
                .then_with(|| b.point_diff.cmp(&a.point_diff))
        });

        history.enter(scope);
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = i as u32 + 1;
            entry.movement = history.movement(&entry.player, entry.rank);
        }
        history.commit(entries.iter().map(|e| (e.player.clone(), e.rank)).collect());

        debug!(scope = %scope, players = entries.len(), "Ranked players");
        entries
    }

    /// Head-to-head table of the decided matches.
    pub fn head_to_head<'m, I>(&self, matches: I) -> HeadToHead
    where
        I: IntoIterator<Item = &'m MatchRecord>,
    {
        self.tally(matches).1
    }

    fn tally<'m, I>(&self, matches: I) -> (Vec<Line>, HeadToHead)
    where
        I: IntoIterator<Item = &'m MatchRecord>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut lines: Vec<Line> = Vec::new();
        let mut h2h = HeadToHead::default();

        let mut slot = |name: &str, lines: &mut Vec<Line>| -> usize {
            *index.entry(name.to_string()).or_insert_with(|| {
                lines.push(Line {
                    player: name.to_string(),
                    ..Line::default()
                });
                lines.len() - 1
            })
        };

        for record in matches {
            let Some((winner, loser)) = record.decided() else {
                continue;
            };
            let points = record
                .points
                .unwrap_or_else(|| self.points.points_for(&record.finish_type()));

            // Register in row order so unbroken ties follow the input.
            let (first, second) = if record.player1.as_deref().map(str::trim) == Some(winner.player)
            {
                (winner.player, loser.player)
            } else {
                (loser.player, winner.player)
            };
            let a = slot(first, &mut lines);
            let b = slot(second, &mut lines);
            let (w, l) = if first == winner.player { (a, b) } else { (b, a) };

            lines[w].wins += 1;
            lines[w].points_for += points;
            lines[l].losses += 1;
            lines[l].points_against += points;
            h2h.record(w, l);

            for (me, them) in [(w, l), (l, w)] {
                if !lines[me].opponents.contains(&them) {
                    lines[me].opponents.push(them);
                }
            }
        }

        h2h.players = lines.iter().map(|l| l.player.clone()).collect();
        (lines, h2h)
    }
}

/// Head-to-head wins of `player` over everyone else on the same score.
fn tie_break(player: usize, scores: &[u32], h2h: &HeadToHead) -> u32 {
    scores
        .iter()
        .enumerate()
        .filter(|&(other, &score)| other != player && score == scores[player])
        .map(|(other, _)| h2h.wins(player, other))
        .sum()
}

/// Sum of opponents' scores, minus the highest and lowest when more than
/// two opponents were met.
fn buchholz(opponents: &[usize], scores: &[u32]) -> u32 {
    let opp: Vec<u32> = opponents.iter().map(|&o| scores[o]).collect();
    let sum: u32 = opp.iter().sum();
    if opp.len() > 2 {
        let max = opp.iter().copied().max().unwrap_or(0);
        let min = opp.iter().copied().min().unwrap_or(0);
        sum - max - min
    } else {
        sum
    }
}
