//! Aggregated statistics models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FinishType, PartCategory, Scope};

/// Running win/loss counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,

    /// Points earned from won matches
    pub points: u32,

    /// Match count per finish label, both won and lost
    pub finishes: BTreeMap<String, u32>,
}

impl Record {
    pub fn record_win(&mut self, points: u32, finish: &FinishType) {
        self.matches += 1;
        self.wins += 1;
        self.points += points;
        *self.finishes.entry(finish.label().to_string()).or_default() += 1;
    }

    pub fn record_loss(&mut self, finish: &FinishType) {
        self.matches += 1;
        self.losses += 1;
        *self.finishes.entry(finish.label().to_string()).or_default() += 1;
    }

    pub fn finish_count(&self, label: &str) -> u32 {
        self.finishes.get(label).copied().unwrap_or(0)
    }
}

/// Rates and scores derived from a `Record`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub win_rate: f64,

    /// Lower bound of the win-rate confidence interval
    pub wilson: f64,

    pub weighted_win_rate: f64,

    pub avg_points: f64,

    pub combo_score: f64,
}

/// Per-player statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub player: String,

    #[serde(flatten)]
    pub record: Record,

    #[serde(default)]
    pub metrics: Metrics,
}

impl PlayerStat {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            record: Record::default(),
            metrics: Metrics::default(),
        }
    }
}

/// How one player performed with one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboStat {
    /// Build name as written in the match record
    pub build: String,

    pub player: String,

    #[serde(flatten)]
    pub record: Record,

    /// Share of all attributable build appearances
    #[serde(default)]
    pub usage_rate: f64,

    #[serde(default)]
    pub metrics: Metrics,
}

impl ComboStat {
    pub fn new(build: impl Into<String>, player: impl Into<String>) -> Self {
        Self {
            build: build.into(),
            player: player.into(),
            record: Record::default(),
            usage_rate: 0.0,
            metrics: Metrics::default(),
        }
    }
}

/// Performance of a single part across every build that used it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartStat {
    pub category: PartCategory,

    pub name: String,

    #[serde(flatten)]
    pub record: Record,

    /// Share of attributable appearances in this part's category
    #[serde(default)]
    pub usage_rate: f64,

    #[serde(default)]
    pub metrics: Metrics,
}

impl PartStat {
    pub fn new(category: PartCategory, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
            record: Record::default(),
            usage_rate: 0.0,
            metrics: Metrics::default(),
        }
    }
}

/// Rank change since the previous computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    Up,
    Down,
}

impl std::fmt::Display for Movement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Movement::Up => write!(f, "up"),
            Movement::Down => write!(f, "down"),
        }
    }
}

/// One row of a tournament leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position after sorting
    pub rank: u32,

    pub player: String,

    pub wins: u32,

    pub losses: u32,

    /// One point per match win
    pub score: u32,

    /// Head-to-head wins against players on the same score
    pub tb: u32,

    /// Median-cut sum of opponents' scores
    pub buchholz: u32,

    pub points_for: u32,

    pub points_against: u32,

    pub point_diff: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement: Option<Movement>,
}

/// A computed leaderboard for one scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standings {
    pub scope: Scope,

    /// When these standings were computed
    pub computed_at: DateTime<Utc>,

    pub entries: Vec<LeaderboardEntry>,
}

impl Standings {
    pub fn new(scope: Scope, entries: Vec<LeaderboardEntry>) -> Self {
        Self {
            scope,
            computed_at: Utc::now(),
            entries,
        }
    }

    /// Get an entry by player name.
    pub fn get(&self, player: &str) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.player == player)
    }

    pub fn leader(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_win_and_loss() {
        let mut record = Record::default();
        record.record_win(2, &FinishType::Burst);
        record.record_win(1, &FinishType::Spin);
        record.record_loss(&FinishType::Burst);

        assert_eq!(record.matches, 3);
        assert_eq!(record.wins, 2);
        assert_eq!(record.losses, 1);
        assert_eq!(record.points, 3);
        assert_eq!(record.finish_count("Burst Finish"), 2);
        assert_eq!(record.finish_count("Spin Finish"), 1);
        assert_eq!(record.finish_count("Over Finish"), 0);
    }

    #[test]
    fn test_player_stat_serializes_flat() {
        let mut stat = PlayerStat::new("Alice");
        stat.record.record_win(3, &FinishType::Extreme);

        let json = serde_json::to_value(&stat).unwrap();
        assert_eq!(json["player"], "Alice");
        assert_eq!(json["wins"], 1);
        assert_eq!(json["points"], 3);
        assert_eq!(json["finishes"]["Extreme Finish"], 1);
    }

    #[test]
    fn test_movement_serialization() {
        assert_eq!(serde_json::to_string(&Movement::Up).unwrap(), "\"up\"");
        assert_eq!(Movement::Down.to_string(), "down");
    }

    #[test]
    fn test_standings_lookup() {
        let entry = LeaderboardEntry {
            rank: 1,
            player: "Alice".to_string(),
            wins: 3,
            losses: 0,
            score: 3,
            tb: 0,
            buchholz: 2,
            points_for: 7,
            points_against: 0,
            point_diff: 7,
            movement: None,
        };
        let standings = Standings::new(Scope::tournament("cup"), vec![entry.clone()]);

        assert_eq!(standings.get("Alice"), Some(&entry));
        assert_eq!(standings.leader().map(|e| e.rank), Some(1));
        assert!(standings.get("Bob").is_none());

        let json = serde_json::to_value(&standings).unwrap();
        assert!(json["entries"][0].get("movement").is_none());
    }
}
