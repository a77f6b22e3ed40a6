//! Match records and finish types.

use serde::{Deserialize, Serialize};

use super::{EntityId, MatchId, TournamentId};

/// The way a match ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FinishType {
    Spin,
    Burst,
    Over,
    Extreme,
    /// A finish label outside the points table.
    Other(String),
    /// No outcome recorded.
    Unknown,
}

impl FinishType {
    /// Canonical finish type of a raw outcome string.
    ///
    /// Any parenthetical qualifier starting at the first `" ("` is dropped,
    /// so `"Over Finish (ring out)"` and `"Over Finish"` are the same finish.
    pub fn from_outcome(outcome: Option<&str>) -> Self {
        let Some(outcome) = outcome else {
            return FinishType::Unknown;
        };
        let label = match outcome.find(" (") {
            Some(idx) => &outcome[..idx],
            None => outcome,
        }
        .trim();
        if label.is_empty() {
            return FinishType::Unknown;
        }

        let head = label
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match head.as_str() {
            "spin" => FinishType::Spin,
            "burst" => FinishType::Burst,
            "over" => FinishType::Over,
            "extreme" | "xtreme" => FinishType::Extreme,
            _ => FinishType::Other(label.to_string()),
        }
    }

    /// Label used as the key of per-finish counters.
    pub fn label(&self) -> &str {
        match self {
            FinishType::Spin => "Spin Finish",
            FinishType::Burst => "Burst Finish",
            FinishType::Over => "Over Finish",
            FinishType::Extreme => "Extreme Finish",
            FinishType::Other(label) => label,
            FinishType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for FinishType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded match between two players.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(default)]
    pub player1: Option<String>,

    #[serde(default)]
    pub player2: Option<String>,

    #[serde(default)]
    pub player1_build: Option<String>,

    #[serde(default)]
    pub player2_build: Option<String>,

    /// Name of the winning player
    #[serde(default)]
    pub winner: Option<String>,

    /// Raw outcome, e.g. "Burst Finish (2 pts)"
    #[serde(default)]
    pub outcome: Option<String>,

    /// Points explicitly recorded for the winner; overrides the finish table
    #[serde(default)]
    pub points: Option<u32>,

    #[serde(default)]
    pub tournament_id: Option<TournamentId>,

    /// Tournament phase (e.g. 1 = Swiss, 2 = top cut)
    #[serde(default)]
    pub phase: Option<u32>,
}

impl MatchRecord {
    pub fn new(player1: impl Into<String>, player2: impl Into<String>) -> Self {
        Self {
            player1: Some(player1.into()),
            player2: Some(player2.into()),
            ..Self::default()
        }
    }

    pub fn with_builds(mut self, player1_build: &str, player2_build: &str) -> Self {
        self.player1_build = Some(player1_build.to_string());
        self.player2_build = Some(player2_build.to_string());
        self
    }

    pub fn with_winner(mut self, winner: impl Into<String>) -> Self {
        self.winner = Some(winner.into());
        self
    }

    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = Some(outcome.into());
        self
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = Some(points);
        self
    }

    pub fn in_tournament(mut self, tournament_id: impl Into<TournamentId>) -> Self {
        self.tournament_id = Some(tournament_id.into());
        self
    }

    pub fn in_phase(mut self, phase: u32) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Content-derived id of this match.
    pub fn id(&self) -> MatchId {
        let phase = self.phase.map(|p| p.to_string()).unwrap_or_default();
        EntityId::derive(&[
            self.tournament_id.as_ref().map(|t| t.as_str()).unwrap_or(""),
            &phase,
            self.player1.as_deref().unwrap_or(""),
            self.player2.as_deref().unwrap_or(""),
            self.player1_build.as_deref().unwrap_or(""),
            self.player2_build.as_deref().unwrap_or(""),
        ])
    }

    pub fn finish_type(&self) -> FinishType {
        FinishType::from_outcome(self.outcome.as_deref())
    }

    /// Winner and loser sides, or `None` if the row is incomplete.
    ///
    /// A row needs two distinct player names and a winner that is one of
    /// them.
    pub fn decided(&self) -> Option<(Side<'_>, Side<'_>)> {
        let p1 = non_blank(self.player1.as_deref())?;
        let p2 = non_blank(self.player2.as_deref())?;
        if p1 == p2 {
            return None;
        }
        let winner = non_blank(self.winner.as_deref())?;

        let first = Side {
            player: p1,
            build: non_blank(self.player1_build.as_deref()),
        };
        let second = Side {
            player: p2,
            build: non_blank(self.player2_build.as_deref()),
        };

        if winner == p1 {
            Some((first, second))
        } else if winner == p2 {
            Some((second, first))
        } else {
            None
        }
    }

    /// True if this record falls inside `scope`.
    pub fn in_scope(&self, scope: &Scope) -> bool {
        match scope {
            Scope::All => true,
            Scope::Tournament { id, phase } => {
                self.tournament_id.as_ref() == Some(id)
                    && phase.map_or(true, |p| self.phase == Some(p))
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// One participant of a decided match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Side<'a> {
    pub player: &'a str,
    pub build: Option<&'a str>,
}

/// Which matches a computation covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "scope")]
pub enum Scope {
    All,
    Tournament {
        id: TournamentId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phase: Option<u32>,
    },
}

impl Scope {
    pub fn tournament(id: impl Into<TournamentId>) -> Self {
        Scope::Tournament {
            id: id.into(),
            phase: None,
        }
    }

    pub fn with_phase(self, phase: u32) -> Self {
        match self {
            Scope::Tournament { id, .. } => Scope::Tournament {
                id,
                phase: Some(phase),
            },
            Scope::All => Scope::All,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::All => write!(f, "all"),
            Scope::Tournament { id, phase: None } => write!(f, "{}", id),
            Scope::Tournament {
                id,
                phase: Some(phase),
            } => write!(f, "{}#{}", id, phase),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_type_strips_qualifier() {
        assert_eq!(
            FinishType::from_outcome(Some("Over Finish (ring out)")),
            FinishType::Over
        );
        assert_eq!(FinishType::from_outcome(Some("Burst Finish")), FinishType::Burst);
        assert_eq!(FinishType::from_outcome(Some("Spin")), FinishType::Spin);
        assert_eq!(
            FinishType::from_outcome(Some("Xtreme Finish (3)")),
            FinishType::Extreme
        );
    }

    #[test]
    fn test_finish_type_unknown_and_other() {
        assert_eq!(FinishType::from_outcome(None), FinishType::Unknown);
        assert_eq!(FinishType::from_outcome(Some("   ")), FinishType::Unknown);
        assert_eq!(
            FinishType::from_outcome(Some("Penalty (late)")),
            FinishType::Other("Penalty".to_string())
        );
        assert_eq!(FinishType::Unknown.label(), "Unknown");
    }

    #[test]
    fn test_decided_orders_winner_first() {
        let m = MatchRecord::new("Alice", "Bob")
            .with_builds("Dran Sword 3-60F", "Wizard Rod 9-60B")
            .with_winner("Bob");

        let (winner, loser) = m.decided().unwrap();
        assert_eq!(winner.player, "Bob");
        assert_eq!(winner.build, Some("Wizard Rod 9-60B"));
        assert_eq!(loser.player, "Alice");
    }

    #[test]
    fn test_decided_rejects_incomplete_rows() {
        assert!(MatchRecord::new("Alice", "Bob").decided().is_none());
        assert!(MatchRecord::new("Alice", " ").with_winner("Alice").decided().is_none());
        assert!(MatchRecord::new("Alice", "Bob").with_winner("Carol").decided().is_none());
    }

    #[test]
    fn test_decided_rejects_self_match() {
        let m = MatchRecord::new("Alice", "Alice").with_winner("Alice");
        assert!(m.decided().is_none());

        let padded = MatchRecord::new("Alice", " Alice ").with_winner("Alice");
        assert!(padded.decided().is_none());
    }

    #[test]
    fn test_scope_filter() {
        let m = MatchRecord::new("A", "B").in_tournament("cup").in_phase(2);

        assert!(m.in_scope(&Scope::All));
        assert!(m.in_scope(&Scope::tournament("cup")));
        assert!(m.in_scope(&Scope::tournament("cup").with_phase(2)));
        assert!(!m.in_scope(&Scope::tournament("cup").with_phase(1)));
        assert!(!m.in_scope(&Scope::tournament("other")));
    }

    #[test]
    fn test_match_id_deterministic() {
        let a = MatchRecord::new("A", "B").in_tournament("cup");
        let b = MatchRecord::new("A", "B").in_tournament("cup");
        let c = MatchRecord::new("A", "B").in_tournament("cup").in_phase(2);
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_match_record_from_json() {
        let json = r#"{"player1":"A","player2":"B","winner":"A","outcome":"Burst Finish","tournament_id":"cup"}"#;
        let m: MatchRecord = serde_json::from_str(json).unwrap();
        assert_eq!(m.finish_type(), FinishType::Burst);
        assert_eq!(m.points, None);
        assert_eq!(m.tournament_id, Some(TournamentId::from("cup")));
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::All.to_string(), "all");
        assert_eq!(Scope::tournament("cup").with_phase(1).to_string(), "cup#1");
    }
}
