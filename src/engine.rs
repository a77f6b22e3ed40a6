//! Recomputation pipeline.
//!
//! One pass runs: match source → name parser → aggregator → scorer →
//! ranking engine. The only state that survives a pass is the caller's
//! [`RankHistory`]; a pass that fails before ranking leaves it untouched.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::aggregate::{Aggregator, StatsReport};
use crate::config::{AppConfig, FinishPoints, ScoringConfig};
use crate::dictionary::{PartDictionary, PartSource};
use crate::models::{Build, MatchRecord, Scope, Standings};
use crate::parser::{NameParser, ParseEvent, ParseTrace, TracingTrace};
use crate::ranking::{RankHistory, RankingEngine};
use crate::storage::StorageError;

/// Read-only source of match records.
pub trait MatchSource {
    /// Matches inside `scope`.
    fn fetch_matches(&self, scope: &Scope) -> Result<Vec<MatchRecord>, StorageError>;
}

/// Errors surfaced by a recomputation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to load parts: {0}")]
    Parts(#[source] StorageError),

    #[error("Failed to fetch matches for {scope}: {source}")]
    Matches {
        scope: Scope,
        #[source]
        source: StorageError,
    },
}

/// Everything one pass produces for the display layer.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub stats: StatsReport,

    pub standings: Standings,

    /// Participant appearances whose build could not be resolved
    pub unattributed: u32,

    /// Build names that also read as a Custom build
    pub ambiguous: Vec<String>,
}

/// Forwards parse events to `tracing` and keeps ambiguous names.
#[derive(Debug, Default)]
struct PassTrace {
    ambiguous: Vec<String>,
}

impl ParseTrace for PassTrace {
    fn record(&mut self, event: ParseEvent) {
        if let ParseEvent::AmbiguousGrammar { input } = &event {
            self.ambiguous.push(input.clone());
        }
        TracingTrace.record(event);
    }
}

/// Parser, aggregator, scorer and ranking engine over one dictionary.
#[derive(Debug, Clone)]
pub struct MetaEngine {
    dictionary: PartDictionary,
    scoring: ScoringConfig,
    points: FinishPoints,
}

impl MetaEngine {
    pub fn new(dictionary: PartDictionary, config: &AppConfig) -> Self {
        Self {
            dictionary,
            scoring: config.scoring,
            points: config.finish_points,
        }
    }

    /// Load the dictionary from a part source.
    pub fn load(parts: &dyn PartSource, config: &AppConfig) -> Result<Self, EngineError> {
        let dictionary = PartDictionary::load(parts).map_err(EngineError::Parts)?;
        info!("Loaded {} parts", dictionary.len());
        Ok(Self::new(dictionary, config))
    }

    pub fn dictionary(&self) -> &PartDictionary {
        &self.dictionary
    }

    pub fn parser(&self) -> NameParser<'_> {
        NameParser::new(&self.dictionary)
    }

    /// Resolve one build name.
    pub fn parse(&self, name: &str) -> Build {
        self.parser().parse(name, &mut TracingTrace)
    }

    /// Player, combo and part statistics without standings.
    pub fn stats(&self, matches: &[MatchRecord]) -> StatsReport {
        let mut aggregator = Aggregator::new(self.parser(), self.points);
        aggregator
            .aggregate(matches, &mut TracingTrace)
            .into_report(&self.scoring)
    }

    /// Run a full pass over already-fetched matches.
    ///
    /// Matches outside `scope` are ignored.
    pub fn compute(
        &self,
        scope: &Scope,
        matches: &[MatchRecord],
        history: &mut RankHistory,
    ) -> Report {
        let in_scope: Vec<&MatchRecord> = matches.iter().filter(|m| m.in_scope(scope)).collect();

        let mut trace = PassTrace::default();
        let mut aggregator = Aggregator::new(self.parser(), self.points);
        let aggregation = aggregator.aggregate(in_scope.iter().copied(), &mut trace);
        let unattributed = aggregation.unattributed;
        let stats = aggregation.into_report(&self.scoring);

        let entries =
            RankingEngine::new(self.points).rank(scope, in_scope.iter().copied(), history);

        info!(
            scope = %scope,
            matches = in_scope.len(),
            players = entries.len(),
            combos = stats.combos.len(),
            "Recomputed standings"
        );

        Report {
            stats,
            standings: Standings::new(scope.clone(), entries),
            unattributed,
            ambiguous: trace.ambiguous,
        }
    }

    /// Fetch the matches of `scope` and run a full pass.
    ///
    /// The `&mut` borrow of `history` keeps passes from interleaving.
    pub fn recompute(
        &self,
        source: &dyn MatchSource,
        scope: &Scope,
        history: &mut RankHistory,
    ) -> Result<Report, EngineError> {
        let matches = source
            .fetch_matches(scope)
            .map_err(|err| EngineError::Matches {
                scope: scope.clone(),
                source: err,
            })?;
        Ok(self.compute(scope, &matches, history))
    }

    /// Like [`MetaEngine::recompute`], for a history shared between
    /// threads. The lock is held for the whole pass.
    pub fn recompute_shared(
        &self,
        source: &dyn MatchSource,
        scope: &Scope,
        history: &Mutex<RankHistory>,
    ) -> Result<Report, EngineError> {
        // A panicked pass never reached commit, so the snapshot is intact.
        let mut guard = history.lock().unwrap_or_else(PoisonError::into_inner);
        self.recompute(source, scope, &mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BladeLine, Movement, PartRecord};
    use std::sync::Arc;

    struct Memory(Vec<MatchRecord>);

    impl MatchSource for Memory {
        fn fetch_matches(&self, scope: &Scope) -> Result<Vec<MatchRecord>, StorageError> {
            Ok(self.0.iter().filter(|m| m.in_scope(scope)).cloned().collect())
        }
    }

    struct Offline;

    impl MatchSource for Offline {
        fn fetch_matches(&self, _scope: &Scope) -> Result<Vec<MatchRecord>, StorageError> {
            Err(StorageError::Unavailable("offline".to_string()))
        }
    }

    fn engine() -> MetaEngine {
        let dictionary = PartDictionary::from_parts([
            PartRecord::blade("Dran Sword", BladeLine::Basic),
            PartRecord::blade("Wizard Rod", BladeLine::Basic),
            PartRecord::blade("Blast", BladeLine::Custom),
            PartRecord::ratchet("3-60"),
            PartRecord::ratchet("9-60"),
            PartRecord::ratchet("1-60"),
            PartRecord::bit("Flat", Some("F")),
            PartRecord::bit("Ball", Some("B")),
            PartRecord::lockchip("Pegasus"),
            PartRecord::assist_blade("Wheel"),
        ]);
        MetaEngine::new(dictionary, &AppConfig::default())
    }

    fn game(p1: &str, p2: &str, winner: &str, outcome: &str) -> MatchRecord {
        MatchRecord::new(p1, p2)
            .with_builds("Dran Sword 3-60F", "PegasusBlast Wheel1-60B")
            .with_winner(winner)
            .with_outcome(outcome)
            .in_tournament("cup")
    }

    #[test]
    fn test_compute_full_pass() {
        let engine = engine();
        let matches = vec![
            game("A", "B", "A", "Burst Finish"),
            game("B", "C", "B", "Extreme Finish"),
            game("A", "C", "A", "Spin Finish"),
        ];
        let mut history = RankHistory::new();

        let report = engine.compute(&Scope::tournament("cup"), &matches, &mut history);

        assert_eq!(report.standings.leader().map(|e| e.player.as_str()), Some("A"));
        assert_eq!(report.stats.players.len(), 3);
        assert_eq!(report.stats.combos.len(), 4);
        assert_eq!(report.unattributed, 0);
        assert!(report.ambiguous.is_empty());
        assert!(report
            .stats
            .parts
            .iter()
            .any(|p| p.name == "Pegasus" && p.record.matches == 3));
    }

    #[test]
    fn test_compute_filters_scope() {
        let engine = engine();
        let matches = vec![
            game("A", "B", "A", "Burst Finish"),
            MatchRecord::new("X", "Y")
                .with_winner("X")
                .in_tournament("other"),
        ];
        let mut history = RankHistory::new();

        let report = engine.compute(&Scope::tournament("cup"), &matches, &mut history);
        assert_eq!(report.standings.entries.len(), 2);
        assert!(report.standings.get("X").is_none());
    }

    #[test]
    fn test_recompute_tracks_movement() {
        let engine = engine();
        let scope = Scope::tournament("cup");
        let mut history = RankHistory::new();

        let source = Memory(vec![game("A", "B", "A", "Spin Finish")]);
        engine.recompute(&source, &scope, &mut history).unwrap();

        let source = Memory(vec![
            game("A", "B", "A", "Spin Finish"),
            game("A", "B", "B", "Burst Finish"),
            game("B", "C", "B", "Burst Finish"),
        ]);
        let report = engine.recompute(&source, &scope, &mut history).unwrap();

        let b = report.standings.get("B").unwrap();
        assert_eq!(b.rank, 1);
        assert_eq!(b.movement, Some(Movement::Up));
    }

    #[test]
    fn test_failed_fetch_keeps_history() {
        let engine = engine();
        let scope = Scope::tournament("cup");
        let mut history = RankHistory::new();
        engine
            .recompute(&Memory(vec![game("A", "B", "A", "Spin Finish")]), &scope, &mut history)
            .unwrap();

        let result = engine.recompute(&Offline, &scope, &mut history);

        assert!(matches!(result, Err(EngineError::Matches { .. })));
        assert_eq!(history.previous("A"), Some(1));
    }

    #[test]
    fn test_recompute_shared_serializes_passes() {
        let engine = Arc::new(engine());
        let history = Arc::new(Mutex::new(RankHistory::new()));
        let source = Arc::new(Memory(vec![game("A", "B", "A", "Spin Finish")]));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let (engine, history, source) = (engine.clone(), history.clone(), source.clone());
                std::thread::spawn(move || {
                    engine
                        .recompute_shared(source.as_ref(), &Scope::tournament("cup"), &history)
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let history = history.lock().unwrap();
        assert_eq!(history.previous("A"), Some(1));
        assert_eq!(history.previous("B"), Some(2));
    }

    #[test]
    fn test_unattributed_builds_reported() {
        let engine = engine();
        let matches = vec![MatchRecord::new("A", "B")
            .with_builds("Mystery Top", "Dran Sword 3-60F")
            .with_winner("A")
            .with_outcome("Spin Finish")];
        let mut history = RankHistory::new();

        let report = engine.compute(&Scope::All, &matches, &mut history);
        assert_eq!(report.unattributed, 1);
        assert_eq!(report.standings.get("A").map(|e| e.wins), Some(1));
    }

    #[test]
    fn test_parse_via_engine() {
        let engine = engine();
        assert!(engine.parse("PegasusBlast Wheel1-60B").is_custom());
        assert!(!engine.parse("").is_resolved());
    }

    #[test]
    fn test_report_serializes() {
        let engine = engine();
        let mut history = RankHistory::new();
        let report = engine.compute(
            &Scope::All,
            &[game("A", "B", "A", "Burst Finish")],
            &mut history,
        );

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["players"].is_array());
        assert!(json["standings"]["entries"].is_array());
    }
}
