//! Match aggregation.
//!
//! Folds a match list into per-player, per-combo and per-part counters in
//! one pass. Counters are always rebuilt from the full match set.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculate::{calculate_metrics, calculate_usage_rate};
use crate::config::{FinishPoints, ScoringConfig};
use crate::models::{
    Build, ComboStat, FinishType, MatchRecord, Metrics, PartCategory, PartStat, PlayerStat, Record,
    Side,
};
use crate::parser::{NameParser, ParseTrace};

/// Raw counters produced by one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub players: BTreeMap<String, PlayerStat>,

    /// Keyed by (build name, player)
    pub combos: BTreeMap<(String, String), ComboStat>,

    /// Keyed by (category, part name)
    pub parts: BTreeMap<(PartCategory, String), PartStat>,

    /// Matches that updated the counters
    pub counted: usize,

    /// Rows without both players and a matching winner
    pub skipped: usize,

    /// Participant appearances whose build resolved
    pub attributed: u32,

    /// Participant appearances whose build did not resolve
    pub unattributed: u32,

    /// Resolved appearances per part category
    pub category_appearances: BTreeMap<PartCategory, u32>,
}

/// Scored, display-ordered statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsReport {
    pub players: Vec<PlayerStat>,
    pub combos: Vec<ComboStat>,
    pub parts: Vec<PartStat>,
}

/// One-pass match folder.
///
/// Parsed builds are cached per build name for the lifetime of the
/// aggregator, so a name is parsed once per pass.
pub struct Aggregator<'d> {
    parser: NameParser<'d>,
    points: FinishPoints,
    builds: HashMap<String, Build>,
}

impl<'d> Aggregator<'d> {
    pub fn new(parser: NameParser<'d>, points: FinishPoints) -> Self {
        Self {
            parser,
            points,
            builds: HashMap::new(),
        }
    }

    /// Points for a match: the explicit value if recorded, else the finish table.
    pub fn points_for(&self, record: &MatchRecord, finish: &FinishType) -> u32 {
        record
            .points
            .unwrap_or_else(|| self.points.points_for(finish))
    }

    pub fn aggregate<'m, I>(&mut self, matches: I, trace: &mut dyn ParseTrace) -> Aggregation
    where
        I: IntoIterator<Item = &'m MatchRecord>,
    {
        let mut out = Aggregation::default();

        for record in matches {
            let Some((winner, loser)) = record.decided() else {
                debug!(match_id = %record.id(), "Skipping incomplete match row");
                out.skipped += 1;
                continue;
            };

            let finish = record.finish_type();
            let points = self.points_for(record, &finish);

            out.players
                .entry(winner.player.to_string())
                .or_insert_with(|| PlayerStat::new(winner.player))
                .record
                .record_win(points, &finish);
            out.players
                .entry(loser.player.to_string())
                .or_insert_with(|| PlayerStat::new(loser.player))
                .record
                .record_loss(&finish);

            self.attribute(&mut out, winner, Some(points), &finish, trace);
            self.attribute(&mut out, loser, None, &finish, trace);

            out.counted += 1;
        }

        debug!(
            counted = out.counted,
            skipped = out.skipped,
            unattributed = out.unattributed,
            "Aggregated matches"
        );
        out
    }

    /// Credit one side's build and its parts. `won` carries the points
    /// when the side won.
    fn attribute(
        &mut self,
        out: &mut Aggregation,
        side: Side<'_>,
        won: Option<u32>,
        finish: &FinishType,
        trace: &mut dyn ParseTrace,
    ) {
        let Some(name) = side.build else {
            out.unattributed += 1;
            return;
        };

        let parser = self.parser;
        let build = self
            .builds
            .entry(name.to_string())
            .or_insert_with(|| parser.parse(name, trace));
        if !build.is_resolved() {
            out.unattributed += 1;
            return;
        }
        out.attributed += 1;

        let combo = out
            .combos
            .entry((name.to_string(), side.player.to_string()))
            .or_insert_with(|| ComboStat::new(name, side.player));
        credit(&mut combo.record, won, finish);

        for part in build.parts() {
            let category = part.category();
            *out.category_appearances.entry(category).or_default() += 1;
            let stat = out
                .parts
                .entry((category, part.name().to_string()))
                .or_insert_with(|| PartStat::new(category, part.name()));
            credit(&mut stat.record, won, finish);
        }
    }

    /// Builds parsed so far, keyed by name.
    pub fn builds(&self) -> &HashMap<String, Build> {
        &self.builds
    }
}

fn credit(record: &mut Record, won: Option<u32>, finish: &FinishType) {
    match won {
        Some(points) => record.record_win(points, finish),
        None => record.record_loss(finish),
    }
}

impl Aggregation {
    /// Attach metrics and usage rates, drop combos and parts under the
    /// sample threshold, and order everything for display.
    pub fn into_report(self, config: &ScoringConfig) -> StatsReport {
        let mut players: Vec<PlayerStat> = self
            .players
            .into_values()
            .map(|mut p| {
                p.metrics = calculate_metrics(&p.record, config);
                p
            })
            .collect();
        players.sort_by(|a, b| {
            by_metrics(&a.metrics, &b.metrics)
                .then_with(|| b.record.wins.cmp(&a.record.wins))
                .then_with(|| a.player.cmp(&b.player))
        });

        let attributed = self.attributed;
        let mut combos: Vec<ComboStat> = self
            .combos
            .into_values()
            .filter(|c| c.record.matches >= config.min_matches)
            .map(|mut c| {
                c.metrics = calculate_metrics(&c.record, config);
                c.usage_rate = calculate_usage_rate(c.record.matches, attributed);
                c
            })
            .collect();
        combos.sort_by(|a, b| {
            by_metrics(&a.metrics, &b.metrics)
                .then_with(|| a.build.cmp(&b.build))
                .then_with(|| a.player.cmp(&b.player))
        });

        let appearances = self.category_appearances;
        let mut parts: Vec<PartStat> = self
            .parts
            .into_values()
            .filter(|p| p.record.matches >= config.min_matches)
            .map(|mut p| {
                p.metrics = calculate_metrics(&p.record, config);
                let total = appearances.get(&p.category).copied().unwrap_or(0);
                p.usage_rate = calculate_usage_rate(p.record.matches, total);
                p
            })
            .collect();
        parts.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| by_metrics(&a.metrics, &b.metrics))
                .then_with(|| a.name.cmp(&b.name))
        });

        StatsReport {
            players,
            combos,
            parts,
        }
    }
}

/// Descending by combo score, then Wilson score.
fn by_metrics(a: &Metrics, b: &Metrics) -> Ordering {
    b.combo_score
        .total_cmp(&a.combo_score)
        .then_with(|| b.wilson.total_cmp(&a.wilson))
}
