//! Statistics calculation.
//!
//! Pure formulas turning aggregated counters into ranking metrics:
//! - Raw win rate
//! - Wilson lower bound of the win rate
//! - Pseudo-count weighted win rate
//! - Combo score (weighted win rate blended with scoring power)
//!
//! Every formula returns 0 for an empty sample instead of NaN.

use crate::config::ScoringConfig;
use crate::models::{Metrics, Record};

/// z value of the Wilson lower bound (95% confidence).
pub const WILSON_Z: f64 = 1.96;

/// Matches of pseudo-evidence added by the weighted win rate.
pub const PSEUDO_COUNT: f64 = 10.0;

/// Value of the best finish, used to normalise average points.
pub const MAX_FINISH_POINTS: u32 = 3;

/// Calculate win rate from wins and matches played.
pub fn calculate_win_rate(wins: u32, matches: u32) -> f64 {
    if matches == 0 {
        0.0
    } else {
        wins as f64 / matches as f64
    }
}

/// Wilson score lower bound at z = 1.96.
pub fn calculate_wilson_score(wins: u32, total: u32) -> f64 {
    calculate_wilson_score_with_z(wins, total, WILSON_Z)
}

/// Wilson score lower bound for an arbitrary z.
pub fn calculate_wilson_score_with_z(wins: u32, total: u32, z: f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    let p = wins as f64 / n;
    let z2 = z * z;

    let denom = 1.0 + z2 / n;
    let center = p + z2 / (2.0 * n);
    let spread = z * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt();

    (center - spread) / denom
}

/// Win rate damped by a 10-match pseudo-count.
pub fn calculate_weighted_win_rate(wins: u32, matches: u32) -> f64 {
    calculate_weighted_win_rate_with(wins, matches, PSEUDO_COUNT)
}

pub fn calculate_weighted_win_rate_with(wins: u32, matches: u32, pseudo_count: f64) -> f64 {
    if matches == 0 {
        return 0.0;
    }
    let n = matches as f64;
    calculate_win_rate(wins, matches) * (n / (n + pseudo_count))
}

/// Average points earned per match played.
pub fn calculate_avg_points(points: u32, matches: u32) -> f64 {
    if matches == 0 {
        0.0
    } else {
        points as f64 / matches as f64
    }
}

/// Composite ranking score: `weightedWinRate × (avgPoints / 3) × 100`.
pub fn calculate_combo_score(weighted_win_rate: f64, avg_points: f64) -> f64 {
    calculate_combo_score_with(weighted_win_rate, avg_points, MAX_FINISH_POINTS)
}

pub fn calculate_combo_score_with(
    weighted_win_rate: f64,
    avg_points: f64,
    max_finish_points: u32,
) -> f64 {
    if max_finish_points == 0 {
        return 0.0;
    }
    weighted_win_rate * (avg_points / max_finish_points as f64) * 100.0
}

/// Share of `part` in `whole`.
pub fn calculate_usage_rate(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Derive every metric of a record under the given constants.
pub fn calculate_metrics(record: &Record, config: &ScoringConfig) -> Metrics {
    let weighted =
        calculate_weighted_win_rate_with(record.wins, record.matches, config.pseudo_count);
    let avg = calculate_avg_points(record.points, record.matches);

    Metrics {
        win_rate: calculate_win_rate(record.wins, record.matches),
        wilson: calculate_wilson_score_with_z(record.wins, record.matches, config.wilson_z),
        weighted_win_rate: weighted,
        avg_points: avg,
        combo_score: calculate_combo_score_with(weighted, avg, config.max_finish_points),
    }
}
