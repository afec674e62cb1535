//! Statistics arithmetic.
//!
//! Pure helpers shared by the aggregation and detection stages:
//! - Win rates and shares as one-decimal percentages
//! - Means and rounding
//! - Severity scoring for ranking
//! - Recent-form summaries and momentum
//! - Star-player impact scores

use crate::models::{Momentum, Outcome};

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Win rate as a one-decimal percentage; `None` without games.
pub fn win_rate_pct(wins: u32, losses: u32) -> Option<f64> {
    share_pct(wins, wins + losses)
}

/// `part / total` as a one-decimal percentage; `None` when `total` is 0.
pub fn share_pct(part: u32, total: u32) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(round_to(part as f64 / total as f64 * 100.0, 1))
    }
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// "W-L" record string.
pub fn record_string(wins: u32, losses: u32) -> String {
    format!("{}-{}", wins, losses)
}

/// Sample-size confidence weight in `[0, 1)`: `n / (n + prior)`.
pub fn confidence_weight(sample_size: u32, prior: f64) -> f64 {
    let n = sample_size as f64;
    if n + prior <= 0.0 {
        0.0
    } else {
        n / (n + prior)
    }
}

/// Ranking score: distance from the neutral baseline scaled by the
/// sample-size weight, two decimals.
pub fn severity(deviation: f64, sample_size: u32, prior: f64) -> f64 {
    round_to(deviation.abs() * confidence_weight(sample_size, prior), 2)
}

/// Length of the run the most recent result belongs to.
pub fn current_streak(form: &[Outcome]) -> usize {
    match form.first() {
        None => 0,
        Some(first) => form.iter().take_while(|o| *o == first).count(),
    }
}

/// Plain-language summary of a recent-form sequence.
pub fn summarize_form(form: &[Outcome]) -> String {
    if form.is_empty() {
        return "No recent matches".to_string();
    }

    let wins = form.iter().filter(|o| o.is_win()).count();
    let total = form.len();
    let ratio = wins as f64 / total as f64;

    let label = if wins == total {
        "Perfect form"
    } else if ratio >= 0.8 {
        "Excellent form"
    } else if ratio >= 0.6 {
        "Good form"
    } else if ratio >= 0.4 {
        "Mixed form"
    } else {
        "Poor form"
    };

    format!("{} ({}/{} wins)", label, wins, total)
}

/// Compare the newest `recent` results of `form` (most recent first) with
/// the older ones. The win rate gap must exceed `margin` points to count as
/// a shift. `None` when there are no older results to compare against.
pub fn form_momentum(form: &[Outcome], recent: usize, margin: f64) -> Option<Momentum> {
    if recent == 0 || form.len() <= recent {
        return None;
    }
    let (newest, older) = form.split_at(recent);
    let wins = |results: &[Outcome]| results.iter().filter(|o| o.is_win()).count() as u32;
    let newest_rate = share_pct(wins(newest), newest.len() as u32)?;
    let older_rate = share_pct(wins(older), older.len() as u32)?;

    let shift = newest_rate - older_rate;
    Some(if shift > margin {
        Momentum::Improving
    } else if shift < -margin {
        Momentum::Declining
    } else {
        Momentum::Stable
    })
}

/// Composite rating for ranking star players: combat score, K/D, damage
/// and opening duels, one decimal.
pub fn impact_score(combat_score: f64, kd: f64, adr: f64, first_kill_diff: i64) -> f64 {
    round_to(
        combat_score * 0.4 + kd * 30.0 + adr * 0.2 + first_kill_diff as f64 * 0.5,
        1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use Outcome::{Loss as L, Win as W};

    #[test]
    fn test_win_rate_pct() {
        assert_eq!(win_rate_pct(7, 3), Some(70.0));
        assert_eq!(win_rate_pct(11, 3), Some(78.6));
        assert_eq!(win_rate_pct(2, 5), Some(28.6));
        assert_eq!(win_rate_pct(4, 4), Some(50.0));
        assert_eq!(win_rate_pct(0, 0), None);
    }

    #[test]
    fn test_share_pct() {
        assert_eq!(share_pct(1, 3), Some(33.3));
        assert_eq!(share_pct(2, 3), Some(66.7));
        assert_eq!(share_pct(3, 0), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.26, 1), 1.3);
        assert_eq!(round_to(1.234, 2), 1.23);
        assert_eq!(round_to(-2.25, 0), -2.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_record_string() {
        assert_eq!(record_string(11, 3), "11-3");
    }

    #[test]
    fn test_severity_monotonic_in_sample_size() {
        let small = severity(20.0, 3, 5.0);
        let large = severity(20.0, 12, 5.0);
        assert!(large > small);
        assert_eq!(severity(20.0, 5, 5.0), 10.0);
    }

    #[test]
    fn test_severity_monotonic_in_deviation() {
        assert!(severity(30.0, 8, 5.0) > severity(15.0, 8, 5.0));
        assert_eq!(severity(-15.0, 8, 5.0), severity(15.0, 8, 5.0));
        assert_eq!(severity(0.0, 8, 5.0), 0.0);
    }

    #[test]
    fn test_current_streak() {
        assert_eq!(current_streak(&[W, W, W, L, W]), 3);
        assert_eq!(current_streak(&[L, W]), 1);
        assert_eq!(current_streak(&[]), 0);
    }

    #[test]
    fn test_form_momentum() {
        assert_eq!(form_momentum(&[W, W, W, L, L], 3, 20.0), Some(Momentum::Improving));
        assert_eq!(form_momentum(&[L, L, W, W, W], 3, 20.0), Some(Momentum::Declining));
        // 66.7% against 50.0% is inside the margin
        assert_eq!(form_momentum(&[W, W, L, W, L], 3, 20.0), Some(Momentum::Stable));
        assert_eq!(form_momentum(&[W, W, W, W, W], 3, 20.0), Some(Momentum::Stable));
    }

    #[test]
    fn test_form_momentum_needs_older_results() {
        assert_eq!(form_momentum(&[W, W, W], 3, 20.0), None);
        assert_eq!(form_momentum(&[], 3, 20.0), None);
        assert_eq!(form_momentum(&[W, L, L, L], 3, 20.0), Some(Momentum::Improving));
    }

    #[test]
    fn test_impact_score() {
        // 104 + 24 + 30 - 3
        assert_eq!(impact_score(260.0, 0.8, 150.0, -6), 155.0);
        // 92 + 48 + 32 + 4
        assert_eq!(impact_score(230.0, 1.6, 160.0, 8), 176.0);
    }

    #[test]
    fn test_summarize_form() {
        assert_eq!(summarize_form(&[]), "No recent matches");
        assert_eq!(summarize_form(&[W, W, W, W, W]), "Perfect form (5/5 wins)");
        assert_eq!(summarize_form(&[W, W, W, W, L]), "Excellent form (4/5 wins)");
        assert_eq!(summarize_form(&[W, W, W, L, L]), "Good form (3/5 wins)");
        assert_eq!(summarize_form(&[W, W, L, L, L]), "Mixed form (2/5 wins)");
        assert_eq!(summarize_form(&[W, L, L, L, L]), "Poor form (1/5 wins)");
    }
}
