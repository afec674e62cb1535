//! Assembly of the final [`Report`].

use std::cmp::Ordering;

use tracing::{info, warn};

use crate::calculate::{form_momentum, impact_score, summarize_form};
use crate::config::AnalysisConfig;
use crate::models::{
    AgentSummary, AnalysisWindow, DataStatus, EntityId, Finding, HeadToHead, MapList, MapStat,
    MapSummary, MatchId, MatchOverview, OpponentSnapshot, PlayerStat, Polarity, Report,
    ReportFinding, ReportId, ReportParts, StarPlayer, TeamId, TeamStatsSnapshot,
};

use super::RankedRecommendations;

/// Deterministic id: same teams, window and matches give the same id.
pub fn report_id<'m>(
    team_a: &TeamId,
    team_b: &TeamId,
    window: &AnalysisWindow,
    match_ids: impl IntoIterator<Item = &'m MatchId>,
) -> ReportId {
    let mut ids: Vec<&str> = match_ids.into_iter().map(|id| id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();

    let days = window.days.to_string();
    let now = window.now.to_rfc3339();
    let mut fields = vec![team_a.as_str(), team_b.as_str(), days.as_str(), now.as_str()];
    fields.extend(ids);
    EntityId::generate(&fields)
}

/// Everything the builder consumes.
pub struct ReportInputs {
    pub report_id: ReportId,
    /// Requesting team
    pub ours: TeamStatsSnapshot,
    pub opponent: TeamStatsSnapshot,
    pub head_to_head: HeadToHead,
    /// Ranked opponent findings
    pub findings: Vec<Finding>,
    pub recommendations: RankedRecommendations,
}

pub struct ReportBuilder<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, inputs: ReportInputs) -> Report {
        let ReportInputs {
            report_id,
            ours,
            opponent,
            head_to_head,
            findings,
            recommendations,
        } = inputs;

        let data_status = self.data_status(&opponent);
        if let DataStatus::Limited { reason } | DataStatus::Insufficient { reason } = &data_status {
            warn!("Report {} rests on thin data: {}", report_id, reason);
        }

        let (strengths, weaknesses): (Vec<Finding>, Vec<Finding>) = findings
            .into_iter()
            .partition(|f| f.polarity() == Polarity::Strength);
        let key_strengths = self.top_findings(strengths);
        let exploitable_weaknesses = self.top_findings(weaknesses);

        let match_overview = MatchOverview {
            team_a_name: ours.team.name.clone(),
            team_b_name: opponent.team.name.clone(),
            team_a_region: ours.team.region.clone(),
            team_b_region: opponent.team.region.clone(),
            matches_analyzed_team_a: ours.matches_analyzed,
            matches_analyzed_team_b: opponent.matches_analyzed,
            games_analyzed_team_a: ours.games_analyzed,
            games_analyzed_team_b: opponent.games_analyzed,
            time_window_days: opponent.window.days,
            opponent_overall_win_rate: opponent.overall_win_rate,
            opponent_recent_form: opponent.recent_form.clone(),
            opponent_recent_form_summary: summarize_form(&opponent.recent_form),
            opponent_momentum: form_momentum(
                &opponent.recent_form,
                self.config.form_trend_length,
                self.config.momentum_margin,
            ),
            head_to_head,
        };
        let opponent_snapshot = self.opponent_snapshot(&opponent);

        info!(
            "Built report {} for {} vs {}: {} strengths, {} weaknesses, {} recommendations",
            report_id,
            ours.team.name,
            opponent.team.name,
            key_strengths.len(),
            exploitable_weaknesses.len(),
            recommendations.kept.len()
        );

        Report::from_parts(ReportParts {
            report_id,
            generated_at: opponent.window.now,
            data_status,
            match_overview,
            opponent_snapshot,
            key_strengths,
            exploitable_weaknesses,
            recommendations_dropped: recommendations.dropped.len(),
            recommendations: recommendations.kept,
            team_a_stats: ours,
            team_b_stats: opponent,
        })
    }

    fn data_status(&self, opponent: &TeamStatsSnapshot) -> DataStatus {
        let name = &opponent.team.name;
        let days = opponent.window.days;
        if opponent.matches_analyzed == 0 {
            DataStatus::Insufficient {
                reason: format!("no matches found for {} in the last {} days", name, days),
            }
        } else if opponent.games_analyzed == 0 {
            DataStatus::Insufficient {
                reason: format!(
                    "{} matches found for {} but none include game data",
                    opponent.matches_analyzed, name
                ),
            }
        } else if opponent.matches_analyzed < self.config.min_sample_size {
            DataStatus::Limited {
                reason: format!(
                    "fewer than {} matches available for this opponent in the selected window ({} found)",
                    self.config.min_sample_size, opponent.matches_analyzed
                ),
            }
        } else {
            DataStatus::Sufficient
        }
    }

    fn top_findings(&self, findings: Vec<Finding>) -> Vec<ReportFinding> {
        // Input is already ranked; partition keeps the order.
        findings
            .into_iter()
            .take(self.config.max_findings)
            .map(ReportFinding::from)
            .collect()
    }

    fn opponent_snapshot(&self, opponent: &TeamStatsSnapshot) -> OpponentSnapshot {
        let n = self.config.map_list_size;

        let mut best: Vec<&MapStat> = opponent.maps.iter().collect();
        best.sort_by(|a, b| compare_maps(b, a).then_with(|| a.map.cmp(&b.map)));
        let mut worst: Vec<&MapStat> = opponent.maps.iter().collect();
        worst.sort_by(|a, b| compare_maps(a, b).then_with(|| a.map.cmp(&b.map)));

        let mut agents: Vec<_> = opponent.agents.iter().collect();
        agents.sort_by(|a, b| {
            b.picks
                .cmp(&a.picks)
                .then_with(|| cmp_rate(b.win_rate, a.win_rate))
                .then_with(|| a.agent.cmp(&b.agent))
        });

        let mut players: Vec<(f64, &PlayerStat)> = opponent
            .players
            .iter()
            .map(|p| {
                let score = impact_score(p.avg_combat_score, p.avg_kd, p.avg_adr, p.first_kill_diff);
                (score, p)
            })
            .collect();
        players.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .total_cmp(score_a)
                .then_with(|| b.avg_combat_score.total_cmp(&a.avg_combat_score))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        OpponentSnapshot {
            best_maps: map_list(&best, n),
            worst_maps: map_list(&worst, n),
            top_agents: agents
                .into_iter()
                .take(self.config.top_agents)
                .map(|a| AgentSummary {
                    agent: a.agent.clone(),
                    role: a.role,
                    picks: a.picks,
                    pick_rate: a.pick_rate,
                    win_rate: a.win_rate,
                })
                .collect(),
            star_players: players
                .into_iter()
                .take(self.config.star_players)
                .map(|(score, p)| StarPlayer {
                    player_id: p.player_id.clone(),
                    name: p.name.clone(),
                    impact_score: score,
                    games: p.games,
                    avg_combat_score: p.avg_combat_score,
                    avg_kd: p.avg_kd,
                    avg_adr: p.avg_adr,
                    avg_kills: p.avg_kills,
                    first_kill_diff: p.first_kill_diff,
                    most_played_agent: p.most_played_agent.clone(),
                })
                .collect(),
        }
    }
}

/// Ascending by win rate, then by round differential. Undefined sorts low.
fn compare_maps(a: &MapStat, b: &MapStat) -> Ordering {
    cmp_rate(a.win_rate, b.win_rate).then_with(|| cmp_rate(a.avg_round_diff, b.avg_round_diff))
}

fn cmp_rate(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn map_list(maps: &[&MapStat], n: usize) -> MapList {
    MapList {
        sample_gated: false,
        maps: maps
            .iter()
            .take(n)
            .map(|m| MapSummary {
                map: m.map.clone(),
                win_rate: m.win_rate,
                record: m.record.clone(),
                sample_size: m.sample_size,
                avg_round_diff: m.avg_round_diff,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{PatternDetector, RecommendationEngine};
    use crate::models::{Decision, Momentum, Outcome};
    use crate::test_support::{empty_snapshot, map_stat, player_line, window};
    use pretty_assertions::assert_eq;

    fn build(config: &AnalysisConfig, opponent: TeamStatsSnapshot) -> Report {
        let findings = PatternDetector::new(config).detect(&opponent);
        let recommendations = RecommendationEngine::new(config).recommend(&opponent, &findings, None);
        ReportBuilder::new(config).build(ReportInputs {
            report_id: ReportId::from("r1"),
            ours: empty_snapshot("fnc"),
            opponent,
            head_to_head: HeadToHead::default(),
            findings,
            recommendations,
        })
    }

    fn opponent(maps: Vec<MapStat>, matches: u32) -> TeamStatsSnapshot {
        let mut snapshot = empty_snapshot("sen");
        snapshot.games_analyzed = maps.iter().map(|m| m.sample_size).sum();
        snapshot.matches_analyzed = matches;
        snapshot.maps = maps;
        snapshot
    }

    #[test]
    fn test_zero_matches_is_insufficient_not_error() {
        let config = AnalysisConfig::default();
        let report = build(&config, empty_snapshot("sen"));

        assert!(report.data_status().is_insufficient());
        assert!(report.key_strengths().is_empty());
        assert!(report.exploitable_weaknesses().is_empty());
        assert!(report.recommendations().is_empty());
        assert_eq!(report.match_overview().opponent_overall_win_rate, None);
        assert_eq!(
            report.match_overview().opponent_recent_form_summary,
            "No recent matches"
        );
    }

    #[test]
    fn test_limited_data_status() {
        let config = AnalysisConfig::default();
        let report = build(&config, opponent(vec![map_stat("Haven", 2, 0)], 2));
        assert_eq!(
            report.data_status(),
            &DataStatus::Limited {
                reason: "fewer than 3 matches available for this opponent in the selected window (2 found)"
                    .to_string()
            }
        );
    }

    #[test]
    fn test_best_and_worst_maps_are_not_sample_gated() {
        let config = AnalysisConfig::default();
        let report = build(
            &config,
            opponent(
                vec![
                    map_stat("Ascent", 4, 4),
                    map_stat("Bind", 2, 5),
                    map_stat("Breeze", 2, 0),
                    map_stat("Haven", 11, 3),
                ],
                20,
            ),
        );
        let snapshot = report.opponent_snapshot();

        let best: Vec<&str> = snapshot.best_maps.maps.iter().map(|m| m.map.as_str()).collect();
        let worst: Vec<&str> = snapshot.worst_maps.maps.iter().map(|m| m.map.as_str()).collect();
        assert_eq!(best, vec!["Breeze", "Haven", "Ascent"]);
        assert_eq!(worst, vec!["Bind", "Ascent", "Haven"]);
        assert!(!snapshot.best_maps.sample_gated);
    }

    #[test]
    fn test_findings_split_by_polarity() {
        let config = AnalysisConfig::default();
        let mut snapshot = opponent(
            vec![map_stat("Bind", 2, 5), map_stat("Haven", 11, 3)],
            21,
        );
        // Streak severity 18.75 sits below Haven's 21.07
        snapshot.recent_form = vec![Outcome::Win; 5];
        let report = build(&config, snapshot);

        let strengths: Vec<&str> = report
            .key_strengths()
            .iter()
            .map(|f| f.description.as_str())
            .collect();
        assert_eq!(
            strengths,
            vec!["Dominant on Haven", "On a 5-match winning streak"]
        );
        assert_eq!(report.exploitable_weaknesses().len(), 1);
        assert_eq!(report.exploitable_weaknesses()[0].description, "Struggles on Bind");
        assert_eq!(report.data_status(), &DataStatus::Sufficient);
        assert_eq!(report.generated_at(), window().now);
    }

    #[test]
    fn test_star_players_ranked_by_impact_score() {
        let config = AnalysisConfig::default();
        let mut snapshot = opponent(vec![map_stat("Haven", 5, 5)], 10);
        snapshot.players = vec![
            // 104 + 24 + 30 - 3
            player_line("aspas", 10, 260.0, 0.8, 150.0, -6),
            // 92 + 48 + 32 + 4
            player_line("less", 10, 230.0, 1.6, 160.0, 8),
            player_line("saadhak", 10, 190.0, 1.0, 120.0, 0),
        ];
        let report = build(&config, snapshot);

        let stars: Vec<(&str, f64)> = report
            .opponent_snapshot()
            .star_players
            .iter()
            .map(|p| (p.name.as_str(), p.impact_score))
            .collect();
        assert_eq!(stars, vec![("less", 176.0), ("aspas", 155.0)]);

        // Player focus still follows combat score
        assert!(report.recommendations().iter().any(|r| r.decision
            == Decision::FocusPlayer {
                player: "aspas".into()
            }));
    }

    #[test]
    fn test_opponent_momentum() {
        let config = AnalysisConfig::default();
        let mut snapshot = opponent(vec![map_stat("Haven", 5, 5)], 10);
        snapshot.recent_form = vec![Outcome::Win, Outcome::Win, Outcome::Win, Outcome::Loss, Outcome::Loss];
        let report = build(&config, snapshot.clone());
        assert_eq!(report.match_overview().opponent_momentum, Some(Momentum::Improving));

        snapshot.recent_form.truncate(3);
        let report = build(&config, snapshot);
        assert_eq!(report.match_overview().opponent_momentum, None);
    }

    #[test]
    fn test_report_id_is_order_independent() {
        let w = window();
        let a: TeamId = "fnc".into();
        let b: TeamId = "sen".into();
        let ids: Vec<MatchId> = vec!["m2".into(), "m1".into()];
        let reversed: Vec<MatchId> = vec!["m1".into(), "m2".into()];

        assert_eq!(report_id(&a, &b, &w, &ids), report_id(&a, &b, &w, &reversed));
        assert_ne!(report_id(&a, &b, &w, &ids), report_id(&b, &a, &w, &ids));
    }
}
