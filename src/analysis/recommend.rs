//! Turning findings into ranked coaching decisions.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::calculate::{mean, round_to, severity};
use crate::config::AnalysisConfig;
use crate::models::{
    Confidence, Decision, DependencyFinding, Evidence, Finding, PerformanceFinding, PlayerStat,
    Recommendation, Side, SideBiasFinding, StatField, Subject, TeamStatsSnapshot,
};

/// Output of ranking: the recommendations that made the cut and the ones
/// that ranked below it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedRecommendations {
    pub kept: Vec<Recommendation>,
    pub dropped: Vec<Recommendation>,
}

pub struct RecommendationEngine<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Derive, rank, dedupe and cap recommendations against `opponent`.
    ///
    /// `ours` adds our own record to map-pick reasoning when present.
    pub fn recommend(
        &self,
        opponent: &TeamStatsSnapshot,
        findings: &[Finding],
        ours: Option<&TeamStatsSnapshot>,
    ) -> RankedRecommendations {
        let mut candidates: Vec<Recommendation> = findings
            .iter()
            .filter_map(|finding| match finding {
                Finding::Strength(p) => self.from_strength(p),
                Finding::Weakness(p) => self.from_weakness(p, ours),
                Finding::Dependency(d) => Some(self.from_dependency(d)),
                Finding::SideBias(s) => Some(self.from_side_bias(s)),
                Finding::FormTrend(_) => None,
            })
            .collect();

        if let Some(focus) = self.player_focus(opponent) {
            candidates.push(focus);
        }

        debug!(
            "{} candidate recommendations from {} findings",
            candidates.len(),
            findings.len()
        );
        self.rank(candidates)
    }

    /// Sort, keep the best of each (target, type) pair and cap the list.
    /// Applying it to its own `kept` output changes nothing.
    pub fn rank(&self, mut candidates: Vec<Recommendation>) -> RankedRecommendations {
        candidates.sort_by(|a, b| a.rank_cmp(b));

        let mut seen = HashSet::new();
        let mut ranked = Vec::with_capacity(candidates.len());
        let mut dropped = Vec::new();
        for rec in candidates {
            if seen.insert(rec.dedup_key()) {
                ranked.push(rec);
            } else {
                debug!("Dropping duplicate recommendation: {}", rec.action);
            }
        }

        if ranked.len() > self.config.max_recommendations {
            dropped = ranked.split_off(self.config.max_recommendations);
            for rec in &dropped {
                debug!(
                    "Below the cap: {} ({} confidence, severity {:.2})",
                    rec.action, rec.confidence, rec.severity
                );
            }
            info!(
                "Kept {} recommendations, {} ranked below the cap of {}",
                ranked.len(),
                dropped.len(),
                self.config.max_recommendations
            );
        }

        RankedRecommendations {
            kept: ranked,
            dropped,
        }
    }

    fn sample_confidence(&self, sample_size: u32) -> Confidence {
        Confidence::from_sample(sample_size, self.config.high_confidence_games)
    }

    fn from_strength(&self, finding: &PerformanceFinding) -> Option<Recommendation> {
        let recommendation = match &finding.subject {
            Subject::Map(map) => Recommendation::new(
                Decision::BanMap { map: map.clone() },
                format!(
                    "Opponent's strongest map: {}-{} ({:.1}%) over {} games",
                    finding.wins, finding.losses, finding.win_rate, finding.sample_size
                ),
                "Removes their best map option",
                self.sample_confidence(finding.sample_size),
                finding.evidence.clone(),
                finding.severity,
            ),
            Subject::Agent(agent) => Recommendation::new(
                Decision::CounterAgent {
                    agent: agent.clone(),
                },
                format!(
                    "They win {:.1}% of games with {} picked ({}-{})",
                    finding.win_rate, agent, finding.wins, finding.losses
                ),
                "Takes away a composition they rely on to win",
                self.sample_confidence(finding.sample_size),
                finding.evidence.clone(),
                finding.severity,
            ),
            // A strong record overall is context, not something to ban.
            Subject::Overall => return None,
        };
        Some(recommendation)
    }

    fn from_weakness(
        &self,
        finding: &PerformanceFinding,
        ours: Option<&TeamStatsSnapshot>,
    ) -> Option<Recommendation> {
        // Weak agents are reported, not acted on.
        let Subject::Map(map) = &finding.subject else {
            return None;
        };

        let mut reasoning = format!(
            "Opponent struggles on {}: {}-{} ({:.1}%)",
            map, finding.wins, finding.losses, finding.win_rate
        );
        let our_stat = ours.and_then(|s| s.map(map));
        let expected_impact = match our_stat.and_then(|m| m.win_rate.map(|wr| (m, wr))) {
            Some((stat, our_rate)) => {
                reasoning.push_str(&format!(
                    "; we are {} ({:.1}%) there",
                    stat.record, our_rate
                ));
                let edge = round_to(our_rate - finding.win_rate, 1);
                if edge > 0.0 {
                    format!("+{:.1}% win rate edge on {}", edge, map)
                } else {
                    format!("Keeps them on a map they win {:.1}% of the time", finding.win_rate)
                }
            }
            None => format!(
                "Keeps them on a map they win {:.1}% of the time",
                finding.win_rate
            ),
        };

        Some(Recommendation::new(
            Decision::PickMap { map: map.clone() },
            reasoning,
            expected_impact,
            self.sample_confidence(finding.sample_size),
            finding.evidence.clone(),
            finding.severity,
        ))
    }

    fn from_dependency(&self, finding: &DependencyFinding) -> Recommendation {
        let excess = finding.excess();
        let confidence = if excess >= self.config.dependency_high_margin {
            Confidence::High
        } else if excess >= self.config.dependency_medium_margin {
            Confidence::Medium
        } else {
            Confidence::Low
        };
        let win_rate = finding
            .win_rate
            .map(|wr| format!("{:.1}%", wr))
            .unwrap_or_else(|| "n/a".to_string());

        Recommendation::new(
            Decision::BanAgent {
                agent: finding.agent.clone(),
            },
            format!(
                "{} takes {:.1}% of their {} picks ({:.1}% of all picks), win rate {}",
                finding.agent, finding.role_share, finding.role, finding.pick_rate, win_rate
            ),
            "Forces suboptimal compositions",
            confidence,
            finding.evidence.clone(),
            finding.severity,
        )
    }

    fn from_side_bias(&self, finding: &SideBiasFinding) -> Recommendation {
        let (weak, strong) = match finding.weaker_side {
            Side::Attack => (finding.attack_win_rate, finding.defense_win_rate),
            Side::Defense => (finding.defense_win_rate, finding.attack_win_rate),
        };
        Recommendation::new(
            Decision::ExploitSide {
                map: finding.map.clone(),
                side: finding.weaker_side,
            },
            format!(
                "{:.1}% rounds won on {} against {:.1}% on {} over {} games on {}",
                weak,
                finding.weaker_side,
                strong,
                finding.weaker_side.opposite(),
                finding.games,
                finding.map
            ),
            format!(
                "Pressure their {} half on {} where they concede most rounds",
                finding.weaker_side, finding.map
            ),
            self.sample_confidence(finding.games).downgrade(),
            finding.evidence.clone(),
            finding.severity,
        )
    }

    /// Highest-impact regular: best combat score among players with enough
    /// participation.
    fn player_focus(&self, opponent: &TeamStatsSnapshot) -> Option<Recommendation> {
        if opponent.games_analyzed == 0 {
            return None;
        }
        let required = self.config.player_participation * opponent.games_analyzed as f64;
        let star: &PlayerStat = opponent
            .players
            .iter()
            .filter(|p| p.games as f64 >= required)
            .min_by(|a, b| {
                b.avg_combat_score
                    .total_cmp(&a.avg_combat_score)
                    .then_with(|| b.avg_kd.total_cmp(&a.avg_kd))
                    .then_with(|| a.name.cmp(&b.name))
            })?;

        let scores: Vec<f64> = opponent.players.iter().map(|p| p.avg_combat_score).collect();
        let team_mean = mean(&scores).unwrap_or(0.0);
        let above_mean = if team_mean > 0.0 {
            (star.avg_combat_score - team_mean) / team_mean * 100.0
        } else {
            0.0
        };

        let agent = star
            .most_played_agent
            .as_deref()
            .map(|a| format!(" on {}", a))
            .unwrap_or_default();
        let evidence = Evidence::new(
            StatField::PlayerCombatScore {
                player: star.player_id.clone(),
            },
            star.avg_combat_score,
            format!(
                "{}: {:.1} ACS, {:.2} K/D over {} games{}",
                star.name, star.avg_combat_score, star.avg_kd, star.games, agent
            ),
        );

        Some(Recommendation::new(
            Decision::FocusPlayer {
                player: star.name.clone(),
            },
            format!(
                "Star player averaging {:.1} ACS, {:.2} K/D",
                star.avg_combat_score, star.avg_kd
            ),
            "Disrupting their star player reduces team effectiveness",
            self.sample_confidence(star.games),
            evidence,
            severity(above_mean, star.games, self.config.severity_prior),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::PatternDetector;
    use crate::models::{PlayerId, RecommendationKind, SideSplit};
    use crate::test_support::{empty_snapshot, map_stat};
    use pretty_assertions::assert_eq;

    fn opponent(maps: Vec<crate::models::MapStat>) -> TeamStatsSnapshot {
        let mut snapshot = empty_snapshot("sen");
        snapshot.matches_analyzed = maps.iter().map(|m| m.sample_size).sum();
        snapshot.games_analyzed = snapshot.matches_analyzed;
        snapshot.maps = maps;
        snapshot
    }

    fn player(name: &str, games: u32, acs: f64, kd: f64) -> PlayerStat {
        PlayerStat {
            player_id: PlayerId::from(name),
            name: name.to_string(),
            games,
            avg_kills: 18.0,
            avg_deaths: 14.0,
            avg_assists: 4.0,
            avg_adr: 150.0,
            avg_combat_score: acs,
            avg_kd: kd,
            first_kill_diff: 3,
            most_played_agent: Some("Jett".to_string()),
        }
    }

    fn run(
        config: &AnalysisConfig,
        snapshot: &TeamStatsSnapshot,
        ours: Option<&TeamStatsSnapshot>,
    ) -> RankedRecommendations {
        let findings = PatternDetector::new(config).detect(snapshot);
        RecommendationEngine::new(config).recommend(snapshot, &findings, ours)
    }

    #[test]
    fn test_reference_scenario_ban_and_pick() {
        let config = AnalysisConfig::default();
        let snapshot = opponent(vec![
            map_stat("Ascent", 4, 4),
            map_stat("Bind", 2, 5),
            map_stat("Haven", 11, 3),
        ]);
        let ranked = run(&config, &snapshot, None);

        let actions: Vec<(&str, Confidence)> = ranked
            .kept
            .iter()
            .map(|r| (r.action.as_str(), r.confidence))
            .collect();
        assert_eq!(
            actions,
            vec![("Ban Haven", Confidence::High), ("Pick Bind", Confidence::Medium)]
        );
        assert!(ranked.dropped.is_empty());
        assert_eq!(ranked.kept[0].evidence.text, "11-3 on Haven (78.6%)");
    }

    #[test]
    fn test_map_pick_mentions_our_record() {
        let config = AnalysisConfig::default();
        let snapshot = opponent(vec![map_stat("Bind", 2, 5)]);
        let ours = opponent(vec![map_stat("Bind", 6, 2)]);

        let ranked = run(&config, &snapshot, Some(&ours));
        let pick = &ranked.kept[0];
        assert_eq!(pick.kind, RecommendationKind::MapPick);
        assert!(pick.reasoning.ends_with("; we are 6-2 (75.0%) there"));
        assert_eq!(pick.expected_impact, "+46.4% win rate edge on Bind");
    }

    #[test]
    fn test_cap_reports_dropped_and_is_idempotent() {
        let mut config = AnalysisConfig::default();
        config.max_recommendations = 2;
        let snapshot = opponent(vec![
            map_stat("Haven", 11, 3),
            map_stat("Lotus", 9, 1),
            map_stat("Bind", 2, 5),
            map_stat("Split", 1, 6),
        ]);

        let ranked = run(&config, &snapshot, None);
        assert_eq!(ranked.kept.len(), 2);
        assert_eq!(ranked.dropped.len(), 2);

        let engine = RecommendationEngine::new(&config);
        let again = engine.rank(ranked.kept.clone());
        assert_eq!(again.kept, ranked.kept);
        assert!(again.dropped.is_empty());
    }

    #[test]
    fn test_duplicates_keep_highest_ranked() {
        let config = AnalysisConfig::default();
        let engine = RecommendationEngine::new(&config);
        let evidence = Evidence::new(StatField::OverallWinRate, 50.0, "50.0%");
        let weak = Recommendation::new(
            Decision::BanMap { map: "Haven".into() },
            "weak",
            "impact",
            Confidence::Medium,
            evidence.clone(),
            3.0,
        );
        let strong = Recommendation::new(
            Decision::BanMap { map: "Haven".into() },
            "strong",
            "impact",
            Confidence::High,
            evidence,
            1.0,
        );

        let ranked = engine.rank(vec![weak, strong]);
        assert_eq!(ranked.kept.len(), 1);
        assert_eq!(ranked.kept[0].reasoning, "strong");
    }

    #[test]
    fn test_player_focus_requires_participation() {
        let config = AnalysisConfig::default();
        let engine = RecommendationEngine::new(&config);
        let mut snapshot = opponent(vec![map_stat("Haven", 5, 5)]);
        snapshot.players = vec![
            // Subbed in once: highest score but not eligible
            player("sub", 1, 320.0, 2.0),
            player("aspas", 10, 260.0, 1.4),
            player("less", 9, 200.0, 1.0),
        ];

        let ranked = engine.recommend(&snapshot, &[], None);
        assert_eq!(ranked.kept.len(), 1);
        let focus = &ranked.kept[0];
        assert_eq!(focus.action, "Prioritize shutting down aspas");
        assert_eq!(focus.confidence, Confidence::High);
        assert_eq!(snapshot.resolve(&focus.evidence.field), Some(260.0));
    }

    #[test]
    fn test_overall_strength_is_not_actionable() {
        let config = AnalysisConfig::default();
        let mut snapshot = opponent(vec![map_stat("Haven", 5, 5)]);
        snapshot.wins = 8;
        snapshot.losses = 2;
        snapshot.overall_win_rate = Some(80.0);

        let findings = PatternDetector::new(&config).detect(&snapshot);
        assert_eq!(findings.len(), 1);
        let ranked = RecommendationEngine::new(&config).recommend(&snapshot, &findings, None);
        assert!(ranked.kept.is_empty());
    }

    #[test]
    fn test_no_players_no_focus() {
        let config = AnalysisConfig::default();
        let engine = RecommendationEngine::new(&config);
        let snapshot = opponent(vec![map_stat("Haven", 5, 5)]);
        assert!(engine.recommend(&snapshot, &[], None).kept.is_empty());
    }

    #[test]
    fn test_tactical_is_one_tier_below_sample_confidence() {
        let config = AnalysisConfig::default();
        let mut bind = map_stat("Bind", 5, 5);
        bind.attack = SideSplit {
            rounds_won: 30,
            rounds_played: 120,
            games: 10,
            win_rate: Some(25.0),
        };
        bind.defense = SideSplit {
            rounds_won: 70,
            rounds_played: 120,
            games: 10,
            win_rate: Some(58.3),
        };
        let snapshot = opponent(vec![bind]);

        let ranked = run(&config, &snapshot, None);
        let tactical = &ranked.kept[0];
        assert_eq!(tactical.kind, RecommendationKind::Tactical);
        assert_eq!(tactical.confidence, Confidence::Medium);
        assert_eq!(
            tactical.decision,
            Decision::ExploitSide {
                map: "Bind".into(),
                side: Side::Attack
            }
        );
    }

    #[test]
    fn test_dependency_confidence_by_margin() {
        let config = AnalysisConfig::default();
        let mut snapshot = opponent(vec![map_stat("Haven", 5, 5)]);
        snapshot.agents = vec![crate::models::AgentStat {
            agent: "Viper".to_string(),
            role: Some(crate::models::Role::Controller),
            picks: 9,
            wins: 5,
            pick_rate: Some(18.0),
            win_rate: Some(55.6),
            role_share: Some(72.0),
        }];

        let ranked = run(&config, &snapshot, None);
        let ban = ranked
            .kept
            .iter()
            .find(|r| r.kind == RecommendationKind::AgentBan)
            .unwrap();
        assert_eq!(ban.action, "Ban/punish Viper");
        assert_eq!(ban.confidence, Confidence::Medium);
    }
}
