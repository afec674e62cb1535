//! Pattern detection over a team snapshot.
//!
//! Each detector reads only the snapshot and the configured thresholds and
//! emits classified findings with a cited statistic. Findings come back
//! ranked by severity with a total, deterministic tie-break.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::calculate::{current_streak, round_to, severity};
use crate::config::AnalysisConfig;
use crate::models::{
    AgentStat, DependencyFinding, Evidence, Finding, FormTrendFinding, MapStat,
    PerformanceFinding, Role, Side, SideBiasFinding, StatField, Streak, Subject,
    TeamStatsSnapshot,
};

/// Neutral win rate findings are measured against.
const BASELINE: f64 = 50.0;

pub struct PatternDetector<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> PatternDetector<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// All findings for `snapshot`, most severe first.
    pub fn detect(&self, snapshot: &TeamStatsSnapshot) -> Vec<Finding> {
        if snapshot.is_empty() {
            debug!("No matches for {}, skipping detection", snapshot.team.name);
            return Vec::new();
        }

        let mut findings = Vec::new();
        findings.extend(self.overall_strength(snapshot));
        findings.extend(snapshot.maps.iter().filter_map(|m| self.classify_map(m)));
        findings.extend(snapshot.agents.iter().filter_map(|a| self.classify_agent(a)));
        findings.extend(self.dependencies(snapshot));
        findings.extend(snapshot.maps.iter().filter_map(|m| self.side_bias(m)));
        findings.extend(self.form_trend(snapshot));

        findings.sort_by(|a, b| a.rank_cmp(b));

        info!(
            "Detected {} patterns for {} ({} maps, {} agents inspected)",
            findings.len(),
            snapshot.team.name,
            snapshot.maps.len(),
            snapshot.agents.len()
        );
        findings
    }

    /// Match record at or above the overall strength cutoff.
    fn overall_strength(&self, snapshot: &TeamStatsSnapshot) -> Option<Finding> {
        let sample_size = snapshot.wins + snapshot.losses;
        if sample_size < self.config.min_sample_size {
            return None;
        }
        let win_rate = snapshot.overall_win_rate?;
        if win_rate < self.config.overall_strength_win_rate {
            return None;
        }

        let evidence = Evidence::new(
            StatField::OverallWinRate,
            win_rate,
            format!(
                "{}-{} across {} matches ({:.1}%)",
                snapshot.wins, snapshot.losses, sample_size, win_rate
            ),
        );
        Some(Finding::Strength(PerformanceFinding {
            subject: Subject::Overall,
            win_rate,
            wins: snapshot.wins,
            losses: snapshot.losses,
            sample_size,
            evidence,
            severity: severity(win_rate - BASELINE, sample_size, self.config.severity_prior),
        }))
    }

    /// Strength or weakness on a map with enough games.
    fn classify_map(&self, map: &MapStat) -> Option<Finding> {
        if map.sample_size < self.config.min_sample_size {
            return None;
        }
        let win_rate = map.win_rate?;
        let evidence = Evidence::new(
            StatField::MapWinRate {
                map: map.map.clone(),
            },
            win_rate,
            format!("{} on {} ({:.1}%)", map.record, map.map, win_rate),
        );
        self.classify(
            Subject::Map(map.map.clone()),
            win_rate,
            map.wins,
            map.losses,
            evidence,
        )
    }

    /// Strength or weakness with an agent, sampled by picks.
    fn classify_agent(&self, agent: &AgentStat) -> Option<Finding> {
        if agent.picks < self.config.min_sample_size {
            return None;
        }
        let win_rate = agent.win_rate?;
        let losses = agent.picks - agent.wins;
        let evidence = Evidence::new(
            StatField::AgentWinRate {
                agent: agent.agent.clone(),
            },
            win_rate,
            format!(
                "{}-{} in games with {} picked ({:.1}%)",
                agent.wins, losses, agent.agent, win_rate
            ),
        );
        self.classify(
            Subject::Agent(agent.agent.clone()),
            win_rate,
            agent.wins,
            losses,
            evidence,
        )
    }

    fn classify(
        &self,
        subject: Subject,
        win_rate: f64,
        wins: u32,
        losses: u32,
        evidence: Evidence,
    ) -> Option<Finding> {
        let sample_size = wins + losses;
        let finding = PerformanceFinding {
            subject,
            win_rate,
            wins,
            losses,
            sample_size,
            evidence,
            severity: severity(win_rate - BASELINE, sample_size, self.config.severity_prior),
        };

        // Rates are already rounded to one decimal; both cutoffs are inclusive.
        if win_rate >= self.config.strength_win_rate {
            Some(Finding::Strength(finding))
        } else if win_rate <= self.config.weakness_win_rate {
            Some(Finding::Weakness(finding))
        } else {
            None
        }
    }

    /// Agents taking more than the dependency share of their role's picks.
    fn dependencies(&self, snapshot: &TeamStatsSnapshot) -> Vec<Finding> {
        let mut role_picks: BTreeMap<Role, u32> = BTreeMap::new();
        for agent in &snapshot.agents {
            if let Some(role) = agent.role {
                *role_picks.entry(role).or_default() += agent.picks;
            }
        }

        snapshot
            .agents
            .iter()
            .filter(|a| a.picks >= self.config.min_sample_size)
            .filter_map(|agent| {
                let role = agent.role?;
                let role_share = agent.role_share?;
                if role_share <= self.config.dependency_share {
                    return None;
                }
                let total = role_picks.get(&role).copied().unwrap_or(agent.picks);
                let evidence = Evidence::new(
                    StatField::AgentRoleShare {
                        agent: agent.agent.clone(),
                    },
                    role_share,
                    format!(
                        "{} on {} of {} {} picks ({:.1}%)",
                        agent.agent, agent.picks, total, role, role_share
                    ),
                );
                Some(Finding::Dependency(DependencyFinding {
                    agent: agent.agent.clone(),
                    role,
                    picks: agent.picks,
                    role_picks: total,
                    role_share,
                    pick_rate: agent.pick_rate.unwrap_or(0.0),
                    win_rate: agent.win_rate,
                    threshold: self.config.dependency_share,
                    evidence,
                    severity: severity(
                        role_share - BASELINE,
                        agent.picks,
                        self.config.severity_prior,
                    ),
                }))
            })
            .collect()
    }

    /// Attack and defense round win rates far apart on one map.
    fn side_bias(&self, map: &MapStat) -> Option<Finding> {
        let games = map.attack.games.min(map.defense.games);
        if games < self.config.side_min_games {
            return None;
        }
        let attack = map.attack.win_rate?;
        let defense = map.defense.win_rate?;
        let gap = round_to((attack - defense).abs(), 1);
        if gap <= self.config.side_bias_margin {
            return None;
        }

        let weaker_side = if attack < defense {
            Side::Attack
        } else {
            Side::Defense
        };
        let weaker_rate = map.side(weaker_side).win_rate.unwrap_or(0.0);
        let stronger_rate = map.side(weaker_side.opposite()).win_rate.unwrap_or(0.0);
        let evidence = Evidence::new(
            StatField::MapSideWinRate {
                map: map.map.clone(),
                side: weaker_side,
            },
            weaker_rate,
            format!(
                "{}: {} rounds won {:.1}% vs {} {:.1}% over {} games",
                map.map,
                weaker_side,
                weaker_rate,
                weaker_side.opposite(),
                stronger_rate,
                games
            ),
        );

        Some(Finding::SideBias(SideBiasFinding {
            map: map.map.clone(),
            weaker_side,
            attack_win_rate: attack,
            defense_win_rate: defense,
            gap,
            games,
            evidence,
            severity: severity(gap / 2.0, games, self.config.severity_prior),
        }))
    }

    /// The last `form_trend_length` results all went the same way.
    fn form_trend(&self, snapshot: &TeamStatsSnapshot) -> Option<Finding> {
        let length = self.config.form_trend_length;
        let recent = snapshot.recent_form.get(..length)?;
        let first = *recent.first()?;
        if recent.iter().any(|o| *o != first) {
            return None;
        }

        let streak = if first.is_win() {
            Streak::Winning
        } else {
            Streak::Losing
        };
        let streak_length = current_streak(&snapshot.recent_form);
        let form = snapshot.recent_form_string();
        let wins = if first.is_win() { length } else { 0 };
        let evidence = Evidence::new(
            StatField::RecentFormWins { length },
            wins as f64,
            format!(
                "Last {} results {} (current run of {})",
                length,
                &form[..length],
                streak_length
            ),
        );

        Some(Finding::FormTrend(FormTrendFinding {
            streak,
            window: length,
            streak_length,
            form,
            evidence,
            severity: severity(BASELINE, length as u32, self.config.severity_prior),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Outcome, SideSplit};
    use crate::test_support::{empty_snapshot, map_stat};
    use Outcome::{Loss as L, Win as W};

    fn detect(snapshot: &TeamStatsSnapshot) -> Vec<Finding> {
        let config = AnalysisConfig::default();
        PatternDetector::new(&config).detect(snapshot)
    }

    fn snapshot_with_maps(maps: Vec<MapStat>) -> TeamStatsSnapshot {
        let mut snapshot = empty_snapshot("sen");
        snapshot.matches_analyzed = maps.iter().map(|m| m.sample_size).sum();
        snapshot.games_analyzed = snapshot.matches_analyzed;
        snapshot.maps = maps;
        snapshot
    }

    fn agent(name: &str, role: Role, picks: u32, wins: u32, role_share: f64) -> AgentStat {
        AgentStat {
            agent: name.to_string(),
            role: Some(role),
            picks,
            wins,
            pick_rate: Some(20.0),
            win_rate: crate::calculate::share_pct(wins, picks),
            role_share: Some(role_share),
        }
    }

    fn split(won: u32, played: u32, games: u32) -> SideSplit {
        SideSplit {
            rounds_won: won,
            rounds_played: played,
            games,
            win_rate: crate::calculate::share_pct(won, played),
        }
    }

    #[test]
    fn test_empty_snapshot_has_no_findings() {
        assert!(detect(&empty_snapshot("sen")).is_empty());
    }

    #[test]
    fn test_small_sample_map_is_not_classified() {
        let snapshot = snapshot_with_maps(vec![map_stat("Breeze", 2, 0)]);
        assert!(detect(&snapshot).is_empty());
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        // 13-7 is exactly 65.0%, 2-3 exactly 40.0%
        let snapshot = snapshot_with_maps(vec![map_stat("Lotus", 13, 7), map_stat("Split", 2, 3)]);
        let findings = detect(&snapshot);

        assert_eq!(findings.len(), 2);
        assert!(findings
            .iter()
            .any(|f| matches!(f, Finding::Strength(p) if p.subject.name() == "Lotus")));
        assert!(findings
            .iter()
            .any(|f| matches!(f, Finding::Weakness(p) if p.subject.name() == "Split")));
    }

    #[test]
    fn test_reference_scenario() {
        let snapshot = snapshot_with_maps(vec![
            map_stat("Ascent", 4, 4),
            map_stat("Bind", 2, 5),
            map_stat("Haven", 11, 3),
        ]);
        let findings = detect(&snapshot);

        assert_eq!(findings.len(), 2);
        match &findings[0] {
            Finding::Strength(p) => {
                assert_eq!(p.subject, Subject::Map("Haven".into()));
                assert_eq!(p.win_rate, 78.6);
                assert_eq!(p.evidence.text, "11-3 on Haven (78.6%)");
                assert_eq!(p.severity, 21.07);
            }
            other => panic!("expected Haven strength, got {:?}", other),
        }
        match &findings[1] {
            Finding::Weakness(p) => {
                assert_eq!(p.subject, Subject::Map("Bind".into()));
                assert_eq!(p.win_rate, 28.6);
            }
            other => panic!("expected Bind weakness, got {:?}", other),
        }
    }

    #[test]
    fn test_evidence_resolves_against_snapshot() {
        let snapshot = snapshot_with_maps(vec![map_stat("Haven", 11, 3), map_stat("Bind", 2, 5)]);
        for finding in detect(&snapshot) {
            let evidence = finding.evidence();
            assert_eq!(snapshot.resolve(&evidence.field), Some(evidence.value));
        }
    }

    #[test]
    fn test_agent_strength_and_dependency() {
        let mut snapshot = snapshot_with_maps(vec![map_stat("Haven", 5, 5)]);
        snapshot.agents = vec![
            agent("Jett", Role::Duelist, 8, 6, 80.0),
            agent("Raze", Role::Duelist, 2, 1, 20.0),
            agent("Omen", Role::Controller, 5, 3, 50.0),
        ];
        let findings = detect(&snapshot);

        let dependency = findings
            .iter()
            .find_map(|f| match f {
                Finding::Dependency(d) => Some(d),
                _ => None,
            })
            .unwrap();
        assert_eq!(dependency.agent, "Jett");
        assert_eq!(dependency.role_picks, 10);
        assert_eq!(dependency.excess(), 20.0);
        assert_eq!(dependency.evidence.text, "Jett on 8 of 10 duelist picks (80.0%)");

        // 6-2 with Jett is 75%
        assert!(findings
            .iter()
            .any(|f| matches!(f, Finding::Strength(p) if p.subject == Subject::Agent("Jett".into()))));
        // Omen sits at 60%: neither cutoff
        assert!(!findings.iter().any(|f| f.entity().name == "Omen"));
    }

    #[test]
    fn test_dependency_needs_strictly_more_than_threshold() {
        let mut snapshot = snapshot_with_maps(vec![map_stat("Haven", 5, 5)]);
        snapshot.agents = vec![agent("Viper", Role::Controller, 6, 3, 60.0)];
        assert!(detect(&snapshot)
            .iter()
            .all(|f| !matches!(f, Finding::Dependency(_))));
    }

    #[test]
    fn test_side_bias_names_weaker_side() {
        let mut bind = map_stat("Bind", 3, 2);
        bind.attack = split(20, 60, 5);
        bind.defense = split(40, 60, 5);
        let snapshot = snapshot_with_maps(vec![bind]);

        let findings = detect(&snapshot);
        let bias = findings
            .iter()
            .find_map(|f| match f {
                Finding::SideBias(s) => Some(s),
                _ => None,
            })
            .unwrap();
        assert_eq!(bias.weaker_side, Side::Attack);
        assert_eq!(bias.gap, 33.4);
        assert_eq!(bias.games, 5);
        assert_eq!(
            snapshot.resolve(&bias.evidence.field),
            Some(bias.evidence.value)
        );
    }

    #[test]
    fn test_dependency_needs_min_picks() {
        let mut snapshot = snapshot_with_maps(vec![map_stat("Haven", 5, 5)]);
        // 2 of 3 sentinel picks is 66.7%, but only 2 picks
        snapshot.agents = vec![
            agent("Killjoy", Role::Sentinel, 2, 1, 66.7),
            agent("Cypher", Role::Sentinel, 1, 0, 33.3),
        ];
        assert!(detect(&snapshot)
            .iter()
            .all(|f| !matches!(f, Finding::Dependency(_))));

        snapshot.agents[0] = agent("Killjoy", Role::Sentinel, 3, 1, 75.0);
        assert!(detect(&snapshot)
            .iter()
            .any(|f| matches!(f, Finding::Dependency(d) if d.agent == "Killjoy")));
    }

    #[test]
    fn test_side_bias_gap_at_margin_is_not_emitted() {
        // 45.0% attack against 60.0% defense: a gap of exactly 15.0
        let mut bind = map_stat("Bind", 3, 2);
        bind.attack = split(27, 60, 5);
        bind.defense = split(36, 60, 5);
        assert!(detect(&snapshot_with_maps(vec![bind.clone()]))
            .iter()
            .all(|f| !matches!(f, Finding::SideBias(_))));

        // 43.3% against 60.0% clears it
        bind.attack = split(26, 60, 5);
        assert!(detect(&snapshot_with_maps(vec![bind]))
            .iter()
            .any(|f| matches!(f, Finding::SideBias(s) if s.gap == 16.7)));
    }

    #[test]
    fn test_overall_strength() {
        let mut snapshot = snapshot_with_maps(vec![map_stat("Haven", 5, 5)]);
        snapshot.wins = 6;
        snapshot.losses = 4;
        snapshot.overall_win_rate = Some(60.0);

        let findings = detect(&snapshot);
        let overall = findings
            .iter()
            .find_map(|f| match f {
                Finding::Strength(p) if p.subject == Subject::Overall => Some(p),
                _ => None,
            })
            .unwrap();
        assert_eq!(overall.evidence.text, "6-4 across 10 matches (60.0%)");
        assert_eq!(snapshot.resolve(&overall.evidence.field), Some(60.0));
        // 10 * 10 / 15
        assert_eq!(overall.severity, 6.67);

        snapshot.wins = 5;
        snapshot.losses = 5;
        snapshot.overall_win_rate = Some(50.0);
        assert!(detect(&snapshot)
            .iter()
            .all(|f| !matches!(f, Finding::Strength(p) if p.subject == Subject::Overall)));
    }

    #[test]
    fn test_overall_strength_needs_min_sample() {
        let mut snapshot = snapshot_with_maps(vec![map_stat("Haven", 2, 0)]);
        snapshot.wins = 2;
        snapshot.overall_win_rate = Some(100.0);
        assert!(detect(&snapshot).is_empty());
    }

    #[test]
    fn test_side_bias_needs_games_on_both_sides() {
        let mut bind = map_stat("Bind", 3, 2);
        bind.attack = split(10, 40, 4);
        bind.defense = split(30, 40, 2);
        assert!(detect(&snapshot_with_maps(vec![bind])).is_empty());
    }

    #[test]
    fn test_form_trend() {
        let mut snapshot = snapshot_with_maps(vec![map_stat("Haven", 5, 5)]);
        snapshot.recent_form = vec![L, L, L, L, W];
        let findings = detect(&snapshot);

        let trend = findings
            .iter()
            .find_map(|f| match f {
                Finding::FormTrend(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(trend.streak, Streak::Losing);
        assert_eq!(trend.streak_length, 4);
        assert_eq!(trend.evidence.value, 0.0);

        snapshot.recent_form = vec![W, L, W, W, W];
        assert!(detect(&snapshot)
            .iter()
            .all(|f| !matches!(f, Finding::FormTrend(_))));
    }

    #[test]
    fn test_equal_severity_ties_break_by_name() {
        let snapshot = snapshot_with_maps(vec![
            map_stat("Split", 8, 2),
            map_stat("Ascent", 8, 2),
        ]);
        let findings = detect(&snapshot);
        let names: Vec<&str> = findings.iter().map(|f| f.evidence().text.as_str()).collect();
        assert_eq!(names, vec!["8-2 on Ascent (80.0%)", "8-2 on Split (80.0%)"]);
    }
}
