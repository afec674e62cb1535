//! Reduction of raw match records into a [`TeamStatsSnapshot`].

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use crate::calculate::{mean, record_string, round_to, share_pct, win_rate_pct};
use crate::config::AnalysisConfig;
use crate::models::{
    AgentCatalog, AgentStat, AnalysisWindow, HeadToHead, HeadToHeadMap, MapStat, MatchRecord,
    Outcome, PlayerId, PlayerStat, Role, Side, SideSplit, TeamId, TeamInfo, TeamStatsSnapshot,
};

#[derive(Default)]
struct SideTally {
    rounds_won: u32,
    rounds_played: u32,
    games: u32,
}

impl SideTally {
    fn finish(self) -> SideSplit {
        SideSplit {
            win_rate: share_pct(self.rounds_won, self.rounds_played),
            rounds_won: self.rounds_won,
            rounds_played: self.rounds_played,
            games: self.games,
        }
    }
}

#[derive(Default)]
struct MapTally {
    wins: u32,
    losses: u32,
    rounds_won: u32,
    rounds_lost: u32,
    attack: SideTally,
    defense: SideTally,
}

impl MapTally {
    fn side_mut(&mut self, side: Side) -> &mut SideTally {
        match side {
            Side::Attack => &mut self.attack,
            Side::Defense => &mut self.defense,
        }
    }
}

#[derive(Default)]
struct AgentTally {
    picks: u32,
    wins: u32,
    role: Option<Role>,
}

struct PlayerTally {
    name: String,
    games: u32,
    kills: u32,
    deaths: u32,
    assists: u32,
    first_kills: u32,
    first_deaths: u32,
    adr: Vec<f64>,
    combat_score: Vec<f64>,
    kd: Vec<f64>,
    agents: BTreeMap<String, u32>,
}

impl PlayerTally {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            games: 0,
            kills: 0,
            deaths: 0,
            assists: 0,
            first_kills: 0,
            first_deaths: 0,
            adr: Vec::new(),
            combat_score: Vec::new(),
            kd: Vec::new(),
            agents: BTreeMap::new(),
        }
    }

    fn finish(self, player_id: PlayerId) -> PlayerStat {
        let games = self.games.max(1) as f64;
        // Most picked agent; alphabetical on ties.
        let most_played_agent = self
            .agents
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(agent, _)| agent.clone());

        PlayerStat {
            player_id,
            name: self.name,
            games: self.games,
            avg_kills: round_to(self.kills as f64 / games, 1),
            avg_deaths: round_to(self.deaths as f64 / games, 1),
            avg_assists: round_to(self.assists as f64 / games, 1),
            avg_adr: round_to(mean(&self.adr).unwrap_or(0.0), 1),
            avg_combat_score: round_to(mean(&self.combat_score).unwrap_or(0.0), 1),
            avg_kd: round_to(mean(&self.kd).unwrap_or(0.0), 2),
            first_kill_diff: i64::from(self.first_kills) - i64::from(self.first_deaths),
            most_played_agent,
        }
    }
}

/// Matches `team` played inside `window`, first occurrence of each id,
/// most recent first (match id breaks date ties).
pub fn matches_in_window<'m>(
    team: &TeamId,
    matches: &'m [MatchRecord],
    window: &AnalysisWindow,
) -> Vec<&'m MatchRecord> {
    let mut seen = HashSet::new();
    let mut selected: Vec<&MatchRecord> = matches
        .iter()
        .filter(|m| m.involves(team) && window.contains(m.date))
        .filter(|m| seen.insert(&m.id))
        .collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
    selected
}

/// Builds team snapshots. Stateless; one instance can serve any number of
/// teams.
pub struct StatsAggregator<'a> {
    config: &'a AnalysisConfig,
    catalog: &'a AgentCatalog,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(config: &'a AnalysisConfig, catalog: &'a AgentCatalog) -> Self {
        Self { config, catalog }
    }

    /// Aggregate `team`'s matches inside `window` into one snapshot.
    pub fn aggregate(
        &self,
        team: &TeamInfo,
        matches: &[MatchRecord],
        window: AnalysisWindow,
    ) -> TeamStatsSnapshot {
        let selected = matches_in_window(&team.id, matches, &window);

        let mut wins = 0u32;
        let mut losses = 0u32;
        let mut games_analyzed = 0u32;
        let mut maps: BTreeMap<String, MapTally> = BTreeMap::new();
        let mut agents: BTreeMap<String, AgentTally> = BTreeMap::new();
        let mut players: BTreeMap<PlayerId, PlayerTally> = BTreeMap::new();

        for record in &selected {
            match record.outcome_for(&team.id) {
                Some(Outcome::Win) => wins += 1,
                Some(Outcome::Loss) => losses += 1,
                None => continue,
            }

            for game in &record.games {
                games_analyzed += 1;
                let won = game.winner == team.id;

                let tally = maps.entry(self.catalog.canonical_map(&game.map)).or_default();
                if won {
                    tally.wins += 1;
                } else {
                    tally.losses += 1;
                }
                let (rounds_won, rounds_lost) = record.rounds_for(game, &team.id);
                tally.rounds_won += rounds_won;
                tally.rounds_lost += rounds_lost;

                let mut sides_seen = [false, false];
                for (side, won_rounds, played_rounds) in record.halves_for(game, &team.id) {
                    let side_tally = tally.side_mut(side);
                    side_tally.rounds_won += won_rounds;
                    side_tally.rounds_played += played_rounds;
                    let slot = &mut sides_seen[side as usize];
                    if !*slot {
                        *slot = true;
                        side_tally.games += 1;
                    }
                }

                for pick in game.agent_picks.iter().filter(|p| p.team == team.id) {
                    let agent = agents
                        .entry(self.catalog.canonical_agent(&pick.agent))
                        .or_default();
                    agent.picks += 1;
                    if won {
                        agent.wins += 1;
                    }
                    if agent.role.is_none() {
                        agent.role = pick.role.or_else(|| self.catalog.role_of(&pick.agent));
                    }
                }

                for stat in game.player_stats.iter().filter(|s| s.team == team.id) {
                    let player = players
                        .entry(stat.player_id.clone())
                        .or_insert_with(|| PlayerTally::new(&stat.player_name));
                    player.games += 1;
                    player.kills += stat.kills;
                    player.deaths += stat.deaths;
                    player.assists += stat.assists;
                    player.first_kills += stat.first_kills;
                    player.first_deaths += stat.first_deaths;
                    player.adr.push(stat.adr);
                    player.combat_score.push(stat.combat_score);
                    player.kd.push(stat.kd_ratio());
                    if let Some(agent) = &stat.agent {
                        *player
                            .agents
                            .entry(self.catalog.canonical_agent(agent))
                            .or_default() += 1;
                    }
                }
            }
        }

        let total_agent_picks: u32 = agents.values().map(|a| a.picks).sum();
        let mut role_picks: BTreeMap<Role, u32> = BTreeMap::new();
        for agent in agents.values() {
            if let Some(role) = agent.role {
                *role_picks.entry(role).or_default() += agent.picks;
            }
        }

        let map_stats: Vec<MapStat> = maps
            .into_iter()
            .map(|(map, tally)| {
                let sample_size = tally.wins + tally.losses;
                let diff = i64::from(tally.rounds_won) - i64::from(tally.rounds_lost);
                MapStat {
                    map,
                    wins: tally.wins,
                    losses: tally.losses,
                    sample_size,
                    win_rate: win_rate_pct(tally.wins, tally.losses),
                    record: record_string(tally.wins, tally.losses),
                    rounds_won: tally.rounds_won,
                    rounds_lost: tally.rounds_lost,
                    avg_round_diff: (sample_size > 0)
                        .then(|| round_to(diff as f64 / sample_size as f64, 1)),
                    attack: tally.attack.finish(),
                    defense: tally.defense.finish(),
                }
            })
            .collect();

        let agent_stats: Vec<AgentStat> = agents
            .into_iter()
            .map(|(agent, tally)| {
                let role_share = tally
                    .role
                    .and_then(|role| share_pct(tally.picks, role_picks.get(&role).copied().unwrap_or(0)));
                AgentStat {
                    agent,
                    role: tally.role,
                    picks: tally.picks,
                    wins: tally.wins,
                    pick_rate: share_pct(tally.picks, total_agent_picks),
                    win_rate: share_pct(tally.wins, tally.picks),
                    role_share,
                }
            })
            .collect();

        let mut player_stats: Vec<PlayerStat> = players
            .into_iter()
            .map(|(id, tally)| tally.finish(id))
            .collect();
        player_stats.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.player_id.cmp(&b.player_id)));

        let recent_form: Vec<Outcome> = selected
            .iter()
            .filter_map(|m| m.outcome_for(&team.id))
            .take(self.config.recent_form_length)
            .collect();

        debug!(
            "Aggregated {}: {} maps, {} agents, {} players",
            team.name,
            map_stats.len(),
            agent_stats.len(),
            player_stats.len()
        );
        info!(
            "Snapshot for {}: {} matches, {} games in the last {} days",
            team.name,
            selected.len(),
            games_analyzed,
            window.days
        );

        TeamStatsSnapshot {
            team: team.clone(),
            window,
            matches_analyzed: selected.len() as u32,
            games_analyzed,
            wins,
            losses,
            overall_win_rate: win_rate_pct(wins, losses),
            maps: map_stats,
            agents: agent_stats,
            players: player_stats,
            total_agent_picks,
            recent_form,
        }
    }

    /// Direct meetings between `team_a` and `team_b` inside the window,
    /// drawn from both teams' records.
    pub fn head_to_head(
        &self,
        team_a: &TeamId,
        team_b: &TeamId,
        matches_a: &[MatchRecord],
        matches_b: &[MatchRecord],
        window: &AnalysisWindow,
    ) -> HeadToHead {
        let mut seen = HashSet::new();
        let mut meetings: Vec<&MatchRecord> = matches_a
            .iter()
            .chain(matches_b.iter())
            .filter(|m| m.is_between(team_a, team_b) && window.contains(m.date))
            .filter(|m| seen.insert(&m.id))
            .collect();
        meetings.sort_by(|a, b| a.id.cmp(&b.id));

        let team_a_wins = meetings.iter().filter(|m| &m.winner == team_a).count() as u32;
        let team_b_wins = meetings.len() as u32 - team_a_wins;

        let mut maps: BTreeMap<String, (u32, u32)> = BTreeMap::new();
        for record in &meetings {
            for game in &record.games {
                let entry = maps.entry(self.catalog.canonical_map(&game.map)).or_default();
                if &game.winner == team_a {
                    entry.0 += 1;
                } else {
                    entry.1 += 1;
                }
            }
        }

        HeadToHead {
            matches_played: meetings.len() as u32,
            team_a_wins,
            team_b_wins,
            team_a_win_rate: win_rate_pct(team_a_wins, team_b_wins),
            maps: maps
                .into_iter()
                .map(|(map, (a, b))| HeadToHeadMap {
                    map,
                    team_a_wins: a,
                    team_b_wins: b,
                })
                .collect(),
        }
    }
}
