//! Fixture builders shared by unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::calculate::{record_string, win_rate_pct};
use crate::models::{
    AgentPick, AnalysisWindow, GameRecord, HalfRecord, MapStat, MatchRecord, PlayerGameStat,
    PlayerStat, Side, SideSplit, TeamInfo, TeamStatsSnapshot,
};

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
}

pub(crate) fn window() -> AnalysisWindow {
    AnalysisWindow::new(now(), 90)
}

pub(crate) fn team(id: &str) -> TeamInfo {
    TeamInfo::new(id, id.to_uppercase())
}

/// A game won by `winner` 13 to `loser_rounds`, listed with `team_a` first.
pub(crate) fn game(map: &str, team_a: &str, winner: &str, loser_rounds: u32) -> GameRecord {
    let (team_a_rounds, team_b_rounds) = if winner == team_a {
        (13, loser_rounds)
    } else {
        (loser_rounds, 13)
    };
    GameRecord {
        map: map.to_string(),
        winner: winner.into(),
        team_a_rounds,
        team_b_rounds,
        halves: Vec::new(),
        agent_picks: Vec::new(),
        player_stats: Vec::new(),
    }
}

/// A match `days_ago` days before [`now`], winner and score derived from the games.
pub(crate) fn series(
    id: &str,
    days_ago: i64,
    team_a: &str,
    team_b: &str,
    games: Vec<GameRecord>,
) -> MatchRecord {
    let a_wins = games.iter().filter(|g| g.winner.as_str() == team_a).count() as u32;
    let b_wins = games.len() as u32 - a_wins;
    let winner = if a_wins >= b_wins { team_a } else { team_b };
    MatchRecord {
        id: id.into(),
        date: now() - Duration::days(days_ago),
        tournament: None,
        best_of: 3,
        team_a: team_a.into(),
        team_b: team_b.into(),
        winner: winner.into(),
        team_a_score: a_wins,
        team_b_score: b_wins,
        games,
    }
}

/// `wins + losses` single-game matches for `team` on `map`, numbered from
/// `first_day` days ago, one day apart.
pub(crate) fn map_run(
    team: &str,
    opponent: &str,
    map: &str,
    wins: u32,
    losses: u32,
    first_day: i64,
) -> Vec<MatchRecord> {
    let mut matches = Vec::new();
    for i in 0..(wins + losses) {
        let winner = if i < wins { team } else { opponent };
        let day = first_day + i as i64;
        let id = format!("{}-{}-{}", team, map.to_lowercase(), day);
        matches.push(series(&id, day, team, opponent, vec![game(map, team, winner, 7)]));
    }
    matches
}

pub(crate) fn pick(team: &str, player: &str, agent: &str) -> AgentPick {
    AgentPick {
        team: team.into(),
        player_id: player.into(),
        player_name: player.to_string(),
        agent: agent.to_string(),
        role: None,
    }
}

pub(crate) fn player_stat(team: &str, player: &str, kills: u32, deaths: u32, acs: f64) -> PlayerGameStat {
    PlayerGameStat {
        team: team.into(),
        player_id: player.into(),
        player_name: player.to_string(),
        agent: None,
        kills,
        deaths,
        assists: 4,
        adr: 140.0,
        combat_score: acs,
        first_kills: 2,
        first_deaths: 1,
    }
}

pub(crate) fn half(team_a_side: Side, team_a_rounds: u32, team_b_rounds: u32) -> HalfRecord {
    HalfRecord {
        team_a_side,
        team_a_rounds,
        team_b_rounds,
    }
}

pub(crate) fn empty_snapshot(team_id: &str) -> TeamStatsSnapshot {
    TeamStatsSnapshot {
        team: team(team_id),
        window: window(),
        matches_analyzed: 0,
        games_analyzed: 0,
        wins: 0,
        losses: 0,
        overall_win_rate: None,
        maps: Vec::new(),
        agents: Vec::new(),
        players: Vec::new(),
        total_agent_picks: 0,
        recent_form: Vec::new(),
    }
}

pub(crate) fn map_stat(map: &str, wins: u32, losses: u32) -> MapStat {
    MapStat {
        map: map.to_string(),
        wins,
        losses,
        sample_size: wins + losses,
        win_rate: win_rate_pct(wins, losses),
        record: record_string(wins, losses),
        rounds_won: 0,
        rounds_lost: 0,
        avg_round_diff: None,
        attack: SideSplit::default(),
        defense: SideSplit::default(),
    }
}

/// Aggregated player line; the name doubles as the id.
pub(crate) fn player_line(
    name: &str,
    games: u32,
    acs: f64,
    kd: f64,
    adr: f64,
    first_kill_diff: i64,
) -> PlayerStat {
    PlayerStat {
        player_id: name.into(),
        name: name.to_string(),
        games,
        avg_kills: 16.0,
        avg_deaths: 14.0,
        avg_assists: 5.0,
        avg_adr: adr,
        avg_combat_score: acs,
        avg_kd: kd,
        first_kill_diff,
        most_played_agent: None,
    }
}
