//! Group standings: accumulate results from the match list and rank each group.

use crate::models::{Match, QualifiedTeam, Team, TeamStats};
use std::cmp::Ordering;
use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Name used to match teams across inconsistently typed data: decomposed, accents dropped,
/// surrounding whitespace trimmed. "Llunàtics 2" and "Llunatics 2" normalize to the same key.
pub fn normalize_team_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Ranking order shared by group tables and cross-group rankings: points, then goal difference,
/// then goals scored, all descending. `Ordering::Less` means `a` ranks above `b`.
pub fn compare_standing(a: &TeamStats, b: &TeamStats) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
}

/// Compute ranked standings for every group from the raw match list.
///
/// 1. Seed a zeroed record for every roster team (the roster itself is never touched).
/// 2. For each match with both scores set, credit each side that is found in the roster.
/// 3. Stable-sort each group with `compare_standing`; full ties keep roster order.
/// 4. Emit one row per team, group by group, with its 1-based position.
///
/// Group numbers in the output are the 1-based index of the group in `groups`.
pub fn calculate_standings(groups: &[Vec<Team>], matches: &[Match]) -> Vec<QualifiedTeam> {
    let mut tables: Vec<Vec<(&str, TeamStats)>> = groups
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|t| (t.name.as_str(), TeamStats::default()))
                .collect()
        })
        .collect();

    let mut index: HashMap<String, (usize, usize)> = HashMap::new();
    for (g, group) in groups.iter().enumerate() {
        for (t, team) in group.iter().enumerate() {
            let key = normalize_team_name(&team.name);
            if index.contains_key(&key) {
                log::warn!("Duplicate team name after normalization: {}", team.name);
                continue;
            }
            index.insert(key, (g, t));
        }
    }

    for m in matches {
        let Some((score1, score2)) = m.scores() else {
            continue;
        };
        let sides = [
            (m.team1.as_deref(), score1, score2),
            (m.team2.as_deref(), score2, score1),
        ];
        for (name, scored, conceded) in sides {
            let Some(name) = name else {
                continue;
            };
            match index.get(&normalize_team_name(name)) {
                Some(&(g, t)) => tables[g][t].1.record(scored, conceded),
                None => log::debug!("Skipping unknown team '{}' in match {:?}", name, m.id),
            }
        }
    }

    let mut qualified = Vec::with_capacity(tables.iter().map(Vec::len).sum());
    for (g, table) in tables.iter_mut().enumerate() {
        table.sort_by(|a, b| compare_standing(&a.1, &b.1));
        for (pos, (name, stats)) in table.iter().enumerate() {
            qualified.push(QualifiedTeam {
                name: (*name).to_string(),
                group: g as u32 + 1,
                position: pos as u32 + 1,
                stats: *stats,
            });
        }
    }
    qualified
}

/// Split computed standings back into per-group tables, in group order.
pub fn standings_by_group(qualified: &[QualifiedTeam]) -> Vec<Vec<QualifiedTeam>> {
    let mut grouped: Vec<Vec<QualifiedTeam>> = Vec::new();
    for team in qualified {
        let g = team.group.saturating_sub(1) as usize;
        if grouped.len() <= g {
            grouped.resize_with(g + 1, Vec::new);
        }
        grouped[g].push(team.clone());
    }
    grouped
}

/// Teams that finished in `position` across all groups, best first (same ordering as a group
/// table; ties keep group order).
pub fn rank_best_placed(qualified: &[QualifiedTeam], position: u32) -> Vec<&QualifiedTeam> {
    let mut placed: Vec<&QualifiedTeam> =
        qualified.iter().filter(|t| t.position == position).collect();
    placed.sort_by(|a, b| compare_standing(&a.stats, &b.stats));
    placed
}

/// True once every group match has both scores and is no longer live. Until then standings,
/// and any bracket slot derived from them, are provisional.
pub fn group_stage_complete(matches: &[Match]) -> bool {
    matches.iter().all(Match::is_complete)
}
