//! Tournament leaderboards derived from standings.

use crate::models::QualifiedTeam;
use serde::Serialize;

/// One leaderboard entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Leader {
    pub team: String,
    pub group: u32,
    pub value: i64,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentLeaders {
    pub most_goals_scored: Vec<Leader>,
    pub most_goals_conceded: Vec<Leader>,
    pub best_goal_difference: Vec<Leader>,
    pub most_points: Vec<Leader>,
    pub most_wins: Vec<Leader>,
}

/// Top `limit` teams per category. Ties keep standings order.
pub fn tournament_leaders(qualified: &[QualifiedTeam], limit: usize) -> TournamentLeaders {
    TournamentLeaders {
        most_goals_scored: top_by(qualified, limit, |t| t.stats.goals_for.into()),
        most_goals_conceded: top_by(qualified, limit, |t| t.stats.goals_against.into()),
        best_goal_difference: top_by(qualified, limit, QualifiedTeam::goal_difference),
        most_points: top_by(qualified, limit, |t| t.stats.points.into()),
        most_wins: top_by(qualified, limit, |t| t.stats.won.into()),
    }
}

fn top_by(
    qualified: &[QualifiedTeam],
    limit: usize,
    key: impl Fn(&QualifiedTeam) -> i64,
) -> Vec<Leader> {
    let mut ranked: Vec<&QualifiedTeam> = qualified.iter().collect();
    ranked.sort_by_key(|t| std::cmp::Reverse(key(*t)));
    ranked
        .into_iter()
        .take(limit)
        .map(|t| Leader {
            team: t.name.clone(),
            group: t.group,
            value: key(t),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::standings::calculate_standings;
    use crate::models::{Match, Team, TimeSlot};

    #[test]
    fn leaders_per_category() {
        let groups = vec![vec![Team::new("A", 1), Team::new("B", 1), Team::new("C", 1)]];
        let t = TimeSlot::parse("10:00-10:20").unwrap();
        let matches = vec![
            Match::between("G1", t, 1, "A", "B").with_score(4, 0),
            Match::between("G2", t, 1, "B", "C").with_score(2, 2),
        ];
        let leaders = tournament_leaders(&calculate_standings(&groups, &matches), 2);

        fn names(l: &[Leader]) -> Vec<&str> {
            l.iter().map(|x| x.team.as_str()).collect()
        }
        // A, C and B finish in that order; C and B both scored 2.
        assert_eq!(names(&leaders.most_goals_scored), ["A", "C"]);
        assert_eq!(names(&leaders.most_goals_conceded), ["B", "C"]);
        assert_eq!(leaders.best_goal_difference[0].value, 4);
        assert_eq!(leaders.most_goals_conceded[0].value, 6);
        assert_eq!(names(&leaders.most_points), ["A", "C"]);
        assert_eq!(leaders.most_wins.len(), 2);
    }
}
