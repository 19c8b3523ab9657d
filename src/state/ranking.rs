use poolcast_api::TournamentSnapshot;
use rand::Rng;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPlayer {
    pub name: String,
    pub team_name: String,
    pub score: u32,
}

/// Players split over two columns for the rankings page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingView {
    pub left: Vec<RankedPlayer>,
    pub right: Vec<RankedPlayer>,
}

impl RankingView {
    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// There is no scoring feed yet, so scores are placeholders drawn from
/// 1..=100 on every call.
pub fn build_ranking<R: Rng + ?Sized>(snapshot: &TournamentSnapshot, rng: &mut R) -> RankingView {
    let mut seen = HashSet::new();
    let mut players: Vec<RankedPlayer> = snapshot
        .teams
        .iter()
        .flat_map(|team| {
            team.players.iter().map(move |player| (player.name.as_str(), team.name.as_str()))
        })
        .map(|(name, team_name)| RankedPlayer {
            name: name.to_string(),
            team_name: team_name.to_string(),
            score: rng.gen_range(1..=100),
        })
        .filter(|player| seen.insert(player.name.clone()))
        .collect();

    players.sort_by(|a, b| b.score.cmp(&a.score));

    let mut view = RankingView::default();
    for (idx, player) in players.into_iter().enumerate() {
        if idx % 2 == 0 {
            view.left.push(player);
        } else {
            view.right.push(player);
        }
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolcast_api::{Player, Team};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn team(id: &str, name: &str, players: &[&str]) -> Team {
        Team {
            id: id.to_string(),
            name: name.to_string(),
            players: players
                .iter()
                .enumerate()
                .map(|(i, p)| Player {
                    id: format!("{id}_player_{i}"),
                    name: p.to_string(),
                    captain: false,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn snapshot() -> TournamentSnapshot {
        TournamentSnapshot {
            teams: vec![
                team("t1", "Breakers", &["Ann", "Bo", "Cy"]),
                team("t2", "Cue Ballers", &["Dee", "Bo", "Eli"]),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn duplicate_names_keep_first_team() {
        let view = build_ranking(&snapshot(), &mut StdRng::seed_from_u64(7));
        let all: Vec<_> = view.left.iter().chain(&view.right).collect();
        assert_eq!(all.len(), 5);
        let bo: Vec<_> = all.iter().filter(|p| p.name == "Bo").collect();
        assert_eq!(bo.len(), 1);
        assert_eq!(bo[0].team_name, "Breakers");
    }

    #[test]
    fn scores_in_range_and_columns_alternate_by_rank() {
        let view = build_ranking(&snapshot(), &mut StdRng::seed_from_u64(42));
        assert_eq!(view.left.len(), 3);
        assert_eq!(view.right.len(), 2);

        // Interleaving the columns restores the descending order.
        let mut merged = Vec::new();
        for i in 0..view.left.len() {
            merged.push(&view.left[i]);
            if let Some(p) = view.right.get(i) {
                merged.push(p);
            }
        }
        assert!(merged.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(merged.iter().all(|p| (1..=100).contains(&p.score)));
    }

    #[test]
    fn empty_snapshot_gives_empty_view() {
        let view = build_ranking(&TournamentSnapshot::default(), &mut StdRng::seed_from_u64(1));
        assert!(view.is_empty());
    }
}
