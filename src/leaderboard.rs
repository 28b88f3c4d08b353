//! Rankings of the players in a room
//!
//! Scores are computed by the room server; this module only orders what it
//! reports. Sorting is stable, so players with the same score keep the
//! order the server listed them in.

use itertools::Itertools;
use serde::Serialize;

use crate::protocol::{Player, Sid};

/// A player together with their position in the ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// Position in the ranking, starting at 1
    pub rank: usize,
    /// The ranked player
    #[serde(flatten)]
    pub player: Player,
}

/// Medal awarded to the first three players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Medal {
    /// First place
    Gold,
    /// Second place
    Silver,
    /// Third place
    Bronze,
}

impl Medal {
    /// Returns the medal for a rank, if it earns one
    pub fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Self::Gold),
            2 => Some(Self::Silver),
            3 => Some(Self::Bronze),
            _ => None,
        }
    }

    /// Returns the emoji of the medal
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Gold => "🥇",
            Self::Silver => "🥈",
            Self::Bronze => "🥉",
        }
    }
}

/// A step of the podium
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodiumPlace {
    /// Medal of the step
    pub medal: Medal,
    /// Player standing on it
    pub standing: Standing,
}

/// Ranks players by score, highest first
pub fn standings(players: &[Player]) -> Vec<Standing> {
    players
        .iter()
        .sorted_by(|a, b| b.score.cmp(&a.score))
        .enumerate()
        .map(|(index, player)| Standing {
            rank: index + 1,
            player: player.clone(),
        })
        .collect_vec()
}

/// Returns the podium in display order: second, first, then third
///
/// Places without a player are left out, so a two player game shows only
/// the silver and gold steps.
pub fn podium(players: &[Player]) -> Vec<PodiumPlace> {
    let mut top = standings(players).into_iter().take(3).map(Some).collect_vec();
    top.resize(3, None);

    [1, 0, 2]
        .into_iter()
        .filter_map(|index| top[index].take())
        .filter_map(|standing| {
            Medal::for_rank(standing.rank).map(|medal| PodiumPlace { medal, standing })
        })
        .collect_vec()
}

/// Returns the rank of a player, if they are in the list
pub fn rank_of(players: &[Player], sid: &Sid) -> Option<usize> {
    standings(players)
        .into_iter()
        .find(|standing| &standing.player.sid == sid)
        .map(|standing| standing.rank)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn player(sid: &str, name: &str, score: u64) -> Player {
        Player {
            sid: Sid::from(sid),
            name: name.to_owned(),
            score,
            ready: false,
            avatar: "😀".to_owned(),
        }
    }

    #[test]
    fn test_standings_sorted_descending() {
        let players = vec![
            player("a", "Aina", 120),
            player("b", "Bako", 340),
            player("c", "Cela", 200),
        ];

        let ranked = standings(&players);
        assert_eq!(
            ranked.iter().map(|s| s.player.name.as_str()).collect_vec(),
            ["Bako", "Cela", "Aina"]
        );
        assert_eq!(ranked.iter().map(|s| s.rank).collect_vec(), [1, 2, 3]);
    }

    #[test]
    fn test_standings_ties_keep_server_order() {
        let players = vec![
            player("a", "Aina", 100),
            player("b", "Bako", 100),
            player("c", "Cela", 150),
        ];

        let ranked = standings(&players);
        assert_eq!(
            ranked.iter().map(|s| s.player.name.as_str()).collect_vec(),
            ["Cela", "Aina", "Bako"]
        );
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_standings_empty() {
        assert!(standings(&[]).is_empty());
        assert!(podium(&[]).is_empty());
    }

    #[test]
    fn test_podium_display_order() {
        let players = vec![
            player("a", "Aina", 10),
            player("b", "Bako", 30),
            player("c", "Cela", 20),
            player("d", "Dera", 5),
        ];

        let places = podium(&players);
        assert_eq!(
            places
                .iter()
                .map(|p| (p.medal, p.standing.player.name.as_str()))
                .collect_vec(),
            [
                (Medal::Silver, "Cela"),
                (Medal::Gold, "Bako"),
                (Medal::Bronze, "Aina")
            ]
        );
    }

    #[test]
    fn test_podium_two_players() {
        let players = vec![player("a", "Aina", 10), player("b", "Bako", 30)];

        let places = podium(&players);
        assert_eq!(
            places.iter().map(|p| p.medal).collect_vec(),
            [Medal::Silver, Medal::Gold]
        );
    }

    #[test]
    fn test_podium_single_player() {
        let places = podium(&[player("a", "Aina", 0)]);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].medal, Medal::Gold);
    }

    #[test]
    fn test_rank_of() {
        let players = vec![player("a", "Aina", 10), player("b", "Bako", 30)];
        assert_eq!(rank_of(&players, &Sid::from("a")), Some(2));
        assert_eq!(rank_of(&players, &Sid::from("z")), None);
    }

    #[test]
    fn test_standing_serializes_flat() {
        let ranked = standings(&[player("a", "Aina", 10)]);
        let value = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(value["rank"], 1);
        assert_eq!(value["name"], "Aina");
    }
}
