//! Player and team membership for one room.

use std::collections::HashMap;

use quizclash_protocol::{PlayerId, PlayerView, PowerUpKind, Team};

use crate::PowerUpError;

/// A player and their per-session progress. Owned exclusively by the
/// [`Roster`]; team score lives at the session level, not here.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: Team,
    pub score: u32,
    /// Consecutive correct answers; reset by any wrong answer.
    pub streak: u32,
    /// Remaining single-use consumables.
    pub power_ups: Vec<PowerUpKind>,
}

impl Player {
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            team: self.team,
            score: self.score,
            streak: self.streak,
            power_ups: self.power_ups.clone(),
        }
    }
}

/// The inventory every player starts (and restarts) with.
fn starting_power_ups() -> Vec<PowerUpKind> {
    vec![PowerUpKind::Double, PowerUpKind::Freeze, PowerUpKind::Shield]
}

/// Tracks players, their team assignment, and power-up inventory within
/// one room. Join order is preserved for broadcast display.
#[derive(Debug, Default)]
pub struct Roster {
    players: HashMap<PlayerId, Player>,
    join_order: Vec<PlayerId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player. Without a preferred team, assigns the smaller one
    /// (ties favor red) to keep sides balanced. Empty names get a
    /// `PlayerN` placeholder.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: &str,
        preferred_team: Option<Team>,
    ) -> &Player {
        let team = preferred_team.unwrap_or_else(|| self.smallest_team());
        let name = if name.trim().is_empty() {
            format!("Player{}", self.players.len() + 1)
        } else {
            name.trim().to_string()
        };

        let player = Player {
            id,
            name,
            team,
            score: 0,
            streak: 0,
            power_ups: starting_power_ups(),
        };
        self.players.insert(id, player);
        self.join_order.push(id);
        &self.players[&id]
    }

    pub fn remove_player(&mut self, id: PlayerId) {
        self.players.remove(&id);
        self.join_order.retain(|p| *p != id);
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Members of one team, in join order.
    pub fn team_members(&self, team: Team) -> Vec<PlayerView> {
        self.join_order
            .iter()
            .filter_map(|id| self.players.get(id))
            .filter(|p| p.team == team)
            .map(Player::view)
            .collect()
    }

    /// The team with fewer members; red wins ties.
    pub fn smallest_team(&self) -> Team {
        let red = self.players.values().filter(|p| p.team == Team::Red).count();
        let blue = self.players.len() - red;
        if red <= blue { Team::Red } else { Team::Blue }
    }

    /// Flips one player between red and blue. Does not rebalance others.
    pub fn switch_team(&mut self, id: PlayerId) -> Option<Team> {
        let player = self.players.get_mut(&id)?;
        player.team = player.team.opponent();
        Some(player.team)
    }

    /// Removes one unit of `kind` from the player's inventory.
    ///
    /// # Errors
    /// [`PowerUpError::NotAvailable`] when the inventory has none left.
    pub fn take_power_up(
        &mut self,
        id: PlayerId,
        kind: PowerUpKind,
    ) -> Result<(), PowerUpError> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(PowerUpError::PlayerNotFound)?;
        let pos = player
            .power_ups
            .iter()
            .position(|p| *p == kind)
            .ok_or(PowerUpError::NotAvailable)?;
        player.power_ups.remove(pos);
        Ok(())
    }

    /// Zeroes scores and streaks and regrants the starting inventory.
    /// Membership and team assignment survive (rematch semantics).
    pub fn reset_for_new_game(&mut self) {
        for player in self.players.values_mut() {
            player.score = 0;
            player.streak = 0;
            player.power_ups = starting_power_ups();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    #[test]
    fn test_add_player_grants_starting_inventory() {
        let mut roster = Roster::new();
        let player = roster.add_player(pid(1), "Ada", Some(Team::Red));
        assert_eq!(
            player.power_ups,
            vec![PowerUpKind::Double, PowerUpKind::Freeze, PowerUpKind::Shield]
        );
        assert_eq!(player.score, 0);
        assert_eq!(player.streak, 0);
    }

    #[test]
    fn test_add_player_empty_name_gets_placeholder() {
        let mut roster = Roster::new();
        let player = roster.add_player(pid(1), "   ", None);
        assert_eq!(player.name, "Player1");
    }

    #[test]
    fn test_auto_assignment_balances_teams_ties_favor_red() {
        let mut roster = Roster::new();
        assert_eq!(roster.smallest_team(), Team::Red);
        roster.add_player(pid(1), "a", None); // red (tie)
        assert_eq!(roster.player(pid(1)).unwrap().team, Team::Red);
        roster.add_player(pid(2), "b", None); // blue (red has 1)
        assert_eq!(roster.player(pid(2)).unwrap().team, Team::Blue);
        roster.add_player(pid(3), "c", None); // red again (tie)
        assert_eq!(roster.player(pid(3)).unwrap().team, Team::Red);
    }

    #[test]
    fn test_team_members_preserve_join_order() {
        let mut roster = Roster::new();
        roster.add_player(pid(1), "first", Some(Team::Red));
        roster.add_player(pid(2), "second", Some(Team::Blue));
        roster.add_player(pid(3), "third", Some(Team::Red));

        let reds = roster.team_members(Team::Red);
        let names: Vec<_> = reds.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["first", "third"]);
    }

    #[test]
    fn test_switch_team_flips_only_that_player() {
        let mut roster = Roster::new();
        roster.add_player(pid(1), "a", Some(Team::Red));
        roster.add_player(pid(2), "b", Some(Team::Red));

        assert_eq!(roster.switch_team(pid(1)), Some(Team::Blue));
        assert_eq!(roster.player(pid(1)).unwrap().team, Team::Blue);
        assert_eq!(roster.player(pid(2)).unwrap().team, Team::Red);
    }

    #[test]
    fn test_switch_team_unknown_player_is_none() {
        let mut roster = Roster::new();
        assert_eq!(roster.switch_team(pid(9)), None);
    }

    #[test]
    fn test_take_power_up_consumes_one_unit() {
        let mut roster = Roster::new();
        roster.add_player(pid(1), "a", Some(Team::Red));

        roster.take_power_up(pid(1), PowerUpKind::Shield).unwrap();
        let result = roster.take_power_up(pid(1), PowerUpKind::Shield);
        assert_eq!(result, Err(PowerUpError::NotAvailable));
        // The other power-ups are untouched.
        assert_eq!(roster.player(pid(1)).unwrap().power_ups.len(), 2);
    }

    #[test]
    fn test_remove_player_updates_order_and_counts() {
        let mut roster = Roster::new();
        roster.add_player(pid(1), "a", Some(Team::Red));
        roster.add_player(pid(2), "b", Some(Team::Red));
        roster.remove_player(pid(1));

        assert_eq!(roster.len(), 1);
        let reds = roster.team_members(Team::Red);
        assert_eq!(reds.len(), 1);
        assert_eq!(reds[0].id, pid(2));
    }

    #[test]
    fn test_reset_for_new_game_preserves_membership() {
        let mut roster = Roster::new();
        roster.add_player(pid(1), "a", Some(Team::Blue));
        {
            let p = roster.player_mut(pid(1)).unwrap();
            p.score = 55;
            p.streak = 4;
            p.power_ups.clear();
        }

        roster.reset_for_new_game();

        let p = roster.player(pid(1)).unwrap();
        assert_eq!(p.score, 0);
        assert_eq!(p.streak, 0);
        assert_eq!(p.power_ups.len(), 3);
        assert_eq!(p.team, Team::Blue);
    }
}
