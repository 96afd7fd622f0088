//! Per-player views of the match.
//!
//! Rendering implements fog-of-war: a player's own grid is fully visible,
//! while the opponent's grid only reveals ship cells that have been fired on.

use crate::grid::{Coord, GRID_SIZE};
use crate::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Style tags attached to a rendered cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellTag {
    Square,
    Hit,
    Ship,
    Dead,
}

/// A single rendered cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    /// `?` unknown, `X` fired upon, `O` revealed ship
    pub symbol: char,
    pub tags: Vec<CellTag>,
}

impl CellView {
    pub const UNKNOWN: char = '?';
    pub const SHOT: char = 'X';
    pub const SHIP: char = 'O';

    fn unknown() -> Self {
        Self {
            symbol: Self::UNKNOWN,
            tags: vec![CellTag::Square],
        }
    }

    pub fn has_tag(&self, tag: CellTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Rows indexed by `y`, each row indexed by `x`
pub type GridView = Vec<Vec<CellView>>;

/// Size and remaining lives of one ship.
///
/// For the opponent's ships `lives` is `None` unless the ship is sunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipSummary {
    pub size: usize,
    pub lives: Option<usize>,
}

/// Everything one side of the table shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideStatus {
    pub grid: GridView,
    pub has_turn: bool,
    pub has_won: bool,
    pub ships: Vec<ShipSummary>,
    /// Own side only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ships_left: Option<BTreeMap<usize, u32>>,
}

/// A player's view of the whole match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    pub own: SideStatus,
    /// `None` until the opponent has registered
    pub enemy: Option<SideStatus>,
}

/// Render `player`'s grid, fully (`own_view`) or through fog-of-war.
pub fn render_grid(player: &Player, own_view: bool) -> GridView {
    (0..GRID_SIZE)
        .map(|y| {
            (0..GRID_SIZE)
                .map(|x| render_cell(player, Coord::new(x, y), own_view))
                .collect()
        })
        .collect()
}

fn render_cell(player: &Player, at: Coord, own_view: bool) -> CellView {
    let mut cell = CellView::unknown();
    let shot = player.shots_received.contains(&at);

    if shot {
        cell.symbol = CellView::SHOT;
        cell.tags.push(CellTag::Hit);
    }

    // Ships never overlap, so the first match is the only one
    if let Some(ship) = player.ship_at(at) {
        if own_view || shot {
            cell.symbol = CellView::SHIP;
            cell.tags.push(CellTag::Ship);
            if ship.is_sunk() {
                cell.tags.push(CellTag::Dead);
            }
        }
    }

    cell
}

/// Summarise one side for the viewer
pub fn side_status(player: &Player, own_view: bool) -> SideStatus {
    let ships = player
        .fleet
        .iter()
        .map(|ship| ShipSummary {
            size: ship.length(),
            lives: if own_view || ship.is_sunk() {
                Some(ship.lives())
            } else {
                None
            },
        })
        .collect();

    SideStatus {
        grid: render_grid(player, own_view),
        has_turn: player.has_turn,
        has_won: player.has_won,
        ships,
        ships_left: own_view.then(|| player.ships_left.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Orientation;
    use crate::player::FleetTemplate;
    use crate::ship::Ship;

    fn player_with_ship() -> Player {
        let mut player = Player::new("p".into(), &FleetTemplate::default());
        player
            .fleet
            .push(Ship::new(Coord::new(1, 1), 2, Orientation::Horizontal));
        player
    }

    fn cell(grid: &GridView, x: usize, y: usize) -> &CellView {
        &grid[y][x]
    }

    #[test]
    fn test_own_view_shows_ships() {
        let player = player_with_ship();
        let grid = render_grid(&player, true);

        assert_eq!(grid.len(), 10);
        assert!(grid.iter().all(|row| row.len() == 10));

        let c = cell(&grid, 1, 1);
        assert_eq!(c.symbol, 'O');
        assert_eq!(c.tags, vec![CellTag::Square, CellTag::Ship]);

        let empty = cell(&grid, 0, 0);
        assert_eq!(empty.symbol, '?');
        assert_eq!(empty.tags, vec![CellTag::Square]);
    }

    #[test]
    fn test_enemy_view_hides_unshot_ships() {
        let mut player = player_with_ship();
        let grid = render_grid(&player, false);
        assert!(grid.iter().flatten().all(|c| !c.has_tag(CellTag::Ship)));

        player.shots_received.insert(Coord::new(1, 1));
        player.shots_received.insert(Coord::new(5, 5));
        player.fleet[0].hit(Coord::new(1, 1));
        let grid = render_grid(&player, false);

        let hit = cell(&grid, 1, 1);
        assert_eq!(hit.symbol, 'O');
        assert_eq!(hit.tags, vec![CellTag::Square, CellTag::Hit, CellTag::Ship]);

        let hidden = cell(&grid, 2, 1);
        assert_eq!(hidden.symbol, '?');

        let miss = cell(&grid, 5, 5);
        assert_eq!(miss.symbol, 'X');
        assert_eq!(miss.tags, vec![CellTag::Square, CellTag::Hit]);
    }

    #[test]
    fn test_sunk_ship_is_dead() {
        let mut player = player_with_ship();
        for at in [Coord::new(1, 1), Coord::new(2, 1)] {
            player.shots_received.insert(at);
            player.fleet[0].hit(at);
        }
        let grid = render_grid(&player, false);
        assert!(cell(&grid, 2, 1).has_tag(CellTag::Dead));
    }

    #[test]
    fn test_enemy_summary_hides_lives() {
        let mut player = player_with_ship();
        player
            .fleet
            .push(Ship::new(Coord::new(5, 5), 1, Orientation::Vertical));
        player.fleet[1].hit(Coord::new(5, 5));

        let enemy = side_status(&player, false);
        assert_eq!(
            enemy.ships,
            vec![
                ShipSummary { size: 2, lives: None },
                ShipSummary { size: 1, lives: Some(0) },
            ]
        );
        assert!(enemy.ships_left.is_none());

        let own = side_status(&player, true);
        assert_eq!(own.ships[0].lives, Some(2));
        assert!(own.ships_left.is_some());
    }
}
