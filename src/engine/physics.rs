//! Movement, projectiles, damage and scripted placement.

use tracing::debug;

use super::simulation::Simulation;
use super::{SHOT_SOURCE_PLAYER, TORCH_DIST_SQR, TORCH_DX, TORCH_DY, sqr};
use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Stat, Tile};
use crate::elements::{self, COLOR_SPECIAL_MIN, COLOR_WHITE_ON_CHOICE, id};
use crate::host::Host;

const SOUND_OUCH: &[u8] = b"\x10\x01 \x01\x13\x01#\x01";
const SOUND_REENTER: &[u8] = b" \x01#\x01'\x010\x01\x10\x01";
const SOUND_GAME_OVER: &[u8] = b" \x03#\x03'\x030\x03'\x03*\x032\x037\x035\x038\x03@\x03E\x03\x10\n";
const SOUND_BULLET_HIT: &[u8] = b" \x01";
const SOUND_KILL: &[u8] = b"@\x01\x10\x01P\x010\x01";
const SOUND_DAMAGE: &[u8] = b"\x10\x01";
const SOUND_PASSAGE: &[u8] = b"0\x014\x017\x011\x015\x018\x012\x016\x019\x013\x017\x01:\x014\x018\x01@\x01";

impl<H: Host> Simulation<H> {
    /// Spawn a stat and draw its tile. A full table is a silent no-op.
    pub fn add_stat(
        &mut self,
        x: i16,
        y: i16,
        element: u8,
        color: u8,
        cycle: i16,
        template: &Stat,
    ) -> Option<i16> {
        let index = self
            .world
            .board
            .add_stat(x, y, element, color, cycle, template)?;
        self.draw_tile(x, y);
        Some(index)
    }

    /// Remove stat `id`, restoring its under tile and keeping the tick loop
    /// and the running interpreter pointed at the right stats.
    pub fn remove_stat(&mut self, id: i16) {
        let Some(stat) = self.world.board.remove_stat(id) else {
            return;
        };
        if id <= self.current_stat {
            self.current_stat -= 1;
        }
        self.executing = match self.executing {
            Some(running) if running == id => None,
            Some(running) if running > id => Some(running - 1),
            other => other,
        };
        let (x, y) = stat.pos();
        self.draw_tile(x, y);
    }

    /// Move stat `id` to `(x, y)`, swapping `under` tiles and recolouring.
    pub fn move_stat(&mut self, id: i16, x: i16, y: i16) {
        let (old_x, old_y) = self.world.board.stats.get(id).pos();
        if (old_x, old_y) == (x, y) {
            return;
        }
        let board = &mut self.world.board;
        let source = board.tiles.get(old_x, old_y);
        let dest = board.tiles.get(x, y);
        let Some(stat) = board.stats.get_mut(id) else {
            return;
        };
        let old_under = std::mem::replace(&mut stat.under, dest);
        stat.x = x as u8;
        stat.y = y as u8;

        let color = if source.element == id::PLAYER {
            source.color
        } else if dest.element == id::EMPTY {
            source.color & 0x0F
        } else {
            (source.color & 0x0F) | (dest.color & 0x70)
        };
        board.tiles.set(x, y, Tile::new(source.element, color));
        board.tiles.set(old_x, old_y, old_under);

        self.draw_tile(x, y);
        self.draw_tile(old_x, old_y);

        if id == 0 && self.world.board.info.is_dark && self.world.info.torch_ticks > 0 {
            if sqr(old_x - x) + sqr(old_y - y) == 1 {
                for ix in (x - TORCH_DX - 3).max(1)..=(x + TORCH_DX + 3).min(BOARD_WIDTH) {
                    for iy in (y - TORCH_DY - 3).max(1)..=(y + TORCH_DY + 3).min(BOARD_HEIGHT) {
                        let was_lit = sqr(ix - old_x) + sqr(iy - old_y) * 2 < TORCH_DIST_SQR;
                        let is_lit = sqr(ix - x) + sqr(iy - y) * 2 < TORCH_DIST_SQR;
                        if was_lit != is_lit {
                            self.draw_tile(ix, iy);
                        }
                    }
                }
            } else {
                self.draw_player_surroundings(old_x, old_y);
                self.draw_player_surroundings(x, y);
            }
        }
    }

    /// Redraw the torch box around `(x, y)`.
    pub(crate) fn draw_player_surroundings(&mut self, x: i16, y: i16) {
        for ix in (x - TORCH_DX - 1).max(1)..=(x + TORCH_DX + 1).min(BOARD_WIDTH) {
            for iy in (y - TORCH_DY - 1).max(1)..=(y + TORCH_DY + 1).min(BOARD_HEIGHT) {
                self.draw_tile(ix, iy);
            }
        }
    }

    /// Hurt stat `id`. The player loses 10 health; anything else is removed.
    pub fn damage_stat(&mut self, id: i16) {
        let (x, y) = self.world.board.stats.get(id).pos();
        if id != 0 {
            match self.world.board.tiles.get(x, y).element {
                id::BULLET => self.host.queue_sound(3, SOUND_BULLET_HIT),
                id::OBJECT => {}
                _ => self.host.queue_sound(3, SOUND_KILL),
            }
            self.remove_stat(id);
            return;
        }

        if self.world.info.health <= 0 {
            return;
        }
        self.world.info.health -= 10;
        self.display_message(100, "Ouch!");
        self.world
            .board
            .tiles
            .set_color(x, y, 0x70 + elements::def(id::PLAYER).color % 0x10);

        if self.world.info.health > 0 {
            self.world.info.board_time_sec = 0;
            if self.world.board.info.reenter_when_zapped {
                self.host.queue_sound(4, SOUND_REENTER);
                self.world.board.tiles.set_element(x, y, id::EMPTY);
                self.draw_tile(x, y);
                let (start_x, start_y) = (self.world.board.info.start_x, self.world.board.info.start_y);
                let player = self.world.board.stats.player_mut();
                player.x = start_x;
                player.y = start_y;
                self.draw_player_surroundings(x, y);
                self.draw_player_surroundings(i16::from(start_x), i16::from(start_y));
                self.paused = true;
            }
            self.host.queue_sound(4, SOUND_OUCH);
        } else {
            debug!("player died");
            self.host.queue_sound(5, SOUND_GAME_OVER);
        }
    }

    /// Damage whatever is at `(x, y)`: its stat if it has one, otherwise the
    /// tile is cleared.
    pub fn damage_tile(&mut self, x: i16, y: i16) {
        match self.world.board.stats.index_at(x, y) {
            Some(id) => self.damage_stat(id),
            None => {
                self.world.board.tiles.set_element(x, y, id::EMPTY);
                self.draw_tile(x, y);
            }
        }
    }

    /// Stat `attacker` runs into `(x, y)`.
    pub fn attack(&mut self, attacker: i16, x: i16, y: i16) {
        let (ax, ay) = self.world.board.stats.get(attacker).pos();
        let attacker_element = self.world.board.tiles.get(ax, ay).element;
        let energized = self.world.info.energizer_ticks > 0;

        if attacker == 0 && energized {
            let target = self.world.board.tiles.get(x, y).element;
            self.add_score(elements::def(target).score_value);
        } else {
            self.damage_stat(attacker);
        }

        if self.world.board.tiles.get(x, y).element == id::PLAYER && self.world.info.energizer_ticks > 0 {
            self.add_score(elements::def(attacker_element).score_value);
        } else {
            self.damage_tile(x, y);
            self.host.queue_sound(2, SOUND_DAMAGE);
        }
    }

    fn add_score(&mut self, value: i16) {
        self.world.info.score = self.world.info.score.saturating_add(value);
    }

    /// Fire `element` from `(x, y)` toward `(dx, dy)`.
    ///
    /// Spawns a projectile on a walkable or water cell; damages a breakable
    /// cell, or a destructible one when it is the player and the shooter is
    /// not (or the reverse) and no energizer is active. Returns whether the
    /// shot went off; a full stat table still counts as a shot.
    pub fn shoot(&mut self, element: u8, x: i16, y: i16, dx: i16, dy: i16, source: u8) -> bool {
        let (tx, ty) = (x + dx, y + dy);
        let target = self.world.board.tiles.get(tx, ty).element;
        let def = elements::def(target);

        if def.walkable || target == id::WATER {
            let template = Stat {
                p1: source,
                p2: 100,
                step_x: dx,
                step_y: dy,
                ..Stat::default()
            };
            self.add_stat(tx, ty, element, elements::def(element).color, 1, &template);
            true
        } else if target == id::BREAKABLE
            || (def.destructible
                && (target == id::PLAYER) == (source != SHOT_SOURCE_PLAYER)
                && self.world.info.energizer_ticks <= 0)
        {
            self.damage_tile(tx, ty);
            self.host.queue_sound(2, SOUND_DAMAGE);
            true
        } else {
            false
        }
    }

    /// Push the tile at `(x, y)` one step along `(dx, dy)`, pushing whatever
    /// is in the way first and crushing destructible blockers.
    pub fn push(&mut self, x: i16, y: i16, dx: i16, dy: i16) {
        if dx == 0 && dy == 0 {
            return;
        }
        let tile = self.world.board.tiles.get(x, y);
        let movable = match tile.element {
            id::SLIDER_NS => dx == 0,
            id::SLIDER_EW => dy == 0,
            e => elements::def(e).pushable,
        };
        if !movable {
            return;
        }

        let (tx, ty) = (x + dx, y + dy);
        if self.world.board.tiles.get(tx, ty).element != id::EMPTY {
            self.push(tx, ty, dx, dy);
        }

        let blocker = self.world.board.tiles.get(tx, ty).element;
        let def = elements::def(blocker);
        if !def.walkable && def.destructible && blocker != id::PLAYER {
            self.damage_tile(tx, ty);
        }

        if elements::def(self.world.board.tiles.get(tx, ty).element).walkable {
            match self.world.board.stats.index_at(x, y) {
                Some(stat) => self.move_stat(stat, tx, ty),
                None => {
                    self.world.board.tiles.set(tx, ty, tile);
                    self.draw_tile(tx, ty);
                    self.world.board.tiles.set_element(x, y, id::EMPTY);
                    self.draw_tile(x, y);
                }
            }
        }
    }

    /// Place `tile` at `(x, y)` the way scripts do.
    ///
    /// Elements with a fixed colour keep it; otherwise the requested colour
    /// is used, falling back to the colour already there and then white.
    /// The same element only recolours; anything else damages the cell
    /// first and spawns a stat when the element has a cycle. The player is
    /// never overwritten.
    pub fn place_tile(&mut self, x: i16, y: i16, tile: Tile) {
        let current = self.world.board.tiles.get(x, y);
        if current.element == id::PLAYER {
            return;
        }
        let def = elements::def(tile.element);
        let color = if def.color < COLOR_SPECIAL_MIN {
            def.color
        } else {
            let mut color = tile.color;
            if color == 0 {
                color = current.color;
            }
            if color == 0 {
                color = 0x0F;
            }
            if def.color == COLOR_WHITE_ON_CHOICE {
                color = color.wrapping_sub(8).wrapping_mul(0x10).wrapping_add(0x0F);
            }
            color
        };

        if current.element == tile.element {
            self.world.board.tiles.set_color(x, y, color);
        } else {
            self.damage_tile(x, y);
            if def.cycle >= 0 {
                self.add_stat(x, y, tile.element, color, def.cycle, &Stat::default());
            } else {
                self.world.board.tiles.set(x, y, Tile::new(tile.element, color));
            }
        }
        self.draw_tile(x, y);
    }

    /// Unit step toward the player, away from it while energized.
    pub fn seek_direction(&mut self, x: i16, y: i16) -> (i16, i16) {
        let (px, py) = self.world.board.player_pos();
        let mut dx = 0;
        let mut dy = 0;
        if self.host.random(2) < 1 || py == y {
            dx = (px - x).signum();
        }
        if dx == 0 {
            dy = (py - y).signum();
        }
        if self.world.info.energizer_ticks > 0 {
            (-dx, -dy)
        } else {
            (dx, dy)
        }
    }

    /// A random cardinal step.
    pub fn random_direction(&mut self) -> (i16, i16) {
        let dx = self.host.random(3) - 1;
        if dx == 0 {
            (0, self.host.random(2) * 2 - 1)
        } else {
            (dx, 0)
        }
    }

    /// Travel through the passage at `(x, y)` to the board named in its P3,
    /// arriving on the last passage of the same colour there.
    pub fn passage_teleport(&mut self, x: i16, y: i16) {
        let color = self.world.board.tiles.get(x, y).color;
        let target = self
            .world
            .board
            .stats
            .index_at(x, y)
            .map_or(0, |i| i16::from(self.world.board.stats.get(i).p3));
        self.board_change(target);

        let mut arrival = None;
        for ix in 1..=BOARD_WIDTH {
            for iy in 1..=BOARD_HEIGHT {
                let tile = self.world.board.tiles.get(ix, iy);
                if tile.element == id::PASSAGE && tile.color == color {
                    arrival = Some((ix, iy));
                }
            }
        }

        let (px, py) = self.world.board.player_pos();
        self.world.board.tiles.set(px, py, Tile::EMPTY);
        if let Some((nx, ny)) = arrival {
            let player = self.world.board.stats.player_mut();
            player.x = nx as u8;
            player.y = ny as u8;
        }
        self.paused = true;
        self.host.queue_sound(4, SOUND_PASSAGE);
        self.redraw();
        self.board_enter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::HeadlessHost;
    use crate::world::World;

    fn sim() -> Simulation<HeadlessHost> {
        Simulation::new(World::new(), EngineConfig::default(), HeadlessHost::new(1))
    }

    #[test]
    fn test_move_stat_swaps_under_tiles() {
        let mut sim = sim();
        let fake = Tile::new(id::FAKE, 0x1E);
        sim.world.board.tiles.set(11, 10, fake);
        let stat = sim.add_stat(10, 10, id::OBJECT, 0x0C, 3, &Stat::default()).unwrap();

        sim.move_stat(stat, 11, 10);
        assert_eq!(sim.world.board.tiles.get(10, 10), Tile::EMPTY);
        assert_eq!(sim.world.board.tiles.get(11, 10), Tile::new(id::OBJECT, 0x1C));
        assert_eq!(sim.world.board.stats.get(stat).under, fake);

        sim.move_stat(stat, 12, 10);
        assert_eq!(sim.world.board.tiles.get(11, 10), fake);
    }

    #[test]
    fn test_remove_stat_rewinds_tick_cursor() {
        let mut sim = sim();
        let a = sim.add_stat(5, 5, id::OBJECT, 0x0F, 1, &Stat::default()).unwrap();
        sim.add_stat(6, 5, id::OBJECT, 0x0F, 1, &Stat::default());
        sim.current_stat = a;
        sim.executing = Some(2);
        sim.remove_stat(a);
        assert_eq!(sim.current_stat, a - 1);
        assert_eq!(sim.executing, Some(1));
        sim.remove_stat(1);
        assert_eq!(sim.executing, None);
    }

    #[test]
    fn test_shoot_breaks_breakable() {
        let mut sim = sim();
        sim.world.board.tiles.set(11, 10, Tile::new(id::BREAKABLE, 0x0A));
        assert!(sim.shoot(id::BULLET, 10, 10, 1, 0, 1));
        assert_eq!(sim.world.board.tiles.get(11, 10).element, id::EMPTY);
    }

    #[test]
    fn test_shoot_spawns_projectile() {
        let mut sim = sim();
        assert!(sim.shoot(id::BULLET, 10, 10, 0, 1, SHOT_SOURCE_PLAYER));
        let index = sim.world.board.stats.index_at(10, 11).unwrap();
        let bullet = sim.world.board.stats.get(index);
        assert_eq!((bullet.step_x, bullet.step_y, bullet.p1, bullet.p2), (0, 1, 0, 100));
        assert_eq!(bullet.cycle, 1);
    }

    #[test]
    fn test_shoot_at_energized_player_fails() {
        let mut sim = sim();
        let (px, py) = sim.world.board.player_pos();
        sim.world.info.energizer_ticks = 10;
        assert!(!sim.shoot(id::BULLET, px - 1, py, 1, 0, 1));
        assert_eq!(sim.world.info.health, 100);
    }

    #[test]
    fn test_push_chain_of_boulders() {
        let mut sim = sim();
        let boulder = Tile::new(id::BOULDER, 0x0E);
        sim.world.board.tiles.set(10, 10, boulder);
        sim.world.board.tiles.set(11, 10, boulder);
        sim.push(10, 10, 1, 0);
        assert_eq!(sim.world.board.tiles.get(10, 10), Tile::EMPTY);
        assert_eq!(sim.world.board.tiles.get(11, 10), boulder);
        assert_eq!(sim.world.board.tiles.get(12, 10), boulder);
    }

    #[test]
    fn test_slider_moves_only_along_axis() {
        let mut sim = sim();
        let slider = Tile::new(id::SLIDER_NS, 0x0F);
        sim.world.board.tiles.set(10, 10, slider);
        sim.push(10, 10, 1, 0);
        assert_eq!(sim.world.board.tiles.get(10, 10), slider);
        sim.push(10, 10, 0, 1);
        assert_eq!(sim.world.board.tiles.get(10, 11), slider);
    }

    #[test]
    fn test_damage_player_reenters() {
        let mut sim = sim();
        sim.world.board.info.reenter_when_zapped = true;
        sim.world.board.info.start_x = 5;
        sim.world.board.info.start_y = 6;
        sim.damage_stat(0);
        assert_eq!(sim.world.info.health, 90);
        assert_eq!(sim.world.board.player_pos(), (5, 6));
        assert!(sim.is_paused());
        assert_eq!(sim.world.board.info.message, "Ouch!");
    }

    #[test]
    fn test_place_tile_spawns_stat_for_cycled_element() {
        let mut sim = sim();
        let before = sim.world.board.tiles.get(10, 10);
        sim.place_tile(10, 10, Tile::new(id::LION, 0));
        let index = sim.world.board.stats.index_at(10, 10).unwrap();
        assert_eq!(sim.world.board.stats.get(index).under, before);
        assert_eq!(sim.world.board.tiles.get(10, 10).element, id::LION);
    }

    #[test]
    fn test_place_tile_white_on_choice_background() {
        let mut sim = sim();
        sim.place_tile(10, 10, Tile::new(id::TEXT_WHITE, 0));
        // Text white has a fixed colour.
        assert_eq!(sim.world.board.tiles.get(10, 10).color, 0x0F);
        sim.place_tile(11, 10, Tile::new(id::DOOR, 0x0C));
        assert_eq!(sim.world.board.tiles.get(11, 10), Tile::new(id::DOOR, 0x4F));
    }

    #[test]
    fn test_seek_reverses_when_energized() {
        let mut sim = sim();
        let (px, py) = sim.world.board.player_pos();
        let toward = sim.seek_direction(px - 5, py);
        assert_eq!(toward, (1, 0));
        sim.world.info.energizer_ticks = 5;
        assert_eq!(sim.seek_direction(px - 5, py), (-1, 0));
    }
}
