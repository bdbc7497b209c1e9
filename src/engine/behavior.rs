//! Per-element tick and touch behaviour.

use super::simulation::{Simulation, first_time};
use super::{ENERGIZER_DURATION, SHOT_SOURCE_ENEMY, SHOT_SOURCE_PLAYER, TORCH_DURATION};
use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Neighbor};
use crate::elements::{self, COLOR_NAMES, id};
use crate::host::Host;
use crate::sound;

const SOUND_PLAYER_SHOT: &[u8] = b"\x40\x01\x30\x01\x20\x01";
const SOUND_TORCH_OUT: &[u8] = b"\x30\x01\x20\x01\x10\x01";
const SOUND_ENERGIZER_ENDING: &[u8] = b"\x20\x03\x1A\x03\x17\x03\x16\x03\x15\x03\x13\x03\x10\x03";
const SOUND_TIME_RUNNING_OUT: &[u8] = b"\x40\x06\x45\x06\x40\x06\x35\x06\x40\x06\x45\x06\x40\x0A";
const SOUND_RICOCHET: &[u8] = b"\xF9\x01";
const SOUND_AMMO: &[u8] = b"\x30\x01\x31\x01\x32\x01";
const SOUND_TORCH: &[u8] = b"\x30\x01\x39\x01\x34\x02";
const SOUND_GEM: &[u8] = b"\x40\x01\x37\x01\x34\x01\x30\x01";
const SOUND_KEY: &[u8] = b"\x40\x01\x44\x01\x47\x01\x40\x01\x44\x01\x47\x01\x40\x01\x44\x01\x47\x01\x50\x02";
const SOUND_KEY_HELD: &[u8] = b"\x30\x02\x20\x02";
const SOUND_DOOR_OPEN: &[u8] = b"\x30\x01\x37\x01\x3B\x01\x30\x01\x37\x01\x3B\x01\x40\x04";
const SOUND_DOOR_LOCKED: &[u8] = b"\x17\x01\x10\x01";
const SOUND_FOREST: &[u8] = b"\x39\x01";
const SOUND_INVISIBLE: &[u8] = b"\x12\x01\x10\x01";
const SOUND_WATER: &[u8] = b"\x40\x01\x50\x01";
const SOUND_ENERGIZER: &[u8] = b"\x20\x03\x1A\x03\x17\x03\x16\x03\x15\x03\x13\x03\x10\x03";
const SOUND_PUSH: &[u8] = b"\x15\x01";

impl<H: Host> Simulation<H> {
    /// Run one scheduled update of stat `index`, picked by the element
    /// under it.
    pub(crate) fn tick_stat(&mut self, index: i16) {
        let (x, y) = self.world.board.stats.get(index).pos();
        match self.world.board.tiles.get(x, y).element {
            id::PLAYER => self.player_tick(index),
            id::OBJECT => self.object_tick(index),
            id::SCROLL => self.scroll_tick(index),
            id::BULLET => self.bullet_tick(index),
            id::STAR => self.star_tick(index),
            id::LION => self.lion_tick(index),
            id::TIGER => self.tiger_tick(index),
            id::BEAR => self.bear_tick(index),
            _ => {}
        }
    }

    /// Stat `source` steps onto `(x, y)`. Touch rules may cancel the move
    /// by zeroing the step.
    pub(crate) fn touch(&mut self, x: i16, y: i16, source: i16, dx: &mut i16, dy: &mut i16) {
        let tile = self.world.board.tiles.get(x, y);
        let duration = self.config.message_duration;
        match tile.element {
            id::AMMO => {
                self.world.info.ammo = self.world.info.ammo.saturating_add(5);
                self.clear_tile(x, y);
                self.host.queue_sound(2, SOUND_AMMO);
                if first_time(&mut self.hints.ammo) {
                    self.display_message(duration, "Ammunition - 5 shots per container.");
                }
            }
            id::TORCH => {
                self.world.info.torches = self.world.info.torches.saturating_add(1);
                self.clear_tile(x, y);
                if first_time(&mut self.hints.torch) {
                    self.display_message(duration, "Torch - used for lighting in the underground.");
                }
                self.host.queue_sound(3, SOUND_TORCH);
            }
            id::GEM => {
                let info = &mut self.world.info;
                info.health = info.health.saturating_add(1);
                info.gems = info.gems.saturating_add(1);
                info.score = info.score.saturating_add(10);
                self.clear_tile(x, y);
                self.host.queue_sound(2, SOUND_GEM);
                if first_time(&mut self.hints.gem) {
                    self.display_message(duration, "Gems give you Health!");
                }
            }
            id::KEY => self.key_touch(x, y, tile.color % 8),
            id::DOOR => self.door_touch(x, y, (tile.color / 16) % 8),
            id::SCROLL => self.scroll_touch(x, y),
            id::OBJECT => {
                if let Some(object) = self.world.board.stats.index_at(x, y) {
                    self.world.board.send(object, "TOUCH", false, true);
                }
            }
            id::PASSAGE => {
                self.passage_teleport(x, y);
                *dx = 0;
                *dy = 0;
            }
            id::BOARD_EDGE => self.board_edge_touch(source, dx, dy),
            id::FOREST => {
                self.clear_tile(x, y);
                self.host.queue_sound(3, SOUND_FOREST);
                if first_time(&mut self.hints.forest) {
                    self.display_message(duration, "A path is cleared through the forest.");
                }
            }
            id::FAKE => {
                if first_time(&mut self.hints.fake) {
                    self.display_message(duration, "A fake wall - secret passage!");
                }
            }
            id::INVISIBLE => {
                self.world.board.tiles.set_element(x, y, id::NORMAL);
                self.draw_tile(x, y);
                self.host.queue_sound(3, SOUND_INVISIBLE);
                self.display_message(100, "You are blocked by an invisible wall.");
            }
            id::WATER => {
                self.host.queue_sound(3, SOUND_WATER);
                self.display_message(100, "Your way is blocked by water.");
            }
            id::ENERGIZER => {
                self.host.queue_sound(9, SOUND_ENERGIZER);
                self.clear_tile(x, y);
                self.world.info.energizer_ticks = ENERGIZER_DURATION;
                if first_time(&mut self.hints.energizer) {
                    self.display_message(duration, "Energizer - You are invincible");
                }
                self.world.board.send(0, "ALL:ENERGIZE", false, false);
            }
            id::BOULDER | id::SLIDER_NS | id::SLIDER_EW => {
                self.push(x, y, *dx, *dy);
                self.host.queue_sound(2, SOUND_PUSH);
            }
            id::BEAR
            | id::RUFFIAN
            | id::SLIME
            | id::SHARK
            | id::LION
            | id::TIGER
            | id::CENTIPEDE_HEAD
            | id::CENTIPEDE_SEGMENT
            | id::STAR
            | id::BULLET => self.attack(source, x, y),
            _ => {}
        }
    }

    fn clear_tile(&mut self, x: i16, y: i16) {
        self.world.board.tiles.set_element(x, y, id::EMPTY);
        self.draw_tile(x, y);
    }

    fn key_touch(&mut self, x: i16, y: i16, key: u8) {
        let Some(slot) = usize::from(key).checked_sub(1) else {
            return;
        };
        let name = COLOR_NAMES[slot];
        if self.world.info.keys[slot] {
            self.display_message(self.config.message_duration, &format!("You already have a {name} key!"));
            self.host.queue_sound(2, SOUND_KEY_HELD);
        } else {
            self.world.info.keys[slot] = true;
            self.clear_tile(x, y);
            self.display_message(self.config.message_duration, &format!("You now have the {name} key."));
            self.host.queue_sound(2, SOUND_KEY);
        }
    }

    fn door_touch(&mut self, x: i16, y: i16, key: u8) {
        let Some(slot) = usize::from(key).checked_sub(1) else {
            return;
        };
        let name = COLOR_NAMES[slot];
        if self.world.info.keys[slot] {
            self.world.info.keys[slot] = false;
            self.clear_tile(x, y);
            self.display_message(self.config.message_duration, &format!("The {name} door is now open."));
            self.host.queue_sound(3, SOUND_DOOR_OPEN);
        } else {
            self.display_message(self.config.message_duration, &format!("The {name} door is locked!"));
            self.host.queue_sound(3, SOUND_DOOR_LOCKED);
        }
    }

    fn scroll_touch(&mut self, x: i16, y: i16) {
        let Some(scroll) = self.world.board.stats.index_at(x, y) else {
            return;
        };
        self.host.queue_sound(2, &sound::parse("c-c+d-d+e-e+f-f+g-g"));
        if let Some(stat) = self.world.board.stats.get_mut(scroll) {
            stat.cursor = 0;
        }
        self.execute_script(scroll, "Scroll");
        if let Some(left) = self.world.board.stats.index_at(x, y)
            && left > 0
        {
            self.remove_stat(left);
        }
    }

    fn board_edge_touch(&mut self, source: i16, dx: &mut i16, dy: &mut i16) {
        let (mut entry_x, mut entry_y) = self.world.board.player_pos();
        let side = match (*dx, *dy) {
            (_, -1) => {
                entry_y = BOARD_HEIGHT;
                Neighbor::North
            }
            (_, 1) => {
                entry_y = 1;
                Neighbor::South
            }
            (-1, _) => {
                entry_x = BOARD_WIDTH;
                Neighbor::West
            }
            _ => {
                entry_x = 1;
                Neighbor::East
            }
        };
        let target = self.world.board.info.neighbor(side);
        if target == 0 {
            return;
        }

        let from = self.world.info.current_board;
        self.board_change(i16::from(target));
        if self.world.board.tiles.get(entry_x, entry_y).element != id::PLAYER {
            let (mut ix, mut iy) = (self.input.dx, self.input.dy);
            self.touch(entry_x, entry_y, source, &mut ix, &mut iy);
        }

        let arrival = self.world.board.tiles.get(entry_x, entry_y).element;
        if elements::def(arrival).walkable || arrival == id::PLAYER {
            if arrival != id::PLAYER {
                self.move_stat(0, entry_x, entry_y);
            }
            self.redraw();
            *dx = 0;
            *dy = 0;
            self.board_enter();
        } else {
            self.board_change(from);
        }
    }

    fn player_tick(&mut self, index: i16) {
        let (x, y) = self.world.board.stats.get(index).pos();

        if self.world.info.energizer_ticks > 0 {
            let color = if self.current_tick % 2 != 0 {
                0x0F
            } else {
                ((self.current_tick % 7 + 1) * 16 + 0x0F) as u8
            };
            self.world.board.tiles.set_color(x, y, color);
            self.draw_tile(x, y);
        } else if self.world.board.tiles.get(x, y).color != elements::def(id::PLAYER).color {
            self.world.board.tiles.set_color(x, y, elements::def(id::PLAYER).color);
            self.draw_tile(x, y);
        }

        if self.world.info.health <= 0 {
            self.input = Default::default();
            if self.message_ticks == 0 {
                self.display_message(32000, " Game over  -  Press ESCAPE");
            }
        }

        let input = self.input;
        if input.shoot && input.has_direction() {
            self.player_shoot(x, y, input.dx, input.dy);
        } else if input.has_direction() {
            let (mut dx, mut dy) = (input.dx, input.dy);
            self.touch(x + dx, y + dy, 0, &mut dx, &mut dy);
            if dx != 0 || dy != 0 {
                let (x, y) = self.world.board.player_pos();
                if elements::def(self.world.board.tiles.get(x + dx, y + dy).element).walkable {
                    self.move_stat(0, x + dx, y + dy);
                }
            }
        }

        if input.torch {
            self.light_torch();
        }
        if input.quit {
            self.request_end_play();
        }

        let (x, y) = self.world.board.player_pos();
        if self.world.info.torch_ticks > 0 {
            self.world.info.torch_ticks -= 1;
            if self.world.info.torch_ticks <= 0 {
                self.draw_player_surroundings(x, y);
                self.host.queue_sound(3, SOUND_TORCH_OUT);
            }
        }

        if self.world.info.energizer_ticks > 0 {
            self.world.info.energizer_ticks -= 1;
            if self.world.info.energizer_ticks == 10 {
                self.host.queue_sound(9, SOUND_ENERGIZER_ENDING);
            } else if self.world.info.energizer_ticks <= 0 {
                self.world.board.tiles.set_color(x, y, elements::def(id::PLAYER).color);
                self.draw_tile(x, y);
            }
        }

        self.count_board_time();
    }

    fn player_shoot(&mut self, x: i16, y: i16, dx: i16, dy: i16) {
        let duration = self.config.message_duration;
        if self.world.board.info.max_shots == 0 {
            if first_time(&mut self.hints.no_shooting) {
                self.display_message(duration, "Can't shoot in this place!");
            }
            return;
        }
        if self.world.info.ammo == 0 {
            if first_time(&mut self.hints.out_of_ammo) {
                self.display_message(duration, "You don't have any ammo!");
            }
            return;
        }
        let board = &self.world.board;
        let live_shots = board
            .stats
            .iter()
            .filter(|s| {
                let (sx, sy) = s.pos();
                board.tiles.get(sx, sy).element == id::BULLET && s.p1 == SHOT_SOURCE_PLAYER
            })
            .count();
        if live_shots < usize::from(board.info.max_shots)
            && self.shoot(id::BULLET, x, y, dx, dy, SHOT_SOURCE_PLAYER)
        {
            self.world.info.ammo -= 1;
            self.host.queue_sound(2, SOUND_PLAYER_SHOT);
        }
    }

    fn light_torch(&mut self) {
        let duration = self.config.message_duration;
        if self.world.info.torch_ticks > 0 {
            return;
        }
        if self.world.info.torches <= 0 {
            if first_time(&mut self.hints.out_of_torches) {
                self.display_message(duration, "You don't have any torches!");
            }
        } else if self.world.board.info.is_dark {
            self.world.info.torches -= 1;
            self.world.info.torch_ticks = TORCH_DURATION;
            let (x, y) = self.world.board.player_pos();
            self.draw_player_surroundings(x, y);
        } else if first_time(&mut self.hints.room_not_dark) {
            self.display_message(duration, "Don't need torch - room is not dark!");
        }
    }

    fn count_board_time(&mut self) {
        let limit = self.world.board.info.time_limit;
        if limit <= 0 || self.world.info.health <= 0 {
            return;
        }
        let info = &mut self.world.info;
        info.board_time_hsec += self.config.tick_duration();
        if info.board_time_hsec < 100 {
            return;
        }
        info.board_time_hsec -= 100;
        info.board_time_sec += 1;
        let elapsed = info.board_time_sec;
        if limit - 10 == elapsed {
            self.display_message(self.config.message_duration, "Running out of time!");
            self.host.queue_sound(3, SOUND_TIME_RUNNING_OUT);
        } else if elapsed > limit {
            self.damage_stat(0);
        }
    }

    fn object_tick(&mut self, index: i16) {
        let mut index = index;
        if self.world.board.stats.get(index).cursor >= 0 {
            match self.execute_script(index, "Interaction") {
                Some(alive) => index = alive,
                None => return,
            }
        }
        let stat = self.world.board.stats.get(index);
        let (dx, dy) = (stat.step_x, stat.step_y);
        if dx == 0 && dy == 0 {
            return;
        }
        let (x, y) = stat.pos();
        if elements::def(self.world.board.tiles.get(x + dx, y + dy).element).walkable {
            self.move_stat(index, x + dx, y + dy);
        } else {
            self.world.board.send(index, "THUD", false, true);
        }
    }

    fn scroll_tick(&mut self, index: i16) {
        let (x, y) = self.world.board.stats.get(index).pos();
        let color = self.world.board.tiles.get(x, y).color.wrapping_add(1);
        self.world
            .board
            .tiles
            .set_color(x, y, if color > 0x0F { 0x09 } else { color });
        self.draw_tile(x, y);
    }

    fn bullet_tick(&mut self, index: i16) {
        let mut first_try = true;
        loop {
            let stat = self.world.board.stats.get(index);
            let (x, y) = stat.pos();
            let (dx, dy) = (stat.step_x, stat.step_y);
            let source = stat.p1;
            let (tx, ty) = (x + dx, y + dy);
            let target = self.world.board.tiles.get(tx, ty).element;
            let def = elements::def(target);

            if def.walkable || target == id::WATER {
                self.move_stat(index, tx, ty);
                return;
            }
            if target == id::RICOCHET && first_try {
                self.set_step(index, -dx, -dy);
                self.host.queue_sound(1, SOUND_RICOCHET);
                first_try = false;
                continue;
            }
            if target == id::BREAKABLE
                || (def.destructible && (target == id::PLAYER || source == SHOT_SOURCE_PLAYER))
            {
                self.world.info.score = self.world.info.score.saturating_add(def.score_value);
                self.attack(index, tx, ty);
                return;
            }
            if self.world.board.tiles.get(x + dy, y + dx).element == id::RICOCHET && first_try {
                self.set_step(index, -dy, -dx);
                self.host.queue_sound(1, SOUND_RICOCHET);
                first_try = false;
                continue;
            }
            if self.world.board.tiles.get(x - dy, y - dx).element == id::RICOCHET && first_try {
                self.set_step(index, dy, dx);
                self.host.queue_sound(1, SOUND_RICOCHET);
                first_try = false;
                continue;
            }

            self.remove_stat(index);
            if (target == id::OBJECT || target == id::SCROLL)
                && let Some(hit) = self.world.board.stats.index_at(tx, ty)
            {
                self.world.board.send(hit, "SHOT", false, true);
            }
            return;
        }
    }

    fn set_step(&mut self, index: i16, dx: i16, dy: i16) {
        if let Some(stat) = self.world.board.stats.get_mut(index) {
            stat.step_x = dx;
            stat.step_y = dy;
        }
    }

    fn star_tick(&mut self, index: i16) {
        let Some(stat) = self.world.board.stats.get_mut(index) else {
            return;
        };
        stat.p2 = stat.p2.wrapping_sub(1);
        let (p2, (x, y)) = (stat.p2, stat.pos());
        if p2 == 0 {
            self.remove_stat(index);
            return;
        }
        if p2 % 2 != 0 {
            self.draw_tile(x, y);
            return;
        }

        let (dx, dy) = self.seek_direction(x, y);
        self.set_step(index, dx, dy);
        let (tx, ty) = (x + dx, y + dy);
        let target = self.world.board.tiles.get(tx, ty).element;
        if target == id::PLAYER || target == id::BREAKABLE {
            self.attack(index, tx, ty);
            return;
        }
        if !elements::def(target).walkable {
            self.push(tx, ty, dx, dy);
        }
        let target = self.world.board.tiles.get(tx, ty).element;
        if elements::def(target).walkable || target == id::WATER {
            self.move_stat(index, tx, ty);
        }
    }

    fn lion_tick(&mut self, index: i16) {
        let stat = self.world.board.stats.get(index);
        let (x, y) = stat.pos();
        let intelligence = i16::from(stat.p1);
        let (dx, dy) = if intelligence < self.host.random(10) {
            self.random_direction()
        } else {
            self.seek_direction(x, y)
        };
        self.step_or_attack(index, x + dx, y + dy, false);
    }

    fn tiger_tick(&mut self, index: i16) {
        let stat = self.world.board.stats.get(index);
        let (x, y) = stat.pos();
        let firing_rate = i16::from(stat.p2 % 0x80);
        let projectile = if stat.p2 >= 0x80 { id::STAR } else { id::BULLET };
        let (px, py) = self.world.board.player_pos();

        if self.host.random(10) * 3 <= firing_rate {
            let shot = (x - px).abs() <= 2
                && self.shoot(projectile, x, y, 0, (py - y).signum(), SHOT_SOURCE_ENEMY);
            if !shot && (y - py).abs() <= 2 {
                self.shoot(projectile, x, y, (px - x).signum(), 0, SHOT_SOURCE_ENEMY);
            }
        }
        self.lion_tick(index);
    }

    fn bear_tick(&mut self, index: i16) {
        let stat = self.world.board.stats.get(index);
        let (x, y) = stat.pos();
        let reach = 8 - i16::from(stat.p1);
        let (px, py) = self.world.board.player_pos();

        let (dx, dy) = if x != px && (y - py).abs() <= reach {
            ((px - x).signum(), 0)
        } else if (x - px).abs() <= reach {
            (0, (py - y).signum())
        } else {
            (0, 0)
        };
        self.step_or_attack(index, x + dx, y + dy, true);
    }

    fn step_or_attack(&mut self, index: i16, tx: i16, ty: i16, hits_breakable: bool) {
        let target = self.world.board.tiles.get(tx, ty).element;
        if elements::def(target).walkable {
            self.move_stat(index, tx, ty);
        } else if target == id::PLAYER || (hits_breakable && target == id::BREAKABLE) {
            self.attack(index, tx, ty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Script, Stat, Tile};
    use crate::config::EngineConfig;
    use crate::host::{HeadlessHost, PlayerInput};
    use crate::world::World;

    fn sim() -> Simulation<HeadlessHost> {
        Simulation::new(World::new(), EngineConfig::default(), HeadlessHost::new(1))
    }

    fn player_step(sim: &mut Simulation<HeadlessHost>, dx: i16, dy: i16) {
        sim.host.push_input(PlayerInput::step(dx, dy));
        sim.tick();
    }

    #[test]
    fn test_player_walks_and_picks_up_gem() {
        let mut sim = sim();
        let (px, py) = sim.world.board.player_pos();
        sim.world.board.tiles.set(px + 1, py, Tile::new(id::GEM, 0x0B));
        player_step(&mut sim, 1, 0);
        assert_eq!(sim.world.info.gems, 1);
        assert_eq!(sim.world.info.score, 10);
        assert_eq!(sim.world.info.health, 101);
        assert_eq!(sim.world.board.player_pos(), (px + 1, py));
        assert!(sim.host.messages().any(|m| m == "Gems give you Health!"));
    }

    #[test]
    fn test_key_then_door() {
        let mut sim = sim();
        let (px, py) = sim.world.board.player_pos();
        sim.world.board.tiles.set(px + 1, py, Tile::new(id::KEY, 0x0C));
        sim.world.board.tiles.set(px + 2, py, Tile::new(id::DOOR, 0x4F));
        player_step(&mut sim, 1, 0);
        assert!(sim.world.info.keys[3]);
        player_step(&mut sim, 1, 0);
        assert!(!sim.world.info.keys[3]);
        assert!(sim.host.messages().any(|m| m == "The Red door is now open."));
        assert_eq!(sim.world.board.player_pos(), (px + 2, py));
    }

    #[test]
    fn test_locked_door_blocks() {
        let mut sim = sim();
        let (px, py) = sim.world.board.player_pos();
        sim.world.board.tiles.set(px + 1, py, Tile::new(id::DOOR, 0x1F));
        player_step(&mut sim, 1, 0);
        assert_eq!(sim.world.board.player_pos(), (px, py));
        assert!(sim.host.messages().any(|m| m == "The Blue door is locked!"));
    }

    #[test]
    fn test_player_shot_uses_ammo() {
        let mut sim = sim();
        let (px, py) = sim.world.board.player_pos();
        sim.world.info.ammo = 2;
        sim.host.push_input(PlayerInput {
            shoot: true,
            ..PlayerInput::step(0, -1)
        });
        sim.tick();
        assert_eq!(sim.world.info.ammo, 1);
        // The bullet spawned above the player and already took its first step.
        let bullet = sim.world.board.stats.get(1);
        assert_eq!((bullet.x as i16, bullet.step_y, bullet.p1), (px, -1, SHOT_SOURCE_PLAYER));
        assert!(i16::from(bullet.y) < py);
    }

    #[test]
    fn test_no_ammo_hint_shows_once() {
        let mut sim = sim();
        for _ in 0..2 {
            sim.host.push_input(PlayerInput {
                shoot: true,
                ..PlayerInput::step(1, 0)
            });
            sim.tick();
        }
        let hints = sim
            .host
            .messages()
            .filter(|m| *m == "You don't have any ammo!")
            .count();
        assert_eq!(hints, 1);
    }

    #[test]
    fn test_bullet_flies_then_hits_wall() {
        let mut sim = sim();
        let template = Stat {
            step_x: -1,
            p1: SHOT_SOURCE_ENEMY,
            ..Stat::default()
        };
        let bullet = sim.add_stat(3, 5, id::BULLET, 0x0F, 1, &template).unwrap();
        sim.bullet_tick(bullet);
        assert_eq!(sim.world.board.stats.get(bullet).pos(), (2, 5));
        sim.bullet_tick(bullet);
        assert_eq!(sim.world.board.stats.count(), 0);
        assert_eq!(sim.world.board.tiles.get(1, 5).element, id::NORMAL);
    }

    #[test]
    fn test_bullet_ricochets() {
        let mut sim = sim();
        sim.world.board.tiles.set(11, 5, Tile::new(id::RICOCHET, 0x0A));
        let template = Stat {
            step_x: 1,
            ..Stat::default()
        };
        let bullet = sim.add_stat(10, 5, id::BULLET, 0x0F, 1, &template).unwrap();
        sim.bullet_tick(bullet);
        let stat = sim.world.board.stats.get(bullet);
        assert_eq!((stat.pos(), stat.step_x), ((9, 5), -1));
    }

    #[test]
    fn test_energizer_notifies_objects() {
        let mut sim = sim();
        let (px, py) = sim.world.board.player_pos();
        let template = Stat {
            script: Some(Script::from_text("#end\n:energize\n#set powered\n#end\n")),
            ..Stat::default()
        };
        let object = sim.add_stat(5, 5, id::OBJECT, 0x0F, 1, &template).unwrap();
        sim.world.board.stats.get_mut(object).unwrap().cursor = -1;
        sim.world.board.tiles.set(px + 1, py, Tile::new(id::ENERGIZER, 0x05));
        player_step(&mut sim, 1, 0);
        assert_eq!(sim.world.info.energizer_ticks, ENERGIZER_DURATION - 1);
        assert!(sim.world.info.has_flag("POWERED"));
    }

    #[test]
    fn test_board_edge_moves_to_neighbour() {
        let mut world = World::new();
        let mut east_board = Board::new();
        east_board.tiles.set(1, 12, Tile::EMPTY);
        let east = world.push_board(&east_board).unwrap();
        world.board.info.neighbors[Neighbor::East as usize] = east as u8;
        world.board.tiles.set(30, 12, Tile::EMPTY);
        world.board.tiles.set(BOARD_WIDTH, 12, Tile::new(id::PLAYER, 0x1F));
        world.board.stats.player_mut().x = BOARD_WIDTH as u8;
        let mut sim = Simulation::new(world, EngineConfig::default(), HeadlessHost::new(1));

        let (mut dx, mut dy) = (1, 0);
        sim.touch(BOARD_WIDTH + 1, 12, 0, &mut dx, &mut dy);
        assert_eq!(sim.world.info.current_board, east);
        assert_eq!(sim.world.board.player_pos(), (1, 12));
        assert_eq!((dx, dy), (0, 0));
        assert_eq!(sim.world.board.tiles.get(30, 12), Tile::EMPTY);
    }

    #[test]
    fn test_blocked_board_edge_changes_back() {
        let mut world = World::new();
        let east = world.push_board(&Board::new()).unwrap();
        world.board.info.neighbors[Neighbor::East as usize] = east as u8;
        let mut sim = Simulation::new(world, EngineConfig::default(), HeadlessHost::new(1));

        let (mut dx, mut dy) = (1, 0);
        sim.touch(BOARD_WIDTH + 1, 12, 0, &mut dx, &mut dy);
        assert_eq!(sim.world.info.current_board, 0);
        assert_eq!((dx, dy), (1, 0));
    }

    #[test]
    fn test_lion_attacks_adjacent_player() {
        let mut sim = sim();
        let (px, py) = sim.world.board.player_pos();
        let template = Stat {
            p1: 10,
            ..Stat::default()
        };
        let lion = sim.add_stat(px - 1, py, id::LION, 0x0C, 2, &template).unwrap();
        sim.lion_tick(lion);
        assert_eq!(sim.world.info.health, 90);
        assert_eq!(sim.world.board.stats.count(), 0);
    }
}
