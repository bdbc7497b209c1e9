//! The debug command prompt.

use tracing::debug;

use super::NEIGHBOR_DELTAS;
use super::simulation::Simulation;
use crate::elements::id;
use crate::host::Host;

impl<H: Host> Simulation<H> {
    /// Ask the host for a debug command and run it. A cancelled prompt does
    /// nothing.
    pub fn debug_prompt(&mut self) {
        if let Some(line) = self.host.prompt_line("Debug command:") {
            self.run_debug_command(&line);
        }
    }

    /// Run one debug command.
    ///
    /// `+NAME` sets flag `NAME` and `-NAME` clears it; the bare name is then
    /// also tried as a command, with `-` turning `DARK` off.
    pub fn run_debug_command(&mut self, input: &str) {
        let mut command = input.trim().to_ascii_uppercase();
        let mut toggle = true;
        if let Some(rest) = command.strip_prefix('+') {
            command = rest.to_string();
            self.world.info.set_flag(&command);
        } else if let Some(rest) = command.strip_prefix('-') {
            command = rest.to_string();
            toggle = false;
            self.world.info.clear_flag(&command);
        }
        debug!(command = %command, toggle, "debug command");

        let info = &mut self.world.info;
        match command.as_str() {
            "HEALTH" => info.health = info.health.saturating_add(50),
            "AMMO" => info.ammo = info.ammo.saturating_add(5),
            "KEYS" => info.keys = [true; 7],
            "TORCHES" => info.torches = info.torches.saturating_add(3),
            "TIME" => info.board_time_sec = info.board_time_sec.saturating_sub(30),
            "GEMS" => info.gems = info.gems.saturating_add(5),
            "DARK" => {
                self.world.board.info.is_dark = toggle;
                self.redraw();
            }
            "ZAP" => {
                let (px, py) = self.world.board.player_pos();
                for (dx, dy) in NEIGHBOR_DELTAS {
                    let (x, y) = (px + dx, py + dy);
                    self.damage_tile(x, y);
                    self.world.board.tiles.set_element(x, y, id::EMPTY);
                    self.draw_tile(x, y);
                }
            }
            _ => {}
        }
        self.host.queue_sound(10, b"'\x04");
    }
}
