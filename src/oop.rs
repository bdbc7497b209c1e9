//! Object scripts.
//!
//! A script is a byte buffer of `\r`-terminated lines owned by a stat (and
//! possibly shared with others through `#BIND`). Lines starting with `#` are
//! commands, `:` starts a label, `'` a zapped label or comment, `@` the
//! object's name, `/` and `?` are movement shorthands, and anything else is
//! text shown to the player.
//!
//! - [`Cursor`] reads characters, words and numbers at a stat's position.
//! - [`LabelSearch`] and the `Board` routing methods deliver messages.
//! - [`Simulation::execute_script`](crate::engine::Simulation::execute_script)
//!   runs a script for one tick.

mod cursor;
mod interp;
mod parse;
mod router;

pub use cursor::Cursor;
pub use router::{ACTIVE_LABEL, LabelSearch, ZAPPED_LABEL, find_string};
