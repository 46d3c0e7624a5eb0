//! Cosmetic values for the viewer. Nothing here feeds role or tier logic.

use rand::Rng;

pub const Y_MIN: u8 = 10;
pub const Y_MAX: u8 = 90;

/// Vertical position of a creature in the viewer's tank.
pub fn random_y() -> u8 {
    rand::thread_rng().gen_range(Y_MIN..=Y_MAX)
}
