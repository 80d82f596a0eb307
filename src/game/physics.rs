//! Jump-arc physics and arena movement constraints

use super::world::Fighter;

/// Resting vertical position
pub const GROUND_Y: f32 = 300.0;
/// Downward acceleration per tick
pub const GRAVITY: f32 = 1.0;
/// Initial upward velocity of a jump (negative = up)
pub const JUMP_VELOCITY: f32 = -15.0;

/// Horizontal arena bounds
pub const ARENA_MIN_X: f32 = 50.0;
pub const ARENA_MAX_X: f32 = 720.0;
/// Horizontal movement per tick
pub const MOVE_SPEED: f32 = 5.0;

/// Advance one fighter's jump arc by one tick. No-op while grounded.
pub fn integrate(fighter: &mut Fighter) {
    if !fighter.is_jumping {
        return;
    }

    fighter.y += fighter.jump_velocity;
    fighter.jump_velocity += GRAVITY;

    if fighter.y >= GROUND_Y {
        fighter.y = GROUND_Y;
        fighter.is_jumping = false;
        fighter.jump_velocity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::protocol::Facing;

    #[test]
    fn grounded_fighter_is_untouched() {
        let mut fighter = Fighter::spawn(100.0, Facing::Right);
        integrate(&mut fighter);
        assert_eq!(fighter.y, GROUND_Y);
        assert!(!fighter.is_jumping);
    }

    #[test]
    fn jump_rises_then_gravity_pulls_back() {
        let mut fighter = Fighter::spawn(100.0, Facing::Right);
        fighter.is_jumping = true;
        fighter.jump_velocity = JUMP_VELOCITY;

        integrate(&mut fighter);
        assert_eq!(fighter.y, GROUND_Y + JUMP_VELOCITY);
        assert_eq!(fighter.jump_velocity, JUMP_VELOCITY + GRAVITY);
    }

    #[test]
    fn landing_clamps_to_ground_and_clears_jump() {
        let mut fighter = Fighter::spawn(100.0, Facing::Right);
        fighter.is_jumping = true;
        fighter.jump_velocity = JUMP_VELOCITY;

        // A full arc always terminates back on the ground
        for _ in 0..100 {
            integrate(&mut fighter);
            if !fighter.is_jumping {
                break;
            }
        }

        assert!(!fighter.is_jumping);
        assert_eq!(fighter.y, GROUND_Y);
        assert_eq!(fighter.jump_velocity, 0.0);
    }
}
