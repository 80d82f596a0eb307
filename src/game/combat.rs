//! Combat resolution - range check, damage, combo interaction
//!
//! Pure functions over fighter state; all mutation happens in the room.

use super::world::Fighter;

/// Attacks land strictly inside this horizontal range
pub const ATTACK_RANGE: f32 = 80.0;
/// Base damage of a normal attack
pub const NORMAL_DAMAGE: f32 = 15.0;
/// Base damage of a special attack
pub const SPECIAL_DAMAGE: f32 = 25.0;
/// Damage multiplier applied when the defender is blocking
pub const BLOCK_DAMAGE_SCALE: f32 = 0.3;
/// Bonus damage per combo step
pub const COMBO_DAMAGE_STEP: u32 = 2;

/// Attack variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    Normal,
    Special,
}

impl AttackKind {
    pub fn base_damage(self) -> f32 {
        match self {
            AttackKind::Normal => NORMAL_DAMAGE,
            AttackKind::Special => SPECIAL_DAMAGE,
        }
    }
}

/// Result of resolving one attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackOutcome {
    /// Defender HP after the attack (floored at 0)
    pub defender_hp: f32,
    /// True when the hit was blocked, which resets the attacker's combo
    pub combo_broken: bool,
}

/// Resolve an attack. Out-of-range attacks whiff: HP unchanged, combo
/// kept. Blocking scales damage by [`BLOCK_DAMAGE_SCALE`] and breaks the
/// combo regardless of its size.
pub fn resolve(attacker: &Fighter, defender: &Fighter, kind: AttackKind) -> AttackOutcome {
    let distance = (attacker.x - defender.x).abs();
    if distance >= ATTACK_RANGE {
        return AttackOutcome {
            defender_hp: defender.hp,
            combo_broken: false,
        };
    }

    let mut damage = kind.base_damage();
    if attacker.combo > 0 {
        damage += (attacker.combo * COMBO_DAMAGE_STEP) as f32;
    }

    if defender.is_blocking {
        damage *= BLOCK_DAMAGE_SCALE;
        AttackOutcome {
            defender_hp: (defender.hp - damage).max(0.0),
            combo_broken: true,
        }
    } else {
        AttackOutcome {
            defender_hp: (defender.hp - damage).max(0.0),
            combo_broken: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::protocol::Facing;

    fn fighter_at(x: f32) -> Fighter {
        Fighter::spawn(x, Facing::Right)
    }

    #[test]
    fn normal_attack_in_range_deals_base_damage() {
        let attacker = fighter_at(100.0);
        let defender = fighter_at(150.0);

        let outcome = resolve(&attacker, &defender, AttackKind::Normal);

        assert_eq!(outcome.defender_hp, 85.0);
        assert!(!outcome.combo_broken);
    }

    #[test]
    fn range_boundary_is_exclusive() {
        let attacker = fighter_at(100.0);
        let at_range = fighter_at(180.0);
        let outcome = resolve(&attacker, &at_range, AttackKind::Normal);
        assert_eq!(outcome.defender_hp, at_range.hp);

        let just_inside = fighter_at(179.0);
        let outcome = resolve(&attacker, &just_inside, AttackKind::Normal);
        assert!(outcome.defender_hp < just_inside.hp);
    }

    #[test]
    fn combo_adds_two_damage_per_step() {
        let mut attacker = fighter_at(100.0);
        attacker.combo = 3;
        let defender = fighter_at(150.0);

        let outcome = resolve(&attacker, &defender, AttackKind::Normal);

        // 15 base + 3 * 2 combo bonus
        assert_eq!(outcome.defender_hp, 100.0 - 21.0);
    }

    #[test]
    fn blocking_scales_damage_and_breaks_combo() {
        let mut attacker = fighter_at(100.0);
        attacker.combo = 10;
        let mut defender = fighter_at(150.0);
        defender.is_blocking = true;

        let outcome = resolve(&attacker, &defender, AttackKind::Normal);

        // (15 + 20) * 0.3
        assert_approx_eq::assert_approx_eq!(outcome.defender_hp, 100.0 - 10.5, 1e-4);
        assert!(outcome.combo_broken);
    }

    #[test]
    fn whiffed_attack_keeps_combo_intact() {
        let mut attacker = fighter_at(100.0);
        attacker.combo = 5;
        let mut defender = fighter_at(500.0);
        defender.is_blocking = true;

        let outcome = resolve(&attacker, &defender, AttackKind::Normal);

        assert_eq!(outcome.defender_hp, defender.hp);
        assert!(!outcome.combo_broken);
    }

    #[test]
    fn special_attack_uses_heavier_base() {
        let attacker = fighter_at(100.0);
        let defender = fighter_at(150.0);

        let outcome = resolve(&attacker, &defender, AttackKind::Special);

        assert_eq!(outcome.defender_hp, 75.0);
    }

    #[test]
    fn hp_floors_at_zero() {
        let attacker = fighter_at(100.0);
        let mut defender = fighter_at(150.0);
        defender.hp = 5.0;

        let outcome = resolve(&attacker, &defender, AttackKind::Special);

        assert_eq!(outcome.defender_hp, 0.0);
    }
}
