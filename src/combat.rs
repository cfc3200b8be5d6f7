use rand::Rng;
use crate::entity::{Buff, Enemy, Player};
use crate::message::GameMessage;

pub const CRIT_MULTIPLIER: f64 = 1.5;
/// Basic attack reach. Separate constant from the melee skill range.
pub const BASIC_ATTACK_RANGE: i32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRoll {
    pub damage: i32,
    pub is_crit: bool,
}

/// Outgoing damage for every player-originated hit.
///
/// An active bonus adds `floor(base * bonus)`; a nonzero critical chance then
/// rolls once and multiplies the buffed total by 1.5, floored.
pub fn resolve_damage<R: Rng + ?Sized>(buff: Option<&Buff>, base_damage: i32, rng: &mut R) -> DamageRoll {
    let mut damage = base_damage;
    let mut is_crit = false;

    if let Some(buff) = buff {
        if buff.damage_bonus > 0.0 {
            damage += (base_damage as f64 * buff.damage_bonus).floor() as i32;
        }
        if buff.critical_chance > 0.0 && rng.gen::<f64>() < buff.critical_chance {
            damage = (damage as f64 * CRIT_MULTIPLIER).floor() as i32;
            is_crit = true;
        }
    }

    DamageRoll { damage, is_crit }
}

/// Incoming damage after the player's flat reduction, if any.
pub fn reduce_incoming(buff: Option<&Buff>, raw_damage: i32) -> i32 {
    match buff {
        Some(buff) if buff.damage_reduction > 0.0 => {
            (raw_damage as f64 * (1.0 - buff.damage_reduction)).floor() as i32
        }
        _ => raw_damage,
    }
}

/// One player hit on an enemy, buff and crit applied.
pub fn player_strike<R: Rng + ?Sized>(
    player: &Player,
    target: &mut Enemy,
    base_damage: i32,
    rng: &mut R,
) -> GameMessage {
    let roll = resolve_damage(player.buff.as_ref(), base_damage, rng);
    target.modify_hp(-roll.damage);

    GameMessage::combat(
        player.name.clone(),
        target.name.clone(),
        roll.damage,
        target.stats.hp,
        !target.is_alive(),
        roll.is_crit,
    )
}

/// One enemy hit on the player, reduced by the player's buff.
pub fn enemy_strike(attacker: &Enemy, player: &mut Player) -> GameMessage {
    let damage = reduce_incoming(player.buff.as_ref(), attacker.stats.atk);
    player.modify_hp(-damage);

    GameMessage::combat(
        attacker.name.clone(),
        player.name.clone(),
        damage,
        player.stats.hp,
        !player.is_alive(),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::data::{enemy_data, EnemyKind};
    use crate::entity::{EnemyId, GridPosition};
    use crate::skill::focus_buff;

    #[test]
    fn no_buff_means_base_damage() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(resolve_damage(None, 13, &mut rng), DamageRoll { damage: 13, is_crit: false });
        assert_eq!(reduce_incoming(None, 12), 12);
    }

    #[test]
    fn bonus_is_floored_and_added() {
        let mut rng = StdRng::seed_from_u64(7);
        let buff = focus_buff(1);
        // 13 + floor(13 * 0.3) = 13 + 3
        assert_eq!(resolve_damage(Some(&buff), 13, &mut rng).damage, 16);
        let buff = focus_buff(2);
        assert_eq!(resolve_damage(Some(&buff), 10, &mut rng).damage, 14);
    }

    #[test]
    fn guaranteed_crit_multiplies_buffed_total() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut buff = focus_buff(3);
        buff.critical_chance = 1.0;
        // 10 + 5 = 15, then floor(15 * 1.5) = 22
        assert_eq!(resolve_damage(Some(&buff), 10, &mut rng), DamageRoll { damage: 22, is_crit: true });
    }

    #[test]
    fn crit_rate_roughly_matches_chance() {
        let mut rng = StdRng::seed_from_u64(42);
        let buff = focus_buff(3);
        let crits = (0..10_000)
            .filter(|_| resolve_damage(Some(&buff), 10, &mut rng).is_crit)
            .count();
        assert!((1_700..2_300).contains(&crits), "crits = {}", crits);
    }

    #[test]
    fn incoming_reduction_is_floored() {
        assert_eq!(reduce_incoming(Some(&focus_buff(3)), 12), 6);
        assert_eq!(reduce_incoming(Some(&focus_buff(3)), 7), 3);
        assert_eq!(reduce_incoming(Some(&focus_buff(1)), 12), 8);
    }

    #[test]
    fn enemy_strike_reports_player_hp() {
        let enemy = Enemy::from_data(EnemyId(1), &enemy_data(EnemyKind::Guardian), GridPosition::new(2, 1));
        let mut player = Player::new(GridPosition::new(1, 1));
        let msg = enemy_strike(&enemy, &mut player);
        assert_eq!(player.stats.hp, 51);
        assert_eq!(msg.damage, Some(9));
        assert_eq!(msg.target_health_after, Some(51));
    }
}
