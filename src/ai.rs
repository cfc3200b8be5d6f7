use crate::entity::{Enemy, GridPosition};

/// What one enemy does with its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyAction {
    Attack,
    MoveTo(GridPosition),
    Hold,  // Blocked, or cannot move at all
}

/// Adjacent enemies attack. Others take one step toward the player, each axis
/// independently, so a step may be diagonal.
pub fn decide_enemy_action(
    enemy: &Enemy,
    player_pos: GridPosition,
    others: &[GridPosition],
    width: i32,
    height: i32,
) -> EnemyAction {
    if enemy.position.within(&player_pos, 1) {
        return EnemyAction::Attack;
    }
    if enemy.stats.move_range <= 0 {
        return EnemyAction::Hold;
    }

    let dx = (player_pos.x - enemy.position.x).signum();
    let dy = (player_pos.y - enemy.position.y).signum();
    let step = GridPosition::new(enemy.position.x + dx, enemy.position.y + dy);

    if step == enemy.position {
        return EnemyAction::Hold;
    }
    if step.x < 0 || step.y < 0 || step.x >= width || step.y >= height {
        return EnemyAction::Hold;
    }
    // Never onto the player or another enemy
    if step == player_pos || others.contains(&step) {
        return EnemyAction::Hold;
    }

    EnemyAction::MoveTo(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{enemy_data, EnemyKind};
    use crate::entity::EnemyId;

    fn shadow_at(x: i32, y: i32) -> Enemy {
        Enemy::from_data(EnemyId(1), &enemy_data(EnemyKind::Shadow), GridPosition::new(x, y))
    }

    #[test]
    fn adjacent_enemy_attacks() {
        let enemy = shadow_at(2, 2);
        assert_eq!(decide_enemy_action(&enemy, GridPosition::new(2, 3), &[], 6, 6), EnemyAction::Attack);
    }

    #[test]
    fn diagonal_neighbour_steps_instead_of_attacking() {
        // Distance sqrt(2) is out of contact range, and the step lands on the player
        let enemy = shadow_at(2, 2);
        assert_eq!(decide_enemy_action(&enemy, GridPosition::new(3, 3), &[], 6, 6), EnemyAction::Hold);
    }

    #[test]
    fn steps_on_both_axes() {
        let enemy = shadow_at(5, 0);
        assert_eq!(
            decide_enemy_action(&enemy, GridPosition::new(1, 4), &[], 6, 6),
            EnemyAction::MoveTo(GridPosition::new(4, 1))
        );
    }

    #[test]
    fn blocked_by_other_enemy() {
        let enemy = shadow_at(5, 0);
        let others = [GridPosition::new(4, 1)];
        assert_eq!(decide_enemy_action(&enemy, GridPosition::new(1, 4), &others, 6, 6), EnemyAction::Hold);
    }

    #[test]
    fn immobile_enemy_holds() {
        let mut enemy = shadow_at(5, 0);
        enemy.stats.move_range = 0;
        assert_eq!(decide_enemy_action(&enemy, GridPosition::new(1, 4), &[], 6, 6), EnemyAction::Hold);
    }
}
