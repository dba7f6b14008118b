//! Path: nova_engine/src/systems/collision.rs
//! Summary: 衝突解決（弾丸ヒット・機体接触・パワーアップ取得）
//!
//! 防御側（敵・ボス）を空間ハッシュに載せてから弾丸を走査する。
//! 死亡マークはこの tick の間は見えたままなので、同一 tick 内の
//! 2 発目以降のヒットは「吸収」される（弾は消えるがイベントなし）。

use nova_core::constants::{INVINCIBLE_DURATION, MAX_POWER_LEVEL};
use nova_core::params::{EnemyParams, PowerupKind, ProjectileKind, ALL_POWERUP_KINDS};

use crate::systems::powerup::ApplyOutcome;
use crate::systems::spawn::spawn_powerup;
use crate::world::entity::{EntityClass, EntityId};
use crate::world::event::{CollisionEvent, CollisionKind, GameEvent};
use crate::world::session::Session;

fn circle_hit(ax: f32, ay: f32, ar: f32, bx: f32, by: f32, br: f32) -> bool {
    let dx = ax - bx;
    let dy = ay - by;
    let r = ar + br;
    dx * dx + dy * dy <= r * r
}

/// 弾丸 1 発が防御側 1 体に当たった結果
enum HitOutcome {
    /// 死亡済み防御側への後続ヒット。弾だけ消える。
    Absorbed,
    /// ダメージは通ったが生存
    Damaged(EntityId),
    /// 撃破。スコア・イベント・ドロップは呼び出し側で処理する。
    Killed(EntityId),
}

/// 挙動パスの後に呼ばれる衝突解決。レジストリの挿入順がそのまま
/// 同時ヒットの解決順になる。
pub(crate) fn resolve_collisions(w: &mut Session) -> Vec<CollisionEvent> {
    let mut collisions = Vec::new();
    let len = w.registry.entities.len();

    // ── ブロードフェーズ再構築（防御側 = 敵とボス）─────────────
    // 問い合わせ半径は生存防御側の最大半径から決める。ボス半径は設定値
    // なので、固定値では大型ボスとの重なりを取りこぼす。
    w.broad.clear();
    let mut max_defender_radius = 0.0_f32;
    for (i, e) in w.registry.entities.iter().enumerate() {
        if e.alive && (e.is_enemy() || e.is_boss()) {
            w.broad.insert(i, e.x, e.y);
            max_defender_radius = max_defender_radius.max(e.radius);
        }
    }

    // ── 弾丸ヒット ─────────────────────────────────────────────
    for i in 0..len {
        let (pid, px, py, pr, kind, damage) = {
            let e = &w.registry.entities[i];
            if !e.alive {
                continue;
            }
            match &e.class {
                EntityClass::Projectile(ps) => (e.id, e.x, e.y, e.radius, ps.kind, ps.damage),
                _ => continue,
            }
        };
        if kind.is_player_owned() {
            resolve_player_shot(
                w,
                &mut collisions,
                pid,
                px,
                py,
                pr + max_defender_radius,
                pr,
                kind,
                damage,
            );
        } else {
            resolve_enemy_shot(w, &mut collisions, pid, px, py, pr, damage);
        }
    }

    // ── 機体接触（敵・ボス vs プレイヤー）──────────────────────
    for i in 0..len {
        let (eid, ex, ey, er, is_boss) = {
            let e = &w.registry.entities[i];
            if !e.alive || !(e.is_enemy() || e.is_boss()) {
                continue;
            }
            (e.id, e.x, e.y, e.radius, e.is_boss())
        };
        let overlapping = w
            .registry
            .get(w.player_id)
            .filter(|p| p.alive)
            .map(|p| circle_hit(ex, ey, er, p.x, p.y, p.radius))
            .unwrap_or(false);
        if !overlapping {
            continue;
        }
        let contact_damage = if is_boss {
            w.config.boss.contact_damage
        } else {
            w.registry
                .get(eid)
                .and_then(|e| e.enemy_kind())
                .map(|k| EnemyParams::get(k).contact_damage)
                .unwrap_or(0)
        };
        if damage_player(w, contact_damage) {
            collisions.push(CollisionEvent {
                a:    eid,
                b:    w.player_id,
                kind: CollisionKind::Contact,
            });
            // 接触した敵は自爆扱いで撃破になる。ボスは接触では死なない。
            if !is_boss {
                kill_enemy(w, eid);
            }
        }
    }

    // ── パワーアップ取得 ───────────────────────────────────────
    for i in 0..len {
        let (pid, kind) = {
            let e = &w.registry.entities[i];
            if !e.alive {
                continue;
            }
            match e.class {
                EntityClass::Powerup(kind) => (e.id, kind),
                _ => continue,
            }
        };
        let overlapping = {
            let e = &w.registry.entities[i];
            w.registry
                .get(w.player_id)
                .filter(|p| p.alive)
                .map(|p| circle_hit(e.x, e.y, e.radius, p.x, p.y, p.radius))
                .unwrap_or(false)
        };
        if !overlapping {
            continue;
        }
        w.registry.mark_dead(pid);
        collisions.push(CollisionEvent {
            a:    w.player_id,
            b:    pid,
            kind: CollisionKind::Pickup,
        });
        w.emit(GameEvent::PowerupCollected { kind });
        // Instant だけは取得と同じ tick 内で効果を実行する
        if w.powerups.apply(w.player_id, kind) == ApplyOutcome::Instant {
            apply_instant_powerup(w, kind, len);
        }
    }

    collisions
}

fn resolve_player_shot(
    w: &mut Session,
    collisions: &mut Vec<CollisionEvent>,
    pid: EntityId,
    px: f32,
    py: f32,
    query_radius: f32,
    pr: f32,
    kind: ProjectileKind,
    damage: i32,
) {
    let mut buf = std::mem::take(&mut w.query_buf);
    w.broad.query_nearby_into(px, py, query_radius, &mut buf);
    let mut consumed = false;
    for &j in &buf {
        let outcome = {
            let d = &mut w.registry.entities[j];
            if !circle_hit(px, py, pr, d.x, d.y, d.radius) {
                continue;
            }
            if !d.alive {
                HitOutcome::Absorbed
            } else if let EntityClass::Boss(state) = &d.class {
                if state.entry_invuln > 0.0 {
                    // フェーズ突入無敵中は弾を受け止めるだけ
                    HitOutcome::Absorbed
                } else {
                    d.hp -= damage;
                    // 撃破・フェーズ遷移の判定はボスコントローラに委ねる
                    HitOutcome::Damaged(d.id)
                }
            } else {
                d.hp -= damage;
                if d.hp <= 0 {
                    HitOutcome::Killed(d.id)
                } else {
                    HitOutcome::Damaged(d.id)
                }
            }
        };
        match outcome {
            HitOutcome::Absorbed => {}
            HitOutcome::Damaged(target) => {
                collisions.push(CollisionEvent {
                    a:    pid,
                    b:    target,
                    kind: CollisionKind::ProjectileHit,
                });
            }
            HitOutcome::Killed(target) => {
                collisions.push(CollisionEvent {
                    a:    pid,
                    b:    target,
                    kind: CollisionKind::ProjectileHit,
                });
                kill_enemy(w, target);
            }
        }
        if !kind.piercing() {
            consumed = true;
            break;
        }
    }
    w.query_buf = buf;
    if consumed {
        w.registry.mark_dead(pid);
    }
}

fn resolve_enemy_shot(
    w: &mut Session,
    collisions: &mut Vec<CollisionEvent>,
    pid: EntityId,
    px: f32,
    py: f32,
    pr: f32,
    damage: i32,
) {
    let overlapping = w
        .registry
        .get(w.player_id)
        .filter(|p| p.alive)
        .map(|p| circle_hit(px, py, pr, p.x, p.y, p.radius))
        .unwrap_or(false);
    if !overlapping {
        return;
    }
    // 命中した弾はシールド・無敵中でも消える
    w.registry.mark_dead(pid);
    if damage_player(w, damage) {
        collisions.push(CollisionEvent {
            a:    pid,
            b:    w.player_id,
            kind: CollisionKind::ProjectileHit,
        });
    }
}

/// プレイヤーにダメージを与える。シールド・無敵ウィンドウ中は false。
/// 通った場合は無敵ウィンドウを開始し、死亡なら敗北フラグを立てる。
fn damage_player(w: &mut Session, damage: i32) -> bool {
    if w.stats.shield_active {
        return false;
    }
    let player_id = w.player_id;
    let Some(p) = w.registry.get_mut(player_id) else {
        return false;
    };
    if !p.alive {
        return false;
    }
    let EntityClass::Player(ps) = &mut p.class else {
        return false;
    };
    if ps.invincible_timer > 0.0 {
        return false;
    }
    ps.invincible_timer = INVINCIBLE_DURATION;
    p.hp -= damage;
    let dead = p.hp <= 0;
    w.emit(GameEvent::PlayerHit { damage });
    if dead {
        w.registry.mark_dead(player_id);
        w.defeat = true;
        log::info!("player defeated at t={:.1}s score={}", w.elapsed, w.score);
    }
    true
}

/// 敵 1 体の戦闘死。スコア加算・イベント発行・ドロップ抽選まで行う。
/// 既に死亡マーク済みなら何もしない。
fn kill_enemy(w: &mut Session, id: EntityId) {
    let Some((kind, x, y)) = w
        .registry
        .get(id)
        .filter(|e| e.alive)
        .and_then(|e| e.enemy_kind().map(|k| (k, e.x, e.y)))
    else {
        return;
    };
    let params = EnemyParams::get(kind);
    w.registry.mark_dead(id);
    w.score += params.score;
    w.emit(GameEvent::EnemyDestroyed { kind, score: params.score });
    if w.rng.roll_percent(params.drop_percent) {
        let drop = ALL_POWERUP_KINDS[(w.rng.next_u32() as usize) % ALL_POWERUP_KINDS.len()];
        spawn_powerup(w, drop, x, y);
    }
}

/// Instant ポリシーのパワーアップ効果。`len` は取得時点のスロット数
/// （この tick にスポーンした弾等を巻き込まないため）。
fn apply_instant_powerup(w: &mut Session, kind: PowerupKind, len: usize) {
    match kind {
        PowerupKind::PowerRestore => {
            if let Some(p) = w.registry.get_mut(w.player_id) {
                if let EntityClass::Player(ps) = &mut p.class {
                    ps.power_level = MAX_POWER_LEVEL;
                }
            }
        }
        PowerupKind::MegaBlast => {
            // 画面上の通常敵を一掃する。ボスには効かない。
            let targets: Vec<EntityId> = w.registry.entities[..len]
                .iter()
                .filter(|e| e.alive && e.is_enemy())
                .map(|e| e.id)
                .collect();
            for id in targets {
                kill_enemy(w, id);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::systems::spawn::spawn_enemy;
    use crate::world::entity::{Entity, ProjectileState};
    use nova_core::constants::{BULLET_RADIUS, PLAYER_MAX_HP, POWERUP_RADIUS};
    use nova_core::params::EnemyKind;

    fn quiet_session() -> Session {
        let mut config = SessionConfig::default_survival(3);
        config.schedule.clear();
        config.filler_spawns = false;
        Session::new(config).unwrap()
    }

    fn spawn_shot(w: &mut Session, x: f32, y: f32, kind: ProjectileKind, damage: i32) -> EntityId {
        w.registry.spawn(|id| Entity {
            id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            hp: 1,
            radius: BULLET_RADIUS,
            alive: true,
            class: EntityClass::Projectile(ProjectileState {
                kind,
                damage,
                lifetime: 1.0,
            }),
        })
    }

    fn spawn_pickup(w: &mut Session, kind: PowerupKind) -> EntityId {
        let (x, y) = {
            let p = w.registry.get(w.player_id).unwrap();
            (p.x, p.y)
        };
        w.registry.spawn(|id| Entity {
            id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            hp: 1,
            radius: POWERUP_RADIUS,
            alive: true,
            class: EntityClass::Powerup(kind),
        })
    }

    #[test]
    fn lethal_shot_scores_once_and_consumes_projectile() {
        let mut w = quiet_session();
        spawn_enemy(&mut w, EnemyKind::Grunt, 500.0, 300.0);
        let shot = spawn_shot(&mut w, 500.0, 300.0, ProjectileKind::PlayerShot, 99);

        resolve_collisions(&mut w);
        let destroyed: Vec<_> = w
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyDestroyed { .. }))
            .collect();
        assert_eq!(destroyed.len(), 1);
        assert_eq!(w.score(), EnemyParams::get(EnemyKind::Grunt).score);
        assert!(!w.registry.get(shot).unwrap().alive);
    }

    #[test]
    fn second_hit_on_dead_defender_is_absorbed() {
        let mut w = quiet_session();
        spawn_enemy(&mut w, EnemyKind::Grunt, 500.0, 300.0);
        let first = spawn_shot(&mut w, 500.0, 300.0, ProjectileKind::PlayerShot, 99);
        let second = spawn_shot(&mut w, 500.0, 300.0, ProjectileKind::PlayerShot, 99);

        resolve_collisions(&mut w);
        // 死亡イベントは 1 回だけ、2 発目は吸収されて消える
        let destroyed = w
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 1);
        assert_eq!(w.score(), EnemyParams::get(EnemyKind::Grunt).score);
        assert!(!w.registry.get(first).unwrap().alive);
        assert!(!w.registry.get(second).unwrap().alive);
    }

    #[test]
    fn laser_pierces_through_a_column() {
        let mut w = quiet_session();
        spawn_enemy(&mut w, EnemyKind::Grunt, 500.0, 300.0);
        spawn_enemy(&mut w, EnemyKind::Grunt, 510.0, 300.0);
        let laser = spawn_shot(&mut w, 505.0, 300.0, ProjectileKind::PlayerLaser, 99);

        resolve_collisions(&mut w);
        let destroyed = w
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 2, "貫通弾は列をまとめて抜く");
        assert!(w.registry.get(laser).unwrap().alive, "レーザーは消費されない");
    }

    #[test]
    fn shield_blocks_enemy_shot_without_player_hit() {
        let mut w = quiet_session();
        w.powerups.apply(w.player_id, PowerupKind::Shield);
        w.stats = w.powerups.derive(w.player_id);
        let (px, py) = {
            let p = w.registry.get(w.player_id).unwrap();
            (p.x, p.y)
        };
        let shot = spawn_shot(&mut w, px, py, ProjectileKind::EnemyShot, 10);

        resolve_collisions(&mut w);
        assert!(!w.registry.get(shot).unwrap().alive, "弾は盾に当たって消える");
        assert!(!w.events.iter().any(|e| matches!(e, GameEvent::PlayerHit { .. })));
        assert_eq!(w.registry.get(w.player_id).unwrap().hp, PLAYER_MAX_HP);
    }

    #[test]
    fn player_hit_opens_invincibility_window() {
        let mut w = quiet_session();
        let (px, py) = {
            let p = w.registry.get(w.player_id).unwrap();
            (p.x, p.y)
        };
        spawn_shot(&mut w, px, py, ProjectileKind::EnemyShot, 10);
        spawn_shot(&mut w, px, py, ProjectileKind::EnemyShot, 10);

        resolve_collisions(&mut w);
        // 同 tick の 2 発目は無敵ウィンドウに吸われる
        let hits = w
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerHit { .. }))
            .count();
        assert_eq!(hits, 1);
        assert_eq!(w.registry.get(w.player_id).unwrap().hp, PLAYER_MAX_HP - 10);
    }

    #[test]
    fn contact_kills_enemy_and_damages_player() {
        let mut w = quiet_session();
        let (px, py) = {
            let p = w.registry.get(w.player_id).unwrap();
            (p.x, p.y)
        };
        spawn_enemy(&mut w, EnemyKind::Grunt, px, py);

        resolve_collisions(&mut w);
        assert!(!w.registry.iter_alive().any(|e| e.is_enemy()));
        let expected = PLAYER_MAX_HP - EnemyParams::get(EnemyKind::Grunt).contact_damage;
        assert_eq!(w.registry.get(w.player_id).unwrap().hp, expected);
        assert_eq!(w.score(), EnemyParams::get(EnemyKind::Grunt).score);
    }

    #[test]
    fn power_restore_is_applied_in_the_pickup_tick() {
        let mut w = quiet_session();
        let pickup = spawn_pickup(&mut w, PowerupKind::PowerRestore);

        resolve_collisions(&mut w);
        assert!(!w.registry.get(pickup).unwrap().alive);
        assert!(w
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::PowerupCollected { kind: PowerupKind::PowerRestore })));
        match &w.registry.get(w.player_id).unwrap().class {
            EntityClass::Player(ps) => assert_eq!(ps.power_level, MAX_POWER_LEVEL),
            _ => unreachable!(),
        }
    }

    #[test]
    fn mega_blast_clears_regular_enemies_but_not_the_boss() {
        let mut w = quiet_session();
        spawn_enemy(&mut w, EnemyKind::Grunt, 600.0, 200.0);
        spawn_enemy(&mut w, EnemyKind::Gunner, 700.0, 400.0);
        let boss_hp = w.config.boss.max_hp;
        let boss_radius = w.config.boss.radius;
        w.registry.spawn(|id| Entity {
            id,
            x: 900.0,
            y: 300.0,
            vx: 0.0,
            vy: 0.0,
            hp: boss_hp,
            radius: boss_radius,
            alive: true,
            class: EntityClass::Boss(crate::world::entity::BossState {
                phase:        0,
                age:          0.0,
                anchor_y:     300.0,
                attack_timer: 1.0,
                entry_invuln: 0.0,
                spiral_angle: 0.0,
                defeated:     false,
            }),
        });
        spawn_pickup(&mut w, PowerupKind::MegaBlast);

        resolve_collisions(&mut w);
        assert!(!w.registry.iter_alive().any(|e| e.is_enemy()));
        let boss = w.registry.iter_alive().find(|e| e.is_boss()).unwrap();
        assert_eq!(boss.hp, boss_hp);
    }

    #[test]
    fn entry_invulnerable_boss_absorbs_shots() {
        let mut w = quiet_session();
        let boss_hp = w.config.boss.max_hp;
        let boss_radius = w.config.boss.radius;
        w.registry.spawn(|id| Entity {
            id,
            x: 900.0,
            y: 300.0,
            vx: 0.0,
            vy: 0.0,
            hp: boss_hp,
            radius: boss_radius,
            alive: true,
            class: EntityClass::Boss(crate::world::entity::BossState {
                phase:        1,
                age:          0.0,
                anchor_y:     300.0,
                attack_timer: 1.0,
                entry_invuln: 0.5,
                spiral_angle: 0.0,
                defeated:     false,
            }),
        });
        let shot = spawn_shot(&mut w, 900.0, 300.0, ProjectileKind::PlayerShot, 50);

        resolve_collisions(&mut w);
        assert!(!w.registry.get(shot).unwrap().alive, "弾は無敵のボスにも当たって消える");
        let boss = w.registry.iter_alive().find(|e| e.is_boss()).unwrap();
        assert_eq!(boss.hp, boss_hp, "無敵中はダメージが通らない");
    }

    #[test]
    fn oversized_boss_is_still_hit_by_player_shots() {
        let mut w = quiet_session();
        let boss_hp = w.config.boss.max_hp;
        // 設定由来の巨大半径でも問い合わせ範囲からこぼれない
        w.registry.spawn(|id| Entity {
            id,
            x: 850.0,
            y: 300.0,
            vx: 0.0,
            vy: 0.0,
            hp: boss_hp,
            radius: 200.0,
            alive: true,
            class: EntityClass::Boss(crate::world::entity::BossState {
                phase:        0,
                age:          0.0,
                anchor_y:     300.0,
                attack_timer: 1.0,
                entry_invuln: 0.0,
                spiral_angle: 0.0,
                defeated:     false,
            }),
        });
        let shot = spawn_shot(&mut w, 700.0, 300.0, ProjectileKind::PlayerShot, 10);

        resolve_collisions(&mut w);
        assert!(!w.registry.get(shot).unwrap().alive);
        let boss = w.registry.iter_alive().find(|e| e.is_boss()).unwrap();
        assert_eq!(boss.hp, boss_hp - 10, "縁での接触にもダメージが通る");
    }

    #[test]
    fn non_piercing_shot_stops_at_the_first_defender() {
        let mut w = quiet_session();
        spawn_enemy(&mut w, EnemyKind::Grunt, 500.0, 300.0);
        spawn_enemy(&mut w, EnemyKind::Grunt, 505.0, 300.0);
        let shot = spawn_shot(&mut w, 500.0, 300.0, ProjectileKind::PlayerShot, 99);

        resolve_collisions(&mut w);
        // 両方と重なっていても消費は最初の 1 体で止まる
        let destroyed = w
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 1);
        assert!(!w.registry.get(shot).unwrap().alive);
        let survivors: Vec<_> = w.registry.iter_alive().filter(|e| e.is_enemy()).collect();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].hp, EnemyParams::get(EnemyKind::Grunt).max_hp);
    }

    #[test]
    fn resolve_never_raises_any_health() {
        let mut w = quiet_session();
        spawn_enemy(&mut w, EnemyKind::Grunt, 500.0, 300.0);
        spawn_enemy(&mut w, EnemyKind::Gunner, 700.0, 400.0);
        spawn_shot(&mut w, 500.0, 300.0, ProjectileKind::PlayerShot, 4);
        let (px, py) = {
            let p = w.registry.get(w.player_id).unwrap();
            (p.x, p.y)
        };
        spawn_shot(&mut w, px, py, ProjectileKind::EnemyShot, 10);
        spawn_pickup(&mut w, PowerupKind::PowerRestore);

        let before: Vec<(EntityId, i32)> =
            w.registry.iter().map(|e| (e.id, e.hp)).collect();
        resolve_collisions(&mut w);
        for (id, hp) in before {
            if let Some(e) = w.registry.get(id) {
                assert!(e.hp <= hp, "解決後に HP が増える個体があってはならない");
            }
        }
    }
}
