//! Path: nova_engine/src/systems/behavior.rs
//! Summary: 挙動システム（プレイヤー操作・敵のパス追従と発射・弾丸と
//! パワーアップの移動、画面外退場の整理）
//!
//! レジストリを挿入順に 1 パス走査し、発射は ProjectileIntent として収集
//! してから走査後にまとめてスポーンする（走査中のレジストリ変更を避ける）。

use nova_core::constants::{
    BULLET_RADIUS, DESPAWN_MARGIN, PLAYER_SPEED, PLAYFIELD_BOTTOM, PLAYFIELD_TOP,
    POWERUP_DRIFT_SPEED, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use nova_core::motion;
use nova_core::params::{CadenceRule, EnemyKind, EnemyParams, PathKind, ProjectileKind};

use crate::input::InputSnapshot;
use crate::world::entity::{Entity, EntityClass, EntityId, ProjectileState};
use crate::world::session::Session;

/// ホーミング弾の旋回速度 (rad/s)
const HOMING_TURN_RATE: f32 = 3.0;
/// ドローン追加射線の Y 間隔
const DRONE_STREAM_GAP: f32 = 24.0;
/// スキャッターボムの放射弾数
const SCATTER_RAY_COUNT: u32 = 12;

/// 走査中に収集する発射意図。走査後にレジストリへスポーンされる。
#[derive(Clone, Copy, Debug)]
struct ProjectileIntent {
    x:      f32,
    y:      f32,
    vx:     f32,
    vy:     f32,
    kind:   ProjectileKind,
    damage: i32,
}

impl ProjectileIntent {
    fn at_angle(x: f32, y: f32, angle: f32, kind: ProjectileKind, damage: i32) -> Self {
        let speed = kind.speed();
        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            kind,
            damage,
        }
    }
}

/// スポーンパスの直後に呼ばれる挙動パス。移動と発射だけを行い、
/// ダメージ判定は衝突解決に委ねる。画面外への退場はここで死亡マーク
/// する（戦闘死ではないのでイベント・スコア・ドロップは発生しない）。
pub(crate) fn update_behaviors(w: &mut Session, input: &InputSnapshot, dt: f32) {
    let stats = w.stats;
    let player_pos = w
        .registry
        .get(w.player_id)
        .filter(|e| e.alive)
        .map(|e| (e.x, e.y));
    // ボム入力はチャージがあるときだけ成立する
    let bomb_fired = input.bomb
        && player_pos.is_some()
        && w.powerups.consume_scatter_charge(w.player_id);

    // ホーミングの照準候補（この tick の移動前の位置で十分）
    let targets: Vec<(f32, f32)> = if stats.homing {
        w.registry
            .iter_alive()
            .filter(|e| e.is_enemy() || e.is_boss())
            .map(|e| (e.x, e.y))
            .collect()
    } else {
        Vec::new()
    };

    let mut intents: Vec<ProjectileIntent> = Vec::new();
    let mut removals: Vec<EntityId> = Vec::new();
    let enemy_dt = dt * stats.time_warp;
    let player_y = player_pos.map(|(_, y)| y).unwrap_or(SCREEN_HEIGHT / 2.0);

    for i in 0..w.registry.entities.len() {
        let e = &mut w.registry.entities[i];
        if !e.alive {
            continue;
        }
        match &mut e.class {
            EntityClass::Player(ps) => {
                let mut mx = input.move_x.clamp(-1.0, 1.0);
                let mut my = input.move_y.clamp(-1.0, 1.0);
                let len = (mx * mx + my * my).sqrt();
                if len > 1.0 {
                    mx /= len;
                    my /= len;
                }
                e.x = (e.x + mx * PLAYER_SPEED * dt).clamp(e.radius, SCREEN_WIDTH - e.radius);
                e.y = (e.y + my * PLAYER_SPEED * dt).clamp(PLAYFIELD_TOP, PLAYFIELD_BOTTOM);
                ps.tilt = if my < -0.1 {
                    -1
                } else if my > 0.1 {
                    1
                } else {
                    0
                };
                ps.invincible_timer = (ps.invincible_timer - dt).max(0.0);
                ps.fire_timer -= dt;

                if input.fire && ps.fire_timer <= 0.0 {
                    ps.fire_timer = stats.fire_delay;
                    let damage = 8 + 4 * ps.power_level as i32;
                    let kind = if stats.laser {
                        ProjectileKind::PlayerLaser
                    } else {
                        ProjectileKind::PlayerShot
                    };
                    let muzzle_x = e.x + e.radius;
                    let angles: &[f32] = if stats.spread >= 3 {
                        &[0.0, 0.15, -0.15]
                    } else {
                        &[0.0]
                    };
                    for &a in angles {
                        intents.push(ProjectileIntent::at_angle(muzzle_x, e.y, a, kind, damage));
                    }
                    // ドローンは本体の上下に交互の追加射線として撃つ
                    for d in 1..=stats.drones {
                        let rank = ((d + 1) / 2) as f32;
                        let side = if d % 2 == 1 { -1.0 } else { 1.0 };
                        let dy = side * rank * DRONE_STREAM_GAP;
                        intents.push(ProjectileIntent::at_angle(
                            muzzle_x,
                            e.y + dy,
                            0.0,
                            ProjectileKind::PlayerShot,
                            6,
                        ));
                    }
                    if stats.flamethrower {
                        for &a in &[0.25, -0.25] {
                            intents.push(ProjectileIntent::at_angle(
                                muzzle_x,
                                e.y,
                                a,
                                ProjectileKind::PlayerFlame,
                                4,
                            ));
                        }
                    }
                }

                if bomb_fired {
                    for ray in 0..SCATTER_RAY_COUNT {
                        let a = ray as f32 / SCATTER_RAY_COUNT as f32 * std::f32::consts::TAU;
                        intents.push(ProjectileIntent::at_angle(
                            e.x,
                            e.y,
                            a,
                            ProjectileKind::PlayerScatter,
                            6,
                        ));
                    }
                }
            }

            EntityClass::Enemy(_) => {
                step_enemy_motion(e, enemy_dt, player_y);
                if e.x < -DESPAWN_MARGIN {
                    // 左端を抜けた敵は退場。イベントなしの静かな除去。
                    removals.push(e.id);
                    continue;
                }
                collect_enemy_fire(e, enemy_dt, player_pos, &mut intents);
            }

            EntityClass::Projectile(ps) => {
                let scale = if ps.kind.is_player_owned() {
                    1.0
                } else {
                    stats.time_warp
                };
                if stats.homing && ps.kind == ProjectileKind::PlayerShot {
                    steer_homing(e, &targets, dt);
                }
                e.x += e.vx * dt * scale;
                e.y += e.vy * dt * scale;
                let mut expired = false;
                if let EntityClass::Projectile(ps) = &mut e.class {
                    ps.lifetime -= dt * scale;
                    expired = ps.lifetime <= 0.0;
                }
                let out = e.x < -DESPAWN_MARGIN
                    || e.x > SCREEN_WIDTH + DESPAWN_MARGIN
                    || e.y < -DESPAWN_MARGIN
                    || e.y > SCREEN_HEIGHT + DESPAWN_MARGIN;
                if expired || out {
                    removals.push(e.id);
                }
            }

            EntityClass::Powerup(_) => {
                e.x -= POWERUP_DRIFT_SPEED * dt;
                if e.x < -DESPAWN_MARGIN {
                    removals.push(e.id);
                }
            }

            // ボスの移動・攻撃は専用システムが担う
            EntityClass::Boss(_) => {}
        }
    }

    for id in removals {
        w.registry.mark_dead(id);
    }
    for intent in intents {
        w.registry.spawn(|id| Entity {
            id,
            x: intent.x,
            y: intent.y,
            vx: intent.vx,
            vy: intent.vy,
            hp: 1,
            radius: BULLET_RADIUS,
            alive: true,
            class: EntityClass::Projectile(ProjectileState {
                kind:     intent.kind,
                damage:   intent.damage,
                lifetime: intent.kind.lifetime(),
            }),
        });
    }
}

/// 敵 1 機のパス追従。状態は EnemyState に閉じていて、同じ状態から
/// 同じ dt 系列で呼べば同じ軌跡を再現する。
pub(crate) fn step_enemy_motion(e: &mut Entity, dt: f32, player_y: f32) {
    let EntityClass::Enemy(state) = &mut e.class else {
        return;
    };
    state.age += dt;
    let params = EnemyParams::get(state.kind);
    match params.path {
        PathKind::Drift => {
            e.x -= params.speed * dt;
        }
        PathKind::Weave => {
            e.x -= params.speed * dt;
            e.y = state.origin_y + motion::weave_offset(state.age, 40.0, 0.5);
        }
        PathKind::SpiralDrift => {
            e.x -= params.speed * dt;
            e.y = state.origin_y + motion::spiral_offset(state.age, 30.0);
        }
        PathKind::SeekRow => {
            e.x -= params.speed * dt;
            e.vy = motion::seek_row_vy(e.y, player_y, params.speed * 0.8);
            e.y += e.vy * dt;
        }
        PathKind::BlinkHold => {
            let vx = motion::drift_until_hold(e.x, state.hold_x, params.speed);
            e.x += vx * dt;
            if vx == 0.0 {
                state.aux_timer -= dt;
                if state.aux_timer <= 0.0 {
                    e.y = state.local_rng.range_f32(PLAYFIELD_TOP, PLAYFIELD_BOTTOM);
                    state.aux_timer = state.local_rng.range_f32(1.5, 2.5);
                }
            }
        }
        PathKind::HoldStrafe => {
            let vx = motion::drift_until_hold(e.x, state.hold_x, params.speed);
            e.x += vx * dt;
            if vx == 0.0 {
                // 三角波の位相を進入時の Y に合わせて横滑りの段差をなくす
                let t0 = (state.origin_y - PLAYFIELD_TOP) / params.speed;
                state.aux_timer += dt;
                e.y = motion::bounce_between(
                    state.aux_timer + t0,
                    PLAYFIELD_TOP,
                    PLAYFIELD_BOTTOM,
                    params.speed,
                );
            }
        }
    }
    e.y = e.y.clamp(PLAYFIELD_TOP, PLAYFIELD_BOTTOM);
}

/// 画面内の敵の発射判定。発射した弾は intents に積む。
fn collect_enemy_fire(
    e: &mut Entity,
    dt: f32,
    player_pos: Option<(f32, f32)>,
    intents: &mut Vec<ProjectileIntent>,
) {
    let EntityClass::Enemy(state) = &mut e.class else {
        return;
    };
    let params = EnemyParams::get(state.kind);
    if params.cadence == CadenceRule::Never || e.x >= SCREEN_WIDTH {
        return;
    }
    let gate_open = match params.cadence {
        CadenceRule::HealthTriggered { below_frac, .. } => {
            (e.hp as f32) <= params.max_hp as f32 * below_frac
        }
        _ => true,
    };
    state.fire_timer -= dt;
    if state.fire_timer > 0.0 || !gate_open {
        return;
    }
    state.fire_timer = match params.cadence {
        CadenceRule::Never => return,
        CadenceRule::Fixed(interval) => interval,
        CadenceRule::Randomized { min, max } => state.local_rng.range_f32(min, max),
        CadenceRule::HealthTriggered { interval, .. } => interval,
    };

    let aim = |intents: &mut Vec<ProjectileIntent>, x: f32, y: f32| {
        let angle = match player_pos {
            Some((px, py)) => (py - y).atan2(px - x),
            None => std::f32::consts::PI,
        };
        intents.push(ProjectileIntent::at_angle(
            x,
            y,
            angle,
            ProjectileKind::EnemyShot,
            params.shot_damage,
        ));
    };

    match state.kind {
        EnemyKind::Gunner | EnemyKind::Seeker | EnemyKind::Blinker => {
            aim(intents, e.x - e.radius, e.y);
        }
        EnemyKind::Weaver => {
            intents.push(ProjectileIntent::at_angle(
                e.x - e.radius,
                e.y,
                std::f32::consts::PI,
                ProjectileKind::EnemyShot,
                params.shot_damage,
            ));
        }
        EnemyKind::Spinner => {
            // 発射のたびに回転する 3 方向弾
            for k in 0..3 {
                let a = state.spin_angle + k as f32 / 3.0 * std::f32::consts::TAU;
                intents.push(ProjectileIntent::at_angle(
                    e.x,
                    e.y,
                    a,
                    ProjectileKind::EnemyShot,
                    params.shot_damage,
                ));
            }
            state.spin_angle += 0.6;
        }
        EnemyKind::Bulwark => {
            // 反撃モードは左向き 3-way 斉射
            for &off in &[0.0, 0.35, -0.35] {
                intents.push(ProjectileIntent::at_angle(
                    e.x - e.radius,
                    e.y,
                    std::f32::consts::PI + off,
                    ProjectileKind::EnemyShot,
                    params.shot_damage,
                ));
            }
        }
        EnemyKind::Grunt => {}
    }
}

/// 最寄りの照準候補へ向けて速度ベクトルを旋回させる
fn steer_homing(e: &mut Entity, targets: &[(f32, f32)], dt: f32) {
    let Some(&(tx, ty)) = targets.iter().min_by(|a, b| {
        let da = (a.0 - e.x).powi(2) + (a.1 - e.y).powi(2);
        let db = (b.0 - e.x).powi(2) + (b.1 - e.y).powi(2);
        da.total_cmp(&db)
    }) else {
        return;
    };
    let speed = (e.vx * e.vx + e.vy * e.vy).sqrt();
    if speed <= 0.0 {
        return;
    }
    let current = e.vy.atan2(e.vx);
    let wanted = (ty - e.y).atan2(tx - e.x);
    let mut diff = wanted - current;
    while diff > std::f32::consts::PI {
        diff -= std::f32::consts::TAU;
    }
    while diff < -std::f32::consts::PI {
        diff += std::f32::consts::TAU;
    }
    let turn = diff.clamp(-HOMING_TURN_RATE * dt, HOMING_TURN_RATE * dt);
    let next = current + turn;
    e.vx = next.cos() * speed;
    e.vy = next.sin() * speed;
}
