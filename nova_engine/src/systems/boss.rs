//! Path: nova_engine/src/systems/boss.rs
//! Summary: ボスコントローラ（フェーズ遷移・移動パターン・攻撃パターン・撃破判定）
//!
//! フェーズは 1 tick で複数しきい値を跨いでも 1 段ずつ歩く（中間フェーズの
//! 突入イベントと無敵時間を飛ばさない）。撃破判定はフェーズ歩行の後。

use nova_core::constants::{BULLET_RADIUS, PLAYFIELD_BOTTOM, PLAYFIELD_TOP, SCREEN_WIDTH};
use nova_core::motion;
use nova_core::params::{BossAttack, BossMotion, ProjectileKind};

use crate::world::entity::{Entity, EntityClass, ProjectileState};
use crate::world::event::GameEvent;
use crate::world::session::Session;

/// Sweep 移動の縦往復速度 (px/s)
const SWEEP_SPEED: f32 = 160.0;
/// Hover 移動の振幅 (px)
const HOVER_AMPLITUDE: f32 = 60.0;

#[derive(Clone, Copy)]
struct ShotIntent {
    x:  f32,
    y:  f32,
    vx: f32,
    vy: f32,
}

impl ShotIntent {
    fn at_angle(x: f32, y: f32, angle: f32) -> Self {
        let speed = ProjectileKind::BossShot.speed();
        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
        }
    }
}

/// 衝突解決とパワーアップ減衰の後に呼ばれるボスパス。
/// ボスが存在しなければ何もしない。
pub(crate) fn update_boss(w: &mut Session, dt: f32) {
    let Some(idx) = w
        .registry
        .entities
        .iter()
        .position(|e| e.alive && e.is_boss())
    else {
        return;
    };
    let player_pos = w
        .registry
        .get(w.player_id)
        .filter(|e| e.alive)
        .map(|e| (e.x, e.y));
    // TimeWarp はボスにも効く
    let dt = dt * w.stats.time_warp;
    let phases = w.config.boss.phases.clone();
    let max_hp = w.config.boss.max_hp;
    let shot_damage = w.config.boss.shot_damage;

    let mut shots: Vec<ShotIntent> = Vec::new();
    let mut rain_count = 0u32;
    let mut phase_events: Vec<usize> = Vec::new();
    let mut defeated = false;

    {
        let e = &mut w.registry.entities[idx];
        let hp = e.hp;
        let (ex, radius) = (e.x, e.radius);
        let EntityClass::Boss(state) = &mut e.class else {
            return;
        };
        state.age += dt;
        state.entry_invuln = (state.entry_invuln - dt).max(0.0);
        state.attack_timer -= dt;

        let phase = phases[state.phase];
        e.y = match phase.motion {
            BossMotion::Hover => motion::hover_y(state.age, state.anchor_y, HOVER_AMPLITUDE),
            BossMotion::Sweep => motion::bounce_between(
                state.age,
                PLAYFIELD_TOP + radius,
                PLAYFIELD_BOTTOM - radius,
                SWEEP_SPEED,
            ),
            BossMotion::Anchor => e.y,
        };

        if state.attack_timer <= 0.0 && state.entry_invuln <= 0.0 {
            state.attack_timer = phase.attack_interval;
            let muzzle_x = ex - radius;
            let ey = e.y;
            match phase.attack {
                BossAttack::Targeted => {
                    let angle = match player_pos {
                        Some((px, py)) => (py - ey).atan2(px - muzzle_x),
                        None => std::f32::consts::PI,
                    };
                    shots.push(ShotIntent::at_angle(muzzle_x, ey, angle));
                }
                BossAttack::Radial => {
                    for k in 0..16 {
                        let a = k as f32 / 16.0 * std::f32::consts::TAU;
                        shots.push(ShotIntent::at_angle(ex, ey, a));
                    }
                }
                BossAttack::Spiral => {
                    for k in 0..4 {
                        let a = state.spiral_angle + k as f32 / 4.0 * std::f32::consts::TAU;
                        shots.push(ShotIntent::at_angle(ex, ey, a));
                    }
                    state.spiral_angle += 0.35;
                }
                BossAttack::Wave => {
                    // 扇の中心が時間とともに上下へ泳ぐ
                    let center = std::f32::consts::PI + 0.5 * (state.age * 2.0).sin();
                    for &off in &[-0.3, -0.15, 0.0, 0.15, 0.3] {
                        shots.push(ShotIntent::at_angle(muzzle_x, ey, center + off));
                    }
                }
                BossAttack::Rain => {
                    // 落下位置は RNG で散らすので走査後に生成する
                    rain_count = 6;
                }
            }
        }

        // フェーズ歩行: しきい値を複数跨いでも 1 段ずつ。各フェーズの
        // 突入イベント・無敵・攻撃間隔を順に適用する。
        let hp_frac = hp as f32 / max_hp as f32;
        while state.phase + 1 < phases.len() && hp_frac < phases[state.phase + 1].enter_below {
            state.phase += 1;
            let next = phases[state.phase];
            state.entry_invuln = next.entry_invuln;
            state.attack_timer = next.attack_interval;
            phase_events.push(state.phase);
        }

        // 撃破はフェーズ歩行の後に判定する（最終フェーズを観測してから死ぬ）
        if hp <= 0 {
            state.defeated = true;
            defeated = true;
        }
    }

    for phase in phase_events {
        log::info!("boss phase {} begins", phase);
        w.emit(GameEvent::BossPhaseStarted { phase });
    }

    if defeated {
        let id = w.registry.entities[idx].id;
        let score = w.config.boss.score;
        w.registry.mark_dead(id);
        w.score += score;
        w.victory = true;
        w.emit(GameEvent::BossDefeated { score });
        log::info!("boss defeated: score +{}", score);
        return;
    }

    for _ in 0..rain_count {
        let x = w.rng.range_f32(SCREEN_WIDTH * 0.1, SCREEN_WIDTH * 0.7);
        let drift = w.rng.range_f32(-40.0, 40.0);
        shots.push(ShotIntent {
            x,
            y: PLAYFIELD_TOP,
            vx: drift,
            vy: ProjectileKind::BossShot.speed(),
        });
    }
    for s in shots {
        w.registry.spawn(|id| Entity {
            id,
            x: s.x,
            y: s.y,
            vx: s.vx,
            vy: s.vy,
            hp: 1,
            radius: BULLET_RADIUS,
            alive: true,
            class: EntityClass::Projectile(ProjectileState {
                kind:     ProjectileKind::BossShot,
                damage:   shot_damage,
                lifetime: ProjectileKind::BossShot.lifetime(),
            }),
        });
    }
}
