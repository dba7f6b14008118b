//! Path: nova_engine/src/systems/spawn.rs
//! Summary: スポーンディレクター（ウェーブスケジュール消化・隊列の時差出現・補充スポーン）

use nova_core::constants::{
    PLAYFIELD_BOTTOM, PLAYFIELD_TOP, POWERUP_RADIUS, SCREEN_WIDTH,
};
use nova_core::params::{
    CadenceRule, EnemyKind, EnemyParams, FormationPattern, PowerupKind, ALL_ENEMY_KINDS,
    ALL_POWERUP_KINDS,
};

use crate::config::{FormationSpec, ScheduleEntry, SessionConfig, SpawnKind, WaveTrigger};
use crate::world::entity::{BossState, Entity, EntityClass, EnemyState};
use crate::world::event::GameEvent;
use crate::world::session::Session;

/// 開始済みフォーメーションの、まだ出現していない 1 機
#[derive(Clone, Copy, Debug)]
struct PendingSpawn {
    delay: f32,
    kind:  EnemyKind,
    x:     f32,
    y:     f32,
}

/// ウェーブスケジュールを単調に消化するディレクター。
/// 一度トリガしたエントリは二度と再生されない。
pub struct SpawnDirector {
    schedule:      Vec<ScheduleEntry>,
    next_entry:    usize,
    pending:       Vec<PendingSpawn>,
    filler_enabled: bool,
    filler_timer:   f32,
    powerup_timer:  f32,
}

impl SpawnDirector {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            schedule:       config.schedule.clone(),
            next_entry:     0,
            pending:        Vec::new(),
            filler_enabled: config.filler_spawns,
            filler_timer:   0.0,
            powerup_timer:  8.0,
        }
    }

    /// スケジュール消化済みかつ時差出現待ちなし（= ウェーブ完了の観測点）。
    /// 空スケジュールはエラーではなく即「完了」。
    pub fn is_exhausted(&self) -> bool {
        self.next_entry >= self.schedule.len() && self.pending.is_empty()
    }
}

/// tick 先頭で呼ばれるスポーンパス。レジストリへの追加だけを行い、削除はしない。
pub(crate) fn update_spawns(w: &mut Session, dt: f32) {
    // ── 1. 開始済み隊列の時差出現 ───────────────────────────────
    let cap = w.config.entity_cap;
    let mut due: Vec<PendingSpawn> = Vec::new();
    for p in w.spawner.pending.iter_mut() {
        p.delay -= dt;
    }
    // 出現期限が来たものを取り出す（キャップ超過分は delay 0 のまま残す）
    let mut budget = cap.saturating_sub(w.registry.live_count());
    let pending = &mut w.spawner.pending;
    let mut i = 0;
    while i < pending.len() {
        if pending[i].delay <= 0.0 && budget > 0 {
            due.push(pending.remove(i));
            budget -= 1;
        } else {
            i += 1;
        }
    }
    for p in due {
        spawn_enemy(w, p.kind, p.x, p.y);
    }

    // ── 2. スケジュール消化（1 tick に開始する隊列は最大 1 つ）──
    // 複数エントリが同時に適格でも、スケジュール順に 1 つずつ開始する。
    if w.spawner.next_entry < w.spawner.schedule.len() {
        let entry = w.spawner.schedule[w.spawner.next_entry].clone();
        if trigger_satisfied(w, entry.trigger) {
            match entry.spawn {
                SpawnKind::Formation(spec) => {
                    if w.registry.live_count() + spec.count <= cap {
                        begin_formation(w, &spec);
                        w.spawner.next_entry += 1;
                    } else {
                        // 資源上限: 隊列を消費せず次の適格 tick に繰り越す
                        log::debug!(
                            "entity cap reached ({} live), deferring formation entry {}",
                            w.registry.live_count(),
                            w.spawner.next_entry
                        );
                    }
                }
                SpawnKind::Boss => {
                    spawn_boss(w);
                    w.spawner.next_entry += 1;
                }
            }
        }
    }

    // ── 3. 難易度連動の補充スポーン（設定で有効なときのみ）──────
    if w.spawner.filler_enabled && !w.victory && !w.defeat {
        update_filler(w, dt);
        update_ambient_powerups(w, dt);
    }
}

fn trigger_satisfied(w: &Session, trigger: WaveTrigger) -> bool {
    match trigger {
        WaveTrigger::AtTime(t) => w.elapsed >= t,
        WaveTrigger::WaveCleared => {
            w.spawner.pending.is_empty()
                && !w.registry.iter_alive().any(|e| e.is_enemy() || e.is_boss())
        }
    }
}

/// 隊列を開始する。先頭は即時、以降は stagger 間隔の時差出現キューに積む。
fn begin_formation(w: &mut Session, spec: &FormationSpec) {
    log::debug!(
        "formation start: {:?} x{} ({:?})",
        spec.kind,
        spec.count,
        spec.pattern
    );
    let params = EnemyParams::get(spec.kind);
    for index in 0..spec.count {
        let (ox, oy) = spec.pattern.offset(index, spec.spacing);
        let x = SCREEN_WIDTH + params.radius + ox;
        let y = (spec.entry_y + oy).clamp(PLAYFIELD_TOP, PLAYFIELD_BOTTOM);
        let delay = index as f32 * spec.stagger;
        if delay <= 0.0 {
            spawn_enemy(w, spec.kind, x, y);
        } else {
            w.spawner.pending.push(PendingSpawn { delay, kind: spec.kind, x, y });
        }
    }
}

pub(crate) fn spawn_enemy(w: &mut Session, kind: EnemyKind, x: f32, y: f32) {
    let params = EnemyParams::get(kind);
    let seed = (w.rng.next_u32() as u64) << 16 | kind as u64;
    let hold_x = w.rng.range_f32(SCREEN_WIDTH * 0.55, SCREEN_WIDTH * 0.8);
    w.registry.spawn(|id| {
        let mut state = EnemyState::new(kind, y, seed);
        state.hold_x = hold_x;
        state.fire_timer = match params.cadence {
            CadenceRule::Never => 0.0,
            CadenceRule::Fixed(interval) => interval,
            CadenceRule::Randomized { min, max } => state.local_rng.range_f32(min, max),
            CadenceRule::HealthTriggered { interval, .. } => interval,
        };
        if kind == EnemyKind::Blinker {
            state.aux_timer = state.local_rng.range_f32(1.5, 2.5);
        }
        Entity {
            id,
            x,
            y,
            vx: -params.speed,
            vy: 0.0,
            hp: params.max_hp,
            radius: params.radius,
            alive: true,
            class: EntityClass::Enemy(state),
        }
    });
}

pub(crate) fn spawn_powerup(w: &mut Session, kind: PowerupKind, x: f32, y: f32) {
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
    });
}

fn spawn_boss(w: &mut Session) {
    let boss = &w.config.boss;
    let anchor_y = (PLAYFIELD_TOP + PLAYFIELD_BOTTOM) / 2.0;
    let phase0 = boss.phases[0];
    let max_hp = boss.max_hp;
    let radius = boss.radius;
    w.registry.spawn(|id| Entity {
        id,
        x: SCREEN_WIDTH - 140.0,
        y: anchor_y,
        vx: 0.0,
        vy: 0.0,
        hp: max_hp,
        radius,
        alive: true,
        class: EntityClass::Boss(BossState {
            phase:        0,
            age:          0.0,
            anchor_y,
            attack_timer: phase0.attack_interval,
            entry_invuln: phase0.entry_invuln,
            spiral_angle: 0.0,
            defeated:     false,
        }),
    });
    log::debug!("boss spawned: hp={} phases={}", max_hp, boss.phases.len());
    w.emit(GameEvent::BossPhaseStarted { phase: 0 });
}

/// スケジュール外の補充敵。難易度で間隔と kind 抽選の重みが変わる。
fn update_filler(w: &mut Session, dt: f32) {
    w.spawner.filler_timer -= dt;
    if w.spawner.filler_timer > 0.0 {
        return;
    }
    let difficulty = w.difficulty();
    w.spawner.filler_timer = (2.2 - 0.18 * (difficulty - 1.0)).max(0.5);

    if w.registry.live_count() + 1 > w.config.entity_cap {
        return;
    }
    let weights: Vec<u32> = ALL_ENEMY_KINDS
        .iter()
        .map(|&k| EnemyParams::spawn_weight(k, difficulty))
        .collect();
    let kind = ALL_ENEMY_KINDS[w.rng.weighted_pick(&weights)];
    let y = w.rng.range_f32(PLAYFIELD_TOP, PLAYFIELD_BOTTOM);
    let x = SCREEN_WIDTH + EnemyParams::get(kind).radius;
    spawn_enemy(w, kind, x, y);
}

/// 定期パワーアップ出現。難易度が上がるほど間隔が詰まる（下限 10 秒の帯）。
fn update_ambient_powerups(w: &mut Session, dt: f32) {
    w.spawner.powerup_timer -= dt;
    if w.spawner.powerup_timer > 0.0 {
        return;
    }
    let difficulty = w.difficulty();
    let max_interval = (30.0 * 0.85_f32.powf(difficulty - 1.0)).max(10.0);
    w.spawner.powerup_timer = w.rng.range_f32(3.0, max_interval);

    if w.registry.live_count() + 1 > w.config.entity_cap {
        return;
    }
    let kind = ALL_POWERUP_KINDS[(w.rng.next_u32() as usize) % ALL_POWERUP_KINDS.len()];
    let y = w.rng.range_f32(PLAYFIELD_TOP + 40.0, PLAYFIELD_BOTTOM - 40.0);
    spawn_powerup(w, kind, SCREEN_WIDTH + POWERUP_RADIUS, y);
}
