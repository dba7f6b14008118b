//! Path: nova_engine/src/step.rs
//! Summary: 1 tick のシステム実行順序と後処理（削除フラッシュ・フレーム計測）
//!
//! 実行順は Spawn → Behavior → Collision → Powerup 減衰 → Boss。
//! 物理削除はパイプラインの最後に 1 回だけ行うので、この tick に死んだ
//! エンティティは全システムから見え続ける。

use std::time::Instant;

use nova_core::constants::{FRAME_BUDGET_MS, TICK_DT};

use crate::input::InputSnapshot;
use crate::systems::behavior::update_behaviors;
use crate::systems::boss::update_boss;
use crate::systems::collision::resolve_collisions;
use crate::systems::spawn::update_spawns;
use crate::world::event::GameEvent;
use crate::world::session::Session;

impl Session {
    /// シミュレーションを 1 tick（TICK_DT 秒）進める。
    /// 実時間の積算と tick 数の決定は GameClock が担う。
    pub fn tick(&mut self, input: &InputSnapshot) {
        let started = Instant::now();
        self.tick_id += 1;
        self.elapsed += TICK_DT;

        update_spawns(self, TICK_DT);
        update_behaviors(self, input, TICK_DT);
        let collisions = resolve_collisions(self);

        let expired = self.powerups.tick(self.player_id, TICK_DT);
        for kind in expired {
            self.emit(GameEvent::PowerupExpired { kind });
        }
        self.stats = self.powerups.derive(self.player_id);

        update_boss(self, TICK_DT);

        if !self.wave_cleared_emitted && self.wave_complete() {
            self.wave_cleared_emitted = true;
            self.emit(GameEvent::WaveCleared);
        }

        // プレイヤー HP はフラッシュで消える前にキャッシュする
        if let Some(p) = self.registry.get(self.player_id) {
            self.player_hp = p.hp;
        }
        self.registry.flush_removed();

        let ms = started.elapsed().as_secs_f64() * 1000.0;
        self.last_frame_time_ms = ms;
        log::trace!(
            "tick {}: {} live, {} collisions, {:.2}ms",
            self.tick_id,
            self.registry.live_count(),
            collisions.len(),
            ms
        );
        if ms > FRAME_BUDGET_MS {
            log::warn!("tick {} overran frame budget: {:.2}ms", self.tick_id, ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        FormationSpec, ScheduleEntry, SessionConfig, SpawnKind, WaveTrigger,
    };
    use nova_core::constants::POWERUP_DURATION;
    use nova_core::params::{EnemyKind, FormationPattern, PowerupKind};

    fn scripted_config(seed: u64) -> SessionConfig {
        let mut config = SessionConfig::default_survival(seed);
        config.filler_spawns = false;
        config.schedule = vec![
            ScheduleEntry {
                trigger: WaveTrigger::AtTime(0.5),
                spawn:   SpawnKind::Formation(FormationSpec {
                    kind:    EnemyKind::Grunt,
                    pattern: FormationPattern::Line,
                    count:   1,
                    spacing: 0.0,
                    entry_y: 300.0,
                    stagger: 0.0,
                }),
            },
            ScheduleEntry {
                trigger: WaveTrigger::WaveCleared,
                spawn:   SpawnKind::Boss,
            },
        ];
        config
    }

    fn fire() -> InputSnapshot {
        InputSnapshot { fire: true, ..Default::default() }
    }

    #[test]
    fn same_seed_and_input_replays_identically() {
        let mut a = Session::new(SessionConfig::default_survival(99)).unwrap();
        let mut b = Session::new(SessionConfig::default_survival(99)).unwrap();
        for t in 0..600 {
            let input = InputSnapshot {
                move_y: if t % 120 < 60 { -1.0 } else { 1.0 },
                fire: t % 3 == 0,
                ..Default::default()
            };
            a.tick(&input);
            b.tick(&input);
        }
        assert_eq!(a.score(), b.score());
        assert_eq!(a.registry.slot_count(), b.registry.slot_count());
        for (ea, eb) in a.registry.iter().zip(b.registry.iter()) {
            assert_eq!(ea.id, eb.id);
            assert_eq!(ea.x, eb.x);
            assert_eq!(ea.y, eb.y);
            assert_eq!(ea.hp, eb.hp);
        }
    }

    #[test]
    fn scripted_wave_flows_into_the_boss_fight() {
        // 1 機のウェーブを撃破 → WaveCleared → ボス出現 → ダメージが通る
        let mut w = Session::new(scripted_config(5)).unwrap();
        let mut boss_seen_at = None;
        for t in 0..1800 {
            w.tick(&fire());
            if boss_seen_at.is_none() && w.registry.iter_alive().any(|e| e.is_boss()) {
                boss_seen_at = Some(t);
            }
            if let Some(seen) = boss_seen_at {
                if t >= seen + 600 {
                    break;
                }
            }
        }
        let grunt_score = nova_core::params::EnemyParams::get(EnemyKind::Grunt).score;
        assert!(w.score() >= grunt_score, "ウェーブの敵を撃破している");
        assert!(boss_seen_at.is_some(), "全滅後にボスが出現する");
        let boss = w.registry.iter_alive().find(|e| e.is_boss());
        if let Some(boss) = boss {
            assert!(boss.hp < w.config.boss.max_hp, "ボスにダメージが通っている");
        } else {
            assert!(w.is_victory());
        }
    }

    #[test]
    fn powerup_expiry_flows_through_the_tick() {
        let mut config = SessionConfig::default_survival(2);
        config.schedule.clear();
        config.filler_spawns = false;
        let mut w = Session::new(config).unwrap();
        w.powerups.apply(w.player_id, PowerupKind::RapidFire);

        let ticks = (POWERUP_DURATION / TICK_DT).ceil() as usize + 2;
        for _ in 0..ticks {
            w.tick(&InputSnapshot::default());
        }
        let events = w.drain_events();
        assert!(events.contains(&GameEvent::PowerupExpired { kind: PowerupKind::RapidFire }));
        assert_eq!(w.stats, crate::systems::powerup::DerivedStats::baseline());
    }

    #[test]
    fn dead_entities_are_gone_after_the_tick() {
        let mut w = Session::new(scripted_config(8)).unwrap();
        for _ in 0..600 {
            w.tick(&fire());
        }
        // tick 末尾のフラッシュ後に死亡スロットは残らない
        assert!(w.registry.iter().all(|e| e.alive));
    }

    #[test]
    fn wave_cleared_fires_exactly_once() {
        let mut config = SessionConfig::default_survival(4);
        config.schedule.clear();
        config.filler_spawns = false;
        let mut w = Session::new(config).unwrap();
        for _ in 0..10 {
            w.tick(&InputSnapshot::default());
        }
        let cleared = w
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::WaveCleared))
            .count();
        assert_eq!(cleared, 1);
    }
}
