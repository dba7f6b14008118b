//! Path: nova_engine/src/world/session.rs
//! Summary: セッション状態（レジストリ・RNG・スコア・バフ・イベントの集約）

use nova_core::constants::{
    DIFFICULTY_MAX, DIFFICULTY_RATE_PER_SEC, DIFFICULTY_START, CELL_SIZE, PLAYER_MAX_HP,
    PLAYER_RADIUS, SCREEN_HEIGHT,
};
use nova_core::params::ALL_POWERUP_KINDS;
use nova_core::rng::SimpleRng;
use nova_core::spatial_hash::SpatialHash;

use crate::config::{ConfigError, SessionConfig};
use crate::systems::powerup::{DerivedStats, PowerupSystem};
use crate::systems::spawn::SpawnDirector;
use crate::world::entity::{Entity, EntityClass, EntityId, PlayerState};
use crate::world::event::GameEvent;
use crate::world::registry::EntityRegistry;

/// 1 セッション分の全シミュレーション状態。
/// グローバル可変状態は持たず、すべてこの構造体を通して流れる。
pub struct Session {
    pub(crate) config:    SessionConfig,
    pub(crate) registry:  EntityRegistry,
    pub(crate) rng:       SimpleRng,
    pub(crate) spawner:   SpawnDirector,
    pub(crate) powerups:  PowerupSystem,
    /// 今 tick のプレイヤー派生ステータス（毎 tick 再計算）
    pub(crate) stats:     DerivedStats,
    pub(crate) events:    Vec<GameEvent>,
    /// 衝突ブロードフェーズ用の空間ハッシュ（毎 tick 再構築）
    pub(crate) broad:     SpatialHash,
    pub(crate) query_buf: Vec<usize>,

    pub(crate) player_id: EntityId,
    pub(crate) tick_id:   u64,
    pub(crate) elapsed:   f32,
    pub(crate) score:     u32,
    /// プレイヤーエンティティが flush された後も読めるよう保持する
    pub(crate) player_hp: i32,
    pub(crate) victory:   bool,
    pub(crate) defeat:    bool,
    pub(crate) wave_cleared_emitted: bool,
    pub(crate) last_frame_time_ms:   f64,
}

impl Session {
    /// 設定を検証してセッションを開始する。検証エラーは fatal。
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut registry = EntityRegistry::new();
        let player_id = registry.spawn(|id| Entity {
            id,
            x: 80.0,
            y: SCREEN_HEIGHT / 2.0,
            vx: 0.0,
            vy: 0.0,
            hp: PLAYER_MAX_HP,
            radius: PLAYER_RADIUS,
            alive: true,
            class: EntityClass::Player(PlayerState::new()),
        });

        let spawner = SpawnDirector::new(&config);
        let powerups = PowerupSystem::new(
            ALL_POWERUP_KINDS.iter().map(|&k| (k, config.policy_for(k))),
        );
        let rng = SimpleRng::new(config.seed);

        Ok(Self {
            config,
            registry,
            rng,
            spawner,
            powerups,
            stats: DerivedStats::baseline(),
            events: Vec::new(),
            broad: SpatialHash::new(CELL_SIZE),
            query_buf: Vec::new(),
            player_id,
            tick_id: 0,
            elapsed: 0.0,
            score: 0,
            player_hp: PLAYER_MAX_HP,
            victory: false,
            defeat: false,
            wave_cleared_emitted: false,
            last_frame_time_ms: 0.0,
        })
    }

    // ── 外部公開の読み取り面 ────────────────────────────────────

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn player_hp(&self) -> i32 {
        self.player_hp
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_victory(&self) -> bool {
        self.victory
    }

    pub fn is_defeat(&self) -> bool {
        self.defeat
    }

    /// スケジュール消化済みかつ敵なし（ボストリガや勝利判定の観測点）
    pub fn wave_complete(&self) -> bool {
        self.spawner.is_exhausted()
            && !self.registry.iter_alive().any(|e| e.is_enemy() || e.is_boss())
    }

    /// 今 tick までに積まれたイベントを取り出す（オーディオ・UI 向け）
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn player_id(&self) -> EntityId {
        self.player_id
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    // ── 内部ユーティリティ ─────────────────────────────────────

    /// 経過時間から導出される難易度（1.0〜DIFFICULTY_MAX）
    pub(crate) fn difficulty(&self) -> f32 {
        (DIFFICULTY_START + self.elapsed * DIFFICULTY_RATE_PER_SEC).min(DIFFICULTY_MAX)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_live_player_at_full_health() {
        let s = Session::new(SessionConfig::default_survival(1)).unwrap();
        let player = s.registry.get(s.player_id).unwrap();
        assert!(player.alive);
        assert_eq!(player.hp, PLAYER_MAX_HP);
        assert_eq!(s.player_hp(), PLAYER_MAX_HP);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn invalid_config_cannot_start() {
        let mut config = SessionConfig::default_survival(1);
        config.boss.phases.clear();
        assert!(Session::new(config).is_err());
    }

    #[test]
    fn difficulty_rises_and_caps() {
        let mut s = Session::new(SessionConfig::default_survival(1)).unwrap();
        assert!((s.difficulty() - DIFFICULTY_START).abs() < 1e-6);
        s.elapsed = 1e6;
        assert!((s.difficulty() - DIFFICULTY_MAX).abs() < 1e-6);
    }
}
