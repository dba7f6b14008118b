//! Path: nova_engine/src/world/event.rs
//! Summary: tick 内で発生したゲームイベントと衝突イベント

use nova_core::params::{EnemyKind, PowerupKind};

use super::entity::EntityId;

/// 外部（オーディオ・スコア表示・セッション進行）へ通知するイベント。
/// 毎 tick の終わりに drain される。
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    EnemyDestroyed { kind: EnemyKind, score: u32 },
    PlayerHit      { damage: i32 },
    PowerupCollected { kind: PowerupKind },
    PowerupExpired   { kind: PowerupKind },
    /// ボスがフェーズに入った（スポーン時の phase 0 を含む）
    BossPhaseStarted { phase: usize },
    /// ボス撃破（通常の敵死亡とは別系統の勝利シグナル）
    BossDefeated { score: u32 },
    /// スケジュール消化済みかつ生存敵なし
    WaveCleared,
}

/// 衝突の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// 弾丸が防御側に命中
    ProjectileHit,
    /// 機体同士の接触
    Contact,
    /// パワーアップ取得
    Pickup,
}

/// 衝突解決が同一 tick 内で生成・消費する一時レコード。tick をまたいで
/// 保持しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a:    EntityId,
    pub b:    EntityId,
    pub kind: CollisionKind,
}
