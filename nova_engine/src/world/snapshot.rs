//! Path: nova_engine/src/world/snapshot.rs
//! Summary: 描画レイヤへ渡すフレームスナップショット

use serde::Serialize;

use nova_core::params::{PowerupKind, ALL_POWERUP_KINDS};

use crate::world::entity::EntityClass;
use crate::world::session::Session;

/// 1 スプライト分の描画状態。kind は render_kind 値
/// （0: プレイヤー, 1〜: 敵, 10〜: 弾丸, 20〜: パワーアップ, 40: ボス）。
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SpriteState {
    pub x:    f32,
    pub y:    f32,
    pub kind: u8,
    /// 機首の傾き（プレイヤーのみ。-1/0/1）
    pub tilt: i8,
}

/// アクティブな時限バフの残り時間
#[derive(Clone, Copy, Debug, Serialize)]
pub struct BuffView {
    pub kind:      PowerupKind,
    pub remaining: f32,
}

/// tick 末尾の状態から切り出した描画用スナップショット。
/// シミュレーション状態への参照は持たない（スレッド境界を越えてよい）。
#[derive(Clone, Debug, Serialize)]
pub struct RenderSnapshot {
    pub tick_id:      u64,
    pub score:        u32,
    pub player_hp:    i32,
    /// (現在 HP, 最大 HP)。ボス不在なら None。
    pub boss_hp:      Option<(i32, i32)>,
    pub victory:      bool,
    pub defeat:       bool,
    pub sprites:      Vec<SpriteState>,
    pub active_buffs: Vec<BuffView>,
    /// スキャッターボムの残りチャージ
    pub bomb_charges: u8,
}

impl Session {
    /// 現在の状態からスナップショットを生成する。tick の合間に呼ぶこと。
    pub fn snapshot(&self) -> RenderSnapshot {
        let sprites = self
            .registry
            .iter_alive()
            .map(|e| SpriteState {
                x:    e.x,
                y:    e.y,
                kind: e.render_kind(),
                tilt: match &e.class {
                    EntityClass::Player(ps) => ps.tilt,
                    _ => 0,
                },
            })
            .collect();
        let boss_hp = self
            .registry
            .iter_alive()
            .find(|e| e.is_boss())
            .map(|e| (e.hp, self.config.boss.max_hp));
        let active_buffs = match self.powerups.buffs(self.player_id) {
            Some(buffs) => ALL_POWERUP_KINDS
                .iter()
                .filter_map(|&kind| {
                    buffs
                        .remaining(kind)
                        .map(|remaining| BuffView { kind, remaining })
                })
                .collect(),
            None => Vec::new(),
        };
        RenderSnapshot {
            tick_id: self.tick_id,
            score: self.score,
            player_hp: self.player_hp,
            boss_hp,
            victory: self.victory,
            defeat: self.defeat,
            sprites,
            active_buffs,
            bomb_charges: self.stats.scatter_charges,
        }
    }
}
