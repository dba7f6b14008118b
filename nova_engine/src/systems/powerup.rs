//! Path: nova_engine/src/systems/powerup.rs
//! Summary: パワーアップシステム（BuffState 管理と派生ステータスの再計算）

use rustc_hash::FxHashMap;

use nova_core::constants::PLAYER_FIRE_DELAY;
use nova_core::params::{PowerupKind, StackPolicy};

use crate::world::entity::EntityId;

/// プレイヤー 1 人分のバフ状態。
/// kind の一意性はマップのキーで担保される（再取得は refresh か段階加算）。
#[derive(Clone, Debug, Default)]
pub struct BuffState {
    /// 時限バフ: kind → 残り秒数
    timed: FxHashMap<PowerupKind, f32>,
    /// 段階バフ: kind → 現在の段階（チャージ数）
    tiers: FxHashMap<PowerupKind, u8>,
}

impl BuffState {
    pub fn remaining(&self, kind: PowerupKind) -> Option<f32> {
        self.timed.get(&kind).copied()
    }

    pub fn tier(&self, kind: PowerupKind) -> u8 {
        self.tiers.get(&kind).copied().unwrap_or(0)
    }
}

/// apply の結果。Instant だけは効果の実体を呼び出し側（衝突解決）が
/// 同一 tick 内で即時実行する。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Refreshed,
    /// 加算後の段階
    Stacked(u8),
    Instant,
}

/// 派生ステータス。毎 tick BuffState 全体から再計算される（増分更新だと
/// 順序バグで値がずれるため、常にゼロから導出する）。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedStats {
    pub fire_delay:      f32,
    /// 同時発射数（TripleShot で 3）
    pub spread:          u8,
    pub shield_active:   bool,
    pub homing:          bool,
    /// 敵と敵弾の時間進行係数（TimeWarp で 0.5）
    pub time_warp:       f32,
    pub laser:           bool,
    pub flamethrower:    bool,
    /// ドローン追加射線の本数
    pub drones:          u8,
    pub scatter_charges: u8,
}

impl DerivedStats {
    pub fn baseline() -> Self {
        Self {
            fire_delay:      PLAYER_FIRE_DELAY,
            spread:          1,
            shield_active:   false,
            homing:          false,
            time_warp:       1.0,
            laser:           false,
            flamethrower:    false,
            drones:          0,
            scatter_charges: 0,
        }
    }
}

/// プレイヤー ID をキーにバフを管理する。シングルプレイヤー運用だが、
/// キーを ID にしておくことで複数アクターへの拡張を安全にする。
pub struct PowerupSystem {
    policies: FxHashMap<PowerupKind, StackPolicy>,
    buffs:    FxHashMap<EntityId, BuffState>,
}

impl PowerupSystem {
    pub fn new(policies: impl IntoIterator<Item = (PowerupKind, StackPolicy)>) -> Self {
        Self {
            policies: policies.into_iter().collect(),
            buffs:    FxHashMap::default(),
        }
    }

    fn policy(&self, kind: PowerupKind) -> StackPolicy {
        self.policies
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_policy())
    }

    /// 取得処理。Refresh は残り時間を上限値にリセット（加算しない）、
    /// Stack は cap まで段階加算、Instant はバフ登録なし。
    pub fn apply(&mut self, player: EntityId, kind: PowerupKind) -> ApplyOutcome {
        let policy = self.policy(kind);
        let state = self.buffs.entry(player).or_default();
        match policy {
            StackPolicy::Refresh { duration } => {
                state.timed.insert(kind, duration);
                ApplyOutcome::Refreshed
            }
            StackPolicy::Stack { per_pickup, cap } => {
                let tier = state.tiers.entry(kind).or_insert(0);
                *tier = tier.saturating_add(per_pickup).min(cap);
                ApplyOutcome::Stacked(*tier)
            }
            StackPolicy::Instant => ApplyOutcome::Instant,
        }
    }

    /// 時限バフを減衰させ、切れた kind を返す（イベント発行は呼び出し側）。
    pub fn tick(&mut self, player: EntityId, dt: f32) -> Vec<PowerupKind> {
        let Some(state) = self.buffs.get_mut(&player) else {
            return Vec::new();
        };
        let mut expired = Vec::new();
        for (kind, remaining) in state.timed.iter_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.push(*kind);
            }
        }
        for kind in &expired {
            state.timed.remove(kind);
        }
        expired
    }

    /// スキャッターボムのチャージを 1 消費する。残っていなければ false。
    pub fn consume_scatter_charge(&mut self, player: EntityId) -> bool {
        let Some(state) = self.buffs.get_mut(&player) else {
            return false;
        };
        match state.tiers.get_mut(&PowerupKind::ScatterBomb) {
            Some(charges) if *charges > 0 => {
                *charges -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn buffs(&self, player: EntityId) -> Option<&BuffState> {
        self.buffs.get(&player)
    }

    /// BuffState 全体からの決定論的な再計算。
    pub fn derive(&self, player: EntityId) -> DerivedStats {
        let mut stats = DerivedStats::baseline();
        let Some(state) = self.buffs.get(&player) else {
            return stats;
        };
        if state.timed.contains_key(&PowerupKind::RapidFire) {
            stats.fire_delay = PLAYER_FIRE_DELAY / 3.0;
        }
        if state.timed.contains_key(&PowerupKind::TripleShot) {
            stats.spread = 3;
        }
        stats.shield_active = state.timed.contains_key(&PowerupKind::Shield);
        stats.homing = state.timed.contains_key(&PowerupKind::Homing);
        if state.timed.contains_key(&PowerupKind::TimeWarp) {
            stats.time_warp = 0.5;
        }
        stats.laser = state.timed.contains_key(&PowerupKind::Laser);
        stats.flamethrower = state.timed.contains_key(&PowerupKind::Flamethrower);
        stats.drones = state.tier(PowerupKind::Drone);
        stats.scatter_charges = state.tier(PowerupKind::ScatterBomb);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nova_core::constants::POWERUP_DURATION;

    fn system() -> PowerupSystem {
        PowerupSystem::new(
            nova_core::params::ALL_POWERUP_KINDS
                .iter()
                .map(|&k| (k, k.default_policy())),
        )
    }

    const PLAYER: EntityId = EntityId(0);

    #[test]
    fn refresh_never_exceeds_max_duration() {
        let mut sys = system();
        sys.apply(PLAYER, PowerupKind::RapidFire);
        // 6 秒経過後に再取得 → 残り時間は上限にリセット、加算はされない
        sys.tick(PLAYER, 6.0);
        sys.apply(PLAYER, PowerupKind::RapidFire);
        let remaining = sys.buffs(PLAYER).unwrap().remaining(PowerupKind::RapidFire);
        assert_relative_eq!(remaining.unwrap(), POWERUP_DURATION);
    }

    #[test]
    fn rapid_fire_expires_at_pickup_plus_duration() {
        // t=2 で取得、t=8 で再取得 → t=18 で切れる（t=20 ではない）
        let mut sys = system();
        sys.apply(PLAYER, PowerupKind::RapidFire); // t=2
        assert!(sys.tick(PLAYER, 6.0).is_empty()); // t=8
        sys.apply(PLAYER, PowerupKind::RapidFire);
        assert!(sys.tick(PLAYER, 9.9).is_empty()); // t=17.9
        let expired = sys.tick(PLAYER, 0.2); // t=18.1
        assert_eq!(expired, vec![PowerupKind::RapidFire]);
    }

    #[test]
    fn stacking_is_capped() {
        let mut sys = system();
        for _ in 0..10 {
            sys.apply(PLAYER, PowerupKind::ScatterBomb);
        }
        assert_eq!(sys.derive(PLAYER).scatter_charges, 9);
        for _ in 0..5 {
            sys.apply(PLAYER, PowerupKind::Drone);
        }
        assert_eq!(sys.derive(PLAYER).drones, 3);
    }

    #[test]
    fn scatter_charge_consumption() {
        let mut sys = system();
        assert!(!sys.consume_scatter_charge(PLAYER));
        sys.apply(PLAYER, PowerupKind::ScatterBomb); // 3 チャージ
        assert!(sys.consume_scatter_charge(PLAYER));
        assert!(sys.consume_scatter_charge(PLAYER));
        assert!(sys.consume_scatter_charge(PLAYER));
        assert!(!sys.consume_scatter_charge(PLAYER));
    }

    #[test]
    fn instant_kinds_do_not_register_buffs() {
        let mut sys = system();
        assert_eq!(sys.apply(PLAYER, PowerupKind::MegaBlast), ApplyOutcome::Instant);
        assert_eq!(sys.apply(PLAYER, PowerupKind::PowerRestore), ApplyOutcome::Instant);
        let stats = sys.derive(PLAYER);
        assert_eq!(stats, DerivedStats::baseline());
    }

    #[test]
    fn derived_stats_revert_after_expiry() {
        let mut sys = system();
        sys.apply(PLAYER, PowerupKind::TripleShot);
        sys.apply(PLAYER, PowerupKind::TimeWarp);
        assert_eq!(sys.derive(PLAYER).spread, 3);
        assert_relative_eq!(sys.derive(PLAYER).time_warp, 0.5);

        let mut expired = sys.tick(PLAYER, POWERUP_DURATION + 0.1);
        expired.sort_by_key(|k| *k as u8);
        assert_eq!(expired, vec![PowerupKind::TripleShot, PowerupKind::TimeWarp]);
        assert_eq!(sys.derive(PLAYER), DerivedStats::baseline());
    }

    #[test]
    fn buffs_are_keyed_per_player() {
        let mut sys = system();
        let other = EntityId(9);
        sys.apply(PLAYER, PowerupKind::Shield);
        assert!(sys.derive(PLAYER).shield_active);
        assert!(!sys.derive(other).shield_active);
    }
}
