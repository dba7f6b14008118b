//! Path: nova_core/src/params.rs
//! Summary: 敵・弾丸・パワーアップ・フォーメーションの kind 別パラメータテーブル
//!
//! kind ごとのサブクラス分岐ではなく、closed な enum + 静的テーブル参照で
//! 全 kind をロード時に列挙・検証できるようにする。

use serde::{Deserialize, Serialize};

use crate::constants::{ENEMY_BULLET_SPEED, ENEMY_DRIFT_SPEED, POWERUP_DURATION};

// ─── EnemyKind ─────────────────────────────────────────────────

/// 敵の種類（7 種、closed set）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EnemyKind {
    /// 直進するだけの雑魚
    Grunt    = 0,
    /// プレイヤーを狙って撃つ
    Gunner   = 1,
    /// 正弦波で上下に揺れながら斉射する
    Weaver   = 2,
    /// 蛇行しつつ回転弾をばら撒く
    Spinner  = 3,
    /// プレイヤーの行に寄ってくる
    Seeker   = 4,
    /// 静止と瞬間移動を繰り返す（発射間隔ランダム）
    Blinker  = 5,
    /// 隊列保持からの横滑り、被弾で反撃に転じる
    Bulwark  = 6,
}

pub const ALL_ENEMY_KINDS: [EnemyKind; 7] = [
    EnemyKind::Grunt,
    EnemyKind::Gunner,
    EnemyKind::Weaver,
    EnemyKind::Spinner,
    EnemyKind::Seeker,
    EnemyKind::Blinker,
    EnemyKind::Bulwark,
];

/// 移動パターンの種別（実体は motion モジュールの純関数）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    Drift,
    Weave,
    SpiralDrift,
    SeekRow,
    BlinkHold,
    HoldStrafe,
}

/// 発射間隔の種別
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CadenceRule {
    Never,
    /// 固定間隔（秒）
    Fixed(f32),
    /// 個体ごとの RNG で min〜max 秒から抽選
    Randomized { min: f32, max: f32 },
    /// HP がしきい値を割って初めて撃ち始める
    HealthTriggered { below_frac: f32, interval: f32 },
}

/// 敵のパラメータ（kind で参照）
#[derive(Clone, Copy, Debug)]
pub struct EnemyParams {
    pub max_hp:         i32,
    pub speed:          f32,
    pub radius:         f32,
    pub score:          u32,
    /// 接触時にプレイヤーへ与えるダメージ
    pub contact_damage: i32,
    /// この敵の弾のダメージ
    pub shot_damage:    i32,
    pub path:           PathKind,
    pub cadence:        CadenceRule,
    pub render_kind:    u8,
    /// 撃破時のパワーアップドロップ率（%）
    pub drop_percent:   u32,
    // 難易度抽選用の重みカーブ
    pub base_weight:       f32,
    pub weight_per_level:  f32,
    pub min_weight:        f32,
    pub max_weight:        f32,
    pub unlock_difficulty: f32,
}

static ENEMY_TABLE: [EnemyParams; 7] = [
    // Grunt
    EnemyParams {
        max_hp: 10, speed: ENEMY_DRIFT_SPEED, radius: 18.0, score: 100,
        contact_damage: 15, shot_damage: 0,
        path: PathKind::Drift, cadence: CadenceRule::Never, render_kind: 1,
        drop_percent: 5,
        base_weight: 40.0, weight_per_level: -3.5, min_weight: 5.0, max_weight: 40.0,
        unlock_difficulty: 1.0,
    },
    // Gunner
    EnemyParams {
        max_hp: 20, speed: ENEMY_DRIFT_SPEED * 0.7, radius: 18.0, score: 150,
        contact_damage: 15, shot_damage: 10,
        path: PathKind::Drift, cadence: CadenceRule::Fixed(1.5), render_kind: 2,
        drop_percent: 8,
        base_weight: 30.0, weight_per_level: 1.5, min_weight: 10.0, max_weight: 45.0,
        unlock_difficulty: 1.0,
    },
    // Weaver
    EnemyParams {
        max_hp: 20, speed: ENEMY_DRIFT_SPEED * 0.8, radius: 18.0, score: 200,
        contact_damage: 15, shot_damage: 8,
        path: PathKind::Weave, cadence: CadenceRule::Fixed(2.0), render_kind: 3,
        drop_percent: 8,
        base_weight: 10.0, weight_per_level: 1.0, min_weight: 5.0, max_weight: 20.0,
        unlock_difficulty: 1.0,
    },
    // Spinner
    EnemyParams {
        max_hp: 25, speed: ENEMY_DRIFT_SPEED * 0.6, radius: 20.0, score: 250,
        contact_damage: 20, shot_damage: 8,
        path: PathKind::SpiralDrift, cadence: CadenceRule::Fixed(1.8), render_kind: 4,
        drop_percent: 10,
        base_weight: 10.0, weight_per_level: 1.0, min_weight: 5.0, max_weight: 20.0,
        unlock_difficulty: 1.0,
    },
    // Seeker
    EnemyParams {
        max_hp: 30, speed: ENEMY_DRIFT_SPEED * 0.9, radius: 18.0, score: 300,
        contact_damage: 20, shot_damage: 12,
        path: PathKind::SeekRow, cadence: CadenceRule::Fixed(2.2), render_kind: 5,
        drop_percent: 10,
        base_weight: 10.0, weight_per_level: 1.5, min_weight: 5.0, max_weight: 25.0,
        unlock_difficulty: 1.0,
    },
    // Blinker
    EnemyParams {
        max_hp: 25, speed: ENEMY_DRIFT_SPEED * 0.5, radius: 16.0, score: 350,
        contact_damage: 20, shot_damage: 10,
        path: PathKind::BlinkHold,
        cadence: CadenceRule::Randomized { min: 1.2, max: 2.8 },
        render_kind: 6,
        drop_percent: 12,
        base_weight: 0.0, weight_per_level: 2.0, min_weight: 2.0, max_weight: 20.0,
        unlock_difficulty: 2.0,
    },
    // Bulwark
    EnemyParams {
        max_hp: 50, speed: ENEMY_DRIFT_SPEED * 0.4, radius: 22.0, score: 400,
        contact_damage: 25, shot_damage: 15,
        path: PathKind::HoldStrafe,
        cadence: CadenceRule::HealthTriggered { below_frac: 0.5, interval: 0.8 },
        render_kind: 7,
        drop_percent: 15,
        base_weight: 0.0, weight_per_level: 2.0, min_weight: 3.0, max_weight: 20.0,
        unlock_difficulty: 2.0,
    },
];

impl EnemyParams {
    pub fn get(kind: EnemyKind) -> &'static EnemyParams {
        &ENEMY_TABLE[kind as usize]
    }

    /// 難易度に応じた抽選重み。アンロック前は 0。
    pub fn spawn_weight(kind: EnemyKind, difficulty: f32) -> u32 {
        let p = Self::get(kind);
        if difficulty < p.unlock_difficulty {
            return 0;
        }
        let raw = p.base_weight + p.weight_per_level * (difficulty - 1.0);
        raw.clamp(p.min_weight, p.max_weight).round() as u32
    }
}

// ─── ProjectileKind ────────────────────────────────────────────

/// 弾丸の種類（発射元と挙動を兼ねる）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ProjectileKind {
    PlayerShot    = 0,
    /// 貫通するレーザー
    PlayerLaser   = 1,
    /// 短命・近距離の火炎弾
    PlayerFlame   = 2,
    /// スキャッターボムの放射弾
    PlayerScatter = 3,
    EnemyShot     = 4,
    BossShot      = 5,
}

impl ProjectileKind {
    pub fn is_player_owned(self) -> bool {
        matches!(
            self,
            Self::PlayerShot | Self::PlayerLaser | Self::PlayerFlame | Self::PlayerScatter
        )
    }

    /// 貫通弾は最初のヒットで消えない
    pub fn piercing(self) -> bool {
        self == Self::PlayerLaser
    }

    pub fn render_kind(self) -> u8 {
        10 + self as u8
    }

    pub fn lifetime(self) -> f32 {
        match self {
            Self::PlayerFlame => 0.35,
            Self::PlayerScatter => 1.2,
            _ => crate::constants::BULLET_LIFETIME,
        }
    }

    pub fn speed(self) -> f32 {
        match self {
            Self::EnemyShot | Self::BossShot => ENEMY_BULLET_SPEED,
            Self::PlayerFlame => 280.0,
            Self::PlayerScatter => 360.0,
            _ => crate::constants::BULLET_SPEED,
        }
    }
}

// ─── PowerupKind ───────────────────────────────────────────────

/// パワーアップの種類（11 種、closed set）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PowerupKind {
    TripleShot   = 0,
    RapidFire    = 1,
    Shield       = 2,
    Homing       = 3,
    PowerRestore = 4,
    ScatterBomb  = 5,
    TimeWarp     = 6,
    MegaBlast    = 7,
    Laser        = 8,
    Drone        = 9,
    Flamethrower = 10,
}

pub const ALL_POWERUP_KINDS: [PowerupKind; 11] = [
    PowerupKind::TripleShot,
    PowerupKind::RapidFire,
    PowerupKind::Shield,
    PowerupKind::Homing,
    PowerupKind::PowerRestore,
    PowerupKind::ScatterBomb,
    PowerupKind::TimeWarp,
    PowerupKind::MegaBlast,
    PowerupKind::Laser,
    PowerupKind::Drone,
    PowerupKind::Flamethrower,
];

/// 再取得時の挙動（Refresh は残り時間を上限までリセット、Stack は段階加算）
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum StackPolicy {
    Refresh { duration: f32 },
    Stack { per_pickup: u8, cap: u8 },
    Instant,
}

impl PowerupKind {
    /// デフォルトのスタックポリシー（セッション設定で上書き可能）
    pub fn default_policy(self) -> StackPolicy {
        match self {
            Self::TripleShot
            | Self::RapidFire
            | Self::Shield
            | Self::Homing
            | Self::TimeWarp
            | Self::Laser
            | Self::Flamethrower => StackPolicy::Refresh { duration: POWERUP_DURATION },
            Self::ScatterBomb => StackPolicy::Stack { per_pickup: 3, cap: 9 },
            Self::Drone => StackPolicy::Stack { per_pickup: 1, cap: 3 },
            Self::PowerRestore | Self::MegaBlast => StackPolicy::Instant,
        }
    }

    pub fn render_kind(self) -> u8 {
        20 + self as u8
    }
}

// ─── FormationPattern ──────────────────────────────────────────

/// フォーメーションの隊形（4 種）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormationPattern {
    Line,
    Column,
    Diagonal,
    Vee,
}

impl FormationPattern {
    /// 隊列内 `index` 番目の、基準点からのオフセット
    pub fn offset(self, index: usize, spacing: f32) -> (f32, f32) {
        let i = index as f32;
        match self {
            Self::Line => (0.0, i * spacing),
            Self::Column => (i * spacing, 0.0),
            Self::Diagonal => (i * spacing, i * spacing),
            Self::Vee => {
                // 先頭が頂点、後続が上下交互に開く
                let rank = ((index + 1) / 2) as f32;
                let side = if index % 2 == 1 { -1.0 } else { 1.0 };
                (rank * spacing, side * rank * spacing)
            }
        }
    }
}

// ─── Boss patterns ─────────────────────────────────────────────

/// ボスの攻撃パターン（フェーズ設定から参照）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossAttack {
    /// プレイヤー狙い
    Targeted,
    /// 全方位同時
    Radial,
    /// 回転しながら連射
    Spiral,
    /// 上下に波打つ扇
    Wave,
    /// 画面上方からの雨
    Rain,
}

/// ボスの移動パターン（フェーズ設定から参照）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossMotion {
    /// 定位置で上下に浮遊
    Hover,
    /// プレイフィールドを縦に往復
    Sweep,
    /// その場に静止
    Anchor,
}
