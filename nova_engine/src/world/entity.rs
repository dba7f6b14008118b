//! Path: nova_engine/src/world/entity.rs
//! Summary: エンティティ本体（Entity, EntityClass と kind 別の挙動ステート）

use nova_core::params::{EnemyKind, EnemyParams, PowerupKind, ProjectileKind};
use nova_core::rng::SimpleRng;

/// エンティティ ID（レジストリが採番する。再利用しない）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// シミュレーション上の 1 エンティティ。
/// hp ≤ 0 になったら mark_dead され、その tick の間は参照可能なまま残る。
#[derive(Clone, Debug)]
pub struct Entity {
    pub id:     EntityId,
    pub x:      f32,
    pub y:      f32,
    pub vx:     f32,
    pub vy:     f32,
    pub hp:     i32,
    pub radius: f32,
    pub alive:  bool,
    pub class:  EntityClass,
}

/// kind 別の判別（closed set）。挙動ステートは各バリアントが持つ。
#[derive(Clone, Debug)]
pub enum EntityClass {
    Player(PlayerState),
    Enemy(EnemyState),
    Projectile(ProjectileState),
    Powerup(PowerupKind),
    Boss(BossState),
}

#[derive(Clone, Debug)]
pub struct PlayerState {
    pub fire_timer:       f32,
    pub invincible_timer: f32,
    /// 武器パワー段階（1 始まり、PowerRestore で最大へ）
    pub power_level:      u8,
    /// 描画用の機首の傾き（-1: 上昇, 0: 水平, 1: 下降）
    pub tilt:             i8,
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            fire_timer:       0.0,
            invincible_timer: 0.0,
            power_level:      1,
            tilt:             0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnemyState {
    pub kind:       EnemyKind,
    /// スポーンからの経過時間（パス評価の引数）
    pub age:        f32,
    /// パスの基準 Y（ウィーブ等はここからのオフセットで動く）
    pub origin_y:   f32,
    pub fire_timer: f32,
    /// HoldStrafe / BlinkHold が停止する X
    pub hold_x:     f32,
    /// Spinner の回転弾角度
    pub spin_angle: f32,
    /// 補助タイマー（Blinker: 次の瞬間移動まで / Bulwark: 横滑り経過時間）
    pub aux_timer:  f32,
    /// 個体 RNG（ランダム発射間隔・瞬間移動先）。エンティティごとに持つことで
    /// 複製したエンティティの update が同じ軌跡を再現する。
    pub local_rng:  SimpleRng,
}

impl EnemyState {
    pub fn new(kind: EnemyKind, origin_y: f32, seed: u64) -> Self {
        Self {
            kind,
            age: 0.0,
            origin_y,
            fire_timer: 0.0,
            hold_x: 0.0,
            spin_angle: 0.0,
            aux_timer: 0.0,
            local_rng: SimpleRng::new(seed),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProjectileState {
    pub kind:     ProjectileKind,
    pub damage:   i32,
    pub lifetime: f32,
}

#[derive(Clone, Debug)]
pub struct BossState {
    /// 現在のフェーズ番号（単調増加）
    pub phase:        usize,
    pub age:          f32,
    pub anchor_y:     f32,
    pub attack_timer: f32,
    /// フェーズ突入直後の無敵残り時間
    pub entry_invuln: f32,
    /// 回転攻撃パターンの角度カーソル
    pub spiral_angle: f32,
    pub defeated:     bool,
}

impl Entity {
    pub fn is_player(&self) -> bool {
        matches!(self.class, EntityClass::Player(_))
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.class, EntityClass::Enemy(_))
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.class, EntityClass::Boss(_))
    }

    pub fn enemy_kind(&self) -> Option<EnemyKind> {
        match &self.class {
            EntityClass::Enemy(s) => Some(s.kind),
            _ => None,
        }
    }

    /// 描画スナップショットに渡す kind 値
    pub fn render_kind(&self) -> u8 {
        match &self.class {
            EntityClass::Player(_) => 0,
            EntityClass::Enemy(s) => EnemyParams::get(s.kind).render_kind,
            EntityClass::Projectile(s) => s.kind.render_kind(),
            EntityClass::Powerup(kind) => kind.render_kind(),
            EntityClass::Boss(_) => 40,
        }
    }
}
