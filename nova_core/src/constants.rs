//! Path: nova_core/src/constants.rs
//! Summary: 画面・プレイフィールド・移動速度・戦闘関連の定数定義

// Screen resolution
pub const SCREEN_WIDTH:  f32 = 1024.0;
pub const SCREEN_HEIGHT: f32 = 600.0;

// Playfield boundaries (Y 軸: HUD 領域を除いた帯)
pub const PLAYFIELD_TOP:    f32 = 75.0;
pub const PLAYFIELD_BOTTOM: f32 = SCREEN_HEIGHT - 75.0;

// シミュレーション刻み
pub const TICK_HZ: f32 = 60.0;
pub const TICK_DT: f32 = 1.0 / TICK_HZ;

// Frame budget (1 tick に許される実時間)
pub const FRAME_BUDGET_MS: f64 = 1000.0 / 60.0;

// Movement (px/s)
pub const PLAYER_SPEED:       f32 = 240.0;
pub const ENEMY_DRIFT_SPEED:  f32 = 180.0;
pub const BULLET_SPEED:       f32 = 600.0;
pub const ENEMY_BULLET_SPEED: f32 = 300.0;

// Player combat
pub const PLAYER_MAX_HP:       i32 = 100;
pub const PLAYER_RADIUS:       f32 = 16.0;
pub const PLAYER_FIRE_DELAY:   f32 = 0.2;
pub const INVINCIBLE_DURATION: f32 = 1.0;
/// 武器パワー段階（PowerRestore で最大まで回復する）
pub const MAX_POWER_LEVEL: u8 = 3;

// Projectile
pub const BULLET_RADIUS:   f32 = 5.0;
pub const BULLET_LIFETIME: f32 = 3.0;

// Powerup
pub const POWERUP_RADIUS:      f32 = 14.0;
pub const POWERUP_DURATION:    f32 = 10.0;
pub const POWERUP_DRIFT_SPEED: f32 = 60.0;

// Spatial hash cell size
pub const CELL_SIZE: f32 = 80.0;

// Entity cap（超過分のフォーメーションは次 tick に繰り越す）
pub const MAX_ENTITIES: usize = 512;

// Difficulty curve: difficulty = 1.0 + elapsed * rate（上限まで）
pub const DIFFICULTY_START:        f32 = 1.0;
pub const DIFFICULTY_MAX:          f32 = 10.0;
pub const DIFFICULTY_RATE_PER_SEC: f32 = 0.02;

/// 画面左端からこれ以上外に出た敵は戦闘死ではなく退場扱いで除去する
pub const DESPAWN_MARGIN: f32 = 96.0;
