//! Path: nova_engine/src/lib.rs
//! Summary: ウェーブ制シューティングのシミュレーションエンジン
//!
//! 固定タイムステップ（60Hz）で決定論的に進む戦闘シミュレーション。
//! 描画・音声・入力デバイスは持たず、外部レイヤが InputSnapshot を渡して
//! tick を回し、RenderSnapshot と GameEvent を受け取る。
//!
//! ```no_run
//! use nova_engine::{GameClock, InputSnapshot, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default_survival(42)).unwrap();
//! let mut clock = GameClock::new();
//! loop {
//!     let input = InputSnapshot { fire: true, ..Default::default() };
//!     for _ in 0..clock.advance(0.016) {
//!         session.tick(&input);
//!     }
//!     let _frame = session.snapshot();
//!     if session.is_victory() || session.is_defeat() {
//!         break;
//!     }
//! }
//! ```

pub mod clock;
pub mod config;
pub mod input;
pub mod step;
pub mod systems;
pub mod world;

pub use clock::GameClock;
pub use config::{
    BossPhaseSpec, BossSpec, ConfigError, FormationSpec, PowerupPolicyEntry, ScheduleEntry,
    SessionConfig, SpawnKind, WaveTrigger,
};
pub use input::InputSnapshot;
pub use systems::powerup::{ApplyOutcome, BuffState, DerivedStats};
pub use world::entity::{Entity, EntityClass, EntityId};
pub use world::event::{CollisionEvent, CollisionKind, GameEvent};
pub use world::registry::{EntityRegistry, RegistryError};
pub use world::session::Session;
pub use world::snapshot::{BuffView, RenderSnapshot, SpriteState};
