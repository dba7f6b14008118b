//! Path: nova_engine/src/world/mod.rs
//! Summary: ワールド状態（エンティティ・レジストリ・セッション・イベント・スナップショット）

pub mod entity;
pub mod event;
pub mod registry;
pub mod session;
pub mod snapshot;
