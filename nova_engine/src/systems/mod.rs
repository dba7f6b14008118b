//! Path: nova_engine/src/systems/mod.rs
//! Summary: 1 tick を構成するシステム群（実行順は step モジュールが決める）

pub mod behavior;
pub mod boss;
pub mod collision;
pub mod powerup;
pub mod spawn;
