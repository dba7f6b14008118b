//! Path: nova_core/src/lib.rs
//! Summary: シミュレーションコア共通ロジック（定数・パラメータテーブル・RNG・空間ハッシュ・移動パス）

pub mod constants;
pub mod motion;
pub mod params;
pub mod rng;
pub mod spatial_hash;
