//! Path: nova_engine/src/input.rs
//! Summary: 外部入力レイヤから渡される 1 tick 分の入力スナップショット

/// デバウンス・デコード済みの移動/射撃意図。生のデバイスポーリングは
/// 外部レイヤの責務。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// -1.0〜1.0（左〜右）
    pub move_x: f32,
    /// -1.0〜1.0（上〜下）
    pub move_y: f32,
    pub fire:   bool,
    /// スキャッターボムのチャージを 1 つ消費する
    pub bomb:   bool,
}
