//! Path: nova_engine/src/clock.rs
//! Summary: 固定タイムステップドライバとポーズ制御

use std::sync::atomic::{AtomicBool, Ordering};

use nova_core::constants::TICK_DT;

/// 固定タイムステップのゲームクロック。
///
/// 実時間を積算し、1 tick 分（TICK_DT）貯まるごとに tick を発行する。
/// ポーズは tick と tick の間でのみ効く。tick の途中で止まることはない。
pub struct GameClock {
    accumulator: f32,
    paused:      AtomicBool,
}

impl GameClock {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            paused:      AtomicBool::new(false),
        }
    }

    /// 実経過時間を加算し、この間に実行すべき tick 数を返す。
    /// ポーズ中は実時間を捨てて 0 を返す（再開時にまとめて進まない）。
    pub fn advance(&mut self, real_dt_secs: f32) -> u32 {
        if self.is_paused() {
            self.accumulator = 0.0;
            return 0;
        }
        self.accumulator += real_dt_secs;
        let ticks = (self.accumulator / TICK_DT).floor() as u32;
        self.accumulator -= ticks as f32 * TICK_DT;
        ticks
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}
