//! Path: nova_core/src/motion.rs
//! Summary: パラメトリックな移動パスの純関数群
//!
//! 状態は呼び出し側（エンティティ）が持ち、ここは (経過時間, パラメータ) から
//! 位置・速度を決定論的に計算するだけ。固定 tick で再現可能な動きを保証する。

/// 正弦波ウィーブの Y オフセット
pub fn weave_offset(age: f32, amplitude: f32, freq_hz: f32) -> f32 {
    amplitude * (age * freq_hz * std::f32::consts::TAU).sin()
}

/// 二重正弦の蛇行オフセット（Spinner 用）
pub fn spiral_offset(age: f32, amplitude: f32) -> f32 {
    amplitude * (age * 2.4).sin() + amplitude * 0.5 * (age * 5.1).sin()
}

/// 目標 Y へ向かう速度成分（最大 `speed` でクランプ）
pub fn seek_row_vy(current_y: f32, target_y: f32, speed: f32) -> f32 {
    (target_y - current_y).clamp(-speed, speed)
}

/// ホールド位置までは左進、それ以降は 0（Bulwark / Blinker の前進フェーズ）
pub fn drift_until_hold(x: f32, hold_x: f32, speed: f32) -> f32 {
    if x > hold_x {
        -speed
    } else {
        0.0
    }
}

/// 上下境界の間を一定速度で往復する三角波の Y 座標
pub fn bounce_between(age: f32, top: f32, bottom: f32, speed: f32) -> f32 {
    let span = bottom - top;
    if span <= 0.0 {
        return top;
    }
    let period = 2.0 * span / speed;
    let t = (age % period) / period; // 0..1
    let tri = if t < 0.5 { t * 2.0 } else { 2.0 - t * 2.0 };
    top + tri * span
}

/// ボス Hover: 基準 Y を中心に浮遊
pub fn hover_y(age: f32, center_y: f32, amplitude: f32) -> f32 {
    center_y + amplitude * (age * 1.2).sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn weave_is_periodic() {
        let a = weave_offset(0.25, 40.0, 1.0);
        let b = weave_offset(1.25, 40.0, 1.0);
        assert_relative_eq!(a, b, epsilon = 1e-3);
    }

    #[test]
    fn seek_row_clamps_to_speed() {
        assert_relative_eq!(seek_row_vy(0.0, 1000.0, 120.0), 120.0);
        assert_relative_eq!(seek_row_vy(1000.0, 0.0, 120.0), -120.0);
        assert_relative_eq!(seek_row_vy(100.0, 130.0, 120.0), 30.0);
    }

    #[test]
    fn bounce_stays_within_bounds() {
        for i in 0..200 {
            let y = bounce_between(i as f32 * 0.13, 75.0, 525.0, 200.0);
            assert!((75.0..=525.0).contains(&y), "y={y} out of playfield");
        }
    }

    #[test]
    fn bounce_starts_at_top_and_reverses() {
        let top = 0.0;
        let bottom = 100.0;
        let speed = 100.0; // period = 2s
        assert_relative_eq!(bounce_between(0.0, top, bottom, speed), 0.0);
        assert_relative_eq!(bounce_between(1.0, top, bottom, speed), 100.0);
        assert_relative_eq!(bounce_between(2.0, top, bottom, speed), 0.0, epsilon = 1e-3);
    }
}
