//! Path: nova_core/src/rng.rs
//! Summary: 決定論的 LCG 乱数ジェネレータ

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimpleRng(u64);

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self.0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    pub fn next_f32(&mut self) -> f32 {
        self.next_u32() as f32 / u32::MAX as f32
    }

    /// [lo, hi) の一様乱数
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next_f32() * (hi - lo)
    }

    /// 確率 `percent`%（0〜100）で true
    pub fn roll_percent(&mut self, percent: u32) -> bool {
        self.next_u32() % 100 < percent
    }

    /// 重み付き抽選。重みがすべて 0 のときは 0 を返す。
    pub fn weighted_pick(&mut self, weights: &[u32]) -> usize {
        let total: u32 = weights.iter().sum();
        if total == 0 {
            return 0;
        }
        let mut roll = self.next_u32() % total;
        for (i, &w) in weights.iter().enumerate() {
            if roll < w {
                return i;
            }
            roll -= w;
        }
        weights.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_reproducibility() {
        let mut rng = SimpleRng::new(12345);
        let a: Vec<u32> = (0..10).map(|_| rng.next_u32()).collect();
        let mut rng2 = SimpleRng::new(12345);
        let b: Vec<u32> = (0..10).map(|_| rng2.next_u32()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn range_f32_stays_in_bounds() {
        let mut rng = SimpleRng::new(999);
        for _ in 0..100 {
            let f = rng.range_f32(10.0, 20.0);
            assert!((10.0..20.0).contains(&f));
        }
    }

    #[test]
    fn weighted_pick_respects_zero_weights() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..50 {
            let i = rng.weighted_pick(&[0, 5, 0, 5]);
            assert!(i == 1 || i == 3);
        }
    }
}
