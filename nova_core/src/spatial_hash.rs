//! Path: nova_core/src/spatial_hash.rs
//! Summary: 空間ハッシュによるブロードフェーズ近傍クエリ

use rustc_hash::FxHashMap;

pub struct SpatialHash {
    pub cell_size: f32,
    cells: FxHashMap<(i32, i32), Vec<usize>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: FxHashMap::default(),
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, id: usize, x: f32, y: f32) {
        let key = self.cell_key(x, y);
        self.cells.entry(key).or_default().push(id);
    }

    fn cell_key(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// 指定円の範囲内にあるエンティティ ID を `buf` に書き込む（アロケーションなし）。
    /// 呼び出し前に `buf` をクリアする必要はない（内部で `clear()` する）。
    /// 同一セル内の ID は挿入順のまま返る。
    pub fn query_nearby_into(&self, x: f32, y: f32, radius: f32, buf: &mut Vec<usize>) {
        buf.clear();
        let r = (radius / self.cell_size).ceil() as i32;
        let cx = (x / self.cell_size).floor() as i32;
        let cy = (y / self.cell_size).floor() as i32;
        for ix in (cx - r)..=(cx + r) {
            for iy in (cy - r)..=(cy + r) {
                if let Some(ids) = self.cells.get(&(ix, iy)) {
                    buf.extend_from_slice(ids);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_finds_nearby_only() {
        let mut hash = SpatialHash::new(80.0);
        hash.insert(0, 10.0, 10.0);
        hash.insert(1, 50.0, 50.0);
        hash.insert(2, 900.0, 900.0);

        let mut buf = Vec::new();
        hash.query_nearby_into(0.0, 0.0, 60.0, &mut buf);
        assert!(buf.contains(&0));
        assert!(buf.contains(&1));
        assert!(!buf.contains(&2));
    }

    #[test]
    fn query_clears_previous_results() {
        let mut hash = SpatialHash::new(80.0);
        hash.insert(3, 500.0, 500.0);

        let mut buf = vec![42, 43];
        hash.query_nearby_into(0.0, 0.0, 10.0, &mut buf);
        assert!(buf.is_empty());
    }

    #[test]
    fn negative_coordinates_hash_correctly() {
        let mut hash = SpatialHash::new(80.0);
        hash.insert(0, -10.0, -10.0);
        let mut buf = Vec::new();
        hash.query_nearby_into(-5.0, -5.0, 20.0, &mut buf);
        assert_eq!(buf, vec![0]);
    }
}
