//! Path: nova_engine/src/world/registry.rs
//! Summary: エンティティレジストリ（採番・検索・挿入順走査・遅延削除）

use rustc_hash::FxHashMap;
use thiserror::Error;

use super::entity::{Entity, EntityId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate entity id {0}")]
    DuplicateId(u32),
}

/// 全エンティティの唯一の所有者。
///
/// 走査順は挿入順で安定しており、衝突解決の同時イベントの tie-break に使う。
/// `mark_dead` は alive フラグを折るだけで、実際の削除は tick 末尾の
/// `flush_removed` まで遅延する。死亡した tick の間は挙動・衝突・スコア処理
/// から見え続ける。
pub struct EntityRegistry {
    /// 挿入順のエンティティ列。システムはインデックス走査で直接読む。
    pub(crate) entities: Vec<Entity>,
    index:      FxHashMap<EntityId, usize>,
    next_id:    u32,
    live_count: usize,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            entities:   Vec::new(),
            index:      FxHashMap::default(),
            next_id:    0,
            live_count: 0,
        }
    }

    /// 未使用の ID を採番する（flush 後も再利用しない）
    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// エンティティを登録する。外部から与えられた ID が重複していたら失敗。
    pub fn create(&mut self, entity: Entity) -> Result<EntityId, RegistryError> {
        let id = entity.id;
        if self.index.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id.0));
        }
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        self.index.insert(id, self.entities.len());
        if entity.alive {
            self.live_count += 1;
        }
        self.entities.push(entity);
        Ok(id)
    }

    /// 採番と登録を一度に行う（ID 衝突が起こり得ない内部スポーン用）
    pub fn spawn(&mut self, build: impl FnOnce(EntityId) -> Entity) -> EntityId {
        let id = self.allocate_id();
        let entity = build(id);
        debug_assert_eq!(entity.id, id);
        self.index.insert(id, self.entities.len());
        if entity.alive {
            self.live_count += 1;
        }
        self.entities.push(entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&i| &self.entities[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let i = *self.index.get(&id)?;
        Some(&mut self.entities[i])
    }

    /// 挿入順の走査（死亡マーク済みも含む）
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// 挿入順の走査（生存のみ）
    pub fn iter_alive(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.alive)
    }

    pub fn mark_dead(&mut self, id: EntityId) {
        if let Some(&i) = self.index.get(&id) {
            let e = &mut self.entities[i];
            if e.alive {
                e.alive = false;
                self.live_count -= 1;
            }
        }
    }

    /// 死亡マーク済みのエンティティを物理削除する。tick 末尾に 1 回だけ呼ぶ。
    /// ここまでは死亡エンティティも走査・検索に現れる。
    pub fn flush_removed(&mut self) {
        if self.entities.iter().all(|e| e.alive) {
            return;
        }
        self.entities.retain(|e| e.alive);
        self.index.clear();
        for (i, e) in self.entities.iter().enumerate() {
            self.index.insert(e.id, i);
        }
    }

    /// 生存エンティティ数（死亡マーク済みを除く）
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// 走査スロット数（死亡マーク済みを含む）
    pub fn slot_count(&self) -> usize {
        self.entities.len()
    }
}
