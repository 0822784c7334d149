//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//! 作成順を保つため、ID の並びを別に持ちます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Mutation, RepositoryError, Room, RoomId, RoomRepository, Timestamp};

#[derive(Default)]
struct RoomStore {
    rooms: HashMap<RoomId, Room>,
    order: Vec<RoomId>,
}

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    store: Arc<Mutex<RoomStore>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create(&self, room: Room) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        if store.rooms.contains_key(&room.id) {
            return Err(RepositoryError::DuplicateRoom(room.id.to_string()));
        }
        store.order.push(room.id.clone());
        store.rooms.insert(room.id.clone(), room);
        Ok(())
    }

    async fn find(&self, room_id: &RoomId) -> Result<Room, RepositoryError> {
        let store = self.store.lock().await;
        store
            .rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))
    }

    async fn list(&self) -> Vec<Room> {
        let store = self.store.lock().await;
        store
            .order
            .iter()
            .filter_map(|id| store.rooms.get(id).cloned())
            .collect()
    }

    async fn apply_mutation(
        &self,
        room_id: &RoomId,
        mutation: &Mutation,
        at: Timestamp,
    ) -> Result<Room, RepositoryError> {
        let mut store = self.store.lock().await;
        let room = store
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?;
        room.apply(mutation, at);
        Ok(room.clone())
    }
}
