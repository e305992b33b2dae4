//! InMemory Client Registry 実装
//!
//! ドメイン層が定義する ClientRegistry trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! All operations take the same lock and never hold it across an `.await`,
//! so a blocking `std::sync::Mutex` is used. Broadcast fan-out works on a
//! snapshot returned by `all_except`, so no sends happen under the lock.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::domain::{ClientName, ClientRegistry, ConnectionId, RegisteredClient};

/// インメモリ Client Registry 実装
#[derive(Debug, Default)]
pub struct InMemoryClientRegistry {
    /// Key: connection id, Value: registry entry
    // std Mutex: never held across `.await`, and `Registration::drop` locks it synchronously
    clients: Mutex<HashMap<ConnectionId, RegisteredClient>>,
}

impl InMemoryClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the map. Poisoning is ignored: every critical section is a single map operation.
    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, RegisteredClient>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ClientRegistry for InMemoryClientRegistry {
    fn register(&self, client: RegisteredClient) {
        let mut clients = self.lock();
        if clients.values().any(|c| c.name == client.name) {
            tracing::debug!(
                "Name '{}' is already in use; direct messages to it are ambiguous",
                client.name
            );
        }
        clients.insert(client.id, client);
    }

    fn unregister(&self, id: &ConnectionId) -> Option<RegisteredClient> {
        self.lock().remove(id)
    }

    fn lookup_by_name(&self, name: &ClientName) -> Option<RegisteredClient> {
        self.lock().values().find(|c| &c.name == name).cloned()
    }

    fn all_except(&self, id: &ConnectionId) -> Vec<RegisteredClient> {
        self.lock()
            .values()
            .filter(|c| &c.id != id)
            .cloned()
            .collect()
    }

    fn count(&self) -> usize {
        self.lock().len()
    }
}
