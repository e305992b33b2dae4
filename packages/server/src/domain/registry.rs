//! Client registry interface.
//!
//! ドメイン層が必要とする接続管理のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{ClientName, ConnectionId};

/// Messages that may wait for one connection's writer before new ones are dropped
pub const OUTBOX_CAPACITY: usize = 256;

/// Outbound channel of one connection, drained by that connection's writer task
pub type Outbox = mpsc::Sender<String>;

/// Create the outbox of a new connection
pub fn outbox_channel() -> (Outbox, mpsc::Receiver<String>) {
    mpsc::channel(OUTBOX_CAPACITY)
}

/// A fully joined client: one registry entry
#[derive(Debug, Clone)]
pub struct RegisteredClient {
    pub id: ConnectionId,
    pub name: ClientName,
    /// Handle for writing to the connection; the socket itself stays owned by its session
    pub outbox: Outbox,
    /// Unix timestamp when the client joined (milliseconds)
    pub connected_at: i64,
}

impl RegisteredClient {
    pub fn new(id: ConnectionId, name: ClientName, outbox: Outbox, connected_at: i64) -> Self {
        Self {
            id,
            name,
            outbox,
            connected_at,
        }
    }

    /// Queue `text` for delivery to this client without waiting.
    ///
    /// Fails if the client's writer task has stopped, or if the client is not
    /// reading and [`OUTBOX_CAPACITY`] messages are already queued. The message
    /// is dropped in both cases.
    pub fn push(&self, text: String) -> Result<(), mpsc::error::TrySendError<String>> {
        self.outbox.try_send(text)
    }
}

/// Client Registry trait
///
/// Every method is a single atomic operation with respect to all others.
/// Implementations must be safe to share between all session tasks.
#[cfg_attr(test, mockall::automock)]
pub trait ClientRegistry: Send + Sync {
    /// Insert an entry. Duplicate names are allowed and coexist.
    fn register(&self, client: RegisteredClient);

    /// Remove the entry for `id`, returning it. No-op if already absent.
    fn unregister(&self, id: &ConnectionId) -> Option<RegisteredClient>;

    /// Return one client registered under `name`.
    ///
    /// With duplicate names, which entry is returned is unspecified.
    fn lookup_by_name(&self, name: &ClientName) -> Option<RegisteredClient>;

    /// Snapshot of every registered client except `id`, for broadcast fan-out
    fn all_except(&self, id: &ConnectionId) -> Vec<RegisteredClient>;

    /// Number of registered clients
    fn count(&self) -> usize;
}

/// Registry membership of one session.
///
/// Registers on construction and unregisters when dropped, so the entry is
/// removed exactly once on every exit path of the session, panics included.
pub struct Registration {
    registry: Arc<dyn ClientRegistry>,
    client: RegisteredClient,
}

impl Registration {
    pub fn new(registry: Arc<dyn ClientRegistry>, client: RegisteredClient) -> Self {
        registry.register(client.clone());
        tracing::debug!("Client '{}' ({}) registered", client.name, client.id);
        Self { registry, client }
    }

    pub fn client(&self) -> &RegisteredClient {
        &self.client
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        match self.registry.unregister(&self.client.id) {
            Some(_) => tracing::debug!(
                "Client '{}' ({}) unregistered",
                self.client.name,
                self.client.id
            ),
            None => tracing::warn!(
                "Client '{}' ({}) was already absent from the registry",
                self.client.name,
                self.client.id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client(name: &str) -> RegisteredClient {
        let (outbox, _rx) = outbox_channel();
        RegisteredClient::new(ConnectionId::generate(), ClientName::new(name), outbox, 1000)
    }

    #[test]
    fn test_registration_registers_and_unregisters_once() {
        // テスト項目: Registration は生成時に登録し、破棄時にちょうど 1 回だけ登録解除する
        // given (前提条件):
        let client = create_test_client("alice");
        let id = client.id;
        let mut registry = MockClientRegistry::new();
        registry
            .expect_register()
            .withf(move |c| c.id == id)
            .times(1)
            .return_const(());
        registry
            .expect_unregister()
            .withf(move |unregistered| *unregistered == id)
            .times(1)
            .returning(|_| None);
        let registry: Arc<dyn ClientRegistry> = Arc::new(registry);

        // when (操作):
        let registration = Registration::new(registry, client);
        assert_eq!(registration.client().name.as_str(), "alice");
        drop(registration);

        // then (期待する結果):
        // MockClientRegistry verifies call counts when dropped
    }

    #[test]
    fn test_registration_unregisters_on_panic() {
        // テスト項目: パニックで巻き戻された場合でも登録解除される
        // given (前提条件):
        let client = create_test_client("alice");
        let mut registry = MockClientRegistry::new();
        registry.expect_register().times(1).return_const(());
        registry.expect_unregister().times(1).returning(|_| None);
        let registry: Arc<dyn ClientRegistry> = Arc::new(registry);

        // when (操作):
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _registration = Registration::new(registry, client);
            panic!("session failed mid-loop");
        }));

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_push_fails_after_receiver_dropped() {
        // テスト項目: 書き込みタスク終了後の push はエラーになる
        // given (前提条件):
        let (outbox, rx) = outbox_channel();
        let client =
            RegisteredClient::new(ConnectionId::generate(), ClientName::new("bob"), outbox, 0);
        drop(rx);

        // when (操作):
        let result = client.push("hello".to_string());

        // then (期待する結果):
        assert!(matches!(result, Err(mpsc::error::TrySendError::Closed(_))));
    }

    #[test]
    fn test_push_drops_messages_beyond_capacity() {
        // テスト項目: 読み出されないクライアントのキューは上限で頭打ちになり、超過分は破棄される
        // given (前提条件):
        let (outbox, mut rx) = outbox_channel();
        let client =
            RegisteredClient::new(ConnectionId::generate(), ClientName::new("bob"), outbox, 0);

        // when (操作):
        let accepted = (0..OUTBOX_CAPACITY + 50)
            .filter(|i| client.push(format!("message {}", i)).is_ok())
            .count();
        let overflow = client.push("one more".to_string());

        // then (期待する結果):
        assert_eq!(accepted, OUTBOX_CAPACITY);
        assert!(matches!(overflow, Err(mpsc::error::TrySendError::Full(_))));
        let mut queued = 0;
        while let Ok(message) = rx.try_recv() {
            assert_eq!(message, format!("message {}", queued));
            queued += 1;
        }
        assert_eq!(queued, OUTBOX_CAPACITY);

        // Draining frees capacity again
        assert!(client.push("after drain".to_string()).is_ok());
    }
}
