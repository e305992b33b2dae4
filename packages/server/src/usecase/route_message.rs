//! UseCase: メッセージのルーティング処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RouteMessageUseCase::execute() メソッド
//! - ダイレクトメッセージ、ブロードキャスト、プロトコルエラーの返信
//!
//! ### どのような状況を想定しているか
//! - 正常系：宛先が存在するダイレクトメッセージ、複数人へのブロードキャスト
//! - 異常系：":" のないダイレクトメッセージ、存在しない宛先
//! - エッジケース：送信者のみが接続している場合、受信者の書き込みタスクが終了済みの場合

use std::sync::Arc;

use crate::domain::{
    ClientName, ClientRegistry, InboundMessage, ProtocolError, RegisteredClient, format_echo,
    format_relay,
};

/// Outcome of a successfully routed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Relayed to one recipient and echoed back to the sender
    Direct { recipient: ClientName },
    /// Relayed to `recipients` other clients
    Broadcast { recipients: usize },
}

/// メッセージルーティングのユースケース
pub struct RouteMessageUseCase {
    registry: Arc<dyn ClientRegistry>,
}

impl RouteMessageUseCase {
    pub fn new(registry: Arc<dyn ClientRegistry>) -> Self {
        Self { registry }
    }

    /// Route one inbound line from `sender`.
    ///
    /// Protocol errors are replied to the sender before being returned, so the
    /// caller only needs to log them and keep the session going. Sends are
    /// fire-and-forget: a recipient whose writer has stopped, or whose outbox
    /// is full because it is not reading, is skipped and the message dropped.
    ///
    /// # Arguments
    ///
    /// * `sender` - The registry entry of the client that sent `line`
    /// * `line` - One inbound frame
    pub fn execute(
        &self,
        sender: &RegisteredClient,
        line: &str,
    ) -> Result<Delivery, ProtocolError> {
        let result = match InboundMessage::parse(line) {
            Ok(InboundMessage::Direct { recipient, body }) => {
                self.send_direct(sender, recipient, &body)
            }
            Ok(InboundMessage::Broadcast(body)) => Ok(self.broadcast(sender, &body)),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::debug!("Rejected message from '{}': {}", sender.name, e);
            if let Err(e) = sender.push(e.to_string()) {
                tracing::warn!("Dropped error reply to '{}': {}", sender.name, e);
            }
        }

        result
    }

    fn send_direct(
        &self,
        sender: &RegisteredClient,
        recipient_name: ClientName,
        body: &str,
    ) -> Result<Delivery, ProtocolError> {
        let recipient = self
            .registry
            .lookup_by_name(&recipient_name)
            .ok_or_else(|| ProtocolError::UserNotFound(recipient_name.clone()))?;

        if let Err(e) = recipient.push(format_relay(&sender.name, body)) {
            tracing::warn!("Dropped direct message to '{}': {}", recipient.name, e);
        }
        if let Err(e) = sender.push(format_echo(&recipient_name, body)) {
            tracing::warn!("Dropped delivery echo to '{}': {}", sender.name, e);
        }

        tracing::debug!(
            "Direct message from '{}' to '{}'",
            sender.name,
            recipient_name
        );
        Ok(Delivery::Direct {
            recipient: recipient_name,
        })
    }

    fn broadcast(&self, sender: &RegisteredClient, body: &str) -> Delivery {
        let text = format_relay(&sender.name, body);
        let targets = self.registry.all_except(&sender.id);

        let mut recipients = 0;
        for target in targets {
            // ブロードキャストでは一部の送信失敗を許容
            match target.push(text.clone()) {
                Ok(()) => recipients += 1,
                Err(e) => tracing::warn!("Dropped broadcast to '{}': {}", target.name, e),
            }
        }

        tracing::debug!(
            "Broadcasted message from '{}' to {} client(s)",
            sender.name,
            recipients
        );
        Delivery::Broadcast { recipients }
    }
}
