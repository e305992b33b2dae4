//! Chat message grammar and reply texts.
//!
//! ```text
//! message      := direct | broadcast
//! direct       := "@" recipientName ":" body
//! broadcast    := anyTextNotStartingWithAt
//! ```

use super::{ClientName, ProtocolError};

/// Prompt sent to every client right after accept
pub const NAME_PROMPT: &str = "Enter your name: ";

/// Sentinel marking a direct message
const DIRECT_SENTINEL: char = '@';

/// Separator between recipient name and body of a direct message
const DIRECT_SEPARATOR: char = ':';

/// A parsed inbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Addressed to exactly one client by name
    Direct { recipient: ClientName, body: String },
    /// Relayed verbatim to every other client
    Broadcast(String),
}

impl InboundMessage {
    /// Parse one inbound line.
    ///
    /// The split happens on the first `:` only, so the body may itself contain `:`.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::InvalidDirectMessage`] if the line starts with `@` but has no `:`.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        match line.strip_prefix(DIRECT_SENTINEL) {
            Some(rest) => {
                let (recipient, body) = rest
                    .split_once(DIRECT_SEPARATOR)
                    .ok_or(ProtocolError::InvalidDirectMessage)?;
                Ok(Self::Direct {
                    recipient: ClientName::new(recipient),
                    body: body.to_string(),
                })
            }
            None => Ok(Self::Broadcast(line.to_string())),
        }
    }
}

/// Text delivered to recipients: `"{sender}: {body}"`
pub fn format_relay(sender: &ClientName, body: &str) -> String {
    format!("{}: {}", sender, body)
}

/// Delivery confirmation sent back to the sender of a direct message: `"To {recipient}: {body}"`
pub fn format_echo(recipient: &ClientName, body: &str) -> String {
    format!("To {}: {}", recipient, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direct_message() {
        // テスト項目: "@name:body" がダイレクトメッセージとして解析される
        // given (前提条件):
        let line = "@bob:hello";

        // when (操作):
        let message = InboundMessage::parse(line).unwrap();

        // then (期待する結果):
        assert_eq!(
            message,
            InboundMessage::Direct {
                recipient: ClientName::new("bob"),
                body: "hello".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_direct_message_splits_on_first_colon() {
        // テスト項目: 最初の ":" でのみ分割され、本文中の ":" は保持される
        // given (前提条件):
        let line = "@bob:meet at 10:30: ok?";

        // when (操作):
        let message = InboundMessage::parse(line).unwrap();

        // then (期待する結果):
        assert_eq!(
            message,
            InboundMessage::Direct {
                recipient: ClientName::new("bob"),
                body: "meet at 10:30: ok?".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_direct_message_keeps_whitespace() {
        // テスト項目: 宛先名と本文の空白はトリムされない
        // given (前提条件):
        let line = "@bob : hi";

        // when (操作):
        let message = InboundMessage::parse(line).unwrap();

        // then (期待する結果):
        assert_eq!(
            message,
            InboundMessage::Direct {
                recipient: ClientName::new("bob "),
                body: " hi".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_direct_message_with_empty_parts() {
        // テスト項目: 宛先名や本文が空でも形式としては有効
        // given (前提条件):
        let line = "@:";

        // when (操作):
        let message = InboundMessage::parse(line).unwrap();

        // then (期待する結果):
        assert_eq!(
            message,
            InboundMessage::Direct {
                recipient: ClientName::new(""),
                body: String::new(),
            }
        );
    }

    #[test]
    fn test_parse_direct_message_without_separator() {
        // テスト項目: ":" を含まないダイレクトメッセージはエラーになる
        // given (前提条件):
        let line = "@nobody";

        // when (操作):
        let result = InboundMessage::parse(line);

        // then (期待する結果):
        assert_eq!(result, Err(ProtocolError::InvalidDirectMessage));
    }

    #[test]
    fn test_parse_broadcast_message() {
        // テスト項目: "@" で始まらないメッセージはそのままブロードキャストになる
        // given (前提条件):
        let line = "hi all: see you @ 5";

        // when (操作):
        let message = InboundMessage::parse(line).unwrap();

        // then (期待する結果):
        assert_eq!(
            message,
            InboundMessage::Broadcast("hi all: see you @ 5".to_string())
        );
    }

    #[test]
    fn test_parse_empty_line_is_broadcast() {
        // テスト項目: 空行は空のブロードキャストとして扱われる
        // given (前提条件):

        // when (操作):
        let message = InboundMessage::parse("").unwrap();

        // then (期待する結果):
        assert_eq!(message, InboundMessage::Broadcast(String::new()));
    }

    #[test]
    fn test_format_relay_and_echo() {
        // テスト項目: 中継メッセージと送信確認の書式
        // given (前提条件):
        let alice = ClientName::new("alice");
        let bob = ClientName::new("bob");

        // when (操作) / then (期待する結果):
        assert_eq!(format_relay(&alice, "hello"), "alice: hello");
        assert_eq!(format_echo(&bob, "hello"), "To bob: hello");
    }
}
