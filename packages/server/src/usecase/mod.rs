//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層（セッション）から呼び出され、Domain 層を操作します。

pub mod route_message;

pub use route_message::{Delivery, RouteMessageUseCase};
