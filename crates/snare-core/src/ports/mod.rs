//! Ports - 外部の呼び出し機構への抽象化レイヤー
//!
//! Evaluator 自体は何も依存しませんが、型付きエラーを投げる
//! 「名前でメッセージを送る」仕組みをここで定義します。

pub mod dispatch;

pub use self::dispatch::{DoesNotUnderstand, Receiver, send};
