//! Receiver port - selector 名によるメッセージ送信
//!
//! 引数と戻り値は `serde_json::Value` で受け渡します（動的な値の表現）。
//! 対応するメソッドがない場合、`send` は [`DoesNotUnderstand`] を
//! [`raise`] します。Evaluator に `catch(|e: DoesNotUnderstand| ...)` を
//! 登録すれば、型で拾えます。

use serde_json::Value;

use crate::domain::raise;

/// Something that answers messages by name.
pub trait Receiver {
    /// Text used in error messages.
    fn describe(&self) -> String;

    /// `None` when there is no method called `selector`.
    fn receive(&self, selector: &str, args: &[Value]) -> Option<Value>;
}

/// The receiver has no method for the selector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Object {receiver} does not understand [{selector}{}]", render_args(.args))]
pub struct DoesNotUnderstand {
    pub receiver: String,
    pub selector: String,
    pub args: Vec<Value>,
}

fn render_args(args: &[Value]) -> String {
    args.iter().map(|arg| format!(" {arg}")).collect()
}

/// Send `selector` to `receiver`, raising [`DoesNotUnderstand`] if unanswered.
pub fn send(receiver: &dyn Receiver, selector: &str, args: Vec<Value>) -> Value {
    match receiver.receive(selector, &args) {
        Some(value) => value,
        None => raise(DoesNotUnderstand {
            receiver: receiver.describe(),
            selector: selector.to_string(),
            args,
        }),
    }
}
