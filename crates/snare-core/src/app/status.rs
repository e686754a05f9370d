//! Status - Outcome を説明用の形に変換
//!
//! 値そのものは任意の型なので、`Debug` 表現の文字列として持ちます。
//! エラーは variant と表示文字列だけを残します（型情報は失われます）。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Error, ErrorKind, Outcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub kind: ErrorKind,
    pub message: String,
}

/// Serializable view of an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutcomeSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSummary>,
}

impl From<&Error> for ErrorSummary {
    fn from(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl<T: fmt::Debug> Outcome<T> {
    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            value: self.value.as_ref().map(|value| format!("{value:?}")),
            error: self.error.as_ref().map(ErrorSummary::from),
        }
    }
}

/// `<value> <error>` with `<nil>` for a missing half.
impl fmt::Display for OutcomeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value.as_deref().unwrap_or("<nil>");
        match &self.error {
            Some(error) => write!(f, "{value} {}", error.message),
            None => write!(f, "{value} <nil>"),
        }
    }
}
