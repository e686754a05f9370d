//! Errors - 捕捉結果として返されるエラー型
//!
//! # 分類
//! - **Raised**: 捕捉値がもともとエラーだった（型を保ったまま通す）
//! - **Panic**: 捕捉値がエラーではなかった（文字列表現に変換）
//! - **Mismatch**: 登録済み handler が捕捉値を受け取れなかった

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};

/// Boxed error that can cross a panic boundary.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error half of an [`Outcome`](super::Outcome).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The captured value was already an error; it is passed through unchanged.
    #[error(transparent)]
    Raised(#[from] BoxError),

    /// The captured value was not an error; holds its textual rendering.
    #[error("{0}")]
    Panic(String),

    #[error("captured value is not a `{0}`")]
    Mismatch(&'static str),
}

/// ErrorKind は Error の variant を表す（status view 用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Raised,
    Panic,
    Mismatch,
}

impl Error {
    /// Converted error carrying `message` verbatim.
    pub fn panic(message: impl Into<String>) -> Self {
        Error::Panic(message.into())
    }

    /// Wrap a typed error so that its concrete type survives.
    pub fn raised<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error::Raised(Box::new(error))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Raised(_) => ErrorKind::Raised,
            Error::Panic(_) => ErrorKind::Panic,
            Error::Mismatch(_) => ErrorKind::Mismatch,
        }
    }

    /// `true` if this is a propagated error of concrete type `E`.
    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.downcast_ref::<E>().is_some()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            Error::Raised(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Recover the concrete error, or get `self` back.
    pub fn downcast<E: StdError + 'static>(self) -> Result<E, Self> {
        match self {
            Error::Raised(inner) => inner.downcast::<E>().map(|e| *e).map_err(Error::Raised),
            other => Err(other),
        }
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Panic(message)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::Panic(message.to_string())
    }
}
