//! Captured - panic payload の分類と型キー
//!
//! `catch_unwind` が返す `Box<dyn Any + Send>` は型が消えているので、
//! 捕捉した時点で「エラーか、それ以外か」を判定し、
//! handler 検索に使う [`TypeKey`] を取り出しておきます。
//!
//! # 学習ポイント
//! - `(*payload).type_id()` と `payload.type_id()` の違い（後者は Box 自身の型）
//! - supertrait を使った二重の type erasure（`dyn Error` と `dyn Any` の両方として扱う）

use std::any::{Any, TypeId};
use std::error::Error as StdError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;
use std::panic;

use super::errors::{BoxError, Error};

/// Rendering used for payloads with no known textual form.
pub const OPAQUE_PAYLOAD: &str = "Box<dyn Any>";

/// Exact runtime type of a captured value.
///
/// Equality and hashing use the `TypeId` only; the name is for logs.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: Option<&'static str>,
}

impl TypeKey {
    pub fn of<E: Any>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: Some(std::any::type_name::<E>()),
        }
    }

    fn unnamed(id: TypeId) -> Self {
        Self { id, name: None }
    }

    pub fn name(&self) -> &'static str {
        self.name.unwrap_or("<unknown>")
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An error value usable both as `dyn Error` and as `dyn Any`.
pub(crate) trait Throwable: StdError + Send + Sync + 'static {
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
    fn into_boxed_error(self: Box<Self>) -> BoxError;
}

impl<E: StdError + Send + Sync + 'static> Throwable for E {
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }

    fn into_boxed_error(self: Box<Self>) -> BoxError {
        self
    }
}

/// Payload placed on the unwind by [`raise`].
struct Raised {
    key: TypeKey,
    error: Box<dyn Throwable>,
}

/// Panic with a typed error.
///
/// Unlike `panic_any(error)`, the payload is recognized as an error: with no
/// matching handler it comes back as [`Error::Raised`] with its concrete type
/// intact, and handlers registered for `E` still receive it by value.
///
/// `panic_any(error)` only keeps the error contract for `std::io::Error`,
/// `std::fmt::Error` and boxed `dyn Error` payloads. Any other error type
/// passed to `panic_any` is reported as an opaque [`Error::Panic`].
pub fn raise<E>(error: E) -> !
where
    E: StdError + Send + Sync + 'static,
{
    panic::panic_any(Raised {
        key: TypeKey::of::<E>(),
        error: Box::new(error),
    })
}

/// A panic payload after classification.
pub(crate) enum Captured {
    /// A typed error from [`raise`].
    Raised {
        key: TypeKey,
        error: Box<dyn Throwable>,
    },
    /// A crate [`Error`] used as the payload.
    Failure(Error),
    /// Anything else, keyed by its exact type.
    Value {
        key: TypeKey,
        payload: Box<dyn Any + Send>,
    },
}

impl Captured {
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<Raised>() {
            Ok(raised) => {
                let Raised { key, error } = *raised;
                if key == TypeKey::of::<Error>() {
                    if let Ok(inner) = error.into_any().downcast::<Error>() {
                        return Captured::Failure(*inner);
                    }
                    return Captured::Failure(Error::Mismatch(key.name()));
                }
                return Captured::Raised { key, error };
            }
            Err(other) => other,
        };
        let payload = match payload.downcast::<Error>() {
            Ok(error) => return Captured::Failure(*error),
            Err(other) => other,
        };
        let id = (*payload).type_id();
        let key = if id == TypeId::of::<String>() {
            TypeKey::of::<String>()
        } else if id == TypeId::of::<&'static str>() {
            TypeKey::of::<&'static str>()
        } else {
            TypeKey::unnamed(id)
        };
        Captured::Value { key, payload }
    }

    /// `panic!("literal")` の `&'static str` を `String` に変換
    ///
    /// `&'static str` 用の handler がないときに使い、`panic!` の二つの形が
    /// 同じ `String` handler に届くようにします。
    pub fn into_owned_message(self) -> Self {
        match self {
            Captured::Value { key, payload } if key == TypeKey::of::<&'static str>() => {
                match payload.downcast::<&'static str>() {
                    Ok(message) => Captured::Value {
                        key: TypeKey::of::<String>(),
                        payload: Box::new(message.to_string()),
                    },
                    Err(payload) => Captured::Value { key, payload },
                }
            }
            other => other,
        }
    }

    /// Key used for handler lookup.
    pub fn key(&self) -> TypeKey {
        match self {
            Captured::Raised { key, .. } | Captured::Value { key, .. } => *key,
            Captured::Failure(_) => TypeKey::of::<Error>(),
        }
    }

    /// Take the captured value as `E`.
    pub fn downcast<E: Any>(self) -> Result<E, Error> {
        let any: Box<dyn Any> = match self {
            Captured::Raised { error, .. } => error.into_any(),
            Captured::Failure(error) => Box::new(error),
            Captured::Value { payload, .. } => payload,
        };
        any.downcast::<E>()
            .map(|value| *value)
            .map_err(|_| Error::Mismatch(std::any::type_name::<E>()))
    }

    /// Error reported when no handler took the value.
    pub fn into_error(self) -> Error {
        match self {
            Captured::Raised { error, .. } => Error::Raised(error.into_boxed_error()),
            Captured::Failure(error) => error,
            Captured::Value { payload, .. } => std_error(payload)
                .unwrap_or_else(|payload| Error::Panic(render(payload.as_ref()))),
        }
    }
}

impl fmt::Debug for Captured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Captured::Raised { key, error } => f
                .debug_struct("Raised")
                .field("key", key)
                .field("error", &error.to_string())
                .finish(),
            Captured::Failure(error) => f.debug_tuple("Failure").field(error).finish(),
            Captured::Value { key, payload } => f
                .debug_struct("Value")
                .field("key", key)
                .field("rendering", &render(payload.as_ref()))
                .finish(),
        }
    }
}

/// Error types from std that keep the error contract when passed to `panic_any`.
fn std_error(payload: Box<dyn Any + Send>) -> Result<Error, Box<dyn Any + Send>> {
    let payload = match payload.downcast::<BoxError>() {
        Ok(error) => return Ok(Error::Raised(*error)),
        Err(other) => other,
    };
    let payload = match payload.downcast::<io::Error>() {
        Ok(error) => return Ok(Error::raised(*error)),
        Err(other) => other,
    };
    match payload.downcast::<fmt::Error>() {
        Ok(error) => Ok(Error::raised(*error)),
        Err(other) => Err(other),
    }
}

macro_rules! render_display {
    ($value:expr; $($ty:ty),+ $(,)?) => {
        $(
            if let Some(v) = $value.downcast_ref::<$ty>() {
                return v.to_string();
            }
        )+
    };
}

/// Default textual rendering of a non-error payload.
pub fn render(value: &(dyn Any + Send)) -> String {
    render_display!(value;
        String, &'static str,
        i8, i16, i32, i64, i128, isize,
        u8, u16, u32, u64, u128, usize,
        f32, f64, bool, char,
    );
    OPAQUE_PAYLOAD.to_string()
}
