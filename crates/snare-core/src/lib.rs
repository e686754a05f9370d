//! snare-core
//!
//! try/catch/finally for Rust panics.
//!
//! A target closure runs under `catch_unwind`. A panic is dispatched to the
//! catch handler registered for the payload's exact type; an optional
//! finalizer runs afterwards and may substitute the value. The caller always
//! gets an [`Outcome`] (value, error) back instead of an unwind.
//!
//! # モジュール構成
//! - **domain**: 捕捉値の分類（`Captured`, `TypeKey`）, `Outcome`, `Error`
//! - **typed**: 型付き handler API（`CatchFn`, `FinallyFn`, `Registry`）
//! - **app**: `Evaluator`, 設定アクション（`catch`, `finally`）, builder, status
//! - **call**: タプル引数での呼び出し（`Apply`, `bind`）
//! - **ports / impls**: 名前によるメッセージ送信（型付きエラーの例）
//!
//! ```
//! use snare::{attempt, bind, catch, finally};
//!
//! let outcome = attempt(
//!     bind(|x: i32| -> i32 { if x > 5 { panic!("too big: {x}") } x }, (10,)),
//!     [catch(|msg: String| Some(msg.len() as i32)), finally(|| ())],
//! );
//! assert_eq!(outcome.value, Some(11));
//! assert!(outcome.error.is_none());
//! ```

pub mod app;
pub mod call;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod typed;

pub use self::app::{
    Action, BuildError, ErrorSummary, Evaluator, EvaluatorBuilder, OutcomeSummary, catch, finally,
};
pub use self::call::{Apply, bind};
pub use self::domain::{BoxError, Error, ErrorKind, Outcome, TypeKey, raise};

/// Build a one-off [`Evaluator`] from `actions` and run `target` in it.
pub fn attempt<T, F>(target: F, actions: impl IntoIterator<Item = Action<T>>) -> Outcome<T>
where
    F: FnOnce() -> T,
{
    Evaluator::new(actions).run(target)
}

/// Build a reusable [`Evaluator`]; same as [`Evaluator::new`].
pub fn new<T>(actions: impl IntoIterator<Item = Action<T>>) -> Evaluator<T> {
    Evaluator::new(actions)
}

/// Call `f` with `args`, converting a panic into an error.
///
/// No handlers and no finalizer are involved.
///
/// ```
/// let outcome = snare::apply(|a: i32, b: i32| a / b, (1, 0));
/// assert!(outcome.value.is_none());
/// assert!(outcome.error.unwrap().to_string().contains("divide by zero"));
/// ```
pub fn apply<F, Args>(f: F, args: Args) -> Outcome<F::Output>
where
    F: Apply<Args>,
{
    Evaluator::default().run(move || f.apply(args))
}
