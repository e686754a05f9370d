//! Builder - Evaluator の構築
//!
//! # 学習ポイント
//! - 設定アクション（`Action<T>`）を順番に適用する構成方法
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計、オプトイン）
//!
//! `catch` / `finally` は登録内容をその場で staging 用の `Registry` に積み、
//! `Evaluator::new` がそれを順番にマージします。後に渡したものが勝ちます。

use log::trace;

use super::runtime::Evaluator;
use crate::domain::TypeKey;
use crate::typed::{CatchFn, FinallyFn, Registry};

/// One configuration step for an [`Evaluator`].
///
/// Produced by [`catch`] and [`finally`]; applied in the order given.
pub struct Action<T> {
    staged: Registry<T>,
}

impl<T> Action<T> {
    pub(crate) fn apply(self, registry: &mut Registry<T>) {
        registry.absorb(self.staged);
    }

    /// `true` if applying this action changes nothing (e.g. a `catch` whose
    /// closure does not take exactly one argument).
    pub fn is_noop(&self) -> bool {
        self.staged.is_empty() && !self.staged.has_finalizer()
    }
}

impl<T> std::fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Action").field(&self.staged).finish()
    }
}

/// Register `handler` for the type of its single parameter.
///
/// The parameter type must be named in the closure (`|e: MyError| ...`).
/// A closure with zero, two or three parameters is accepted and ignored.
/// The return value may be `()`, `Option<T>` or `Result<T, E>` with
/// `E: Into<Error>`.
///
/// ```
/// let outcome = snare::attempt(|| -> i32 { panic!("help!") }, [
///     snare::catch(|msg: String| Some(msg.len() as i32)),
/// ]);
/// assert_eq!(outcome.value, Some(5));
/// ```
pub fn catch<T, Args, F>(handler: F) -> Action<T>
where
    F: CatchFn<T, Args>,
{
    let mut staged = Registry::new();
    handler.register(&mut staged);
    Action { staged }
}

/// Register `finalizer`, replacing any earlier one.
///
/// The finalizer either takes nothing or the value produced so far
/// (`|cur: Option<&T>| ...`). A returned value replaces the result; a failure
/// is only reported if nothing failed before it.
pub fn finally<T, Args, F>(finalizer: F) -> Action<T>
where
    F: FinallyFn<T, Args>,
{
    let mut staged = Registry::new();
    finalizer.register(&mut staged);
    Action { staged }
}

/// EvaluatorBuilder は Evaluator を段階的に構築
///
/// # 使用例
/// ```
/// use snare::Evaluator;
///
/// let evaluator = Evaluator::<String>::builder()
///     .catch(|msg: String| Some(msg))
///     .expect::<String>()
///     .build()
///     .expect("String handler registered");
/// assert_eq!(evaluator.run(|| panic!("oops")).value.as_deref(), Some("oops"));
/// ```
///
/// # Fail-fast 設計
/// - `expect::<E>()` で handler が必要な型を宣言
/// - `build()` 時に宣言済みの型が全て登録されているかチェック
pub struct EvaluatorBuilder<T> {
    actions: Vec<Action<T>>,
    expected: Vec<TypeKey>,
}

/// BuildError は Evaluator 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing catch handlers: {0:?}. These types were expected but not registered.")]
    MissingHandlers(Vec<&'static str>),
}

impl<T> EvaluatorBuilder<T> {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            expected: Vec::new(),
        }
    }

    pub fn catch<Args, F>(self, handler: F) -> Self
    where
        F: CatchFn<T, Args>,
    {
        self.action(catch(handler))
    }

    pub fn finally<Args, F>(self, finalizer: F) -> Self
    where
        F: FinallyFn<T, Args>,
    {
        self.action(finally(finalizer))
    }

    pub fn action(mut self, action: Action<T>) -> Self {
        self.actions.push(action);
        self
    }

    /// Require a handler for `E` to be registered by the time of `build()`.
    pub fn expect<E: 'static>(mut self) -> Self {
        self.expected.push(TypeKey::of::<E>());
        self
    }

    pub fn build(self) -> Result<Evaluator<T>, BuildError> {
        let evaluator = Evaluator::new(self.actions);
        let missing: Vec<&'static str> = self
            .expected
            .iter()
            .filter(|key| !evaluator.registry().handles(key))
            .map(TypeKey::name)
            .collect();
        if !missing.is_empty() {
            return Err(BuildError::MissingHandlers(missing));
        }
        trace!("built {evaluator:?}");
        Ok(evaluator)
    }
}

impl<T> Default for EvaluatorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
