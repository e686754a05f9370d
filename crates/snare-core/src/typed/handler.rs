//! Handler traits - 捕捉値を受け取る handler と finalizer の定義
//!
//! # 学習ポイント
//! - 引数の形で impl を選ぶマーカー型パラメータ (`CatchFn<T, Args>`)
//! - Object-safe trait (`DynHandler<T>`)
//! - Type erasure パターン (`TypedHandler<E, F>` → `DynHandler<T>`)
//!
//! `catch` には任意の引数個数のクロージャを渡せますが、
//! handler として登録されるのは引数がちょうど 1 個のものだけです。
//! それ以外の形は `register` が何もせず、登録は黙って無視されます。

use std::any::Any;
use std::marker::PhantomData;

use log::debug;

use super::registry::Registry;
use crate::domain::{Captured, Outcome, TypeKey};

/// Object-safe form of a catch handler.
///
/// `TypedHandler<E, F>` を `dyn DynHandler<T>` に変換することで、
/// 引数の型が異なる handler を同じ `HashMap` に格納できます。
pub(crate) trait DynHandler<T> {
    fn handle_dyn(&self, captured: Captured) -> Outcome<T>;
    fn type_key(&self) -> TypeKey;
}

pub(crate) struct TypedHandler<E, F> {
    handler: F,
    _marker: PhantomData<fn(E)>,
}

impl<E, F> TypedHandler<E, F> {
    pub(crate) fn new(handler: F) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<T, E, F, R> DynHandler<T> for TypedHandler<E, F>
where
    E: Any + Send,
    F: Fn(E) -> R,
    R: Into<Outcome<T>>,
{
    fn handle_dyn(&self, captured: Captured) -> Outcome<T> {
        match captured.downcast::<E>() {
            Ok(value) => (self.handler)(value).into(),
            Err(error) => Outcome::failure(error),
        }
    }

    fn type_key(&self) -> TypeKey {
        TypeKey::of::<E>()
    }
}

/// Anything that can be passed to [`catch`](crate::catch).
///
/// `Args` is the argument tuple of the closure. Only `(E,)` registers a
/// handler; the other shapes are accepted and dropped.
pub trait CatchFn<T, Args> {
    #[doc(hidden)]
    fn register(self, registry: &mut Registry<T>);
}

impl<T, F, R> CatchFn<T, ()> for F
where
    F: Fn() -> R,
{
    fn register(self, _registry: &mut Registry<T>) {
        debug!("ignoring catch handler with no parameter");
    }
}

impl<T, E, F, R> CatchFn<T, (E,)> for F
where
    E: Any + Send,
    F: Fn(E) -> R + 'static,
    R: Into<Outcome<T>>,
{
    fn register(self, registry: &mut Registry<T>) {
        registry.insert_handler(Box::new(TypedHandler::<E, F>::new(self)));
    }
}

impl<T, A, B, F, R> CatchFn<T, (A, B)> for F
where
    F: Fn(A, B) -> R,
{
    fn register(self, _registry: &mut Registry<T>) {
        debug!("ignoring catch handler with 2 parameters");
    }
}

impl<T, A, B, C, F, R> CatchFn<T, (A, B, C)> for F
where
    F: Fn(A, B, C) -> R,
{
    fn register(self, _registry: &mut Registry<T>) {
        debug!("ignoring catch handler with 3 parameters");
    }
}

/// Object-safe form of a finalizer.
pub(crate) trait DynFinalizer<T> {
    fn finish(&self, current: Option<&T>) -> Outcome<T>;
}

struct Finalizer<F, Args> {
    finalizer: F,
    _marker: PhantomData<fn(Args)>,
}

/// Marker for finalizers that take the in-flight value.
pub struct Current;

/// Anything that can be passed to [`finally`](crate::finally): either
/// `Fn() -> R` or `Fn(Option<&T>) -> R`.
pub trait FinallyFn<T, Args> {
    #[doc(hidden)]
    fn register(self, registry: &mut Registry<T>);
}

impl<T, F, R> DynFinalizer<T> for Finalizer<F, ()>
where
    F: Fn() -> R,
    R: Into<Outcome<T>>,
{
    fn finish(&self, _current: Option<&T>) -> Outcome<T> {
        (self.finalizer)().into()
    }
}

impl<T, F, R> DynFinalizer<T> for Finalizer<F, Current>
where
    F: Fn(Option<&T>) -> R,
    R: Into<Outcome<T>>,
{
    fn finish(&self, current: Option<&T>) -> Outcome<T> {
        (self.finalizer)(current).into()
    }
}

impl<T, F, R> FinallyFn<T, ()> for F
where
    F: Fn() -> R + 'static,
    R: Into<Outcome<T>>,
{
    fn register(self, registry: &mut Registry<T>) {
        registry.set_finalizer(Box::new(Finalizer::<F, ()> {
            finalizer: self,
            _marker: PhantomData,
        }));
    }
}

impl<T, F, R> FinallyFn<T, Current> for F
where
    F: Fn(Option<&T>) -> R + 'static,
    R: Into<Outcome<T>>,
{
    fn register(self, registry: &mut Registry<T>) {
        registry.set_finalizer(Box::new(Finalizer::<F, Current> {
            finalizer: self,
            _marker: PhantomData,
        }));
    }
}
