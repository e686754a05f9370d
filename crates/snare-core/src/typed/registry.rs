//! Registry - catch handler と finalizer の登録と管理
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - `TypeId` をキーにした完全一致のディスパッチ（継承・supertype マッチはしない）
//!
//! # 登録ルール
//! - 同じ型への二重登録はエラーにせず、後勝ちで上書き
//! - finalizer は常に 1 個だけ（後勝ち）

use std::collections::HashMap;
use std::fmt;

use log::debug;

use super::handler::{DynFinalizer, DynHandler};
use crate::domain::TypeKey;

/// Handlers keyed by the exact type they accept, plus an optional finalizer.
///
/// Built during setup (mutable), consulted during runs (shared).
pub struct Registry<T> {
    handlers: HashMap<TypeKey, Box<dyn DynHandler<T>>>,
    finalizer: Option<Box<dyn DynFinalizer<T>>>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            finalizer: None,
        }
    }

    /// Last registration for a type wins.
    pub(crate) fn insert_handler(&mut self, handler: Box<dyn DynHandler<T>>) {
        let key = handler.type_key();
        if self.handlers.insert(key, handler).is_some() {
            debug!("replacing catch handler for {key:?}");
        }
    }

    pub(crate) fn set_finalizer(&mut self, finalizer: Box<dyn DynFinalizer<T>>) {
        if self.finalizer.replace(finalizer).is_some() {
            debug!("replacing finalizer");
        }
    }

    /// Move every entry of `staged` into `self`, as if registered now.
    pub(crate) fn absorb(&mut self, staged: Registry<T>) {
        for (_, handler) in staged.handlers {
            self.insert_handler(handler);
        }
        if let Some(finalizer) = staged.finalizer {
            self.set_finalizer(finalizer);
        }
    }

    pub(crate) fn get(&self, key: &TypeKey) -> Option<&dyn DynHandler<T>> {
        self.handlers.get(key).map(|handler| &**handler)
    }

    pub(crate) fn finalizer(&self) -> Option<&dyn DynFinalizer<T>> {
        self.finalizer.as_deref()
    }

    pub fn handles(&self, key: &TypeKey) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn has_finalizer(&self) -> bool {
        self.finalizer.is_some()
    }

    /// Type names with a registered handler, sorted.
    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().map(TypeKey::name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("handlers", &self.registered_types())
            .field("finalizer", &self.has_finalizer())
            .finish()
    }
}
