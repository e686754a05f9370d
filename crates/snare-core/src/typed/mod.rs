//! Typed - 型付き handler API
//!
//! # 二層構造
//! - **表層（Typed）**: `CatchFn` / `FinallyFn` - 普通のクロージャをそのまま受け取る
//! - **内部（Dyn）**: `DynHandler` / `DynFinalizer` - object-safe, type erasure

pub mod handler;
pub mod registry;

pub use self::handler::{CatchFn, Current, FinallyFn};
pub use self::registry::Registry;
