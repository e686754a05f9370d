//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **MethodTable**: 名前付きクロージャから作る `Receiver`

pub mod dispatch;

pub use self::dispatch::MethodTable;
