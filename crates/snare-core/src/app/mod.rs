//! App - Evaluator の構築と実行
//!
//! # 主要コンポーネント
//! - **builder**: 設定アクション（`catch` / `finally`）と `EvaluatorBuilder`
//! - **runtime**: `Evaluator`（guarded invocation + finalizer composition）
//! - **status**: `Outcome` の説明用ビュー

pub mod builder;
pub mod runtime;
pub mod status;

pub use self::builder::{Action, BuildError, EvaluatorBuilder, catch, finally};
pub use self::runtime::Evaluator;
pub use self::status::{ErrorSummary, OutcomeSummary};
