//! Cohort Plugin System
//!
//! Provides the `FunctionPlugin` trait for exposing statistics as named,
//! self-describing functions, and the registry that dispatches calls to them.

mod traits;
mod registry;
mod context;

pub use traits::{FunctionPlugin, FunctionMeta, ArgMeta};
pub use registry::PluginRegistry;
pub use context::EvalContext;

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{FunctionPlugin, FunctionMeta, ArgMeta, PluginRegistry, EvalContext};
    pub use cohort_core::prelude::*;
}
