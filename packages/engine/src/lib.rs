//! The Zephyr utility compilation engine: theme store, variant registry,
//! utility resolution, and stylesheet assembly.
//!
//! All state is explicit: resolution receives a read-only [`ResolveContext`]
//! snapshot, so per-candidate work is order-independent and output ordering
//! is reimposed by the assembler, never by execution order.

pub mod assembler;
pub mod resolver;
pub mod theme;
pub mod utilities;
pub mod variants;

pub use assembler::assemble;
pub use resolver::{resolve_candidate, GeneratedRule, Resolution, ResolveContext};
pub use theme::ThemeStore;
pub use utilities::{FunctionalUtility, ValueType};
pub use variants::{
    AppliedVariant, PluginRegistrar, VariantDefinition, VariantKind, VariantRegistry,
};
