#![forbid(unsafe_code)]

//! Rules, rule loading, coercion and the checker registry

mod builtin;
pub mod coerce;
pub mod definition;
pub mod registry;
mod rule;

pub use coerce::{Coercion, CoercionKind};
pub use registry::{CheckContext, Checker, CheckerRegistry, RuleCheck};
pub use rule::{CoerceFn, ConvertType, OPTIONAL_MARKER, Pattern, Rule, RuleSet, RuleSpec, normalize};
