//! Validation driver and guard entry points

pub mod guard;
pub mod validator;

pub use guard::{Guard, GuardError, RuleSource};
pub use validator::{Validator, ValidatorOptions};
