//! Plan generation and validation engine.
//!
//! Everything here is a pure function over its inputs: no I/O, no logging,
//! no shared state. Callers persist and report results.

pub mod allocator;
pub mod editing;
pub mod resolver;
pub mod validator;

pub use allocator::{Allocation, allocate, build_calendar};
pub use editing::{
    EditOutcome, GeneratedPlan, add_course, generate_plan, regenerate, remove_course,
};
pub use resolver::order;
pub use validator::{PlanProgress, ValidationResult, progress, validate};
