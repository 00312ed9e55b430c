//! Structured searches over the attached dictionaries.

mod engine;
mod sql;

pub use engine::{EngineState, QueryEngine};
pub use sql::{Catalog, PreparedQuery, build};
