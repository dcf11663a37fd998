//! Lowering of planner expressions into a typed expression IR for
//! incremental dataflow programs.
pub mod config;
pub mod expr;
pub mod literal;
pub mod lower;
pub mod rex;
pub mod runtime;
pub mod types;
