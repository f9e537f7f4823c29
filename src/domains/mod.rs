//! Domain modules containing business logic organized by bounded contexts.
//!
//! - **tools**: the tool registry, invocation contract and toolkits

pub mod tools;
