//! Unit tests for the command module.
//!
//! Tests are organised by component: parsing, result shaping, registry,
//! execution, contextual generation, and the service façade.

mod executor_tests;
mod support;
