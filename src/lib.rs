//! WorldQuest roadmap library.
//!
//! Exposes the country atlas, roadmap unlock logic, and protocol modules for
//! use by integration tests and the binary entry point.

pub mod atlas;
pub mod engine;
pub mod protocol;
pub mod roadmap;
