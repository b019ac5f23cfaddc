//! Retry module
//! - policy.rs: exponential backoff policy and executor

pub mod policy;

pub use policy::*;
