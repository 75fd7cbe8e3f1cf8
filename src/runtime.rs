//! Runtime for executing conversations
//!
//! Owns the controller, runs completion requests in the background, and
//! publishes a fresh view after every event.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ChatRuntime;
