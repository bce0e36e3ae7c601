//! Access-gate primitives.
//!
//! - [`session`] -- invite-code session token generation and validation.

pub mod session;
