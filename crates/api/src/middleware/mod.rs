//! Request extractors that gate access.
//!
//! - [`access::AccessContext`] -- whether the request carries a valid session.
//! - [`access::RequireAccess`] -- requires a valid session.
//! - [`access::LandingAccess`] -- landing page gate, per `LANDING_MODE`.

pub mod access;
