//! Request handlers.
//!
//! Each submodule provides async handler functions for one area of the
//! service. Handlers delegate to the repositories in `rmc_db` and map errors
//! via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod captain;
pub mod options;
pub mod review;
pub mod suggestion;
