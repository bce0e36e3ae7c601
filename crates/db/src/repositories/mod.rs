//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods that must compose inside
//! another repository's transaction take any `PgExecutor` instead.

pub mod assignment_repo;
pub mod captain_repo;
pub mod review_repo;
pub mod suggestion_repo;

pub use assignment_repo::AssignmentRepo;
pub use captain_repo::CaptainRepo;
pub use review_repo::ReviewRepo;
pub use suggestion_repo::SuggestionRepo;
