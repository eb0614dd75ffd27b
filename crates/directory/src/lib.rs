//! `tenderflow-directory`: organization and user membership facts.
//!
//! Organizations and users are created outside this system; the core only
//! reads them through the [`Directory`] trait.

pub mod directory;
pub mod organization;
pub mod user;

pub use directory::{Directory, DirectoryError, InMemoryDirectory};
pub use organization::{Organization, OrganizationType};
pub use user::User;
