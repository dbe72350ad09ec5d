//! Custom Axum extractors.

pub mod auth;
pub mod path;

pub use auth::AuthOwner;
pub use path::parse_folder_id;
