//! Owner identity.

pub mod model;

pub use model::Owner;
