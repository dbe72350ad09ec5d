//! # mediahub-entity
//!
//! Domain entity models for MediaHub. Every struct in this crate
//! represents a catalog row or a domain value object. Catalog entities
//! additionally derive `sqlx::FromRow`.

pub mod folder;
pub mod owner;
pub mod video;
