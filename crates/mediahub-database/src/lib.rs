//! # mediahub-database
//!
//! The folder catalog. [`FolderCatalog`] is the only writer of folder and
//! video records; every operation is scoped by owner id. Two
//! implementations are provided: [`PgFolderCatalog`] over PostgreSQL and
//! [`MemoryFolderCatalog`] for tests and local development.

pub mod catalog;
pub mod pool;
pub mod repositories;

pub use catalog::{CatalogOp, FolderCatalog, MemoryFolderCatalog, PgFolderCatalog, PrefixRewrite};
pub use pool::CatalogPool;
