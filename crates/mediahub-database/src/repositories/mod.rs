//! Concrete PostgreSQL repositories.

pub mod folder;
pub mod video;

pub use folder::FolderRepository;
pub use video::VideoRepository;
