//! Folder domain entities.

pub mod model;
pub mod name;
pub mod status;

pub use model::{CreateFolder, Folder};
pub use name::{validate_folder_name, validate_path_segment};
pub use status::FolderStatus;
