//! Keeps stored video paths in step with folder names.

use std::sync::Arc;

use tracing::info;

use mediahub_core::result::AppResult;
use mediahub_core::types::{FolderId, OwnerId};
use mediahub_database::{FolderCatalog, PrefixRewrite};
use mediahub_remote::paths::content_prefix;

/// Rewrites video `path`/`url` fields after a folder rename.
#[derive(Debug, Clone)]
pub struct VideoPathRewriter {
    catalog: Arc<dyn FolderCatalog>,
}

impl VideoPathRewriter {
    /// Creates a rewriter writing through `catalog`.
    pub fn new(catalog: Arc<dyn FolderCatalog>) -> Self {
        Self { catalog }
    }

    /// Replace the first occurrence of `old_prefix` with `new_prefix` in
    /// every video of the folder. Zero matching videos is not an error.
    pub async fn rewrite_folder_prefix(
        &self,
        owner_id: OwnerId,
        folder_id: FolderId,
        old_prefix: &str,
        new_prefix: &str,
    ) -> AppResult<u64> {
        if old_prefix == new_prefix {
            return Ok(0);
        }

        let rewritten = self
            .catalog
            .rewrite_video_prefix(owner_id, folder_id, old_prefix, new_prefix)
            .await?;

        info!(
            owner_id = %owner_id,
            folder_id = %folder_id,
            old_prefix,
            new_prefix,
            rewritten,
            "Video paths rewritten"
        );
        Ok(rewritten)
    }

    /// Rename the folder record and move its videos from
    /// `/<login>/<old_name>/` to `/<login>/<new_name>/` in one catalog
    /// write, so a failure leaves the old name and the old paths together.
    pub async fn rename_folder(
        &self,
        owner_id: OwnerId,
        folder_id: FolderId,
        login: &str,
        old_name: &str,
        new_name: &str,
    ) -> AppResult<u64> {
        let old_prefix = content_prefix(login, old_name);
        let new_prefix = content_prefix(login, new_name);

        let (_, rewritten) = self
            .catalog
            .rename(
                owner_id,
                folder_id,
                new_name,
                PrefixRewrite {
                    old: &old_prefix,
                    new: &new_prefix,
                },
            )
            .await?;

        info!(
            owner_id = %owner_id,
            folder_id = %folder_id,
            old_prefix = %old_prefix,
            new_prefix = %new_prefix,
            rewritten,
            "Folder record renamed with its video paths"
        );
        Ok(rewritten)
    }
}
