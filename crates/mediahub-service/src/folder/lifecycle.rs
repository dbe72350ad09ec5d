//! Folder create, rename and delete across catalog and media server.

use std::sync::Arc;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::types::{FolderId, OwnerId, ServerId};
use mediahub_database::FolderCatalog;
use mediahub_entity::folder::{CreateFolder, Folder, validate_folder_name};
use mediahub_remote::RemoteFolderExecutor;

use crate::context::RequestContext;

use super::locks::FolderLocks;
use super::rewriter::VideoPathRewriter;
use super::saga::Saga;

/// Outcome of a rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedFolder {
    /// The renamed folder.
    pub folder_id: FolderId,
    /// Name before the call.
    pub old_name: String,
    /// Name after the call.
    pub new_name: String,
}

/// Keeps folder records and folder directories consistent.
///
/// Ordering rules:
/// - create inserts the record first, then creates the directory, and
///   deletes the record again if the directory cannot be created;
/// - delete removes the directory first and touches the catalog only once
///   that succeeded, so a record is never lost while content may remain;
/// - rename moves the directory first, then updates the record and the
///   stored video paths in one catalog transaction.
///
/// Operations on the same folder are serialized; different folders run
/// in parallel. Create picks the folder id up front and holds its lock from
/// before the insert until the directory exists.
#[derive(Debug, Clone)]
pub struct FolderLifecycleManager {
    catalog: Arc<dyn FolderCatalog>,
    executor: Arc<dyn RemoteFolderExecutor>,
    rewriter: VideoPathRewriter,
    locks: FolderLocks,
    default_server: Option<ServerId>,
}

impl FolderLifecycleManager {
    /// Creates a new lifecycle manager.
    pub fn new(
        catalog: Arc<dyn FolderCatalog>,
        executor: Arc<dyn RemoteFolderExecutor>,
        default_server: Option<ServerId>,
    ) -> Self {
        Self {
            rewriter: VideoPathRewriter::new(Arc::clone(&catalog)),
            catalog,
            executor,
            locks: FolderLocks::new(),
            default_server,
        }
    }

    /// The catalog this manager writes to.
    pub fn catalog(&self) -> &Arc<dyn FolderCatalog> {
        &self.catalog
    }

    /// Active folders of the caller.
    ///
    /// An owner without folders gets a single unsaved default folder named
    /// after their login.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<Folder>> {
        let owner_id = ctx.owner_id();
        let folders = self.catalog.list_by_owner(owner_id).await?;
        if !folders.is_empty() {
            return Ok(folders);
        }

        let login = ctx.login()?;
        let server_id = self.resolve_server(owner_id).await?;
        Ok(vec![Folder::placeholder(owner_id, &login, server_id)])
    }

    /// The server new folders of `owner_id` go to: the server of their
    /// existing folders, otherwise the configured default.
    pub async fn resolve_server(&self, owner_id: OwnerId) -> AppResult<ServerId> {
        let folders = self.catalog.list_by_owner(owner_id).await?;
        if let Some(folder) = folders.first() {
            return Ok(folder.server_id);
        }
        self.default_server
            .ok_or_else(|| AppError::configuration("No default media server configured"))
    }

    /// Create a folder record and its directory.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        server_id: Option<ServerId>,
        name: &str,
    ) -> AppResult<Folder> {
        let owner_id = ctx.owner_id();
        let name = validate_folder_name(name)?;
        let login = ctx.login()?;
        let server_id = match server_id {
            Some(id) => id,
            None => self.resolve_server(owner_id).await?,
        };

        if self
            .catalog
            .find_by_owner_and_name(owner_id, &name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!("Folder '{name}' already exists")));
        }

        let folder_id = FolderId::new();
        let _lock = self.locks.acquire(folder_id).await;

        let mut saga = Saga::new("create_folder", owner_id);
        saga.set_folder(folder_id);
        let catalog = Arc::clone(&self.catalog);

        let folder = saga
            .compensable(
                "insert_record",
                self.catalog.insert(&CreateFolder {
                    id: folder_id,
                    owner_id,
                    server_id,
                    name: name.clone(),
                }),
                |folder: &Folder| {
                    let id = folder.id;
                    async move { catalog.delete(owner_id, id).await.map(|_| ()) }.boxed()
                },
            )
            .await?;

        saga.pivot("create_remote_directory", async {
            self.executor.ensure_base_directory(server_id, &login).await?;
            self.executor.create_folder(server_id, &login, &name).await
        })
        .await?;

        info!(
            owner_id = %owner_id,
            folder_id = %folder.id,
            server_id = %server_id,
            name = %folder.name,
            "Folder created"
        );
        Ok(folder)
    }

    /// Remove a folder's directory, then its record and videos.
    pub async fn delete(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<()> {
        let owner_id = ctx.owner_id();
        let _lock = self.locks.acquire(folder_id).await;

        let folder = self.find_owned(owner_id, folder_id).await?;
        let login = ctx.login()?;
        let path = self.executor.paths().folder_dir(&login, &folder.name)?;

        let mut saga = Saga::new("delete_folder", owner_id);
        saga.set_folder(folder_id);

        saga.pivot(
            "remove_remote_directory",
            self.executor.remove_directory(folder.server_id, &path),
        )
        .await?;

        let removed = saga
            .post_pivot("delete_record", self.catalog.delete(owner_id, folder_id))
            .await?;
        if !removed {
            warn!(
                owner_id = %owner_id,
                folder_id = %folder_id,
                "Folder record vanished before delete"
            );
        }

        info!(
            owner_id = %owner_id,
            folder_id = %folder_id,
            name = %folder.name,
            "Folder deleted"
        );
        Ok(())
    }

    /// Rename a folder's directory, then its record and video paths.
    ///
    /// Safe to repeat after a partial failure: a missing old directory is
    /// taken as already moved and the new one is created in its place.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        new_name: &str,
    ) -> AppResult<RenamedFolder> {
        let owner_id = ctx.owner_id();
        let new_name = validate_folder_name(new_name)?;
        let _lock = self.locks.acquire(folder_id).await;

        let folder = self.find_owned(owner_id, folder_id).await?;
        let old_name = folder.name.clone();
        if old_name == new_name {
            return Ok(RenamedFolder {
                folder_id,
                old_name,
                new_name,
            });
        }

        if self
            .catalog
            .find_by_owner_and_name(owner_id, &new_name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "Folder '{new_name}' already exists"
            )));
        }

        let login = ctx.login()?;
        let paths = self.executor.paths();
        let old_path = paths.folder_dir(&login, &old_name)?;
        let new_path = paths.folder_dir(&login, &new_name)?;
        let server_id = folder.server_id;

        let mut saga = Saga::new("rename_folder", owner_id);
        saga.set_folder(folder_id);

        saga.pivot("move_remote_directory", async {
            if !self.executor.directory_exists(server_id, &old_path).await? {
                warn!(
                    owner_id = %owner_id,
                    folder_id = %folder_id,
                    path = %old_path,
                    "Folder directory missing, creating it under the new name"
                );
                return self.executor.create_folder(server_id, &login, &new_name).await;
            }
            if self.executor.directory_exists(server_id, &new_path).await? {
                return Err(AppError::conflict(format!(
                    "Directory for '{new_name}' already exists on the media server"
                )));
            }
            self.executor
                .move_directory(server_id, &old_path, &new_path)
                .await
        })
        .await?;

        saga.post_pivot(
            "rename_record_and_videos",
            self.rewriter
                .rename_folder(owner_id, folder_id, &login, &old_name, &new_name),
        )
        .await?;

        info!(
            owner_id = %owner_id,
            folder_id = %folder_id,
            old_name = %old_name,
            new_name = %new_name,
            "Folder renamed"
        );
        Ok(RenamedFolder {
            folder_id,
            old_name,
            new_name,
        })
    }

    async fn find_owned(&self, owner_id: OwnerId, folder_id: FolderId) -> AppResult<Folder> {
        self.catalog
            .find_by_owner_and_id(owner_id, folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }
}
