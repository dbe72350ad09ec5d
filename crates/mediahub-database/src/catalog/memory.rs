//! In-memory folder catalog for tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::types::{FolderId, OwnerId, VideoId};
use mediahub_entity::folder::{CreateFolder, Folder, FolderStatus};
use mediahub_entity::video::{CreateVideo, Video};

use super::{FolderCatalog, PrefixRewrite};

/// Catalog writes that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogOp {
    /// [`FolderCatalog::insert`].
    Insert,
    /// [`FolderCatalog::delete`].
    Delete,
    /// [`FolderCatalog::rename`], before anything is written.
    Rename,
    /// The video rewrite of [`FolderCatalog::rename`] (which then writes
    /// nothing) and [`FolderCatalog::rewrite_video_prefix`].
    RewriteVideos,
}

#[derive(Debug, Default)]
struct State {
    /// Folders in insertion order.
    folders: Vec<Folder>,
    /// Videos in insertion order.
    videos: Vec<Video>,
}

/// Catalog holding everything in process memory.
///
/// Mirrors the PostgreSQL catalog: owner scoping, active-name uniqueness,
/// and atomic delete and rename of a folder together with its videos.
#[derive(Debug, Default)]
pub struct MemoryFolderCatalog {
    state: Mutex<State>,
    failures: Mutex<HashMap<CatalogOp, usize>>,
}

impl MemoryFolderCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `times` calls of `op` fail with a database error.
    pub fn fail_next(&self, op: CatalogOp, times: usize) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(op, times);
    }

    /// Every folder record, active or not.
    pub fn all_folders(&self) -> Vec<Folder> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .folders
            .clone()
    }

    /// Every video record.
    pub fn all_videos(&self) -> Vec<Video> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .videos
            .clone()
    }

    fn check_failure(&self, op: CatalogOp) -> AppResult<()> {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        match failures.get_mut(&op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(AppError::database(format!("injected {op:?} failure")))
            }
            _ => Ok(()),
        }
    }
}

fn name_taken(state: &State, owner_id: OwnerId, name: &str, except: Option<FolderId>) -> bool {
    state.folders.iter().any(|f| {
        f.owner_id == owner_id && f.is_active() && f.name == name && Some(f.id) != except
    })
}

fn rewrite_videos(
    videos: &mut [Video],
    owner_id: OwnerId,
    folder_id: FolderId,
    rewrite: PrefixRewrite<'_>,
) -> u64 {
    if rewrite.is_noop() {
        return 0;
    }

    let mut changed = 0;
    for video in videos
        .iter_mut()
        .filter(|v| v.folder_id == folder_id && v.owner_id == owner_id)
    {
        let path = replace_first(&video.path, rewrite.old, rewrite.new);
        let url = replace_first(&video.url, rewrite.old, rewrite.new);
        if path.is_none() && url.is_none() {
            continue;
        }
        if let Some(path) = path {
            video.path = path;
        }
        if let Some(url) = url {
            video.url = url;
        }
        video.updated_at = Utc::now();
        changed += 1;
    }
    changed
}

/// Replace the first occurrence of `from` in `haystack`, if any.
pub fn replace_first(haystack: &str, from: &str, to: &str) -> Option<String> {
    if from.is_empty() {
        return None;
    }
    haystack.find(from).map(|pos| {
        let mut out = String::with_capacity(haystack.len() - from.len() + to.len());
        out.push_str(&haystack[..pos]);
        out.push_str(to);
        out.push_str(&haystack[pos + from.len()..]);
        out
    })
}

#[async_trait]
impl FolderCatalog for MemoryFolderCatalog {
    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder> {
        self.check_failure(CatalogOp::Insert)?;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if name_taken(&state, data.owner_id, &data.name, None) {
            return Err(AppError::conflict(format!(
                "Folder '{}' already exists",
                data.name
            )));
        }

        if state.folders.iter().any(|f| f.id == data.id) {
            return Err(AppError::conflict(format!("Folder {} already exists", data.id)));
        }

        let now = Utc::now();
        let folder = Folder {
            id: data.id,
            owner_id: data.owner_id,
            server_id: data.server_id,
            name: data.name.clone(),
            status: FolderStatus::Active,
            created_at: now,
            updated_at: now,
        };
        state.folders.push(folder.clone());
        Ok(folder)
    }

    async fn delete(&self, owner_id: OwnerId, id: FolderId) -> AppResult<bool> {
        self.check_failure(CatalogOp::Delete)?;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let before = state.folders.len();
        state
            .folders
            .retain(|f| !(f.id == id && f.owner_id == owner_id));
        if state.folders.len() == before {
            return Ok(false);
        }
        state
            .videos
            .retain(|v| !(v.folder_id == id && v.owner_id == owner_id));
        Ok(true)
    }

    async fn rename(
        &self,
        owner_id: OwnerId,
        id: FolderId,
        new_name: &str,
        videos: PrefixRewrite<'_>,
    ) -> AppResult<(Folder, u64)> {
        self.check_failure(CatalogOp::Rename)?;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if name_taken(&state, owner_id, new_name, Some(id)) {
            return Err(AppError::conflict(format!(
                "Folder '{new_name}' already exists"
            )));
        }

        let index = state
            .folders
            .iter()
            .position(|f| f.id == id && f.owner_id == owner_id && f.is_active())
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        // Fails before either write lands, like a rolled back transaction.
        self.check_failure(CatalogOp::RewriteVideos)?;

        let changed = rewrite_videos(&mut state.videos, owner_id, id, videos);
        let folder = &mut state.folders[index];
        folder.name = new_name.to_string();
        folder.updated_at = Utc::now();
        Ok((folder.clone(), changed))
    }

    async fn find_by_owner_and_id(
        &self,
        owner_id: OwnerId,
        id: FolderId,
    ) -> AppResult<Option<Folder>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state
            .folders
            .iter()
            .find(|f| f.id == id && f.owner_id == owner_id && f.is_active())
            .cloned())
    }

    async fn find_by_owner_and_name(
        &self,
        owner_id: OwnerId,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state
            .folders
            .iter()
            .find(|f| f.owner_id == owner_id && f.name == name && f.is_active())
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> AppResult<Vec<Folder>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state
            .folders
            .iter()
            .filter(|f| f.owner_id == owner_id && f.is_active())
            .cloned()
            .collect())
    }

    async fn insert_video(&self, data: &CreateVideo) -> AppResult<Video> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let folder_ok = state
            .folders
            .iter()
            .any(|f| f.id == data.folder_id && f.owner_id == data.owner_id && f.is_active());
        if !folder_ok {
            return Err(AppError::not_found(format!(
                "Folder {} not found",
                data.folder_id
            )));
        }

        let now = Utc::now();
        let video = Video {
            id: VideoId::new(),
            owner_id: data.owner_id,
            folder_id: data.folder_id,
            name: data.name.clone(),
            path: data.path.clone(),
            url: data.url.clone(),
            created_at: now,
            updated_at: now,
        };
        state.videos.push(video.clone());
        Ok(video)
    }

    async fn list_videos(&self, owner_id: OwnerId, folder_id: FolderId) -> AppResult<Vec<Video>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state
            .videos
            .iter()
            .filter(|v| v.folder_id == folder_id && v.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn rewrite_video_prefix(
        &self,
        owner_id: OwnerId,
        folder_id: FolderId,
        old_prefix: &str,
        new_prefix: &str,
    ) -> AppResult<u64> {
        self.check_failure(CatalogOp::RewriteVideos)?;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(rewrite_videos(
            &mut state.videos,
            owner_id,
            folder_id,
            PrefixRewrite {
                old: old_prefix,
                new: new_prefix,
            },
        ))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
