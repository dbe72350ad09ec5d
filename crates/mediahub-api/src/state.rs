//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use mediahub_core::config::AppConfig;
use mediahub_core::types::ServerId;
use mediahub_database::FolderCatalog;
use mediahub_remote::RemoteFolderExecutor;
use mediahub_service::FolderLifecycleManager;

use crate::auth::TokenDecoder;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Bearer token validator
    pub token_decoder: Arc<TokenDecoder>,
    /// Folder catalog
    pub catalog: Arc<dyn FolderCatalog>,
    /// Media server command channel
    pub executor: Arc<dyn RemoteFolderExecutor>,
    /// Folder lifecycle orchestration
    pub folders: Arc<FolderLifecycleManager>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Wire the state from its collaborators.
    pub fn new(
        config: AppConfig,
        catalog: Arc<dyn FolderCatalog>,
        executor: Arc<dyn RemoteFolderExecutor>,
        default_server: Option<ServerId>,
    ) -> Self {
        let folders = Arc::new(FolderLifecycleManager::new(
            Arc::clone(&catalog),
            Arc::clone(&executor),
            default_server,
        ));

        Self {
            token_decoder: Arc::new(TokenDecoder::new(&config.auth)),
            config: Arc::new(config),
            catalog,
            executor,
            folders,
            started_at: Instant::now(),
        }
    }
}
