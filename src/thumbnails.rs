// Background thumbnail loading with an LRU cache, polled from the TUI loop

use crate::preview::{render_thumbnail, Thumbnail};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, Mutex};

/// Maximum number of cached thumbnails
const CACHE_SIZE: usize = 64;

/// Queue depth of the background worker
const QUEUE_SIZE: usize = 32;

/// Represents a thumbnail loading state
#[derive(Debug, Clone)]
pub enum ThumbnailState {
    Loading,
    Ready(Arc<Thumbnail>),
    Error(String),
}

/// A file rendered for a specific cell size
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbnailKey {
    pub path: PathBuf,
    pub columns: u16,
    pub rows: u16,
}

impl ThumbnailKey {
    pub fn new(path: &Path, columns: u16, rows: u16) -> Self {
        Self {
            path: path.to_path_buf(),
            columns,
            rows,
        }
    }
}

enum ThumbnailRequest {
    Load {
        key: ThumbnailKey,
        response_tx: oneshot::Sender<ThumbnailState>,
    },
    Shutdown,
}

/// LRU-like cache for thumbnails
#[derive(Debug)]
struct ThumbnailCache {
    cache: HashMap<ThumbnailKey, Arc<Thumbnail>>,
    /// Most recently used at the end
    access_order: Vec<ThumbnailKey>,
    max_size: usize,
}

impl ThumbnailCache {
    fn new(max_size: usize) -> Self {
        Self {
            cache: HashMap::new(),
            access_order: Vec::new(),
            max_size,
        }
    }

    fn get(&mut self, key: &ThumbnailKey) -> Option<Arc<Thumbnail>> {
        let thumbnail = self.cache.get(key).cloned()?;
        self.access_order.retain(|k| k != key);
        self.access_order.push(key.clone());
        Some(thumbnail)
    }

    fn insert(&mut self, key: ThumbnailKey, thumbnail: Arc<Thumbnail>) {
        if self.cache.contains_key(&key) {
            self.access_order.retain(|k| k != &key);
        } else if self.cache.len() >= self.max_size && !self.access_order.is_empty() {
            let oldest = self.access_order.remove(0);
            self.cache.remove(&oldest);
        }

        self.cache.insert(key.clone(), thumbnail);
        self.access_order.push(key);
    }

    fn contains(&self, key: &ThumbnailKey) -> bool {
        self.cache.contains_key(key)
    }

    fn len(&self) -> usize {
        self.cache.len()
    }

    fn clear(&mut self) {
        self.cache.clear();
        self.access_order.clear();
    }
}

/// Handle for sending requests to the background renderer
#[derive(Clone)]
pub struct ThumbnailLoader {
    request_tx: mpsc::Sender<ThumbnailRequest>,
    cache: Arc<Mutex<ThumbnailCache>>,
}

impl ThumbnailLoader {
    /// Spawns the worker on `runtime`
    pub fn new(runtime: &Handle) -> Self {
        let (request_tx, request_rx) = mpsc::channel(QUEUE_SIZE);
        let cache = Arc::new(Mutex::new(ThumbnailCache::new(CACHE_SIZE)));

        let worker_cache = Arc::clone(&cache);
        runtime.spawn(async move {
            Self::worker(request_rx, worker_cache).await;
        });

        Self { request_tx, cache }
    }

    async fn worker(
        mut request_rx: mpsc::Receiver<ThumbnailRequest>,
        cache: Arc<Mutex<ThumbnailCache>>,
    ) {
        while let Some(request) = request_rx.recv().await {
            match request {
                ThumbnailRequest::Load { key, response_tx } => {
                    if let Some(cached) = cache.lock().await.get(&key) {
                        let _ = response_tx.send(ThumbnailState::Ready(cached));
                        continue;
                    }

                    let path = key.path.clone();
                    let (columns, rows) = (key.columns, key.rows);
                    let result =
                        tokio::task::spawn_blocking(move || render_thumbnail(&path, columns, rows))
                            .await;

                    let state = match result {
                        Ok(Ok(thumbnail)) => {
                            let thumbnail = Arc::new(thumbnail);
                            cache.lock().await.insert(key, Arc::clone(&thumbnail));
                            ThumbnailState::Ready(thumbnail)
                        }
                        Ok(Err(e)) => {
                            tracing::debug!(path = %key.path.display(), error = %e, "thumbnail failed");
                            ThumbnailState::Error(e.to_string())
                        }
                        Err(e) => ThumbnailState::Error(format!("Task panicked: {}", e)),
                    };

                    let _ = response_tx.send(state);
                }
                ThumbnailRequest::Shutdown => break,
            }
        }
    }

    /// Renders (or fetches from cache) and waits for the result
    pub async fn request(&self, key: ThumbnailKey) -> ThumbnailState {
        if let Some(cached) = self.get_cached(&key).await {
            return ThumbnailState::Ready(cached);
        }

        let (response_tx, response_rx) = oneshot::channel();
        if self
            .request_tx
            .send(ThumbnailRequest::Load { key, response_tx })
            .await
            .is_err()
        {
            return ThumbnailState::Error("Thumbnail loader shut down".to_string());
        }

        match tokio::time::timeout(std::time::Duration::from_secs(5), response_rx).await {
            Ok(Ok(state)) => state,
            Ok(Err(_)) => ThumbnailState::Error("Response channel closed".to_string()),
            Err(_) => ThumbnailState::Error("Thumbnail timed out".to_string()),
        }
    }

    pub async fn get_cached(&self, key: &ThumbnailKey) -> Option<Arc<Thumbnail>> {
        self.cache.lock().await.get(key)
    }

    pub async fn is_cached(&self, key: &ThumbnailKey) -> bool {
        self.cache.lock().await.contains(key)
    }

    pub async fn shutdown(&self) {
        let _ = self.request_tx.send(ThumbnailRequest::Shutdown).await;
    }

    pub async fn cache_size(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }
}

/// Polling front-end over [`ThumbnailLoader`] for the synchronous TUI loop.
///
/// Any number of tiles may be loading at once; each frame asks for the
/// tiles it draws and [`poll`](Self::poll) collects finished renders.
pub struct SyncThumbnailManager {
    loader: ThumbnailLoader,
    runtime: Handle,
    pending: HashMap<ThumbnailKey, oneshot::Receiver<ThumbnailState>>,
    failed: HashMap<ThumbnailKey, String>,
}

impl SyncThumbnailManager {
    pub fn new(runtime: Handle) -> Self {
        let loader = ThumbnailLoader::new(&runtime);
        Self {
            loader,
            runtime,
            pending: HashMap::new(),
            failed: HashMap::new(),
        }
    }

    /// Current state for `path` at the given size, queueing a render if needed (non-blocking)
    pub fn request(&mut self, path: &Path, columns: u16, rows: u16) -> ThumbnailState {
        let key = ThumbnailKey::new(path, columns, rows);

        if let Some(error) = self.failed.get(&key) {
            return ThumbnailState::Error(error.clone());
        }
        if let Some(cached) = self.runtime.block_on(self.loader.get_cached(&key)) {
            return ThumbnailState::Ready(cached);
        }
        if self.pending.contains_key(&key) {
            return ThumbnailState::Loading;
        }

        let (response_tx, response_rx) = oneshot::channel();
        let request = ThumbnailRequest::Load {
            key: key.clone(),
            response_tx,
        };
        // A full queue is retried on a later frame
        if self.loader.request_tx.try_send(request).is_ok() {
            self.pending.insert(key, response_rx);
        }

        ThumbnailState::Loading
    }

    /// Collects finished renders; returns whether any tile changed
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        let mut finished = Vec::new();

        for (key, rx) in self.pending.iter_mut() {
            match rx.try_recv() {
                Ok(ThumbnailState::Error(e)) => {
                    self.failed.insert(key.clone(), e);
                    finished.push(key.clone());
                }
                Ok(_) => finished.push(key.clone()),
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.failed
                        .insert(key.clone(), "Thumbnail channel closed".to_string());
                    finished.push(key.clone());
                }
            }
        }

        for key in finished {
            self.pending.remove(&key);
            changed = true;
        }

        changed
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn cache_size(&self) -> usize {
        self.runtime.block_on(self.loader.cache_size())
    }

    /// Forgets everything, e.g. after a rescan
    pub fn reset(&mut self) {
        self.pending.clear();
        self.failed.clear();
        self.runtime.block_on(self.loader.clear_cache());
    }
}
