//! Page cache with stale-while-revalidate semantics.
//!
//! A cached page is served as-is until it is older than the revalidation
//! window. The first request after that still gets the old page, and starts
//! one background regeneration that swaps the new page in when done. Slugs
//! that were never generated are generated on the request path; concurrent
//! requests for the same slug wait for that one generation.

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::GenerateError;
use crate::generator::{Generation, PageGenerator, PostPage};
use domain::Slug;

pub const DEFAULT_REVALIDATE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Stale,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Stale => "STALE",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Served {
    pub page: Arc<PostPage>,
    pub status: CacheStatus,
}

struct Entry {
    page: Arc<PostPage>,
    generated_at: Instant,
    refreshing: bool,
    // 每次写入递增，用来丢弃过期的后台结果
    stamp: u64,
}

#[derive(Default)]
struct Shelf {
    entries: RwLock<HashMap<Slug, Entry>>,
    stamps: AtomicU64,
}

impl Shelf {
    fn store(&self, slug: Slug, page: Arc<PostPage>) {
        let stamp = self.stamps.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries.write().expect("page cache lock poisoned").insert(
            slug,
            Entry {
                page,
                generated_at: Instant::now(),
                refreshing: false,
                stamp,
            },
        );
    }

    /// Replaces the entry only if nothing was written since `stamp`.
    fn replace(&self, slug: &Slug, stamp: u64, page: Arc<PostPage>) -> bool {
        let next = self.stamps.fetch_add(1, Ordering::Relaxed) + 1;
        let mut entries = self.entries.write().expect("page cache lock poisoned");
        match entries.get_mut(slug) {
            Some(entry) if entry.stamp == stamp => {
                *entry = Entry {
                    page,
                    generated_at: Instant::now(),
                    refreshing: false,
                    stamp: next,
                };
                true
            }
            _ => false,
        }
    }

    fn remove(&self, slug: &Slug) {
        self.entries
            .write()
            .expect("page cache lock poisoned")
            .remove(slug);
    }

    fn remove_if(&self, slug: &Slug, stamp: u64) -> bool {
        let mut entries = self.entries.write().expect("page cache lock poisoned");
        if entries.get(slug).is_some_and(|e| e.stamp == stamp) {
            entries.remove(slug);
            true
        } else {
            false
        }
    }

    fn end_refresh(&self, slug: &Slug, stamp: u64) {
        let mut entries = self.entries.write().expect("page cache lock poisoned");
        if let Some(entry) = entries.get_mut(slug) {
            if entry.stamp == stamp {
                entry.refreshing = false;
            }
        }
    }
}

type LockMap = Arc<Mutex<HashMap<Slug, Arc<tokio::sync::Mutex<()>>>>>;

/// One request's claim on a slug's generation lock. Dropping it, on any
/// path including cancellation, removes the map entry once nobody else
/// holds the lock.
struct LockSlot {
    locks: LockMap,
    slug: Slug,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl LockSlot {
    fn claim(locks: &LockMap, slug: &Slug) -> Self {
        let lock = locks
            .lock()
            .expect("generation lock map poisoned")
            .entry(slug.clone())
            .or_default()
            .clone();
        Self {
            locks: locks.clone(),
            slug: slug.clone(),
            lock,
        }
    }
}

impl Drop for LockSlot {
    fn drop(&mut self) {
        let Ok(mut locks) = self.locks.lock() else {
            return;
        };
        // map 里一份，这里一份：没有其他等待者
        let ours = locks
            .get(&self.slug)
            .is_some_and(|l| Arc::ptr_eq(l, &self.lock));
        if ours && Arc::strong_count(&self.lock) <= 2 {
            locks.remove(&self.slug);
        }
    }
}

#[derive(Clone)]
pub struct PageCache {
    generator: Arc<dyn PageGenerator>,
    revalidate: Duration,
    shelf: Arc<Shelf>,
    // 每个 slug 一把生成锁，只用于首次生成
    gen_locks: LockMap,
}

impl PageCache {
    pub fn new(generator: Arc<dyn PageGenerator>, revalidate: Duration) -> Self {
        Self {
            generator,
            revalidate,
            shelf: Arc::new(Shelf::default()),
            gen_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn revalidate_window(&self) -> Duration {
        self.revalidate
    }

    pub fn len(&self) -> usize {
        self.shelf
            .entries
            .read()
            .expect("page cache lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generates every enumerated path up front. Pages that fail here are
    /// left to on-demand generation.
    pub async fn prerender(&self, concurrency: usize) -> Result<usize, GenerateError> {
        let slugs = self.generator.static_paths().await?;
        let total = slugs.len();
        info!("Pre-generating {} post page(s)", total);

        let results: Vec<_> = stream::iter(slugs)
            .map(|slug| async move {
                let result = self.generator.generate(&slug).await;
                (slug, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let mut generated = 0;
        for (slug, result) in results {
            match result {
                Ok(Generation::Found(page)) => {
                    self.shelf.store(slug, page);
                    generated += 1;
                }
                Ok(Generation::NotFound) => {
                    warn!("Post '{}' disappeared during pre-generation", slug);
                }
                Err(e) => {
                    warn!("Pre-generation of '{}' failed, will retry on request: {}", slug, e);
                }
            }
        }

        info!("Pre-generated {}/{} post page(s)", generated, total);
        Ok(generated)
    }

    /// `Ok(None)` means the slug matches no post.
    pub async fn get(&self, slug: &Slug) -> Result<Option<Served>, GenerateError> {
        if let Some(served) = self.lookup(slug) {
            return Ok(Some(served));
        }
        self.generate_blocking(slug).await
    }

    /// Regenerates one page now, replacing (or dropping) the cached copy.
    /// A background refresh still in flight will not overwrite the result.
    pub async fn revalidate(&self, slug: &Slug) -> Result<Option<Arc<PostPage>>, GenerateError> {
        match self.generator.generate(slug).await? {
            Generation::Found(page) => {
                self.shelf.store(slug.clone(), page.clone());
                info!("Revalidated '{}'", slug);
                Ok(Some(page))
            }
            Generation::NotFound => {
                self.shelf.remove(slug);
                info!("Dropped '{}' from cache, post no longer exists", slug);
                Ok(None)
            }
        }
    }

    fn lookup(&self, slug: &Slug) -> Option<Served> {
        let mut entries = self
            .shelf
            .entries
            .write()
            .expect("page cache lock poisoned");
        let entry = entries.get_mut(slug)?;

        if entry.generated_at.elapsed() < self.revalidate {
            return Some(Served {
                page: entry.page.clone(),
                status: CacheStatus::Hit,
            });
        }

        if !entry.refreshing {
            entry.refreshing = true;
            self.spawn_refresh(slug.clone(), entry.stamp);
        }
        Some(Served {
            page: entry.page.clone(),
            status: CacheStatus::Stale,
        })
    }

    fn spawn_refresh(&self, slug: Slug, stamp: u64) {
        let generator = self.generator.clone();
        let shelf = self.shelf.clone();

        tokio::spawn(async move {
            match generator.generate(&slug).await {
                Ok(Generation::Found(page)) => {
                    if shelf.replace(&slug, stamp, page) {
                        info!("Background revalidation of '{}' done", slug);
                    } else {
                        debug!("Discarding background result for '{}', superseded", slug);
                    }
                }
                Ok(Generation::NotFound) => {
                    if shelf.remove_if(&slug, stamp) {
                        info!("Post '{}' was removed, dropping cached page", slug);
                    }
                }
                Err(e) => {
                    // 保留旧页面，下一个请求再试
                    warn!("Background revalidation of '{}' failed: {}", slug, e);
                    shelf.end_refresh(&slug, stamp);
                }
            }
        });
    }

    async fn generate_blocking(&self, slug: &Slug) -> Result<Option<Served>, GenerateError> {
        let slot = LockSlot::claim(&self.gen_locks, slug);
        let _guard = slot.lock.lock().await;

        if let Some(served) = self.lookup(slug) {
            return Ok(Some(served));
        }

        Ok(match self.generator.generate(slug).await? {
            Generation::Found(page) => {
                self.shelf.store(slug.clone(), page.clone());
                Some(Served {
                    page,
                    status: CacheStatus::Miss,
                })
            }
            Generation::NotFound => None,
        })
    }
}
