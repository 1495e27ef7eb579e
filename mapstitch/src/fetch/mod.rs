//! Cache-aware concurrent tile fetcher.
//!
//! Runs up to `concurrency` downloads at once while returning results in
//! the original tile-enumeration order. Ordering is a property of the
//! collection mechanism (`buffered` preserves input order regardless of
//! completion order), never of scheduling behavior.
//!
//! Per-tile failures are absorbed: a failed download or an undecodable
//! body yields a `Missing` result and the batch continues. Cache write
//! failures are logged and the tile is still reported `Fetched` - the
//! cache is an optimization, not a correctness requirement.

mod types;

pub use types::{TileOutcome, TileResult};

use crate::cache::TileStore;
use crate::coord::TileCoord;
use crate::provider::{AsyncHttpClient, TileProvider};
use futures::stream::{self, StreamExt};
use image::RgbImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of concurrent downloads.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Concurrent, cache-aware tile fetcher.
pub struct TileFetcher<C: AsyncHttpClient> {
    client: C,
    provider: Arc<dyn TileProvider>,
    /// `None` when caching is disabled
    store: Option<TileStore>,
    concurrency: usize,
    /// Completed-tile counter shared with progress observers
    completed: Arc<AtomicUsize>,
}

impl<C: AsyncHttpClient> TileFetcher<C> {
    /// Creates a fetcher.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client downloads go through
    /// * `provider` - tile source building per-tile URLs
    /// * `store` - disk cache, or `None` to disable caching
    /// * `concurrency` - maximum simultaneous downloads (min 1)
    pub fn new(
        client: C,
        provider: Arc<dyn TileProvider>,
        store: Option<TileStore>,
        concurrency: usize,
    ) -> Self {
        Self {
            client,
            provider,
            store,
            concurrency: concurrency.max(1),
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shares the given counter for completed-tile progress reporting.
    pub fn with_progress_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.completed = counter;
        self
    }

    /// Fetches every tile, preserving input order in the output.
    pub async fn fetch_all(&self, tiles: &[TileCoord]) -> Vec<TileResult> {
        stream::iter(tiles.iter().copied())
            .map(|tile| self.fetch_one(tile))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Fetches a single tile: cache probe, then network, then write-back.
    async fn fetch_one(&self, tile: TileCoord) -> TileResult {
        let result = self.fetch_inner(tile).await;
        self.completed.fetch_add(1, Ordering::Relaxed);
        result
    }

    async fn fetch_inner(&self, tile: TileCoord) -> TileResult {
        if let Some(store) = &self.store {
            if let Some(bytes) = store.get(&tile).await {
                match decode(&bytes) {
                    Ok(image) => {
                        debug!(tile = %tile, "tile served from cache");
                        return TileResult::cached(tile, image);
                    }
                    Err(e) => {
                        // A corrupt cache entry falls through to a fresh
                        // download; the write-back below repairs it.
                        warn!(tile = %tile, error = %e, "cached tile undecodable, refetching");
                    }
                }
            }
        }

        let url = self.provider.tile_url(&tile);
        let bytes = match self.client.get(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(tile = %tile, error = %e, "tile download failed, continuing");
                return TileResult::missing(tile);
            }
        };

        let image = match decode(&bytes) {
            Ok(image) => image,
            Err(e) => {
                warn!(tile = %tile, error = %e, "tile body undecodable, continuing");
                return TileResult::missing(tile);
            }
        };

        if let Some(store) = &self.store {
            if let Err(e) = store.put(&tile, &bytes).await {
                warn!(tile = %tile, error = %e, "cache write failed, tile kept in memory");
            }
        }

        TileResult::fetched(tile, image)
    }
}

fn decode(bytes: &[u8]) -> Result<RgbImage, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockHttpClient;
    use image::Rgb;
    use std::io::Cursor;
    use std::path::PathBuf;

    /// Provider with a deterministic URL template, independent of any
    /// load-balancing state.
    struct StubProvider;

    impl TileProvider for StubProvider {
        fn tile_url(&self, tile: &TileCoord) -> String {
            format!("test://{}/{}/{}", tile.zoom, tile.col, tile.row)
        }
        fn name(&self) -> &str {
            "stub"
        }
        fn tile_format(&self) -> &str {
            "png"
        }
        fn min_zoom(&self) -> u8 {
            0
        }
        fn max_zoom(&self) -> u8 {
            20
        }
    }

    fn png_bytes(color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 8, Rgb(color));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn tiles(n: i32) -> Vec<TileCoord> {
        (0..n).map(|i| TileCoord::new(i, 0, 5)).collect()
    }

    fn store_at(root: PathBuf) -> TileStore {
        TileStore::new(root, "stub", "png")
    }

    #[tokio::test]
    async fn results_preserve_input_order_under_scrambled_delays() {
        let client = MockHttpClient::with_scrambled_delays();
        let coords = tiles(24);
        for tile in &coords {
            client.insert(StubProvider.tile_url(tile), png_bytes([1, 2, 3]));
        }

        let fetcher = TileFetcher::new(client, Arc::new(StubProvider), None, 8);
        let results = fetcher.fetch_all(&coords).await;

        let got: Vec<TileCoord> = results.iter().map(|r| r.coord).collect();
        assert_eq!(got, coords);
        assert!(results.iter().all(|r| r.outcome == TileOutcome::Fetched));
    }

    #[tokio::test]
    async fn missing_tiles_do_not_fail_the_batch() {
        let client = MockHttpClient::new();
        let coords = tiles(3);
        // Only the middle tile resolves.
        client.insert(StubProvider.tile_url(&coords[1]), png_bytes([9, 9, 9]));

        let fetcher = TileFetcher::new(client, Arc::new(StubProvider), None, 2);
        let results = fetcher.fetch_all(&coords).await;

        assert_eq!(results[0].outcome, TileOutcome::Missing);
        assert_eq!(results[1].outcome, TileOutcome::Fetched);
        assert_eq!(results[2].outcome, TileOutcome::Missing);
        assert!(results[0].image.is_none());
        assert!(results[1].image.is_some());
    }

    #[tokio::test]
    async fn undecodable_body_is_missing() {
        let client = MockHttpClient::new();
        let coords = tiles(1);
        client.insert(StubProvider.tile_url(&coords[0]), b"not an image".to_vec());

        let fetcher = TileFetcher::new(client, Arc::new(StubProvider), None, 1);
        let results = fetcher.fetch_all(&coords).await;
        assert!(results[0].is_missing());
    }

    #[tokio::test]
    async fn second_run_hits_cache_and_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let coords = tiles(4);
        let body = png_bytes([7, 7, 7]);

        let client = MockHttpClient::new();
        for tile in &coords {
            client.insert(StubProvider.tile_url(tile), body.clone());
        }
        let fetcher = TileFetcher::new(
            client,
            Arc::new(StubProvider),
            Some(store_at(dir.path().to_path_buf())),
            2,
        );
        let first = fetcher.fetch_all(&coords).await;
        assert!(first.iter().all(|r| r.outcome == TileOutcome::Fetched));

        // Fresh fetcher, empty mock: any network call would 404.
        let offline = MockHttpClient::new();
        let fetcher = TileFetcher::new(
            offline,
            Arc::new(StubProvider),
            Some(store_at(dir.path().to_path_buf())),
            2,
        );
        let second = fetcher.fetch_all(&coords).await;
        assert!(second.iter().all(|r| r.outcome == TileOutcome::Cached));
        assert_eq!(fetcher.client.request_count(), 0);

        // Cached bytes are exactly what the first run downloaded.
        let store = store_at(dir.path().to_path_buf());
        for tile in &coords {
            assert_eq!(store.get(tile).await.unwrap(), body);
        }
    }

    #[tokio::test]
    async fn failed_cache_write_still_reports_fetched() {
        let dir = tempfile::tempdir().unwrap();
        // Root the store inside a plain file so every write-back fails.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let client = MockHttpClient::new();
        let coords = tiles(1);
        client.insert(StubProvider.tile_url(&coords[0]), png_bytes([6, 6, 6]));

        let fetcher = TileFetcher::new(client, Arc::new(StubProvider), Some(store_at(blocker)), 1);
        let results = fetcher.fetch_all(&coords).await;

        // The cache is an optimization: the tile is still delivered.
        assert_eq!(results[0].outcome, TileOutcome::Fetched);
        assert!(results[0].image.is_some());
    }

    #[tokio::test]
    async fn disabled_cache_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let coords = tiles(2);

        let client = MockHttpClient::new();
        for tile in &coords {
            client.insert(StubProvider.tile_url(tile), png_bytes([4, 4, 4]));
        }

        let fetcher = TileFetcher::new(client, Arc::new(StubProvider), None, 2);
        let results = fetcher.fetch_all(&coords).await;
        assert!(results.iter().all(|r| r.outcome == TileOutcome::Fetched));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn progress_counter_reaches_total() {
        let client = MockHttpClient::new();
        let coords = tiles(5);
        for tile in &coords[..3] {
            client.insert(StubProvider.tile_url(tile), png_bytes([0, 0, 0]));
        }

        let counter = Arc::new(AtomicUsize::new(0));
        let fetcher = TileFetcher::new(client, Arc::new(StubProvider), None, 3)
            .with_progress_counter(Arc::clone(&counter));
        fetcher.fetch_all(&coords).await;

        // Missing tiles count as completed work too.
        assert_eq!(counter.load(Ordering::Relaxed), 5);
    }
}
