//! Per-release feature cache.
//!
//! Completion may ask for features on every keystroke, so the catalog only goes
//! to the network when a release is not cached yet, and even then only once per
//! throttle window. The window is tracked by one timestamp shared by all
//! releases: a successful fetch for release A delays a first fetch for release
//! B. While a fetch is in flight no other throttled fetch may start. Anything
//! that cannot be answered from the cache or the network is answered from the
//! bundled dataset.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::models::{public_only, Feature};
use crate::sources::{DefaultFeatureSource, RemoteFeatureSource};

#[derive(Debug, Default)]
struct CatalogState {
    entries: HashMap<String, Arc<Vec<Feature>>>,
    last_fetch: Option<DateTime<Utc>>,
    /// Remote fetches currently running.
    in_flight: usize,
}

impl CatalogState {
    fn throttle_open(&self, now: DateTime<Utc>, request_delay_secs: u64) -> bool {
        let Some(last) = self.last_fetch else {
            return true;
        };
        let Some(window) = i64::try_from(request_delay_secs)
            .ok()
            .and_then(Duration::try_seconds)
        else {
            return false;
        };
        last.checked_add_signed(window)
            .is_some_and(|open_at| now >= open_at)
    }
}

pub struct FeatureCatalog {
    remote: Arc<dyn RemoteFeatureSource>,
    default_source: Arc<dyn DefaultFeatureSource>,
    clock: Arc<dyn Clock>,
    state: Mutex<CatalogState>,
    default_features: OnceLock<Arc<Vec<Feature>>>,
}

impl FeatureCatalog {
    pub fn new(
        remote: Arc<dyn RemoteFeatureSource>,
        default_source: Arc<dyn DefaultFeatureSource>,
    ) -> Self {
        Self {
            remote,
            default_source,
            clock: Arc::new(SystemClock),
            state: Mutex::new(CatalogState::default()),
            default_features: OnceLock::new(),
        }
    }

    /// Replace the clock used for the throttle window.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn state(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Public features for `version`.
    ///
    /// Returns the cached list when there is one. Otherwise fetches from the
    /// remote source if `force_immediate` is set, or if no other fetch is
    /// running and the shared throttle window (`request_delay_secs`) since the
    /// last successful fetch has elapsed. A successful fetch is filtered to
    /// `PUBLIC`, cached and returned. Throttled or failed fetches return the
    /// default list and leave both the cache and the window untouched.
    pub async fn get_features(
        &self,
        version: &str,
        request_delay_secs: u64,
        force_immediate: bool,
    ) -> Arc<Vec<Feature>> {
        {
            let mut state = self.state();
            if let Some(features) = state.entries.get(version) {
                return Arc::clone(features);
            }

            let now = self.clock.now();
            let throttled = state.in_flight > 0 || !state.throttle_open(now, request_delay_secs);
            if !force_immediate && throttled {
                tracing::debug!(
                    "Feature fetch for {} throttled; using default features",
                    version
                );
                drop(state);
                return self.default_features();
            }

            // Claimed under the same lock as the check, so a concurrent
            // request for another release cannot also pass it.
            state.in_flight += 1;
        }

        let _in_flight = InFlight(&self.state);
        match self.remote.fetch(version).await {
            Ok(features) => {
                let features = Arc::new(public_only(features));
                let mut state = self.state();
                state
                    .entries
                    .insert(version.to_string(), Arc::clone(&features));
                state.last_fetch = Some(self.clock.now());
                tracing::info!(
                    "Cached {} public features for version {}",
                    features.len(),
                    version
                );
                features
            }
            Err(e) => {
                tracing::warn!(
                    "Unable to fetch features for version {} from {}: {}. Using default features.",
                    version,
                    self.remote.name(),
                    e
                );
                self.default_features()
            }
        }
    }

    /// First feature whose short name matches `name`, ignoring case.
    pub async fn get_feature(
        &self,
        name: &str,
        version: &str,
        request_delay_secs: u64,
        force_immediate: bool,
    ) -> Option<Feature> {
        self.get_features(version, request_delay_secs, force_immediate)
            .await
            .iter()
            .find(|f| f.matches(name))
            .cloned()
    }

    pub async fn feature_exists(
        &self,
        name: &str,
        version: &str,
        request_delay_secs: u64,
        force_immediate: bool,
    ) -> bool {
        self.get_feature(name, version, request_delay_secs, force_immediate)
            .await
            .is_some()
    }

    /// Public features of the bundled dataset, loaded on first use.
    pub fn default_features(&self) -> Arc<Vec<Feature>> {
        let features = self.default_features.get_or_init(|| {
            match self.default_source.load() {
                Ok(features) => Arc::new(public_only(features)),
                Err(e) => {
                    tracing::error!(
                        "Unable to load default features for version {}: {}",
                        self.default_source.version(),
                        e
                    );
                    Arc::new(Vec::new())
                }
            }
        });
        Arc::clone(features)
    }

    /// Releases with a cached feature list, sorted.
    pub fn cached_versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.state().entries.keys().cloned().collect();
        versions.sort();
        versions
    }

    /// When the last remote fetch succeeded, if ever.
    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.state().last_fetch
    }
}

/// Releases an in-flight claim when the fetch finishes or its future is dropped.
struct InFlight<'a>(&'a Mutex<CatalogState>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight -= 1;
    }
}
