//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use liberty_features::build_files::{ResolveError, VersionResolver};
use liberty_features::catalog::ManualClock;
use liberty_features::models::Feature;
use liberty_features::sources::{DefaultFeatureSource, RemoteFeatureSource, SourceError};
use liberty_features::FeatureCatalog;
use serde_json::json;

/// Build a feature with the given short name and visibility.
pub fn feature(short_name: &str, visibility: &str) -> Feature {
    serde_json::from_value(json!({
        "name": format!("com.ibm.websphere.appserver.{}", short_name),
        "shortDescription": format!("{} description", short_name),
        "wlpInformation": {
            "shortName": short_name,
            "visibility": visibility
        }
    }))
    .expect("valid feature")
}

pub fn short_names(features: &[Feature]) -> Vec<String> {
    features.iter().map(|f| f.short_name().to_string()).collect()
}

/// Remote source answering from a fixed table; unknown versions fail.
#[derive(Default)]
pub struct ScriptedRemote {
    responses: Mutex<HashMap<String, Vec<Feature>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, version: &str, features: Vec<Feature>) {
        self.responses
            .lock()
            .unwrap()
            .insert(version.to_string(), features);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteFeatureSource for ScriptedRemote {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch(&self, version: &str) -> Result<Vec<Feature>, SourceError> {
        self.calls.lock().unwrap().push(version.to_string());
        match self.responses.lock().unwrap().get(version) {
            Some(features) => Ok(features.clone()),
            None => Err(SourceError::Status {
                url: format!("scripted://{}", version),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            }),
        }
    }
}

/// Remote source whose fetches wait until the test opens the gate.
#[derive(Default)]
pub struct GatedRemote {
    gate: tokio::sync::Notify,
    calls: Mutex<Vec<String>>,
}

impl GatedRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Let one waiting (or the next) fetch through.
    pub fn open(&self) {
        self.gate.notify_one();
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteFeatureSource for GatedRemote {
    fn name(&self) -> &'static str {
        "gated"
    }

    async fn fetch(&self, version: &str) -> Result<Vec<Feature>, SourceError> {
        self.calls.lock().unwrap().push(version.to_string());
        self.gate.notified().await;
        Ok(vec![feature(&format!("gated-{}", version), "PUBLIC")])
    }
}

/// Default source with a fixed list that counts how often it is loaded.
pub struct StaticDefault {
    features: Vec<Feature>,
    loads: AtomicUsize,
}

impl StaticDefault {
    pub fn new(features: Vec<Feature>) -> Arc<Self> {
        Arc::new(Self {
            features,
            loads: AtomicUsize::new(0),
        })
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl DefaultFeatureSource for StaticDefault {
    fn version(&self) -> &str {
        "20.0.0.9"
    }

    fn load(&self) -> Result<Vec<Feature>, SourceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.features.clone())
    }
}

pub fn default_features() -> Vec<Feature> {
    vec![
        feature("servlet-4.0", "PUBLIC"),
        feature("servlet.api-4.0", "PRIVATE"),
        feature("jaxrs-2.1", "PUBLIC"),
    ]
}

pub struct CatalogFixture {
    pub remote: Arc<ScriptedRemote>,
    pub defaults: Arc<StaticDefault>,
    pub clock: Arc<ManualClock>,
    pub catalog: FeatureCatalog,
}

pub fn catalog_fixture() -> CatalogFixture {
    let remote = ScriptedRemote::new();
    let defaults = StaticDefault::new(default_features());
    let clock = Arc::new(ManualClock::default());
    let catalog = FeatureCatalog::new(remote.clone(), defaults.clone()).with_clock(clock.clone());
    CatalogFixture {
        remote,
        defaults,
        clock,
        catalog,
    }
}

/// Version resolver answering from a table, standing in for Maven.
#[derive(Default)]
pub struct StubResolver {
    answers: Mutex<HashMap<PathBuf, Option<String>>>,
    failing: Mutex<Vec<PathBuf>>,
    calls: AtomicUsize,
}

impl StubResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer(&self, path: &Path, version: Option<&str>) {
        self.failing.lock().unwrap().retain(|p| p != path);
        self.answers
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), version.map(str::to_string));
    }

    pub fn fail(&self, path: &Path) {
        self.failing.lock().unwrap().push(path.to_path_buf());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionResolver for StubResolver {
    async fn resolve(&self, build_file: &Path) -> Result<Option<String>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().iter().any(|p| p == build_file) {
            return Err(ResolveError::ExitStatus {
                command: "mvn".to_string(),
                code: Some(1),
            });
        }
        Ok(self
            .answers
            .lock()
            .unwrap()
            .get(build_file)
            .cloned()
            .flatten())
    }
}

/// Create `relative` under `root` (with parent directories) and return its path.
pub fn touch(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    std::fs::write(&path, contents).expect("write file");
    path
}
