#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use ttl_shortener::domain::clock::ManualClock;
use ttl_shortener::infrastructure::cache::NullCache;
use ttl_shortener::infrastructure::persistence::InMemoryEntryRepository;
use ttl_shortener::routes::router;
use ttl_shortener::state::{AppState, ServiceSettings};
use ttl_shortener::utils::code_generator::IdGenerator;

/// 2025-01-01T00:00:00Z
pub const T0: i64 = 1_735_689_600;

pub const ONE_YEAR: i64 = 365 * 86_400;

pub struct TestApp {
    pub server: TestServer,
    pub clock: Arc<ManualClock>,
    pub repository: Arc<InMemoryEntryRepository>,
}

/// Hands out ids from a fixed list, repeating the last one.
pub struct SequenceIdGenerator {
    ids: Vec<String>,
    next: AtomicUsize,
}

impl SequenceIdGenerator {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            ids: ids.iter().map(|id| id.to_string()).collect(),
            next: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn generate(&self) -> String {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.ids[index.min(self.ids.len() - 1)].clone()
    }
}

pub fn spawn_app() -> TestApp {
    build_app(None, ServiceSettings::default())
}

pub fn spawn_app_with_generator(generator: Arc<dyn IdGenerator>, max_attempts: u32) -> TestApp {
    let settings = ServiceSettings {
        allocator_max_attempts: max_attempts,
        ..ServiceSettings::default()
    };
    build_app(Some(generator), settings)
}

fn build_app(generator: Option<Arc<dyn IdGenerator>>, settings: ServiceSettings) -> TestApp {
    let clock = Arc::new(ManualClock::new(T0));
    let repository = Arc::new(InMemoryEntryRepository::new());

    let state = match generator {
        Some(generator) => AppState::with_generator(
            repository.clone(),
            Arc::new(NullCache::new()),
            clock.clone(),
            generator,
            settings,
        ),
        None => AppState::new(
            repository.clone(),
            Arc::new(NullCache::new()),
            clock.clone(),
            settings,
        ),
    };

    let server = TestServer::new(router(state)).unwrap();

    TestApp {
        server,
        clock,
        repository,
    }
}

pub fn rfc3339(seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .unwrap()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn entry_body(url: &str, expires_at: i64) -> Value {
    json!({
        "url": url,
        "expiration_timestamp": rfc3339(expires_at),
    })
}
