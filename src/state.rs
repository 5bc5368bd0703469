//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::allocator::DEFAULT_MAX_ATTEMPTS;
use crate::application::services::reclaim_service::DEFAULT_BATCH_SIZE;
use crate::application::services::{Allocator, ReclaimService, RedirectService, UpsertService};
use crate::config::Config;
use crate::domain::clock::Clock;
use crate::domain::repositories::EntryRepository;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{DEFAULT_GENERATED_LENGTH, IdGenerator, RandomIdGenerator};
use crate::utils::expiration::DEFAULT_MAX_TTL_DAYS;

/// Tunables for the services built into [`AppState`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub allocator_max_attempts: u32,
    pub allocator_id_length: usize,
    pub cache_ttl_seconds: u64,
    pub reclaim_batch_size: i64,
    pub max_ttl_days: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            allocator_max_attempts: DEFAULT_MAX_ATTEMPTS,
            allocator_id_length: DEFAULT_GENERATED_LENGTH,
            cache_ttl_seconds: 3600,
            reclaim_batch_size: DEFAULT_BATCH_SIZE,
            max_ttl_days: DEFAULT_MAX_TTL_DAYS,
        }
    }
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            allocator_max_attempts: config.allocator_max_attempts,
            allocator_id_length: config.allocator_id_length,
            cache_ttl_seconds: config.cache_ttl_seconds,
            reclaim_batch_size: config.reclaim_batch_size,
            max_ttl_days: config.max_ttl_days,
        }
    }
}

/// Services and collaborators shared by all request handlers.
///
/// Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub upsert_service: Arc<UpsertService<dyn EntryRepository>>,
    pub allocator: Arc<Allocator<dyn EntryRepository>>,
    pub redirect_service: Arc<RedirectService<dyn EntryRepository>>,
    pub reclaim_service: Arc<ReclaimService<dyn EntryRepository>>,
    pub repository: Arc<dyn EntryRepository>,
    pub cache: Arc<dyn CacheService>,
    pub clock: Arc<dyn Clock>,
    pub max_ttl_days: u64,
}

impl AppState {
    /// Wires the services over `repository` using a random id generator.
    pub fn new(
        repository: Arc<dyn EntryRepository>,
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
        settings: ServiceSettings,
    ) -> Self {
        let generator = Arc::new(RandomIdGenerator::new(settings.allocator_id_length));
        Self::with_generator(repository, cache, clock, generator, settings)
    }

    /// Same as [`AppState::new`] with an explicit id generator.
    pub fn with_generator(
        repository: Arc<dyn EntryRepository>,
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn IdGenerator>,
        settings: ServiceSettings,
    ) -> Self {
        let upsert_service = Arc::new(UpsertService::new(Arc::clone(&repository)));
        let allocator = Arc::new(Allocator::new(
            Arc::clone(&upsert_service),
            generator,
            settings.allocator_max_attempts,
        ));
        let redirect_service = Arc::new(RedirectService::new(
            Arc::clone(&repository),
            Arc::clone(&cache),
            settings.cache_ttl_seconds,
        ));
        let reclaim_service = Arc::new(ReclaimService::new(
            Arc::clone(&repository),
            settings.reclaim_batch_size,
        ));

        Self {
            upsert_service,
            allocator,
            redirect_service,
            reclaim_service,
            repository,
            cache,
            clock,
            max_ttl_days: settings.max_ttl_days,
        }
    }
}
