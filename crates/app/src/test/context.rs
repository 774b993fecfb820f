//! Test context wiring a repository to mocks and an in-memory cache.

use std::sync::{Arc, Mutex, PoisonError};

use atrium::ids::SequentialIdGenerator;

use crate::{
    cache::MemoryCacheStore,
    notifications::Notifier,
    remote::MockRemoteAuthority,
    repository::ConfigRepository,
    session::MockSessionProvider,
};

/// Notifier that keeps every message for later assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    errors: Mutex<Vec<String>>,
    successes: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn successes(&self) -> Vec<String> {
        self.successes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn success(&self, message: &str) {
        self.successes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

pub(crate) struct TestContext {
    pub repository: ConfigRepository,
    pub cache: Arc<MemoryCacheStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    pub(crate) fn new(remote: MockRemoteAuthority, session: MockSessionProvider) -> Self {
        Self::with_cache(remote, session, MemoryCacheStore::default())
    }

    pub(crate) fn with_cache(
        remote: MockRemoteAuthority,
        session: MockSessionProvider,
        cache: MemoryCacheStore,
    ) -> Self {
        let cache = Arc::new(cache);
        let notifier = Arc::new(RecordingNotifier::default());

        let repository = ConfigRepository::new(
            Arc::new(remote),
            Arc::new(session),
            cache.clone(),
            notifier.clone(),
            Arc::new(SequentialIdGenerator::new("gen")),
        );

        Self {
            repository,
            cache,
            notifier,
        }
    }
}
