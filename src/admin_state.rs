use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide admin state: the static file hit counter and the deployment
/// platform. Constructed once at startup and shared through `web::Data`, so
/// each test server gets its own instance.
#[derive(Debug)]
pub struct AdminState {
    platform: String,
    file_server_hits: AtomicU64,
}

impl AdminState {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            file_server_hits: AtomicU64::new(0),
        }
    }

    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }

    pub fn record_hit(&self) {
        self.file_server_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.file_server_hits.load(Ordering::Relaxed)
    }

    pub fn reset_hits(&self) {
        self.file_server_hits.store(0, Ordering::Relaxed);
    }
}
