use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Operational counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub signups: Arc<AtomicUsize>,
    pub logins_succeeded: Arc<AtomicUsize>,
    pub logins_failed: Arc<AtomicUsize>,
    pub profile_updates: Arc<AtomicUsize>,
    pub auth_rejections: Arc<AtomicU64>,
    pub csrf_rejections: Arc<AtomicU64>,
    pub rate_limited: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            signups: Arc::new(AtomicUsize::new(0)),
            logins_succeeded: Arc::new(AtomicUsize::new(0)),
            logins_failed: Arc::new(AtomicUsize::new(0)),
            profile_updates: Arc::new(AtomicUsize::new(0)),
            auth_rejections: Arc::new(AtomicU64::new(0)),
            csrf_rejections: Arc::new(AtomicU64::new(0)),
            rate_limited: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_signups(&self) {
        self.signups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_logins_succeeded(&self) {
        self.logins_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_logins_failed(&self) {
        self.logins_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_profile_updates(&self) {
        self.profile_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_auth_rejections(&self) {
        self.auth_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_csrf_rejections(&self) {
        self.csrf_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            signups: self.signups.load(Ordering::Relaxed),
            logins_succeeded: self.logins_succeeded.load(Ordering::Relaxed),
            logins_failed: self.logins_failed.load(Ordering::Relaxed),
            profile_updates: self.profile_updates.load(Ordering::Relaxed),
            auth_rejections: self.auth_rejections.load(Ordering::Relaxed),
            csrf_rejections: self.csrf_rejections.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub signups: usize,
    pub logins_succeeded: usize,
    pub logins_failed: usize,
    pub profile_updates: usize,
    pub auth_rejections: u64,
    pub csrf_rejections: u64,
    pub rate_limited: u64,
    pub uptime_seconds: u64,
}
