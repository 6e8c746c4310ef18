//! Instrumented units and stores shared by the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use keeper_server::service::{ServiceError, ServiceUnit};
use keeper_server::storage::{Store, StoreBackend, StorageError};

/// Ordered record of everything the units and the store did.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.snapshot().iter().position(|e| e == event)
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.snapshot().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

/// A unit whose behavior is scripted per test.
pub struct ScriptedUnit {
    name: String,
    log: EventLog,
    start_delay: Duration,
    stop_delay: Duration,
    fail_start: bool,
    fail_stop: bool,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedUnit {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            start_delay: Duration::ZERO,
            stop_delay: Duration::ZERO,
            fail_start: false,
            fail_stop: false,
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    pub fn slow_start(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub fn slow_stop(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl ServiceUnit for ScriptedUnit {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("start:{}", self.name));
        if !self.start_delay.is_zero() {
            tokio::time::sleep(self.start_delay).await;
        }
        if self.fail_start {
            self.log.push(format!("start-failed:{}", self.name));
            return Err(ServiceError::Other(format!("{} refused to start", self.name)));
        }
        self.log.push(format!("started:{}", self.name));
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("stop:{}", self.name));
        if !self.stop_delay.is_zero() {
            tokio::time::sleep(self.stop_delay).await;
        }
        if self.fail_stop {
            return Err(ServiceError::Other(format!("{} refused to stop", self.name)));
        }
        self.log.push(format!("stopped:{}", self.name));
        Ok(())
    }
}

/// A store that records its close into the log.
pub struct RecordingStore {
    log: EventLog,
    pub closes: AtomicUsize,
}

#[async_trait]
impl Store for RecordingStore {
    async fn close(&self) -> Result<(), StorageError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.log.push("close-store");
        Ok(())
    }
}

/// Backend handing out one [`RecordingStore`], or failing on demand.
pub struct RecordingBackend {
    log: EventLog,
    fail: bool,
    pub store: Arc<RecordingStore>,
}

#[allow(dead_code)]
impl RecordingBackend {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            fail: false,
            store: Arc::new(RecordingStore {
                log: log.clone(),
                closes: AtomicUsize::new(0),
            }),
        }
    }

    pub fn failing(log: &EventLog) -> Self {
        Self {
            fail: true,
            ..Self::new(log)
        }
    }

    pub fn closes(&self) -> usize {
        self.store.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreBackend for RecordingBackend {
    async fn open(&self) -> Result<Arc<dyn Store>, StorageError> {
        if self.fail {
            self.log.push("open-store-failed");
            return Err(StorageError::Other("store unavailable".into()));
        }
        self.log.push("open-store");
        Ok(self.store.clone())
    }
}

/// Upcast a list of scripted units for `Keeper::new`.
#[allow(dead_code)]
pub fn as_units(units: &[Arc<ScriptedUnit>]) -> Vec<Arc<dyn ServiceUnit>> {
    units
        .iter()
        .map(|u| u.clone() as Arc<dyn ServiceUnit>)
        .collect()
}

/// Poll `cond` until it holds or two seconds pass.
#[allow(dead_code)]
pub async fn eventually(cond: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
