//! Recording test doubles for the driver and results-service seams, plus a
//! couple of helpers. Shipped as a normal module so demo binaries and
//! downstream test suites can reuse them.

use crate::capabilities::CapabilityDescriptor;
use crate::driver::{AugmentedDriver, Driver, DriverFactory};
use crate::errors::{HarnessError, Result};
use crate::launcher::LaunchedDriver;
use crate::reporter::{JobApi, JobInfo, JobUpdate};
use async_trait::async_trait;
use serde_json::Map;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

/// Initialize a fmt tracing subscriber; safe to call repeatedly.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Driver double that records every command issued to it.
#[derive(Debug, Default)]
pub struct MockDriver {
    pub navigations: Mutex<Vec<String>>,
    pub window_rects: Mutex<Vec<(i64, i64, u32, u32)>>,
    pub quits: AtomicUsize,
    pub session_id: Option<String>,
}

impl MockDriver {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_session_id(session_id: &str) -> Arc<Self> {
        Arc::new(Self {
            session_id: Some(session_id.to_string()),
            ..Self::default()
        })
    }
}

/// `Box<dyn Driver>`-compatible handle onto a shared [`MockDriver`].
pub struct MockDriverHandle(pub Arc<MockDriver>);

#[async_trait]
impl Driver for MockDriverHandle {
    async fn goto(&self, url: &str) -> Result<()> {
        self.0.navigations.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let navigations = self.0.navigations.lock().unwrap();
        Ok(navigations.last().cloned().unwrap_or_default())
    }

    async fn title(&self) -> Result<String> {
        Ok("Mock Page".to_string())
    }

    async fn page_source(&self) -> Result<String> {
        Ok("<html></html>".to_string())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    async fn set_window_rect(&self, x: i64, y: i64, width: u32, height: u32) -> Result<()> {
        self.0
            .window_rects
            .lock()
            .unwrap()
            .push((x, y, width, height));
        Ok(())
    }

    async fn session_id(&self) -> Result<Option<String>> {
        Ok(self.0.session_id.clone())
    }

    async fn quit(&self) -> Result<()> {
        self.0.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory double. Clone it (or call [`MockDriverFactory::handle`]) before
/// boxing so the test keeps a view onto the recorded connections and the
/// shared driver.
#[derive(Clone)]
pub struct MockDriverFactory {
    pub connections: Arc<Mutex<Vec<String>>>,
    pub capabilities: Arc<Mutex<Vec<CapabilityDescriptor>>>,
    pub driver: Arc<MockDriver>,
    fail_connect: bool,
}

impl MockDriverFactory {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(Vec::new())),
            capabilities: Arc::new(Mutex::new(Vec::new())),
            driver: MockDriver::shared(),
            fail_connect: false,
        }
    }

    pub fn with_session_id(session_id: &str) -> Self {
        Self {
            driver: MockDriver::with_session_id(session_id),
            ..Self::new()
        }
    }

    /// Every connection attempt fails, as an unreachable hub would.
    pub fn failing() -> Self {
        Self {
            fail_connect: true,
            ..Self::new()
        }
    }

    pub fn handle(&self) -> Self {
        self.clone()
    }
}

impl Default for MockDriverFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DriverFactory for MockDriverFactory {
    async fn connect(
        &self,
        endpoint: &Url,
        capabilities: &CapabilityDescriptor,
    ) -> Result<Box<dyn Driver>> {
        self.connections
            .lock()
            .unwrap()
            .push(endpoint.as_str().to_string());
        self.capabilities.lock().unwrap().push(capabilities.clone());
        if self.fail_connect {
            return Err(HarnessError::LaunchFailed("connection refused".to_string()));
        }
        Ok(Box::new(MockDriverHandle(self.driver.clone())))
    }
}

/// Build a [`LaunchedDriver`] around a mock, the way the launcher would.
pub fn mock_launched(
    driver: Option<Arc<MockDriver>>,
    session_id: Option<&str>,
) -> LaunchedDriver {
    let session_id = session_id.map(str::to_string);
    let driver = driver.map(|d| {
        Arc::new(AugmentedDriver::wrap_with_session_id(
            Box::new(MockDriverHandle(d)),
            session_id.clone(),
        ))
    });
    LaunchedDriver {
        driver,
        session_id,
        process: None,
    }
}

/// Results-service double; records calls and can be told to fail either leg.
#[derive(Default)]
pub struct MockJobApi {
    pub updates: Mutex<Vec<(String, JobUpdate)>>,
    pub info_requests: Mutex<Vec<String>>,
    fail_update: bool,
    fail_info: bool,
}

impl MockJobApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_update() -> Self {
        Self {
            fail_update: true,
            ..Self::default()
        }
    }

    pub fn failing_info() -> Self {
        Self {
            fail_info: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl JobApi for MockJobApi {
    async fn update_job(&self, session_id: &str, update: &JobUpdate) -> Result<()> {
        if self.fail_update {
            return Err(HarnessError::Transport("update refused".to_string()));
        }
        self.updates
            .lock()
            .unwrap()
            .push((session_id.to_string(), update.clone()));
        Ok(())
    }

    async fn job_info(&self, session_id: &str) -> Result<JobInfo> {
        if self.fail_info {
            return Err(HarnessError::Transport("job info unavailable".to_string()));
        }
        self.info_requests
            .lock()
            .unwrap()
            .push(session_id.to_string());
        Ok(JobInfo {
            id: Some(session_id.to_string()),
            name: None,
            passed: None,
            build: None,
            extra: Map::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_driver_records_commands() {
        let driver = MockDriver::shared();
        let handle = MockDriverHandle(driver.clone());

        handle.goto("http://localhost:8000/").await.unwrap();
        handle.set_window_rect(20, 20, 800, 600).await.unwrap();
        handle.quit().await.unwrap();

        assert_eq!(
            driver.navigations.lock().unwrap().as_slice(),
            &["http://localhost:8000/"]
        );
        assert_eq!(
            driver.window_rects.lock().unwrap().as_slice(),
            &[(20, 20, 800, 600)]
        );
        assert_eq!(driver.quits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_factory_still_records_the_attempt() {
        let factory = MockDriverFactory::failing();
        let endpoint = Url::parse("http://hub.example.com/wd/hub").unwrap();
        let caps = CapabilityDescriptor::new("chrome");

        let result = factory.connect(&endpoint, &caps).await;

        assert!(result.is_err());
        assert_eq!(factory.connections.lock().unwrap().len(), 1);
    }
}
