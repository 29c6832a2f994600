pub mod webdriver;

pub use webdriver::{WebDriverBackend, WebDriverFactory};

use crate::capabilities::CapabilityDescriptor;
use crate::errors::Result;
use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

/// Minimal remote-controllable browser handle. The wire protocol behind it is
/// opaque to the harness; production code talks W3C WebDriver, tests talk to
/// a recording mock.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    async fn page_source(&self) -> Result<String>;

    /// PNG bytes of the current viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    async fn set_window_rect(&self, x: i64, y: i64, width: u32, height: u32) -> Result<()>;

    /// The remote session identifier, when the backend has one.
    async fn session_id(&self) -> Result<Option<String>>;

    async fn quit(&self) -> Result<()>;
}

/// Seam between the launcher and the concrete WebDriver client.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn connect(
        &self,
        endpoint: &Url,
        capabilities: &CapabilityDescriptor,
    ) -> Result<Box<dyn Driver>>;
}

/// Uniform post-construction wrapper around any freshly built driver. It
/// captures the remote session identifier once, at wrap time, and traces the
/// commands that pass through it. Every construction path goes through this
/// exactly once; no per-branch upgrading.
pub struct AugmentedDriver {
    inner: Box<dyn Driver>,
    remote_session_id: Option<String>,
}

impl AugmentedDriver {
    pub async fn augment(inner: Box<dyn Driver>) -> Self {
        let remote_session_id = match inner.session_id().await {
            Ok(id) => id,
            Err(error) => {
                warn!(%error, "Could not read the session id while augmenting the driver");
                None
            }
        };
        Self {
            inner,
            remote_session_id,
        }
    }

    /// Wrap with a pre-captured session id, skipping the introspection call.
    pub(crate) fn wrap_with_session_id(
        inner: Box<dyn Driver>,
        remote_session_id: Option<String>,
    ) -> Self {
        Self {
            inner,
            remote_session_id,
        }
    }

    /// Session id captured at wrap time.
    pub fn remote_session_id(&self) -> Option<&str> {
        self.remote_session_id.as_deref()
    }
}

#[async_trait]
impl Driver for AugmentedDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!(url, "driver: goto");
        self.inner.goto(url).await
    }

    async fn current_url(&self) -> Result<String> {
        self.inner.current_url().await
    }

    async fn title(&self) -> Result<String> {
        self.inner.title().await
    }

    async fn page_source(&self) -> Result<String> {
        self.inner.page_source().await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.inner.screenshot().await
    }

    async fn set_window_rect(&self, x: i64, y: i64, width: u32, height: u32) -> Result<()> {
        debug!(x, y, width, height, "driver: set_window_rect");
        self.inner.set_window_rect(x, y, width, height).await
    }

    async fn session_id(&self) -> Result<Option<String>> {
        Ok(self.remote_session_id.clone())
    }

    async fn quit(&self) -> Result<()> {
        debug!("driver: quit");
        self.inner.quit().await
    }
}
