use crate::driver::{AugmentedDriver, Driver};
use crate::errors::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Stateless helpers test bodies lean on. Bound to one session's driver,
/// created lazily by [`crate::session::Session::util`].
pub struct SessionUtil {
    driver: Arc<AugmentedDriver>,
}

impl SessionUtil {
    pub(crate) fn new(driver: Arc<AugmentedDriver>) -> Self {
        Self { driver }
    }

    /// Plain blocking-style wait: sleeps `units` times `interval_ms`. Not
    /// event-driven polling, by contract.
    pub async fn wait_timer(&self, units: u32, interval_ms: u64) {
        for unit in 0..units {
            debug!(unit, interval_ms, "wait_timer tick");
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        }
    }

    pub async fn set_window_position(&self, width: u32, height: u32, x: i64, y: i64) -> Result<()> {
        self.driver.set_window_rect(x, y, width, height).await
    }

    pub async fn title(&self) -> Result<String> {
        self.driver.title().await
    }
}
