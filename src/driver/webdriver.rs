use crate::capabilities::CapabilityDescriptor;
use crate::driver::{Driver, DriverFactory};
use crate::errors::{HarnessError, Result};
use async_trait::async_trait;
use thirtyfour::{Capabilities, DesiredCapabilities, WebDriver};
use tracing::info;
use url::Url;

/// Production driver backed by a W3C WebDriver session (local driver binary
/// or remote grid hub; the endpoint URL is all that differs).
pub struct WebDriverBackend {
    driver: WebDriver,
}

impl WebDriverBackend {
    pub fn new(driver: WebDriver) -> Self {
        Self { driver }
    }
}

fn webdriver_err(error: thirtyfour::error::WebDriverError) -> HarnessError {
    HarnessError::WebDriver(error.to_string())
}

#[async_trait]
impl Driver for WebDriverBackend {
    async fn goto(&self, url: &str) -> Result<()> {
        self.driver.goto(url).await.map_err(webdriver_err)
    }

    async fn current_url(&self) -> Result<String> {
        let url = self.driver.current_url().await.map_err(webdriver_err)?;
        Ok(url.to_string())
    }

    async fn title(&self) -> Result<String> {
        self.driver.title().await.map_err(webdriver_err)
    }

    async fn page_source(&self) -> Result<String> {
        self.driver.source().await.map_err(webdriver_err)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.driver.screenshot_as_png().await.map_err(webdriver_err)
    }

    async fn set_window_rect(&self, x: i64, y: i64, width: u32, height: u32) -> Result<()> {
        // Offsets are non-negative by contract; the client wants u32.
        self.driver
            .set_window_rect(x as u32, y as u32, width, height)
            .await
            .map_err(webdriver_err)
    }

    async fn session_id(&self) -> Result<Option<String>> {
        Ok(Some(self.driver.session_id().to_string()))
    }

    async fn quit(&self) -> Result<()> {
        self.driver.clone().quit().await.map_err(webdriver_err)
    }
}

/// Connects real WebDriver sessions. The capability descriptor is converted
/// into the client's capability map on top of the per-browser defaults.
#[derive(Debug, Default, Clone)]
pub struct WebDriverFactory;

impl WebDriverFactory {
    pub fn new() -> Self {
        Self
    }
}

fn to_client_capabilities(descriptor: &CapabilityDescriptor) -> Capabilities {
    let mut caps: Capabilities = match descriptor.browser_name() {
        Some("firefox") => DesiredCapabilities::firefox().into(),
        Some("internet explorer") => DesiredCapabilities::internet_explorer().into(),
        Some("safari") => DesiredCapabilities::safari().into(),
        _ => DesiredCapabilities::chrome().into(),
    };
    for (key, value) in descriptor.values() {
        caps.insert(key.clone(), value.clone());
    }
    caps
}

#[async_trait]
impl DriverFactory for WebDriverFactory {
    async fn connect(
        &self,
        endpoint: &Url,
        capabilities: &CapabilityDescriptor,
    ) -> Result<Box<dyn Driver>> {
        info!(endpoint = %endpoint, "Connecting WebDriver session");
        let caps = to_client_capabilities(capabilities);
        let driver = WebDriver::new(endpoint.as_str(), caps)
            .await
            .map_err(|e| HarnessError::LaunchFailed(e.to_string()))?;
        Ok(Box::new(WebDriverBackend::new(driver)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn capability_conversion_keeps_custom_entries() {
        let mut descriptor = CapabilityDescriptor::new("chrome");
        descriptor.set("screen-resolution", json!("1280x1024"));
        descriptor.set("tags", json!(["a", "b"]));
        let caps = to_client_capabilities(&descriptor);
        assert_eq!(caps.get("browserName"), Some(&json!("chrome")));
        assert_eq!(caps.get("screen-resolution"), Some(&json!("1280x1024")));
        assert_eq!(caps.get("tags"), Some(&json!(["a", "b"])));
    }
}
