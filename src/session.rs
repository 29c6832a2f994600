use crate::capabilities::{CapabilityDescriptor, ResolvedCapabilities};
use crate::config::{BrowserId, SessionConfig};
use crate::driver::{AugmentedDriver, Driver};
use crate::errors::{HarnessError, Result};
use crate::launcher::LaunchedDriver;
use crate::reporter::{JobApi, JobUpdate, SauceRest};
use crate::util::SessionUtil;
use std::sync::{Arc, OnceLock};
use tokio::process::Child;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

/// Immutable-after-construction bundle of one test's browser session: the
/// configuration it was built from, the resolved capabilities, the live
/// driver handle and the remote session identifier (grid/hosted only).
///
/// One session is owned by exactly one sequential test execution. It is
/// never pooled or shared; tear it down with [`Session::quit`] or the remote
/// browser session leaks.
pub struct Session {
    id: Uuid,
    test_name: String,
    browser: BrowserId,
    app_url: Option<Url>,
    hub_url: Option<Url>,
    sauce_user: Option<String>,
    sauce_key: Option<String>,
    session_id: Option<String>,
    capabilities: CapabilityDescriptor,
    is_grid: bool,
    is_sauce: bool,
    driver: Option<Arc<AugmentedDriver>>,
    process: Option<Child>,
    // The one mutable-field exception: created lazily on first access.
    util: OnceLock<SessionUtil>,
}

impl Session {
    /// Pure assembly of the three launch products; no field is computed here.
    pub(crate) fn assemble(
        config: SessionConfig,
        resolved: ResolvedCapabilities,
        launched: LaunchedDriver,
    ) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, browser = %config.browser, "Assembled session handle");
        Self {
            id,
            test_name: config.test_name,
            browser: config.browser,
            app_url: config.app_url,
            hub_url: resolved.hub_url,
            sauce_user: config.sauce_user,
            sauce_key: config.sauce_key,
            session_id: launched.session_id,
            capabilities: resolved.capabilities,
            is_grid: resolved.is_grid,
            is_sauce: resolved.is_sauce,
            driver: launched.driver,
            process: launched.process,
            util: OnceLock::new(),
        }
    }

    /// Harness-side identifier, distinct from the remote session id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    pub fn browser(&self) -> BrowserId {
        self.browser
    }

    pub fn app_url(&self) -> Result<&Url> {
        self.app_url.as_ref().ok_or(HarnessError::AppUrlNotSet)
    }

    pub fn hub_url(&self) -> Option<&Url> {
        self.hub_url.as_ref()
    }

    pub fn sauce_user(&self) -> Option<&str> {
        self.sauce_user.as_deref()
    }

    pub fn sauce_key(&self) -> Option<&str> {
        self.sauce_key.as_deref()
    }

    /// Remote session identifier; only grid and hosted sessions have one.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn capabilities(&self) -> &CapabilityDescriptor {
        &self.capabilities
    }

    pub fn is_grid(&self) -> bool {
        self.is_grid
    }

    pub fn is_sauce_session(&self) -> bool {
        self.is_sauce
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    pub fn driver(&self) -> Result<&Arc<AugmentedDriver>> {
        self.driver.as_ref().ok_or(HarnessError::DriverNotLoaded)
    }

    /// Lazily built utility helper bound to this session's driver.
    pub fn util(&self) -> Result<&SessionUtil> {
        let driver = self.driver()?.clone();
        Ok(self.util.get_or_init(|| SessionUtil::new(driver)))
    }

    /// Drive the browser to the configured application URL.
    pub async fn navigate_to_start(&self) -> Result<()> {
        let url = self.app_url()?.clone();
        info!(url = %url, "Navigating to start URL");
        self.driver()?.goto(url.as_str()).await
    }

    /// Push a pass/fail verdict for this session to SauceLabs using the
    /// session's own credentials.
    pub async fn upload_result(
        &self,
        test_name: &str,
        build: &str,
        passed: bool,
    ) -> Result<bool> {
        let (user, key) = match (self.sauce_user(), self.sauce_key()) {
            (Some(user), Some(key)) => (user, key),
            _ => {
                return Err(HarnessError::Configuration(
                    "sauce_user and sauce_key must be set to upload a result".to_string(),
                ))
            }
        };
        let api = SauceRest::new(user, key)?;
        self.upload_result_with(&api, test_name, build, passed).await
    }

    /// Push a pass/fail verdict through the given results API.
    ///
    /// Misuse (a non-hosted session, or a hosted session whose remote id was
    /// never captured) is a state error. Transport failures are best-effort
    /// telemetry and collapse to `Ok(false)`: a reporting hiccup must never
    /// fail the test itself. `Ok(true)` means both the update and the
    /// follow-up job read succeeded.
    pub async fn upload_result_with(
        &self,
        api: &dyn JobApi,
        test_name: &str,
        build: &str,
        passed: bool,
    ) -> Result<bool> {
        if !self.is_sauce {
            return Err(HarnessError::NotSauceSession);
        }
        let session_id = self
            .session_id()
            .ok_or(HarnessError::SessionIdMissing)?
            .to_string();

        info!(build, passed, "Uploading sauce result");
        let mut update = JobUpdate::new(passed, build);
        if !test_name.is_empty() {
            info!(test_name, "Updating SauceLabs test name");
            update.name = Some(test_name.to_string());
        }

        if let Err(error) = api.update_job(&session_id, &update).await {
            warn!(%error, "Failed to update the SauceLabs job");
            return Ok(false);
        }
        match api.job_info(&session_id).await {
            Ok(job) => {
                info!(?job, "Job info");
                Ok(true)
            }
            Err(error) => {
                warn!(%error, "Failed to read back the SauceLabs job info");
                Ok(false)
            }
        }
    }

    /// Tear the session down: quit the driver and stop any locally spawned
    /// driver binary. The only teardown path; there is no mid-operation
    /// cancellation.
    pub async fn quit(mut self) -> Result<()> {
        if let Some(driver) = self.driver.take() {
            driver.quit().await?;
        }
        if let Some(mut process) = self.process.take() {
            if let Err(error) = process.kill().await {
                warn!(%error, "Failed to stop the local driver binary");
            }
        }
        info!(session = %self.id, "Session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::resolve;
    use crate::testing::{mock_launched, MockDriver};

    fn local_chrome_session(app_url: Option<&str>, with_driver: bool) -> Session {
        let mut config = SessionConfig::new("t", BrowserId::Chrome);
        config.app_url = app_url.map(|u| Url::parse(u).unwrap());
        let resolved = resolve(&config).unwrap();
        let driver = with_driver.then(MockDriver::shared);
        Session::assemble(config, resolved, mock_launched(driver, None))
    }

    #[tokio::test]
    async fn app_url_accessor_errors_when_unset() {
        let session = local_chrome_session(None, true);
        assert!(matches!(session.app_url(), Err(HarnessError::AppUrlNotSet)));
        assert!(matches!(
            session.navigate_to_start().await,
            Err(HarnessError::AppUrlNotSet)
        ));
    }

    #[tokio::test]
    async fn driver_accessor_errors_when_unset() {
        let session = local_chrome_session(Some("http://localhost:8000/"), false);
        assert!(!session.has_driver());
        assert!(matches!(session.driver(), Err(HarnessError::DriverNotLoaded)));
        assert!(matches!(
            session.navigate_to_start().await,
            Err(HarnessError::DriverNotLoaded)
        ));
        assert!(matches!(session.util(), Err(HarnessError::DriverNotLoaded)));
    }

    #[tokio::test]
    async fn navigate_to_start_drives_to_the_app_url() {
        let driver = MockDriver::shared();
        let mut config = SessionConfig::new("t", BrowserId::Chrome);
        config.app_url = Some(Url::parse("http://localhost:8000/").unwrap());
        let resolved = resolve(&config).unwrap();
        let session = Session::assemble(config, resolved, mock_launched(Some(driver.clone()), None));

        session.navigate_to_start().await.unwrap();

        let navigations = driver.navigations.lock().unwrap();
        assert_eq!(navigations.as_slice(), &["http://localhost:8000/"]);
    }

    #[tokio::test]
    async fn util_is_created_once_and_reused() {
        let session = local_chrome_session(Some("http://localhost:8000/"), true);
        let first = session.util().unwrap() as *const SessionUtil;
        let second = session.util().unwrap() as *const SessionUtil;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn quit_stops_the_driver() {
        let driver = MockDriver::shared();
        let session = {
            let mut config = SessionConfig::new("t", BrowserId::Chrome);
            config.app_url = Some(Url::parse("http://localhost:8000/").unwrap());
            let resolved = resolve(&config).unwrap();
            Session::assemble(config, resolved, mock_launched(Some(driver.clone()), None))
        };

        session.quit().await.unwrap();

        assert_eq!(driver.quits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
