pub mod builder;
pub mod capabilities;
pub mod config;
pub mod driver;
pub mod errors;
pub mod launcher;
pub mod provision;
pub mod reporter;
pub mod session;
pub mod testing;
pub mod util;

pub use builder::SessionBuilder;
pub use capabilities::{resolve, CapabilityDescriptor, ResolvedCapabilities};
pub use config::{BrowserId, BrowserProfile, SessionConfig};
pub use driver::{AugmentedDriver, Driver, DriverFactory, WebDriverFactory};
pub use errors::{HarnessError, Result};
pub use launcher::{LaunchMode, LaunchOptions, LaunchedDriver, Launcher, WindowGeometry};
pub use provision::DriverProvisioner;
pub use reporter::{JobApi, JobInfo, JobUpdate, SauceRest};
pub use session::Session;
pub use util::SessionUtil;
