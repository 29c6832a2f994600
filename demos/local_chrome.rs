use gridrunner::SessionBuilder;
use tracing::info;

/// Drives a locally running chromedriver (port 9515) through a full
/// session: build, navigate, inspect, quit.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    gridrunner::testing::init_logging();

    let session = SessionBuilder::new("local chrome demo", "chrome")
        .app_url("https://example.com/")
        .build()
        .await?;

    session.navigate_to_start().await?;

    let util = session.util()?;
    util.wait_timer(1, 1000).await;
    info!(title = %util.title().await?, "Page loaded");
    util.set_window_position(800, 600, 20, 100).await?;

    session.quit().await?;
    Ok(())
}
