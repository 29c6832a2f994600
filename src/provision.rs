use crate::errors::{HarnessError, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

/// Version-pinned chromedriver archive the harness historically shipped
/// against. Override it per provisioner when a different driver build is
/// needed; driver versioning moves independently of this crate.
pub const CHROMEDRIVER_ARCHIVE_URL: &str =
    "https://chromedriver.storage.googleapis.com/2.8/chromedriver_win32.zip";

/// Makes sure a local driver executable exists on disk, downloading and
/// extracting a zip archive when it does not. Failures are real errors, not
/// log lines: a caller must never proceed without a binary by accident.
pub struct DriverProvisioner {
    http: reqwest::Client,
    archive_url: Url,
    install_dir: PathBuf,
    binary_name: String,
}

impl DriverProvisioner {
    pub fn new(archive_url: Url, install_dir: impl Into<PathBuf>, binary_name: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            archive_url,
            install_dir: install_dir.into(),
            binary_name: binary_name.to_string(),
        }
    }

    /// Provisioner for the pinned chromedriver archive.
    pub fn chromedriver(install_dir: impl Into<PathBuf>) -> Result<Self> {
        let binary = if cfg!(windows) {
            "chromedriver.exe"
        } else {
            "chromedriver"
        };
        Ok(Self::new(
            Url::parse(CHROMEDRIVER_ARCHIVE_URL)?,
            install_dir,
            binary,
        ))
    }

    pub fn binary_path(&self) -> PathBuf {
        self.install_dir.join(&self.binary_name)
    }

    fn archive_path(&self) -> PathBuf {
        let name = self
            .archive_url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .unwrap_or("driver.zip");
        self.install_dir.join(name)
    }

    /// Return the driver binary path, downloading and unpacking the archive
    /// first if the binary is absent.
    pub async fn ensure(&self) -> Result<PathBuf> {
        let binary = self.binary_path();
        if binary.exists() {
            info!(path = %binary.display(), "Driver binary already present");
            return Ok(binary);
        }

        let archive = self.archive_path();
        info!(url = %self.archive_url, "Downloading driver archive");
        let bytes = self
            .http
            .get(self.archive_url.clone())
            .send()
            .await
            .map_err(|e| HarnessError::Provisioning(format!("download failed: {e}")))?
            .error_for_status()
            .map_err(|e| HarnessError::Provisioning(format!("download failed: {e}")))?
            .bytes()
            .await
            .map_err(|e| HarnessError::Provisioning(format!("download failed: {e}")))?;

        tokio::fs::create_dir_all(&self.install_dir).await?;
        tokio::fs::write(&archive, &bytes).await?;
        info!(path = %archive.display(), "Finished downloading driver archive");

        let dest = self.install_dir.clone();
        let archive_for_task = archive.clone();
        tokio::task::spawn_blocking(move || unzip(&archive_for_task, &dest))
            .await
            .map_err(|e| HarnessError::Provisioning(format!("unzip task failed: {e}")))??;

        if !binary.exists() {
            return Err(HarnessError::Provisioning(format!(
                "archive did not contain '{}'",
                self.binary_name
            )));
        }
        mark_executable(&binary)?;
        info!(path = %binary.display(), "Driver binary provisioned");
        Ok(binary)
    }
}

fn unzip(archive: &Path, destination: &Path) -> Result<()> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| HarnessError::Provisioning(format!("unreadable archive: {e}")))?;
    zip.extract(destination)
        .map_err(|e| HarnessError::Provisioning(format!("extraction failed: {e}")))?;
    Ok(())
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip_with(dir: &Path, archive_name: &str, entry: &str) -> PathBuf {
        let path = dir.join(archive_name);
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file(entry, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"binary bits").unwrap();
        writer.finish().unwrap();
        path
    }

    #[tokio::test]
    async fn existing_binary_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let provisioner = DriverProvisioner::new(
            Url::parse("http://127.0.0.1:9/unreachable.zip").unwrap(),
            dir.path(),
            "chromedriver",
        );
        std::fs::write(provisioner.binary_path(), b"present").unwrap();

        let path = provisioner.ensure().await.unwrap();

        assert_eq!(path, dir.path().join("chromedriver"));
    }

    #[tokio::test]
    async fn download_failure_is_a_provisioning_error() {
        let dir = tempfile::tempdir().unwrap();
        let provisioner = DriverProvisioner::new(
            Url::parse("http://127.0.0.1:9/unreachable.zip").unwrap(),
            dir.path(),
            "chromedriver",
        );

        let result = provisioner.ensure().await;

        assert!(matches!(result, Err(HarnessError::Provisioning(_))));
    }

    #[test]
    fn unzip_extracts_the_binary() {
        let dir = tempfile::tempdir().unwrap();
        let archive = write_zip_with(dir.path(), "chromedriver_win32.zip", "chromedriver");

        unzip(&archive, dir.path()).unwrap();

        assert!(dir.path().join("chromedriver").exists());
    }

    #[test]
    fn unzip_rejects_a_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"not a zip").unwrap();

        let result = unzip(&archive, dir.path());

        assert!(matches!(result, Err(HarnessError::Provisioning(_))));
    }

    #[test]
    fn archive_name_comes_from_the_url() {
        let provisioner = DriverProvisioner::new(
            Url::parse(CHROMEDRIVER_ARCHIVE_URL).unwrap(),
            "/tmp/drivers",
            "chromedriver",
        );
        assert_eq!(
            provisioner.archive_path(),
            PathBuf::from("/tmp/drivers/chromedriver_win32.zip")
        );
    }
}
