//! Acquisition of the daily CryoSat-SMOS product files.
//!
//! The archive is organised as
//!
//! ```text
//! {base}/YYYY/MM/W_XX-ESA,SMOS_CS2,NH_25KM_EASE2_{start}_{end}_r_v206_01_l4sit.nc
//! {base}/LATEST/W_XX-ESA,SMOS_CS2,NH_25KM_EASE2_{start}_{end}_o_v206_01_l4sit.nc
//! ```
//!
//! where `start`/`end` span the seven-day window centred on the map date.
//! Reprocessed (`r`) files replace the operational (`o`) ones a while after
//! the fact; everything before June 2023 only exists as reprocessed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use crate::{IngestionError, Result};

/// Release line of a product file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revision {
    /// Near-real-time file in `LATEST/`.
    Operational,
    /// Reprocessed file in `YYYY/MM/`.
    Reprocessed,
}

impl Revision {
    /// Revision actually served for `date`: operational files only exist
    /// from June 2023 on.
    pub fn effective(self, date: NaiveDate) -> Self {
        if (date.year(), date.month()) < (2023, 6) {
            Self::Reprocessed
        } else {
            self
        }
    }

    /// Letter used in file names.
    pub fn code(&self) -> char {
        match self {
            Self::Operational => 'o',
            Self::Reprocessed => 'r',
        }
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Operational => f.write_str("operational"),
            Self::Reprocessed => f.write_str("reprocessed"),
        }
    }
}

/// Ordered list of revisions to try for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionPolicy {
    order: Vec<Revision>,
}

impl RevisionPolicy {
    pub fn new(order: Vec<Revision>) -> Self {
        Self { order }
    }

    /// Operational first where it exists, with a reprocessed fallback once
    /// both lines overlap (after June 2023).
    pub fn for_date(date: NaiveDate) -> Self {
        let ym = (date.year(), date.month());
        let order = if ym < (2023, 6) {
            vec![Revision::Reprocessed]
        } else if ym == (2023, 6) {
            vec![Revision::Operational]
        } else {
            vec![Revision::Operational, Revision::Reprocessed]
        };
        Self { order }
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.order
    }
}

/// Product file name for `date`.
pub fn source_file_name(date: NaiveDate, revision: Revision) -> String {
    let start = date - Duration::days(3);
    let end = date + Duration::days(3);
    format!(
        "W_XX-ESA,SMOS_CS2,NH_25KM_EASE2_{}_{}_{}_v206_01_l4sit.nc",
        start.format("%Y%m%d"),
        end.format("%Y%m%d"),
        revision.effective(date).code()
    )
}

/// Archive sub-folder holding the file for `date`.
pub fn remote_subfolder(date: NaiveDate, revision: Revision) -> String {
    match revision.effective(date) {
        Revision::Reprocessed => format!("{}/{:02}", date.year(), date.month()),
        Revision::Operational => "LATEST".to_string(),
    }
}

/// URL path of the file below the archive root, commas escaped.
pub fn remote_path(date: NaiveDate, revision: Revision) -> String {
    format!(
        "{}/{}",
        remote_subfolder(date, revision),
        source_file_name(date, revision).replace(',', "%2C")
    )
}

/// Makes a product file available on the local filesystem.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Local path of the file for `date` in `revision`. A file the archive
    /// does not have is [`IngestionError::NotFound`].
    async fn fetch(&self, date: NaiveDate, revision: Revision) -> Result<PathBuf>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Directory mirror laid out like the remote archive.
#[derive(Debug, Clone)]
pub struct LocalArchive {
    root: PathBuf,
}

impl LocalArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, date: NaiveDate, revision: Revision) -> PathBuf {
        self.root
            .join(remote_subfolder(date, revision))
            .join(source_file_name(date, revision))
    }
}

#[async_trait]
impl SourceFetcher for LocalArchive {
    async fn fetch(&self, date: NaiveDate, revision: Revision) -> Result<PathBuf> {
        let path = self.path_for(date, revision);
        if tokio::fs::try_exists(&path).await? {
            debug!(path = %path.display(), "Found product in local archive");
            Ok(path)
        } else {
            Err(IngestionError::NotFound(path.display().to_string()))
        }
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Remote archive reachable over HTTP(S). Files are downloaded into
/// `download_dir` and reused on later requests.
#[derive(Debug, Clone)]
pub struct HttpArchive {
    client: Client,
    base_url: String,
    download_dir: PathBuf,
}

impl HttpArchive {
    pub fn new(base_url: impl Into<String>, download_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .timeout(std::time::Duration::from_secs(600))
            .build()?;
        Ok(Self::with_client(client, base_url, download_dir))
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            download_dir: download_dir.into(),
        }
    }

    pub fn url_for(&self, date: NaiveDate, revision: Revision) -> String {
        format!("{}/{}", self.base_url, remote_path(date, revision))
    }

    async fn download(&self, url: &str, final_path: &Path) -> Result<()> {
        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(IngestionError::NotFound(url.to_string())),
            status => return Err(IngestionError::Http(format!("{} for {}", status, url))),
        }

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let temp_path = final_path.with_extension("nc.partial");
        let mut file = tokio::fs::File::create(&temp_path).await?;
        let mut stream = response.bytes_stream();
        let mut bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&temp_path, final_path).await?;
        info!(url = %url, bytes = bytes, "Download completed");
        Ok(())
    }
}

#[async_trait]
impl SourceFetcher for HttpArchive {
    #[instrument(skip(self), fields(archive = %self.base_url))]
    async fn fetch(&self, date: NaiveDate, revision: Revision) -> Result<PathBuf> {
        let final_path = self.download_dir.join(source_file_name(date, revision));
        if tokio::fs::try_exists(&final_path).await? {
            info!(path = %final_path.display(), "File already exists, skipping download");
            return Ok(final_path);
        }

        let url = self.url_for(date, revision);
        self.download(&url, &final_path).await?;
        Ok(final_path)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Try every revision of `policy` in order. The first success wins; when
/// all fail, the last error is returned.
pub async fn fetch_with_policy(
    fetcher: &dyn SourceFetcher,
    date: NaiveDate,
    policy: &RevisionPolicy,
) -> Result<(PathBuf, Revision)> {
    let mut last_err = IngestionError::NotFound(format!("no revision configured for {}", date));

    for &revision in policy.revisions() {
        match fetcher.fetch(date, revision).await {
            Ok(path) => return Ok((path, revision)),
            Err(e) => {
                warn!(
                    fetcher = fetcher.name(),
                    date = %date,
                    revision = %revision,
                    error = %e,
                    "Product not available"
                );
                last_err = e;
            }
        }
    }

    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_utils::temp_test_dir;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            source_file_name(ymd(2022, 1, 2), Revision::Operational),
            "W_XX-ESA,SMOS_CS2,NH_25KM_EASE2_20211230_20220105_r_v206_01_l4sit.nc"
        );
        assert_eq!(
            source_file_name(ymd(2024, 3, 10), Revision::Operational),
            "W_XX-ESA,SMOS_CS2,NH_25KM_EASE2_20240307_20240313_o_v206_01_l4sit.nc"
        );
        assert_eq!(
            source_file_name(ymd(2024, 3, 10), Revision::Reprocessed),
            "W_XX-ESA,SMOS_CS2,NH_25KM_EASE2_20240307_20240313_r_v206_01_l4sit.nc"
        );
    }

    #[test]
    fn test_subfolders() {
        assert_eq!(remote_subfolder(ymd(2021, 11, 1), Revision::Operational), "2021/11");
        assert_eq!(remote_subfolder(ymd(2024, 1, 9), Revision::Reprocessed), "2024/01");
        assert_eq!(remote_subfolder(ymd(2024, 1, 9), Revision::Operational), "LATEST");
        assert!(remote_path(ymd(2024, 1, 9), Revision::Operational)
            .starts_with("LATEST/W_XX-ESA%2CSMOS_CS2%2CNH_25KM"));
    }

    #[test]
    fn test_revision_policy() {
        assert_eq!(
            RevisionPolicy::for_date(ymd(2023, 4, 1)).revisions(),
            &[Revision::Reprocessed]
        );
        assert_eq!(
            RevisionPolicy::for_date(ymd(2023, 6, 1)).revisions(),
            &[Revision::Operational]
        );
        assert_eq!(
            RevisionPolicy::for_date(ymd(2023, 11, 1)).revisions(),
            &[Revision::Operational, Revision::Reprocessed]
        );
    }

    struct StubFetcher {
        available: HashSet<Revision>,
    }

    #[async_trait]
    impl SourceFetcher for StubFetcher {
        async fn fetch(&self, date: NaiveDate, revision: Revision) -> Result<PathBuf> {
            if self.available.contains(&revision) {
                Ok(PathBuf::from(source_file_name(date, revision)))
            } else {
                Err(IngestionError::NotFound(revision.to_string()))
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn test_policy_falls_back() {
        let date = ymd(2024, 1, 15);
        let fetcher = StubFetcher {
            available: HashSet::from([Revision::Reprocessed]),
        };
        let (path, revision) = fetch_with_policy(&fetcher, date, &RevisionPolicy::for_date(date))
            .await
            .unwrap();
        assert_eq!(revision, Revision::Reprocessed);
        assert!(path.to_string_lossy().contains("_r_v206"));
    }

    #[tokio::test]
    async fn test_policy_all_missing() {
        let date = ymd(2024, 1, 15);
        let fetcher = StubFetcher {
            available: HashSet::new(),
        };
        let err = fetch_with_policy(&fetcher, date, &RevisionPolicy::for_date(date))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_local_archive() {
        let dir = temp_test_dir();
        let archive = LocalArchive::new(dir.path());
        let date = ymd(2021, 12, 1);

        assert!(archive
            .fetch(date, Revision::Reprocessed)
            .await
            .unwrap_err()
            .is_not_found());

        let path = archive.path_for(date, Revision::Reprocessed);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"CDF").unwrap();
        assert_eq!(archive.fetch(date, Revision::Reprocessed).await.unwrap(), path);
        assert!(path.starts_with(dir.path().join("2021/12")));
    }

    /// Serves `body` for any path except those containing `LATEST`, which
    /// answer 404.
    async fn spawn_archive_server(body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&request);
                let response: Vec<u8> = if request.contains("LATEST") {
                    b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_vec()
                } else {
                    let mut r = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    )
                    .into_bytes();
                    r.extend_from_slice(body);
                    r
                };
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_http_archive_download_and_404() {
        let base = spawn_archive_server(b"netcdf-bytes").await;
        let dir = temp_test_dir();
        let archive = HttpArchive::new(base, dir.path()).unwrap();
        let date = ymd(2024, 2, 1);

        let err = archive.fetch(date, Revision::Operational).await.unwrap_err();
        assert!(err.is_not_found());

        let path = archive.fetch(date, Revision::Reprocessed).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"netcdf-bytes");
        assert_eq!(path.parent().unwrap(), dir.path());

        // Cached file is reused
        let again = archive.fetch(date, Revision::Reprocessed).await.unwrap();
        assert_eq!(again, path);
    }
}
