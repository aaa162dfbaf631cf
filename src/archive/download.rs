//! Sequential archive download into a single overwritten file

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use image::DynamicImage;

use crate::core::{Error, Result};

use super::url::archive_urls;

/// How many archive entries one [`download_images`] call processes.
///
/// The crawl stops after the first entry whether or not it succeeded, so the
/// output file is written at most once per call. Walking the whole archive
/// would mean raising this to `usize::MAX`; it is left at one until it is
/// settled which behaviour is wanted.
pub const CRAWL_LIMIT: usize = 1;

/// Fetches and decodes an image
pub trait ImageSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<DynamicImage>> + Send;
}

/// Receives decoded images
pub trait ImageSink {
    fn write(&mut self, image: &DynamicImage) -> Result<()>;
}

/// HTTP image source backed by reqwest
pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<DynamicImage> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Http(format!("GET {} failed with status: {}", url, response.status())));
        }

        let bytes = response.bytes().await?;
        log::debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(image::load_from_memory(&bytes)?)
    }
}

/// Re-encodes every image to one fixed path, replacing the previous file.
/// The format follows the path's extension.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ImageSink for FileSink {
    fn write(&mut self, image: &DynamicImage) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        image.save(&self.path)?;
        Ok(())
    }
}

/// Outcome of one [`download_images`] call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// URLs requested
    pub attempted: usize,
    /// Images handed to the sink successfully
    pub written: usize,
}

/// Walk the archive in order, writing each image to `sink`.
///
/// Failures are logged and swallowed; they never abort the caller. See
/// [`CRAWL_LIMIT`] for how far the walk goes.
pub async fn download_images<S, K>(source: &S, sink: &mut K) -> DownloadReport
where
    S: ImageSource,
    K: ImageSink,
{
    let mut report = DownloadReport::default();

    for url in archive_urls().take(CRAWL_LIMIT) {
        report.attempted += 1;
        log::info!("Downloading {}", url);

        let result = match source.fetch(&url).await {
            Ok(image) => sink.write(&image),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => report.written += 1,
            Err(e) => log::error!("Failed to download {}: {}", url, e),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::archive::url::{archive_url, MONTH_PREFIXES, START_YEAR};

    #[derive(Default)]
    struct FakeSource {
        fail: bool,
        requested: Mutex<Vec<String>>,
    }

    impl ImageSource for FakeSource {
        async fn fetch(&self, url: &str) -> Result<DynamicImage> {
            self.requested.lock().unwrap().push(url.to_string());
            if self.fail {
                Err(Error::Http("connection refused".into()))
            } else {
                Ok(DynamicImage::new_rgba8(2, 2))
            }
        }
    }

    #[derive(Default)]
    struct CountingSink {
        fail: bool,
        writes: usize,
    }

    impl ImageSink for CountingSink {
        fn write(&mut self, _image: &DynamicImage) -> Result<()> {
            if self.fail {
                return Err(Error::Io(std::io::Error::other("disk full")));
            }
            self.writes += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_at_most_one_write_per_call() {
        let source = FakeSource::default();
        let mut sink = CountingSink::default();

        let report = download_images(&source, &mut sink).await;

        // The archive spans 1979..=2023, yet only the first entry is fetched.
        assert_eq!(sink.writes, 1);
        assert_eq!(report, DownloadReport { attempted: 1, written: 1 });
        assert_eq!(
            *source.requested.lock().unwrap(),
            vec![archive_url(MONTH_PREFIXES[0], START_YEAR)]
        );
    }

    #[tokio::test]
    async fn test_repeated_calls_refetch_first_entry() {
        let source = FakeSource::default();
        let mut sink = CountingSink::default();

        download_images(&source, &mut sink).await;
        download_images(&source, &mut sink).await;

        let requested = source.requested.lock().unwrap();
        assert_eq!(requested.len(), 2);
        assert_eq!(requested[0], requested[1]);
        assert_eq!(sink.writes, 2);
    }

    #[tokio::test]
    async fn test_fetch_error_is_swallowed_and_stops() {
        let source = FakeSource { fail: true, ..Default::default() };
        let mut sink = CountingSink::default();

        let report = download_images(&source, &mut sink).await;

        assert_eq!(report, DownloadReport { attempted: 1, written: 0 });
        assert_eq!(sink.writes, 0);
        assert_eq!(source.requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sink_error_is_swallowed() {
        let source = FakeSource::default();
        let mut sink = CountingSink { fail: true, ..Default::default() };

        let report = download_images(&source, &mut sink).await;
        assert_eq!(report.written, 0);
    }

    #[test]
    fn test_file_sink_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("images/temp.png"));

        sink.write(&DynamicImage::new_rgba8(4, 4)).unwrap();
        sink.write(&DynamicImage::new_rgba8(3, 1)).unwrap();

        let written = image::open(sink.path()).unwrap();
        assert_eq!((written.width(), written.height()), (3, 1));
        assert_eq!(std::fs::read_dir(dir.path().join("images")).unwrap().count(), 1);
    }
}
