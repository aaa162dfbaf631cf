//! NSIDC sea-ice concentration image archive

pub mod download;
pub mod url;

pub use download::{download_images, DownloadReport, FileSink, HttpImageSource, ImageSink, ImageSource};
pub use url::{archive_url, archive_urls, BASE_URL, END_YEAR, MONTH_PREFIXES, START_YEAR};
