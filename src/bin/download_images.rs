//! Sea-ice image downloader: fetches from the NSIDC monthly archive into
//! `data/images/temp.png`, overwriting it.
//!
//! Usage: cargo run --bin download_images
//!
//! Only the first archive entry (January 1979) is fetched per run; see
//! `floe::archive::download::CRAWL_LIMIT`.

use std::path::PathBuf;

use floe::archive::{download_images, FileSink, HttpImageSource};
use floe::core::logging;

#[tokio::main]
async fn main() {
    logging::init();

    let output = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/images/temp.png");

    let source = match HttpImageSource::new() {
        Ok(source) => source,
        Err(e) => {
            log::error!("Failed to create HTTP client: {}", e);
            return;
        }
    };
    let mut sink = FileSink::new(&output);

    let report = download_images(&source, &mut sink).await;
    log::info!(
        "Done: {} of {} images written to {}",
        report.written,
        report.attempted,
        output.display()
    );
}
