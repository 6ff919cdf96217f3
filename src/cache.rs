use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use url::Url;

use crate::archiver;
use crate::fetcher::{self, FetchOutcome};

/// Aggregate of per-image fetch outcomes for one cache run.
#[derive(Debug, Default)]
pub struct CacheSummary {
    pub downloaded: usize,
    pub already_cached: usize,
    pub http_errors: usize,
    pub transport_errors: usize,
}

impl CacheSummary {
    fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Downloaded => self.downloaded += 1,
            FetchOutcome::AlreadyCached => self.already_cached += 1,
            FetchOutcome::HttpStatus(_) => self.http_errors += 1,
            FetchOutcome::TransportError(_) => self.transport_errors += 1,
        }
    }

    pub fn failures(&self) -> usize {
        self.http_errors + self.transport_errors
    }
}

/// Cache every referenced image locally, rewrite image fields to the local
/// paths, drop the transient url field, and write the sorted final JSON.
///
/// A failed download leaves the record pointing at a path that may not
/// exist on disk; the run still completes and reports the failure in the
/// summary.
pub fn run(input: &Path, output: &Path, image_dir: &Path) -> Result<CacheSummary> {
    fs::create_dir_all(image_dir)
        .with_context(|| format!("failed to create {}", image_dir.display()))?;
    let mut entries = archiver::read_records(input)?;
    let client = fetcher::build_client()?;
    let mut summary = CacheSummary::default();

    for entry in &mut entries {
        let record = &mut entry.record;
        if !record.image.is_empty() {
            let filename = image_filename(&record.image);
            let local = image_dir.join(&filename);
            summary.record(&fetcher::fetch_if_missing(&client, &record.image, &local));
            record.image = local.display().to_string();
        }
        record.url = None;
    }

    entries.sort_by_key(|entry| entry.key.to_lowercase());
    archiver::write_pretty(output, &entries)?;
    Ok(summary)
}

/// Cache filename for a remote image: the basename of the URL's path
/// component. Distinct URLs sharing a basename overwrite each other in the
/// cache; known limitation.
pub fn image_filename(image_url: &str) -> String {
    let path = match Url::parse(image_url) {
        Ok(url) => url.path().to_owned(),
        Err(_) => image_url.to_owned(),
    };
    path.rsplit('/').next().unwrap_or(&path).to_owned()
}
