use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::Result;
use reqwest::StatusCode;
use reqwest::blocking::Client;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// What happened to a single image fetch. Failures are values, not errors;
/// a broken download never aborts the run.
#[derive(Debug)]
pub enum FetchOutcome {
    Downloaded,
    AlreadyCached,
    HttpStatus(StatusCode),
    TransportError(anyhow::Error),
}

pub fn build_client() -> Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// Download `url` to `dest` unless a file is already there.
pub fn fetch_if_missing(client: &Client, url: &str, dest: &Path) -> FetchOutcome {
    if dest.exists() {
        log::debug!("image already cached: {}", dest.display());
        return FetchOutcome::AlreadyCached;
    }
    match download(client, url, dest) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::warn!("error downloading {url}: {e:#}");
            FetchOutcome::TransportError(e)
        }
    }
}

fn download(client: &Client, url: &str, dest: &Path) -> Result<FetchOutcome> {
    let mut resp = client.get(url).send()?;
    if resp.status() != StatusCode::OK {
        log::warn!("failed to download {url} (status {})", resp.status());
        return Ok(FetchOutcome::HttpStatus(resp.status()));
    }
    let mut file = File::create(dest)?;
    io::copy(&mut resp, &mut file)?;
    log::info!("downloaded {}", dest.display());
    Ok(FetchOutcome::Downloaded)
}
