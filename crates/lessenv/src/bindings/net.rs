use log::debug;
use reqwest::blocking::Client;
use std::fs;
use std::io;
use url::Url;

use super::JSError;

/// Read a `file:` URL from disk.
pub fn fetch_file(parsed: &Url) -> Result<Vec<u8>, JSError> {
    let path = parsed
        .to_file_path()
        .map_err(|()| JSError::TypeError(format!("invalid file URL: {parsed}")))?;
    Ok(fs::read(path)?)
}

/// Fetch an `http`/`https` URL with a blocking GET.
pub fn fetch_http(parsed: &Url) -> Result<Vec<u8>, JSError> {
    let resp = Client::new()
        .get(parsed.clone())
        .send()
        .map_err(|error| JSError::Io(io::Error::other(error)))?;
    let status = resp.status();
    debug!("readUrl {parsed} -> {}", status.as_u16());
    if !status.is_success() {
        return Err(JSError::Io(io::Error::other(format!(
            "{parsed} returned {status}"
        ))));
    }
    let bytes = resp
        .bytes()
        .map_err(|error| JSError::Io(io::Error::other(error)))?;
    Ok(bytes.to_vec())
}

/// Fetch any supported URL.
pub fn fetch_url(raw: &str) -> Result<Vec<u8>, JSError> {
    let parsed =
        Url::parse(raw).map_err(|error| JSError::TypeError(format!("invalid URL {raw}: {error}")))?;
    match parsed.scheme() {
        "file" => fetch_file(&parsed),
        "http" | "https" => fetch_http(&parsed),
        other => Err(JSError::TypeError(format!("unsupported URL scheme: {other}"))),
    }
}
