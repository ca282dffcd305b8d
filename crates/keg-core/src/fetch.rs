//! Source archive download.
//!
//! Single blocking GET with libcurl, body collected in memory (source
//! archives are small). `file://` URLs are read straight from disk so local
//! mirrors and tests don't need a server.

use crate::config::FetchConfig;
use crate::error::{InstallError, Result};
use std::str;
use std::time::Duration;
use url::Url;

/// Below this rate (bytes/s) for `LOW_SPEED_TIME`, the transfer is abandoned.
const LOW_SPEED_LIMIT: u32 = 1024;
const LOW_SPEED_TIME: Duration = Duration::from_secs(60);

/// Download `url` and return the response body.
///
/// Any transport failure or non-2xx status is a `NetworkError`.
pub fn fetch(url: &str, opts: &FetchConfig) -> Result<Vec<u8>> {
    let network = |message: String| InstallError::Network {
        url: url.to_string(),
        message,
    };

    let parsed = Url::parse(url).map_err(|e| network(format!("invalid URL: {}", e)))?;
    if parsed.scheme() == "file" {
        return fetch_file(&parsed).map_err(network);
    }

    tracing::info!(url, "fetching archive");
    let mut body: Vec<u8> = Vec::new();
    let mut easy = curl::easy::Easy::new();
    let curl_err = |e: curl::Error| network(e.to_string());

    easy.url(url).map_err(curl_err)?;
    easy.follow_location(true).map_err(curl_err)?;
    easy.max_redirections(opts.max_redirections).map_err(curl_err)?;
    easy.connect_timeout(opts.connect_timeout()).map_err(curl_err)?;
    easy.timeout(opts.timeout()).map_err(curl_err)?;
    easy.low_speed_limit(LOW_SPEED_LIMIT).map_err(curl_err)?;
    easy.low_speed_time(LOW_SPEED_TIME).map_err(curl_err)?;
    easy.useragent(concat!("keg/", env!("CARGO_PKG_VERSION")))
        .map_err(curl_err)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(line) = str::from_utf8(data) {
                    let line = line.trim_end();
                    if !line.is_empty() {
                        tracing::trace!(header = line, "response header");
                    }
                }
                true
            })
            .map_err(curl_err)?;
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(curl_err)?;
        transfer.perform().map_err(curl_err)?;
    }

    let code = easy.response_code().map_err(curl_err)?;
    if !(200..300).contains(&code) {
        return Err(network(format!("GET returned HTTP {}", code)));
    }

    tracing::info!(url, bytes = body.len(), "archive fetched");
    Ok(body)
}

fn fetch_file(url: &Url) -> std::result::Result<Vec<u8>, String> {
    let path = url
        .to_file_path()
        .map_err(|_| "file URL has no local path".to_string())?;
    let bytes = std::fs::read(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "archive read from disk");
    Ok(bytes)
}
