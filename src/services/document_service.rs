use std::time::Duration;

use async_trait::async_trait;
use log::{error, info, warn};

pub const MIN_DOCUMENT_BYTES: usize = 100;
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Download error: {0}")]
    Download(String),

    #[error("Upstream status {0}")]
    Status(u16),

    #[error("Received an HTML page instead of the document")]
    HtmlPage,

    #[error("Document too small ({0} bytes)")]
    TooSmall(usize),
}

impl From<reqwest::Error> for LoaderError {
    fn from(error: reqwest::Error) -> Self {
        LoaderError::Download(error.to_string())
    }
}

/// Source of raw document bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoaderError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .unwrap_or_default();
        HttpFetcher { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        HttpFetcher::new()
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoaderError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(LoaderError::Status(response.status().as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// 1-based position of the source in the configured list.
    pub index: usize,
    pub url: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    pub documents: Vec<LoadedDocument>,
    pub attempted: usize,
}

impl DocumentSet {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All documents concatenated, each under a header naming its source index.
    pub fn context_blob(&self) -> String {
        self.documents
            .iter()
            .map(|doc| format!("\n--- Document {} ---\n{}", doc.index, doc.content))
            .collect()
    }
}

/// Rejects error pages and truncated downloads before decoding.
pub fn validate_document(bytes: &[u8]) -> Result<(), LoaderError> {
    if looks_like_html(bytes) {
        return Err(LoaderError::HtmlPage);
    }
    if bytes.len() < MIN_DOCUMENT_BYTES {
        return Err(LoaderError::TooSmall(bytes.len()));
    }
    Ok(())
}

fn looks_like_html(bytes: &[u8]) -> bool {
    const MARKER: &[u8] = b"<!doctype html";
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let head = &bytes[start..];
    head.len() >= MARKER.len() && head[..MARKER.len()].eq_ignore_ascii_case(MARKER)
}

/// Windows-1252 characters for bytes 0x80-0x9F. `None` marks the five
/// undefined positions.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('€'), None, Some('‚'), Some('ƒ'), Some('„'), Some('…'), Some('†'), Some('‡'),
    Some('ˆ'), Some('‰'), Some('Š'), Some('‹'), Some('Œ'), None, Some('Ž'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('“'), Some('”'), Some('•'), Some('–'), Some('—'),
    Some('˜'), Some('™'), Some('š'), Some('›'), Some('œ'), None, Some('ž'), Some('Ÿ'),
];

/// UTF-8 when the body is valid UTF-8, otherwise Latin-1 read as Windows-1252.
///
/// Every byte maps to a character, so accented letters always survive. Only
/// the five bytes Windows-1252 leaves undefined become U+FFFD.
pub fn decode_document(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize].unwrap_or(char::REPLACEMENT_CHARACTER),
            _ => b as char,
        })
        .collect()
}

/// Downloads every URL in order. A failed document is logged and skipped.
pub async fn load_documents(fetcher: &dyn DocumentFetcher, urls: &[String]) -> DocumentSet {
    let mut set = DocumentSet {
        documents: Vec::new(),
        attempted: urls.len(),
    };

    for (i, url) in urls.iter().enumerate() {
        let index = i + 1;
        info!("Downloading document {} of {}", index, urls.len());

        let bytes = match fetcher.fetch(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Error loading document {} ({}): {}", index, url, e);
                continue;
            }
        };

        if let Err(e) = validate_document(&bytes) {
            warn!("Document {} rejected: {}", index, e);
            continue;
        }

        set.documents.push(LoadedDocument {
            index,
            url: url.clone(),
            content: decode_document(&bytes),
        });
        info!("Document {} loaded", index);
    }

    info!("Documents loaded: {}/{}", set.len(), set.attempted);
    set
}
