//! Source resolution
//!
//! Turns the raw source string a caller hands to the player into a
//! [`MediaItem`]: remote sources (anything starting with `http`) are parsed as
//! URLs, everything else is a filesystem path. Registered rewriters run
//! afterwards, in order.

use crate::engine::MediaItem;
use crate::error::{PlayerError, Result};
use std::path::Path;
use tracing::trace;
use url::Url;

const REMOTE_PREFIX: &str = "http";

/// Rewrites a resolved URL before the engine sees it (proxying, caching)
pub trait SourceRewriter {
    fn rewrite(&self, url: Url) -> Url;
}

impl<F> SourceRewriter for F
where
    F: Fn(Url) -> Url,
{
    fn rewrite(&self, url: Url) -> Url {
        self(url)
    }
}

/// Raw source string to engine item
#[derive(Default)]
pub struct SourceResolver {
    rewriters: Vec<Box<dyn SourceRewriter>>,
}

impl SourceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rewrite step
    pub fn add_rewriter(&mut self, rewriter: Box<dyn SourceRewriter>) {
        self.rewriters.push(rewriter);
    }

    pub fn resolve(&self, raw: &str) -> Result<MediaItem> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PlayerError::SourceResolution("empty source".to_string()));
        }

        let url = if raw.starts_with(REMOTE_PREFIX) {
            Url::parse(raw).map_err(|e| PlayerError::SourceResolution(format!("{raw}: {e}")))?
        } else {
            file_url(raw)?
        };

        let url = self
            .rewriters
            .iter()
            .fold(url, |url, rewriter| rewriter.rewrite(url));
        trace!(%url, "source resolved");

        Ok(MediaItem::new(url))
    }
}

fn file_url(raw: &str) -> Result<Url> {
    let path = Path::new(raw);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| PlayerError::SourceResolution(format!("{raw}: {e}")))?
            .join(path)
    };

    Url::from_file_path(&absolute).map_err(|()| {
        PlayerError::SourceResolution(format!("{} is not a valid file path", absolute.display()))
    })
}
