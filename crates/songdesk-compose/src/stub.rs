//! Placeholder composer

use async_trait::async_trait;
use songdesk_core::{SongPrompt, PLACEHOLDER_API_KEY, PLACEHOLDER_LYRICS, PLACEHOLDER_SONG_URLS};
use tracing::debug;

use crate::error::Result;
use crate::{Composition, SongComposer};

/// Composer that returns fixed placeholder lyrics and links
pub struct StubComposer {
    api_key: String,
}

impl StubComposer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl Default for StubComposer {
    fn default() -> Self {
        Self::new(PLACEHOLDER_API_KEY)
    }
}

#[async_trait]
impl SongComposer for StubComposer {
    async fn compose(&self, prompt: &SongPrompt) -> Result<Composition> {
        debug!(title = %prompt.title, prompt = %prompt, "Stub compose");
        Ok(Composition {
            lyrics: PLACEHOLDER_LYRICS.to_string(),
            song_urls: PLACEHOLDER_SONG_URLS.iter().map(|u| u.to_string()).collect(),
        })
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != PLACEHOLDER_API_KEY
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
