//! SongDesk Composer
//!
//! Turns a [`SongPrompt`] into lyrics and song links. Only the stub backend
//! ships; it answers with placeholders and makes no network call.

mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
mod stub;

pub use error::{ComposeError, Result};
pub use stub::StubComposer;

use async_trait::async_trait;
use serde::Serialize;
use songdesk_core::SongPrompt;

/// Output of a composer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Composition {
    pub lyrics: String,
    pub song_urls: Vec<String>,
}

/// Trait for song generation backends
#[async_trait]
pub trait SongComposer: Send + Sync {
    /// Compose a song for the prompt
    async fn compose(&self, prompt: &SongPrompt) -> Result<Composition>;

    /// Check if the backend has the credentials it needs
    fn is_configured(&self) -> bool;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}
