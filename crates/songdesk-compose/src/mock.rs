//! Mock implementations for testing

use crate::error::{ComposeError, Result};
use crate::{Composition, SongComposer};
use async_trait::async_trait;
use songdesk_core::SongPrompt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// A mock composer that records every prompt it receives
#[derive(Default)]
pub struct MockComposer {
    prompts: Mutex<Vec<SongPrompt>>,
    call_count: AtomicUsize,
    composition: Composition,
    should_fail: bool,
}

impl MockComposer {
    /// Mock that answers with `composition`
    pub fn new(composition: Composition) -> Self {
        Self {
            composition,
            ..Default::default()
        }
    }

    /// Mock that always fails
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// All prompts received, in call order
    pub async fn prompts(&self) -> Vec<SongPrompt> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl SongComposer for MockComposer {
    async fn compose(&self, prompt: &SongPrompt) -> Result<Composition> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(prompt.clone());

        if self.should_fail {
            return Err(ComposeError::backend("Mock failure"));
        }
        Ok(self.composition.clone())
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
