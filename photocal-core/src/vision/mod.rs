//! Vision service access.
//!
//! The pipeline talks to a `VisionService`; `OpenAiClient` is the real one,
//! tests substitute their own.

mod openai;
pub mod protocol;

use std::fmt;

use async_trait::async_trait;

use crate::error::PhotocalResult;
use protocol::{ChatRequest, ChatResponse};

pub use openai::OpenAiClient;

/// An API key held in memory for the current session only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Trimmed key, or `None` if nothing was entered.
    pub fn new(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(Credential(value.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// A chat-completion endpoint that accepts images.
#[async_trait]
pub trait VisionService: Send + Sync {
    async fn complete(
        &self,
        request: &ChatRequest,
        credential: &Credential,
    ) -> PhotocalResult<ChatResponse>;
}
