//! # DevPrompt - Prompt Enhancement Pipeline
//!
//! Turns a short, informal idea into a structured prompt aimed at a given
//! AI coding tool, by streaming it through a Gemini model.
//!
#![deny(unsafe_code)]

//! ## Pipeline
//!
//! 1. **Prompt assembly** ([`prompt`]): the idea and the chosen options become a
//!    fixed system instruction, a user-turn text and generation parameters.
//! 2. **Interceptors** ([`interceptor`]): caller hooks rewrite the outgoing
//!    payload, each text fragment, and terminal errors.
//! 3. **Streaming execution** ([`enhancer`]): the stream is established with
//!    exponential backoff ([`retry`]) and fragments are handed out as they
//!    arrive.
//! 4. **Error taxonomy** ([`error`]): terminal failures are classified into
//!    kinds with user-facing messages.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use devprompt::prelude::*;
//! use futures_util::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EnhanceError> {
//!     let enhancer = PromptEnhancer::from_env()?;
//!     let options = EnhancementOptions::new()
//!         .with_domain(Domain::WebDevelopment)
//!         .with_target_tool("cursor");
//!
//!     let mut stream = enhancer
//!         .stream_enhancement("a habit tracker with streaks", &options)
//!         .await?;
//!     while let Some(fragment) = stream.next().await {
//!         print!("{}", fragment?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod cancel;
pub mod config;
pub mod enhancer;
pub mod error;
pub mod interceptor;
pub mod logging;
pub mod prompt;
pub mod retry;
pub mod transport;

pub use batch::enhance_all;
pub use cancel::CancelHandle;
pub use config::EnhancerConfig;
pub use enhancer::{FragmentStream, PromptEnhancer, PromptEnhancerBuilder};
pub use error::{EnhanceError, ErrorKind, Result, classify};
pub use interceptor::{
    InterceptorRegistry, add_error_interceptor, add_request_interceptor, add_response_interceptor,
};
pub use prompt::{ComposedPayload, EnhancementOptions, EnhancementRequest, assemble};
pub use retry::{RetryExecutor, RetryPolicy, retry_with_backoff};
pub use transport::{GeminiTransport, GenerativeTransport, StreamChunk};

/// Commonly used items.
pub mod prelude {
    pub use crate::cancel::CancelHandle;
    pub use crate::config::EnhancerConfig;
    pub use crate::enhancer::{FragmentStream, PromptEnhancer};
    pub use crate::error::{EnhanceError, ErrorKind};
    pub use crate::interceptor::InterceptorRegistry;
    pub use crate::prompt::{
        Complexity, ComposedPayload, Domain, EnhancementOptions, EnhancementRequest,
        GenerationMode, InclusionFlags, Platform,
    };
    pub use crate::retry::RetryPolicy;
}
