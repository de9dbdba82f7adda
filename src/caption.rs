//! Caption generation.
//!
//! - [`Mood`]: the fixed mood set and the prompt registered for each.
//! - [`fallback_caption`]: pre-written captions used when the provider is unavailable.
//! - [`CaptionProvider`]: one attempt against a text-generation backend, reported as a
//!   [`ProviderOutcome`]. [`HuggingFaceProvider`] is the HTTP implementation.
//! - [`CaptionService`]: prompt resolution, bounded retries with backoff, and the
//!   unconfigured short-circuit.

pub mod fallback;
pub mod mood;
pub mod provider;
pub mod service;

pub use fallback::{fallback_caption, fallback_caption_with_rng};
pub use mood::Mood;
pub use provider::{
    CaptionProvider, GenerationParameters, GenerationRequest, HuggingFaceProvider, ProviderOutcome,
};
pub use service::{
    CaptionConfig, CaptionResult, CaptionService, CaptionSource, DEFAULT_API_URL, DEFAULT_MODEL,
    NO_CAPTION_GENERATED,
};
