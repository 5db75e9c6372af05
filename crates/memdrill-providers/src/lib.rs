//! memdrill-providers: Model backends and provider fallback.
//!
//! Implements the `TextGenerator` trait on top of a prioritized list of
//! Gemini-style and chat-completion-style endpoints, falling through to the
//! next model whenever a backend reports it is out of capacity.

pub mod config;
pub mod error;
pub mod gemini;
pub mod invoker;
pub mod mock;
pub mod openai;

pub use config::{default_candidates, load_config_from, Credentials, MemdrillConfig};
pub use invoker::{ProviderFallbackInvoker, MAX_CANDIDATES};
