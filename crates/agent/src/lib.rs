//! Inference Gateway - bounded generative replies for shopper queries
//!
//! This crate owns everything between the dispatcher and the external
//! generation provider:
//! - **Prompt construction** (`prompt`) - persona rules, cached site content,
//!   brand list, and candidate products folded into one prompt
//! - **Provider transport** (`gemini`) - the HTTP call and the normalization
//!   of every provider failure into a typed `InferenceError`
//! - **Bounded invocation** (`invoker`) - a hard wall-clock budget around the
//!   whole call, collapsing every failure mode into a user-facing sentence
//!
//! # Safety principle
//!
//! The provider is strictly a copywriter. Product selection, price filtering,
//! and the decision of whether to call it at all are made upstream by the
//! dispatcher; nothing the provider returns is ever interpreted as an action.

pub mod gemini;
pub mod invoker;
pub mod llm;
pub mod prompt;

pub use gemini::GeminiClient;
pub use invoker::{BoundedInvoker, BUSY_REPLY};
pub use llm::{InferenceRequest, LlmClient};
pub use prompt::{detect_register, format_product_lines, parse_product_lines, ReplyRegister};
