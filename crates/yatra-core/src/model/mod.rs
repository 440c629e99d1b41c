//! Generative-model seam.
//!
//! The planner only sees [`ChatModel`]; [`OpenAiChatModel`] is the one
//! concrete adapter, and tests substitute scripted implementations.

pub mod openai;
pub mod trait_def;

pub use openai::{ModelConfig, OpenAiChatModel, build_chat_model};
pub use trait_def::{ChatModel, ChatRequest};
