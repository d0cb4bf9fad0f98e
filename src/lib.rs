pub mod config;
pub mod credentials;
pub mod error;
pub mod openai;
pub mod pipeline;
pub mod prompts;
pub mod web;
