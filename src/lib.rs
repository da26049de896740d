//! Voice-to-Post: voice note → transcript → blog post → illustrations → HTML.
//!
//! The [`wizard`] module holds the state machine; [`pipeline`] drives the
//! service-backed stages against it.

pub mod assemble;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod image;
pub mod llm;
pub mod pipeline;
pub mod stt;
pub mod wizard;
