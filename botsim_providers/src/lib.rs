#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! HTTP-backed implementations of the external collaborators: the
//! chat-completions provider and the remote bot under test.

mod bot_client;
mod openai;

#[cfg(test)]
pub(crate) mod test_support;

pub use bot_client::HttpBotClient;
pub use openai::OpenAiProvider;
