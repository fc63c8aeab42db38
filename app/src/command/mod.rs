//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use botsim_config::Config;
use botsim_conversation::{Simulator, SynthesizerConfig};
use botsim_providers::{HttpBotClient, OpenAiProvider};
use std::sync::Arc;
use tracing::info;

mod info;
mod run;
mod serve;
mod version;

pub use info::InfoStrategy;
pub use run::{RunInput, RunStrategy};
pub use serve::{ServeInput, ServeStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Wire the provider, the bot client and the synthesizer settings from
/// configuration. Built once per process.
fn build_simulator(config: &Config) -> anyhow::Result<Simulator> {
    let provider = OpenAiProvider::new(config.providers.api_key.clone())
        .with_base_url(config.providers.base_url.clone());
    let bot = HttpBotClient::new(config.bot.base_url.clone(), config.bot.timeout())?;

    info!(
        "Simulator ready: model={}, bot endpoint={}",
        config.synthesis.model, config.bot.base_url
    );

    Ok(Simulator::new(
        Arc::new(bot),
        Arc::new(provider),
        SynthesizerConfig::default().with_params(config.completion_params()),
    ))
}
