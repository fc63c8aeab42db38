use botsim_config::Config;

/// Strategy for displaying the effective configuration.
///
/// The API key is masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== botsim Configuration ===\n");

        println!("Generative Provider:");
        println!("  API Key: {}", config.masked_api_key());
        println!("  Base URL: {}", config.providers.base_url);
        println!("  Model: {}", config.synthesis.model);
        println!("  Max Tokens: {}", config.synthesis.max_tokens);
        println!("  Temperature: {}", config.synthesis.temperature);
        println!();

        println!("Remote Bot:");
        println!("  Base URL: {}", config.bot.base_url);
        println!("  Timeout: {}s", config.bot.timeout_secs);
        println!("  Default Bot ID: {}", config.bot.default_bot_id);
        println!();

        println!("Server:");
        println!("  Listen Address: {}", config.server.listen_addr);

        Ok(())
    }
}
