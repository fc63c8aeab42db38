use botsim_config::Config;

/// Input parameters for the Serve command strategy.
#[derive(Debug, Clone)]
pub struct ServeInput {
    /// Listen address override
    pub addr: Option<String>,
}

/// Strategy for running the HTTP service.
#[derive(Debug, Clone, Copy)]
pub struct ServeStrategy;

impl super::CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let simulator = super::build_simulator(&config)?;

        let addr = input.addr.unwrap_or(config.server.listen_addr);
        botsim_server::serve(&addr, simulator).await
    }
}
