//! Direct entry point: run one simulation and print the outcome.

use botsim_config::Config;
use botsim_conversation::SimulationRequest;
use tracing::info;

/// Input parameters for the Run command strategy.
#[derive(Debug, Clone)]
pub struct RunInput {
    /// Seed message sent to the bot
    pub initial_message: String,
    /// Total number of user messages, seed included
    pub turns: i64,
    /// Bot configuration override
    pub bot_id: Option<i64>,
}

/// Strategy for executing a single simulation from the command line.
///
/// The outcome is printed, not returned as an error: a failed simulation
/// still exits successfully after showing what was collected.
#[derive(Debug, Clone, Copy)]
pub struct RunStrategy;

impl super::CommandStrategy for RunStrategy {
    type Input = RunInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let simulator = super::build_simulator(&config)?;

        let request = SimulationRequest {
            bot_id: input.bot_id.unwrap_or(config.bot.default_bot_id),
            user_prompt: input.initial_message,
            max_turns: input.turns,
            ..SimulationRequest::default()
        };
        info!(
            "Running simulation: bot_id={}, turns={}",
            request.bot_id, request.max_turns
        );

        let report = simulator.run(request).await?;

        println!("\n===== Conversation Summary =====");
        for (i, entry) in report.simulation_conversation.iter().enumerate() {
            println!("{}. {}: {}", i + 1, entry.role, entry.content);
        }

        if report.success {
            println!("\nSimulation completed successfully!");
        } else {
            if let Some(error) = report.error {
                println!("\nError: {error}");
            }
            println!("\nSimulation failed!");
        }

        Ok(())
    }
}
