//! Serve Command
//!
//! Runs the HTTP callable so the API key stays on the server.

use crate::ai::ModelClient;
use crate::cli::Output;
use crate::config::Config;
use crate::server;

pub async fn run(mut config: Config, bind: Option<String>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
        config.validate()?;
    }

    let model = ModelClient::from_config(&config.llm)?;
    if !model.is_configured() {
        Output::new().warning("No API key configured; every call will return INTERNAL");
    }

    server::run_server(&config, model).await
}
