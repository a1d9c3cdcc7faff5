use anyhow::Result;
use question_workflow::utils::logging;
use question_workflow::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env();

    App::initialize(config).await?.run().await
}
