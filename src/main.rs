use clap::Parser;
use gcping_infra::args::{Cli, Commands};
use gcping_infra::{run_networks, run_regen};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default())
        .map_err(|e| format!("Error initializing log4rs from log4rs.yml: {e}"))?;
    dotenv::dotenv().ok();
    //
    log::info!("#Start main()");

    let cli = Cli::parse();
    let command = cli.command.clone();
    let config = cli.into_config().map_err(|e| {
        log::error!("{e}");
        e
    })?;

    match command {
        Commands::Networks { .. } => {
            run_networks(&config).await?;
        }
        Commands::Regen { .. } => {
            let addresses = run_regen(&config).await?;
            log::info!(
                "wrote {} endpoints to {}",
                addresses.len(),
                config.out_file.display()
            );
        }
    }

    Ok(())
}
