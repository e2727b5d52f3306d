use clap::{Parser, Subcommand};
use ms365_tools::error::Error;
use ms365_tools::startup;
use serde_json::Value;
use tracing::info;

#[derive(Parser)]
#[command(name = "ms365-tools", about = "Microsoft 365 mail and calendar tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the registration metadata of every enabled tool
    List,
    /// Invoke a tool and print its JSON result
    Call {
        /// Tool name, e.g. ms365_list_calendar_events
        name: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let cli = Cli::parse();
    let config = startup::load_config()?;

    match cli.command {
        Commands::List => {
            // Specs need no credentials; avoid touching the token store
            let credentials = std::sync::Arc::new(
                ms365_tools::components::credentials::StaticCredentialProvider::new(),
            );
            let registry = startup::build_registry(&config, credentials);
            let specs = serde_json::to_string_pretty(&registry.specs()).map_err(Error::from)?;
            println!("{}", specs);
        }
        Commands::Call { name, args } => {
            let args: Value = serde_json::from_str(&args)
                .map_err(|e| Error::RequestConstruction(format!("--args is not valid JSON: {}", e)))?;
            let credentials = startup::credential_provider(&config)?;
            let registry = startup::build_registry(&config, credentials);

            info!("Calling {}", name);
            let result = registry.invoke(&name, args).await?;
            let output = serde_json::to_string_pretty(&result).map_err(Error::from)?;
            println!("{}", output);
        }
    }

    Ok(())
}
