mod find;
mod intake;

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "carefind-cli")]
#[command(about = "Find the nearest urgent care or emergency room for a set of symptoms")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify symptoms and recommend the nearest matching facility
    #[command(group(ArgGroup::new("home").required(true).args(["address", "street"])))]
    Find {
        /// Comma-separated symptoms (e.g. "fever, sore throat")
        #[arg(long)]
        symptoms: String,
        /// Home street address (e.g. "350 5th Ave")
        #[arg(long, requires = "zip")]
        street: Option<String>,
        /// Home postal code, used with --street
        #[arg(long, requires = "street")]
        zip: Option<String>,
        /// Free-text home address, resolved through the geocoder
        #[arg(long, conflicts_with_all = ["street", "zip"])]
        address: Option<String>,
        /// Also list this many runner-up facilities
        #[arg(long, default_value = "0")]
        alternatives: usize,
        /// Print the full ranking as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify symptoms without any network access
    Classify {
        /// Comma-separated symptoms
        #[arg(long)]
        symptoms: String,
        /// YAML file of extra symptom terms
        #[arg(long, env = "CAREFIND_SYMPTOMS_PATH")]
        symptoms_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Find {
            symptoms,
            street,
            zip,
            address,
            alternatives,
            json,
        }) => {
            let config = carefind_core::load_app_config()?;
            init_tracing(&config.log_level)?;

            let home = match (street, zip, address) {
                (Some(street), Some(zip), _) => intake::HomeInput::Structured { street, zip },
                (_, _, Some(text)) => intake::HomeInput::FreeText(text),
                _ => anyhow::bail!("provide --street with --zip, or --address"),
            };
            let run_id = uuid::Uuid::new_v4();
            find::run_find(
                &config,
                &symptoms,
                home,
                find::Output { alternatives, json },
            )
            .instrument(tracing::info_span!("recommend", %run_id))
            .await?;
        }
        Some(Commands::Classify {
            symptoms,
            symptoms_file,
        }) => {
            init_tracing("warn")?;
            println!("{}", find::run_classify(&symptoms, symptoms_file.as_deref())?);
        }
        None => println!("carefind-cli ready; run `carefind-cli find --help` to get started"),
    }

    Ok(())
}

/// Logs go to stderr; `RUST_LOG` wins over `fallback`.
fn init_tracing(fallback: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
