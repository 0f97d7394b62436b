use std::time::Instant;

use clap::{Parser, Subcommand};
use serde_json::Value;

use common_service::observability::{LogWriter, Logger, Severity};
use common_service::util::{generate_transaction_id, validate_msisdn};

#[derive(Parser)]
#[command(name = "service-cli")]
#[command(about = "Helper CLI for services built on common-service", long_about = None)]
struct Cli {
    /// Dump outgoing requests and responses to stderr.
    #[arg(short, long)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe a running service's liveness endpoint
    Ping {
        #[arg(default_value = "http://localhost:8080")]
        url: String,
    },
    /// Check a subscriber number
    ValidateMsisdn { msisdn: String },
    /// Print a transaction id
    TransactionId {
        #[arg(long, default_value = "")]
        msisdn: String,
        #[arg(long, default_value = "")]
        internal_code: String,
        #[arg(long, default_value = "")]
        api_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let threshold = if cli.trace { Severity::Trace } else { Severity::Info };
    let logger = Logger::new(threshold, LogWriter::plain(std::io::stderr()));

    match cli.command {
        Commands::Ping { url } => {
            let client = reqwest::Client::new();
            let req = client
                .get(format!("{}/_internal/_ping", url.trim_end_matches('/')))
                .build()?;
            logger.trace_reqwest_request(&req);

            let start_time = Instant::now();
            let res = client.execute(req).await;
            let success = matches!(&res, Ok(r) if r.status().is_success());
            logger.backend_metrics(&url, "service-cli", success, start_time.elapsed());

            let res = logger.trace_reqwest_response(res?).await?;
            print_response(res).await?;
        }
        Commands::ValidateMsisdn { msisdn } => {
            if validate_msisdn(&msisdn) {
                println!("{} is valid", msisdn);
            } else {
                eprintln!("{} is not a valid MSISDN", msisdn);
                std::process::exit(1);
            }
        }
        Commands::TransactionId {
            msisdn,
            internal_code,
            api_id,
        } => {
            println!(
                "{}",
                generate_transaction_id("", &msisdn, &internal_code, &api_id)
            );
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
