use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::json;

#[derive(Parser)]
#[command(name = "civic-im-cli")]
#[command(about = "Civic Issue Manager CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit an issue report
    Submit {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: String,

        /// Category (omit to let the classifier decide)
        #[arg(short, long)]
        category: Option<String>,

        #[arg(long)]
        latitude: f64,

        #[arg(long)]
        longitude: f64,

        #[arg(short, long)]
        address: Option<String>,

        #[arg(short, long)]
        reporter: Option<String>,
    },

    /// List issues
    List {
        #[arg(short, long, default_value = "0")]
        page: u32,

        #[arg(short = 's', long, default_value = "20")]
        page_size: u32,

        #[arg(short = 'o', long)]
        open_only: bool,
    },

    /// Get issue details
    Get {
        #[arg(value_name = "ISSUE_ID")]
        id: String,
    },

    /// Update issue status
    Status {
        #[arg(value_name = "ISSUE_ID")]
        id: String,

        #[arg(short, long)]
        status: String,

        #[arg(short, long)]
        actor: Option<String>,
    },

    /// Resolve an issue
    Resolve {
        #[arg(value_name = "ISSUE_ID")]
        id: String,

        #[arg(short, long)]
        resolved_by: String,

        #[arg(short, long)]
        notes: String,
    },

    /// Re-run classification over all stored issues
    Reclassify,

    /// Show the analytics summary
    Stats,

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Submit {
            title,
            description,
            category,
            latitude,
            longitude,
            address,
            reporter,
        } => {
            let body = json!({
                "title": title,
                "description": description,
                "category": category,
                "latitude": latitude,
                "longitude": longitude,
                "address": address,
                "reported_by": reporter,
            });

            let response = client
                .post(format!("{}/v1/issues", cli.endpoint))
                .json(&body)
                .send()
                .await
                .context("Failed to reach server")?;

            print_response(response).await?;
        }

        Commands::List {
            page,
            page_size,
            open_only,
        } => {
            let response = client
                .get(format!("{}/v1/issues", cli.endpoint))
                .query(&[
                    ("page", page.to_string()),
                    ("page_size", page_size.to_string()),
                    ("open_only", open_only.to_string()),
                ])
                .send()
                .await
                .context("Failed to reach server")?;

            print_response(response).await?;
        }

        Commands::Get { id } => {
            let response = client
                .get(format!("{}/v1/issues/{}", cli.endpoint, id))
                .send()
                .await
                .context("Failed to reach server")?;

            print_response(response).await?;
        }

        Commands::Status { id, status, actor } => {
            let body = json!({
                "status": status,
                "actor": actor,
            });

            let response = client
                .put(format!("{}/v1/issues/{}/status", cli.endpoint, id))
                .json(&body)
                .send()
                .await
                .context("Failed to reach server")?;

            print_response(response).await?;
        }

        Commands::Resolve {
            id,
            resolved_by,
            notes,
        } => {
            let body = json!({
                "resolved_by": resolved_by,
                "notes": notes,
            });

            let response = client
                .post(format!("{}/v1/issues/{}/resolve", cli.endpoint, id))
                .json(&body)
                .send()
                .await
                .context("Failed to reach server")?;

            print_response(response).await?;
        }

        Commands::Reclassify => {
            let response = client
                .post(format!("{}/v1/issues/reclassify", cli.endpoint))
                .send()
                .await
                .context("Failed to reach server")?;

            print_response(response).await?;
        }

        Commands::Stats => {
            let response = client
                .get(format!("{}/v1/analytics/summary", cli.endpoint))
                .send()
                .await
                .context("Failed to reach server")?;

            print_response(response).await?;
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await
                .context("Failed to reach server")?;

            print_response(response).await?;
        }
    }

    Ok(())
}

async fn print_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .context("Failed to parse response body")?;

    if !status.is_success() {
        eprintln!("Request failed ({})", status);
    }
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
