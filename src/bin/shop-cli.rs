use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use ecommerce_service::store::setup::{self, SetupOutcome};

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(about = "Management CLI for the e-commerce demo service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema and seed demo data (local, no server needed)
    InitDb {
        #[arg(short, long, default_value = "ecommerce.db")]
        database: PathBuf,
    },
    /// List products
    Products,
    /// List orders
    Orders,
    /// Place an order
    Checkout { product_id: i64, quantity: i64 },
    /// Dump the Prometheus exposition
    Metrics,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::InitDb { database } => match setup::initialize(&database)? {
            SetupOutcome::Seeded => println!("Database created and seeded: {}", database.display()),
            SetupOutcome::AlreadySeeded => println!("Database already seeded: {}", database.display()),
        },
        Commands::Products => {
            let res = client.get(format!("{}/products", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Orders => {
            let res = client.get(format!("{}/orders", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Checkout { product_id, quantity } => {
            let res = client
                .post(format!("{}/checkout", cli.url))
                .json(&json!({ "product_id": product_id, "quantity": quantity }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Metrics => {
            let res = client.get(format!("{}/metrics", cli.url)).send().await?;
            let status = res.status();
            let text = res.text().await?;
            if status.is_success() {
                print!("{}", text);
            } else {
                eprintln!("Error: service returned status {}", status);
                eprintln!("Response: {}", text);
            }
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
