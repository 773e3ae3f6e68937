use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, Method, Request};

const DEFAULT_SIMULATOR_URL: &str = "http://localhost:8000";
const ANNOUNCEMENTS_PATH: &str = "/api/v1/announcements";

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "SIM_SERVER_URL", default_value = DEFAULT_SIMULATOR_URL)]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Post a forward-dated listing now.
    NewListing,
    /// Post a backdated listing now.
    OldListing,
    Status,
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        per_page: usize,
        #[arg(long)]
        category: Option<String>,
    },
}

impl Command {
    fn request(&self, client: &Client, server: &str) -> reqwest::Result<Request> {
        let base = server.trim_end_matches('/');
        let builder = match self {
            Command::NewListing => {
                client.request(Method::POST, format!("{base}/control/new-listing-now"))
            }
            Command::OldListing => {
                client.request(Method::POST, format!("{base}/control/old-listing-now"))
            }
            Command::Status => client.request(Method::GET, format!("{base}/control/status")),
            Command::List {
                page,
                per_page,
                category,
            } => {
                let builder = client
                    .request(Method::GET, format!("{base}{ANNOUNCEMENTS_PATH}"))
                    .query(&[("page", page), ("per_page", per_page)]);
                match category {
                    Some(category) => builder.query(&[("category", category)]),
                    None => builder,
                }
            }
        };
        builder.build()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let request = cli.command.request(&client, &cli.server)?;
    let url = request.url().clone();

    let resp = client.execute(request).await?;
    let status = resp.status();
    let body: serde_json::Value = resp.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    if !status.is_success() {
        bail!("{url} returned {status}");
    }
    Ok(())
}
