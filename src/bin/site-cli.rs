use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use site_router::lifecycle::startup::{build_site, load_or_default};
use site_router::site::registry::strip_api_prefix;
use site_router::{demo, Router};

#[derive(Parser)]
#[command(name = "site-cli")]
#[command(about = "Inspect the demo site's route table", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List page and API patterns in precedence order
    Routes,
    /// Show which route a URL resolves to
    Resolve {
        /// URL such as `/users/1/posts/2?sort=asc` or `/api/hello`
        url: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    let site = build_site(demo::site()?, &config)?;

    let output = match cli.command {
        Commands::Routes => json!({
            "pages": patterns(site.pages()),
            "api": patterns(site.apis()),
        }),
        Commands::Resolve { url } => match strip_api_prefix(&url) {
            Some(api_url) => resolve(site.apis(), "api", api_url),
            None => resolve(site.pages(), "page", &url),
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn patterns<H>(router: &Router<H>) -> Vec<String> {
    router.patterns().map(ToString::to_string).collect()
}

fn resolve<H>(router: &Router<H>, kind: &str, url: &str) -> Value {
    match router.resolve(url) {
        Ok(matched) => json!({
            "kind": kind,
            "pattern": matched.pattern.to_string(),
            "route": matched.info,
        }),
        Err(not_found) => json!({
            "kind": kind,
            "error": not_found.to_string(),
        }),
    }
}
