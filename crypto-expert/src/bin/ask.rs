use anyhow::Result;
use colored::Colorize;
use dotenv::dotenv;

use crypto_expert::ExpertSystem;

const DEFAULT_QUERY: &str = "Give me top 3 coins by market cap";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let query = if query.trim().is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        query
    };

    println!("{}", "🤖 Agent is thinking...".cyan());

    let system = ExpertSystem::from_env().await?;

    match system.respond(&query).await {
        Ok(reply) => {
            println!("{}", "✅ Agent finished successfully!".green());
            if reply.from_cache {
                println!(
                    "{}",
                    format!("💾 Served from cache (topic: {})", reply.topic).dimmed()
                );
            }
            println!("{}", reply.response);
            Ok(())
        }
        Err(e) => {
            println!("{}", "❌ Agent failed".red());
            Err(e.into())
        }
    }
}
