use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Result;
use dotenv::dotenv;

use common::config::DEFAULT_COINGECKO_BASE_URL;
use crypto_expert::middleware::cors_middleware;
use crypto_expert::CoinGeckoClient;
use expert_plugin::actions::{
    GetCoinCategoriesAction, GetSpecificCategoryAction, HelloWorldAction, TestAction,
};
use expert_plugin::{routes, ActionRegistry};

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("🚀 Starting Cryptocurrency Expert plugin server");
    println!("=================================");

    let base_url = std::env::var("COINGECKO_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_COINGECKO_BASE_URL.to_string());
    let client = Arc::new(CoinGeckoClient::with_base_url(base_url)?);

    let port: u16 = std::env::var("PLUGIN_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let mut registry = ActionRegistry::new();
    registry.register(Arc::new(HelloWorldAction));
    registry.register(Arc::new(TestAction));
    registry.register(Arc::new(GetCoinCategoriesAction::new(client.clone())));
    registry.register(Arc::new(GetSpecificCategoryAction::new(client)));
    let registry = web::Data::new(registry);

    println!("\n✅ Plugin initialized with {} actions", registry.len());
    println!("📡 Debug routes: http://localhost:{port}/helloworld, /messagebus-status, /debug-actions");
    println!("🎬 Action endpoint: http://localhost:{port}/actions/{{name}}");

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .app_data(registry.clone())
            .configure(routes::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    Ok(())
}
