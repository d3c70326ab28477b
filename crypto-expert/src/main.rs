use actix_web::{web, App, HttpServer};
use anyhow::Result;
use dotenv::dotenv;

use crypto_expert::middleware::{cors_middleware, RateLimiter};
use crypto_expert::routes;
use crypto_expert::ExpertSystem;

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Print startup banner
    println!("🚀 Starting Cryptocurrency Expert Agent server");
    println!("=================================");

    let system = ExpertSystem::from_env().await?;
    let port = system.config().port;

    let limiter = web::Data::new(RateLimiter::new(&system.config().rate_limit));
    let system = web::Data::new(system);

    println!("\n✅ System initialized successfully!");
    println!("📡 Health check: http://localhost:{port}/health");
    println!("🔍 Query endpoint: http://localhost:{port}/query");

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .app_data(system.clone())
            .app_data(limiter.clone())
            .configure(routes::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    Ok(())
}
