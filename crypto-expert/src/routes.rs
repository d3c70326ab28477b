use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use common::AgentError;

use crate::middleware::RateLimiter;
use crate::system::ExpertSystem;

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "OK",
        "message": "Cryptocurrency Expert Agent is running"
    }))
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    query: Option<String>,
}

#[post("/query")]
pub async fn process_query(
    req: HttpRequest,
    body: web::Json<QueryRequest>,
    system: web::Data<ExpertSystem>,
    limiter: web::Data<RateLimiter>,
) -> HttpResponse {
    let client = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();

    if !limiter.check(&client) {
        return HttpResponse::TooManyRequests().json(serde_json::json!({
            "success": false,
            "error": "Too many requests",
            "message": limiter.message(),
        }));
    }

    let query = match body.query.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Query is required",
                "message": "Please provide a query in the request body"
            }));
        }
    };

    if let Some(limit) = system.config().max_query_length {
        if query.len() > limit {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Query too long",
                "message": format!("Query must be at most {limit} characters")
            }));
        }
    }

    println!("🤖 Processing query: {}", query);

    match system.respond(&query).await {
        Ok(reply) => {
            println!("✅ Query processed successfully");
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "query": query,
                "response": reply.response,
                "timestamp": Utc::now().to_rfc3339(),
            }))
        }
        Err(AgentError::Validation(message)) => HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Invalid request",
            "message": message,
        })),
        Err(e) => {
            println!("❌ Error processing query: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": "Internal server error",
                "message": e.to_string(),
            }))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check).service(process_query);
}
