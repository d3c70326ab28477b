use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use common::AgentError;

use crate::{ActionMessage, ActionRegistry};

#[get("/helloworld")]
pub async fn helloworld() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "text": "hello world!" }))
}

#[get("/messagebus-status")]
pub async fn messagebus_status(registry: web::Data<ActionRegistry>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "connected",
        "registered_actions": registry.len(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[get("/debug-actions")]
pub async fn debug_actions(registry: web::Data<ActionRegistry>) -> HttpResponse {
    let actions: Vec<_> = registry
        .all()
        .iter()
        .map(|action| {
            json!({
                "name": action.name(),
                "description": action.description(),
                "similes": action.similes(),
            })
        })
        .collect();

    HttpResponse::Ok().json(json!({
        "count": actions.len(),
        "actions": actions,
    }))
}

#[post("/actions/{name}")]
pub async fn invoke_action(
    path: web::Path<String>,
    body: web::Json<ActionMessage>,
    registry: web::Data<ActionRegistry>,
) -> HttpResponse {
    let name = path.into_inner();
    let message = body.into_inner();

    let Some(action) = registry.get(&name) else {
        return HttpResponse::NotFound().json(json!({
            "success": false,
            "error": "Unknown action",
            "message": format!("No action named '{}' is registered", name),
        }));
    };

    match action.validate(&message).await {
        Ok(true) => {}
        Ok(false) => {
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": "Action not applicable",
                "message": format!("{} declined to handle this message", action.name()),
            }));
        }
        Err(e) => return error_response(action.name(), e),
    }

    match action.handle(&message).await {
        Ok(content) => HttpResponse::Ok().json(json!({
            "success": true,
            "content": content,
        })),
        Err(e) => error_response(action.name(), e),
    }
}

fn error_response(action: &str, error: AgentError) -> HttpResponse {
    match error {
        AgentError::Validation(message) => HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "Invalid request",
            "message": message,
        })),
        e => {
            tracing::error!(action, "action failed: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": "Internal server error",
                "message": e.to_string(),
            }))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(helloworld)
        .service(messagebus_status)
        .service(debug_actions)
        .service(invoke_action);
}
