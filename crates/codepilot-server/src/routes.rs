// AI HTTP Routes
//
// JSON endpoints under /ai plus /health. Each handler checks required
// fields, delegates to the AI service and maps failures through `ApiError`.
// Only the /ai routes are rate limited.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, Method},
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use codepilot_lib::models::ai::{
    BugsResponse, ChatReplyResponse, ChatRequest, CodeEditDecision, CodeEditRequest, CodeRequest,
    CodeResponse, ConvertRequest, ExplainResponse, ModelInfo, OptimizeResponse,
};
use codepilot_lib::{AIError, AIService};

use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};
use crate::rate_limit::{self, RateLimiter};

/// Router shared state
pub struct AppState {
    pub service: AIService,
}

type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = match config
        .cors_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::from(Any),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Build the application router
pub fn build_router(service: AIService, config: &ServerConfig) -> Router {
    let state = Arc::new(AppState { service });
    let limiter = Arc::new(RateLimiter::from_config(config));

    let ai = Router::new()
        .route("/explain", post(explain))
        .route("/bugs", post(find_bugs))
        .route("/refactor", post(refactor))
        .route("/optimize", post(optimize))
        .route("/convert", post(convert))
        .route("/chat", post(chat))
        .route("/code-edit", post(code_edit))
        .route("/chat-code", post(code_edit))
        .route("/models", get(models))
        .route_layer(middleware::from_fn_with_state(limiter, rate_limit::limit_requests));

    Router::new()
        .route("/health", get(health))
        .nest("/ai", ai)
        .layer(cors_layer(config))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// GET /ai/models
async fn models(State(state): State<SharedState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.service.models(),
    })
}

/// POST /ai/explain
async fn explain(
    State(state): State<SharedState>,
    body: Result<Json<CodeRequest>, JsonRejection>,
) -> ApiResult<ExplainResponse> {
    let Json(req) = body?;
    log::info!("[server] /ai/explain hasCode={}", req.code.is_some());
    let response = state
        .service
        .explain(req.code.as_deref(), req.language.as_deref())
        .await?;
    Ok(Json(response))
}

/// POST /ai/bugs
async fn find_bugs(
    State(state): State<SharedState>,
    body: Result<Json<CodeRequest>, JsonRejection>,
) -> ApiResult<BugsResponse> {
    let Json(req) = body?;
    log::info!("[server] /ai/bugs hasCode={}", req.code.is_some());
    let response = state
        .service
        .find_bugs(req.code.as_deref(), req.language.as_deref())
        .await?;
    Ok(Json(response))
}

/// POST /ai/refactor
async fn refactor(
    State(state): State<SharedState>,
    body: Result<Json<CodeRequest>, JsonRejection>,
) -> ApiResult<CodeResponse> {
    let Json(req) = body?;
    log::info!("[server] /ai/refactor hasCode={}", req.code.is_some());
    let response = state
        .service
        .refactor(req.code.as_deref(), req.language.as_deref())
        .await?;
    Ok(Json(response))
}

/// POST /ai/optimize
async fn optimize(
    State(state): State<SharedState>,
    body: Result<Json<CodeRequest>, JsonRejection>,
) -> ApiResult<OptimizeResponse> {
    let Json(req) = body?;
    log::info!("[server] /ai/optimize hasCode={}", req.code.is_some());
    let response = state
        .service
        .optimize(req.code.as_deref(), req.language.as_deref())
        .await?;
    Ok(Json(response))
}

/// POST /ai/convert
async fn convert(
    State(state): State<SharedState>,
    body: Result<Json<ConvertRequest>, JsonRejection>,
) -> ApiResult<CodeResponse> {
    let Json(req) = body?;
    log::info!("[server] /ai/convert hasCode={}", req.code.is_some());

    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
    if !present(&req.code) || !present(&req.to_language) {
        return Err(AIError::MissingField("code and toLanguage".to_string()).into());
    }

    let response = state
        .service
        .convert(
            req.code.as_deref(),
            req.from_language.as_deref(),
            req.to_language.as_deref(),
        )
        .await?;
    Ok(Json(response))
}

/// POST /ai/chat
///
/// A non-empty `messages` array selects history mode; otherwise `message` is
/// sent as a single turn.
async fn chat(
    State(state): State<SharedState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<ChatReplyResponse> {
    let Json(req) = body?;
    let history = req.messages.unwrap_or_default();
    log::info!(
        "[server] /ai/chat hasMessage={} history={}",
        req.message.is_some() || !history.is_empty(),
        history.len()
    );

    let response = if history.is_empty() {
        let context = req.editor_content.as_deref().or(req.current_code.as_deref());
        state
            .service
            .chat(req.message.as_deref(), context, req.model.as_deref())
            .await?
    } else {
        let context = req.current_code.as_deref().or(req.editor_content.as_deref());
        state
            .service
            .chat_with_history(&history, context, req.model.as_deref())
            .await?
    };
    Ok(Json(response))
}

/// POST /ai/code-edit (alias /ai/chat-code)
async fn code_edit(
    State(state): State<SharedState>,
    body: Result<Json<CodeEditRequest>, JsonRejection>,
) -> ApiResult<CodeEditDecision> {
    let Json(req) = body?;
    log::info!("[server] /ai/code-edit hasMessage={}", req.message.is_some());
    let decision = state
        .service
        .code_edit(
            req.message.as_deref(),
            req.current_code.as_deref(),
            req.language.as_deref(),
            req.model.as_deref(),
        )
        .await?;
    log::info!("[server] /ai/code-edit decision={:?}", decision.kind());
    Ok(Json(decision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    use axum::body::{to_bytes, Body};
    use axum::extract::ConnectInfo;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use codepilot_lib::services::ai::testing::ScriptedProvider;
    use codepilot_lib::services::ai::{AIConfig, AIResult, CompletionClient};

    fn app_with_config(replies: Vec<AIResult<String>>, config: &ServerConfig) -> (Router, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider::new(replies));
        let ai_config = AIConfig::default();
        let client = Arc::new(CompletionClient::with_provider(provider.clone(), &ai_config));
        let service = AIService::with_client(ai_config, client);
        (build_router(service, config), provider)
    }

    fn app_with(replies: Vec<AIResult<String>>) -> (Router, Arc<ScriptedProvider>) {
        app_with_config(replies, &ServerConfig::default())
    }

    async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with(vec![]);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(serde_json::from_slice::<Value>(&bytes).unwrap(), json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_models_lists_default() {
        let (app, _) = app_with(vec![]);
        let response = app
            .oneshot(Request::builder().uri("/ai/models").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let models = body["models"].as_array().unwrap();
        assert_eq!(models.len(), 2);
        assert!(models
            .iter()
            .any(|m| m["id"] == "llama-3.1-8b-instant" && m["isDefault"] == true));
    }

    #[tokio::test]
    async fn test_missing_code_is_400_without_provider_call() {
        for path in ["/ai/explain", "/ai/bugs", "/ai/refactor", "/ai/optimize"] {
            let (app, provider) = app_with(vec![Ok("unused".to_string())]);
            let (status, body) = post_json(app, path, json!({"language": "rust"})).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
            assert_eq!(body, json!({"error": "code required"}));
            assert_eq!(provider.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_convert_requires_code_and_target() {
        let (app, provider) = app_with(vec![]);
        let (status, body) = post_json(app, "/ai/convert", json!({"code": "x = 1"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "code and toLanguage required");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_requires_message() {
        let (app, _) = app_with(vec![]);
        let (status, body) = post_json(app, "/ai/chat", json!({"messages": []})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "message required");

        let (app, _) = app_with(vec![]);
        let (status, _) = post_json(app, "/ai/code-edit", json!({"currentCode": "x"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_explain_success() {
        let (app, provider) = app_with(vec![Ok("Adds two numbers.".to_string())]);
        let (status, body) = post_json(app, "/ai/explain", json!({"code": "a + b"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"explanation": "Adds two numbers."}));
        let calls = provider.requests();
        assert!(calls[0].messages[1].content.contains("text code"));
    }

    #[tokio::test]
    async fn test_refactor_and_optimize_shapes() {
        let (app, _) = app_with(vec![Ok("```rust\nlet x = 1;\n```".to_string())]);
        let (_, body) = post_json(app, "/ai/refactor", json!({"code": "let x=1;", "language": "rust"})).await;
        assert_eq!(body, json!({"code": "let x = 1;", "raw": "```rust\nlet x = 1;\n```"}));

        let (app, _) = app_with(vec![Ok("```rust\nx\n```".to_string())]);
        let (_, body) = post_json(app, "/ai/optimize", json!({"code": "y"})).await;
        assert_eq!(body, json!({"code": "x", "explanation": "See optimized code above."}));
    }

    #[tokio::test]
    async fn test_chat_history_mode() {
        let (app, provider) = app_with(vec![Ok("Sure.".to_string())]);
        let (status, body) = post_json(
            app,
            "/ai/chat",
            json!({
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"},
                    {"role": "user", "content": "explain it"}
                ],
                "currentCode": "fn main() {}",
                "model": "mixtral-8x7b-32768"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Sure."}));

        let calls = provider.requests();
        assert_eq!(calls[0].messages.len(), 4);
        assert_eq!(calls[0].model, "mixtral-8x7b-32768");
        assert!(calls[0].messages[0].content.contains("fn main() {}"));
    }

    #[tokio::test]
    async fn test_code_edit_decisions() {
        let (app, _) = app_with(vec![Ok(
            r#"{"action":"apply","rationale":"done","code":"let a = 2;"}"#.to_string(),
        )]);
        let (status, body) = post_json(
            app,
            "/ai/code-edit",
            json!({"message": "set a to 2", "currentCode": "let a = 1;", "language": "javascript"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"action": "apply", "code": "let a = 2;", "rationale": "done"}));

        let (app, _) = app_with(vec![Ok(r#"{"action":"clarify","question":"Which a?"}"#.to_string())]);
        let (_, body) = post_json(app, "/ai/chat-code", json!({"message": "change a"})).await;
        assert_eq!(body["action"], "clarify");
        assert_eq!(body["question"], "Which a?");
    }

    #[tokio::test]
    async fn test_code_edit_malformed_is_502() {
        let (app, _) = app_with(vec![Ok("Here is your code: let a = 2;".to_string())]);
        let (status, body) = post_json(app, "/ai/code-edit", json!({"message": "set a"})).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "AI returned an unusable response");
        assert!(body["detail"].as_str().unwrap().contains("invalid JSON"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_502() {
        let (app, _) = app_with(vec![Err(AIError::RateLimited)]);
        let (status, body) = post_json(app, "/ai/bugs", json!({"code": "x"})).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "AI service temporarily unavailable");
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_unconfigured_is_503() {
        let service = AIService::unconfigured(AIConfig::default());
        let app = build_router(service, &ServerConfig::default());
        let (status, body) = post_json(app, "/ai/explain", json!({"code": "x"})).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "AI service not configured");
        assert!(body["detail"].as_str().unwrap().contains("GROQ_API_KEY"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let (app, _) = app_with(vec![]);
        let request = Request::builder()
            .method("POST")
            .uri("/ai/explain")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    fn explain_from(client: SocketAddr) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ai/explain")
            .header("content-type", "application/json")
            .extension(ConnectInfo(client))
            .body(Body::from(json!({"code": "x"}).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_request_over_limit_is_429() {
        let config = ServerConfig {
            rate_limit_max: 2,
            ..ServerConfig::default()
        };
        let replies = vec![Ok("one".to_string()), Ok("two".to_string()), Ok("three".to_string())];
        let (app, provider) = app_with_config(replies, &config);

        for _ in 0..2 {
            let (status, _) = post_json(app.clone(), "/ai/explain", json!({"code": "x"})).await;
            assert_eq!(status, StatusCode::OK);
        }

        let request = Request::builder()
            .method("POST")
            .uri("/ai/explain")
            .header("content-type", "application/json")
            .body(Body::from(json!({"code": "x"}).to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("Rate limit exceeded, retry in "));
        assert_eq!(provider.call_count(), 2);

        // health stays reachable
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limit_is_per_client() {
        let config = ServerConfig {
            rate_limit_max: 1,
            ..ServerConfig::default()
        };
        let replies = vec![Ok("a".to_string()), Ok("b".to_string())];
        let (app, provider) = app_with_config(replies, &config);
        let first: SocketAddr = "10.0.0.1:50000".parse().unwrap();
        let second: SocketAddr = "10.0.0.2:50000".parse().unwrap();

        let response = app.clone().oneshot(explain_from(first)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = app.clone().oneshot(explain_from(first)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let response = app.oneshot(explain_from(second)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(provider.call_count(), 2);
    }
}
