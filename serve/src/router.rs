//! Router (§4.2): path normalization and `(method, path)` dispatch.
//!
//! Each handler returns either a fully-materialized [`Response`] or a
//! [`StreamJob`] describing which stream driver `connection` should hand
//! the socket to next (§3 "body bytes OR stream-driver callback").

use serde_json::json;

use gateway_core::{
    budget, generate_or_fallback, run_tool_orchestration, ChatMessage, ChatRequest,
    CompletionRequest, ChatResponse, CompletionResponse, ModelInfo, MODEL_ID,
};

use crate::adapters::{ollama, openai};
use crate::error::HttpError;
use crate::http::{Request, Response};
use crate::state::AppState;

/// A request that needs the stream engine rather than a single buffered
/// response (§3, §4.4).
pub enum StreamJob {
    ChatCompletion(ChatRequest),
    TextCompletion(CompletionRequest),
    OllamaGenerate(CompletionRequest),
}

pub enum Outcome {
    Response(Response),
    Stream(StreamJob),
}

/// Normalizes a raw request-line path (§3 invariant: idempotent): strips
/// the query suffix, strips one trailing slash, preserves a bare `"/"`.
pub fn normalize_path(raw: &str) -> String {
    let without_query = raw.split('?').next().unwrap_or(raw);
    if without_query.len() > 1 && without_query.ends_with('/') {
        without_query.trim_end_matches('/').to_string()
    } else {
        without_query.to_string()
    }
}

fn current_iso8601() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Applies persisted settings (§6.3, SPEC_FULL §C) ahead of budgeting:
/// `includeHistory: false` truncates to the trailing message; an enabled
/// `systemPrompt` is prepended as a synthetic system message.
fn apply_settings(state: &AppState, messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let settings = state.settings();
    let mut messages = if settings.include_history {
        messages
    } else {
        messages.into_iter().last().into_iter().collect()
    };
    if settings.include_system_prompt && !settings.system_prompt.is_empty() {
        let mut out = Vec::with_capacity(messages.len() + 1);
        out.push(ChatMessage::new(
            gateway_core::message::Role::System,
            settings.system_prompt,
        ));
        out.append(&mut messages);
        messages = out;
    }
    messages
}

async fn handle_chat_completions(body: &[u8], state: &AppState) -> Result<Outcome, HttpError> {
    let mut request = openai::decode_chat_request(body)?;
    request.messages = apply_settings(state, request.messages);

    if request.forces_tool_orchestration() {
        let outcome = run_tool_orchestration(
            state.generator.as_ref(),
            state.executor.as_ref(),
            &request.messages,
            &request.tools,
        )
        .await;
        let response = ChatResponse::single(request.model, outcome.content);
        return Ok(Outcome::Response(Response::json(
            200,
            &openai::encode_chat_response(&response),
        )));
    }

    if request.stream {
        return Ok(Outcome::Stream(StreamJob::ChatCompletion(request)));
    }

    let prompt = budget::build_prompt(state.generator.as_ref(), &request.messages).await;
    let text = generate_or_fallback(
        state.generator.as_ref(),
        "Respond to the conversation above.",
        &prompt,
    )
    .await;
    let response = ChatResponse::single(request.model, text);
    Ok(Outcome::Response(Response::json(
        200,
        &openai::encode_chat_response(&response),
    )))
}

async fn handle_completions(body: &[u8], state: &AppState) -> Result<Outcome, HttpError> {
    let request = openai::decode_completion_request(body)?;
    if request.stream {
        return Ok(Outcome::Stream(StreamJob::TextCompletion(request)));
    }
    let prompt_messages = vec![ChatMessage::new(
        gateway_core::message::Role::User,
        &request.prompt,
    )];
    let prompt = budget::build_prompt(state.generator.as_ref(), &prompt_messages).await;
    let text = generate_or_fallback(
        state.generator.as_ref(),
        "Complete the prompt above.",
        &prompt,
    )
    .await;
    let response = CompletionResponse::single(request.model, text);
    Ok(Outcome::Response(Response::json(
        200,
        &openai::encode_completion_response(&response),
    )))
}

async fn handle_ollama_chat(body: &[u8], state: &AppState) -> Result<Outcome, HttpError> {
    let request = ollama::decode_chat_request(body)?;
    let messages = apply_settings(state, request.messages);
    let prompt = budget::build_prompt(state.generator.as_ref(), &messages).await;
    let text = generate_or_fallback(
        state.generator.as_ref(),
        "Respond to the conversation above.",
        &prompt,
    )
    .await;
    let created_at = current_iso8601();
    let body = ollama::encode_chat_response(&request.model, &created_at, &text);
    Ok(Outcome::Response(Response::json(200, &body)))
}

async fn handle_ollama_generate(body: &[u8], state: &AppState) -> Result<Outcome, HttpError> {
    let request = ollama::decode_generate_request(body)?;
    if request.stream {
        return Ok(Outcome::Stream(StreamJob::OllamaGenerate(request)));
    }
    let prompt_messages = vec![ChatMessage::new(
        gateway_core::message::Role::User,
        &request.prompt,
    )];
    let prompt = budget::build_prompt(state.generator.as_ref(), &prompt_messages).await;
    let text = generate_or_fallback(
        state.generator.as_ref(),
        "Complete the prompt above.",
        &prompt,
    )
    .await;
    let created_at = current_iso8601();
    let body = ollama::encode_generate_response(&request.model, &created_at, &text);
    Ok(Outcome::Response(Response::json(200, &body)))
}

fn model_list_response(state: &AppState) -> Response {
    let model = ModelInfo::new(state.model_created);
    Response::json(200, &openai::encode_model_list(&model))
}

fn model_by_id_response(id: &str, state: &AppState) -> Result<Response, HttpError> {
    if id == MODEL_ID || id == "apple.local:latest" {
        let model = ModelInfo::new(state.model_created);
        Ok(Response::json(200, &serde_json::to_value(&model).unwrap_or_default()))
    } else {
        Err(HttpError::UnknownModel(id.to_string()))
    }
}

fn index_response() -> Response {
    Response::json(
        200,
        &json!({
            "name": "pi-gateway",
            "endpoints": [
                "GET /v1/models", "GET /v1/models/{id}",
                "POST /v1/chat/completions", "POST /v1/completions",
                "GET /api/models", "GET /api/models/{id}",
                "GET /api/tags", "GET /api/version", "GET /api/ps",
                "POST /api/chat", "POST /api/generate",
                "GET /debug/health", "POST /debug/echo", "GET /debug/tools",
            ],
        }),
    )
}

fn debug_health_response(state: &AppState) -> Response {
    Response::json(
        200,
        &json!({
            "status": "ok",
            "running": state.status.running(),
            "port": state.status.port(),
        }),
    )
}

fn debug_echo_response(request: &Request) -> Response {
    let mut headers = serde_json::Map::new();
    for (k, v) in &request.headers {
        headers.insert(k.clone(), json!(v));
    }
    let mut body = json!({
        "method": request.method,
        "path": request.path,
        "headers": headers,
    });
    match request.body_utf8() {
        Some(text) => {
            body["bodyUtf8"] = json!(text);
        }
        None => {
            body["bodyBytes"] = json!(request.body.len());
        }
    }
    Response::json(200, &body)
}

fn debug_tools_response(state: &AppState) -> Response {
    let tools: Vec<_> = state
        .executor
        .catalog()
        .iter()
        .map(|entry| json!({ "name": entry.name, "description": entry.description }))
        .collect();
    Response::json(200, &json!({ "tools": tools }))
}

const CORS_METHODS: &str = "GET, POST, OPTIONS, HEAD";
const CORS_HEADERS: &str = "Content-Type, Authorization, Accept";

fn options_response() -> Response {
    Response::no_content(204)
        .with_header("Access-Control-Allow-Methods", CORS_METHODS)
        .with_header("Access-Control-Allow-Headers", CORS_HEADERS)
        .with_header("Access-Control-Max-Age", "600")
}

/// Dispatches a parsed request to its handler (§4.2). `OPTIONS` and `HEAD`
/// are handled generically here so each route only needs a `GET`/`POST`
/// implementation.
pub async fn dispatch(request: &Request, state: &AppState) -> Result<Outcome, HttpError> {
    if request.method == "OPTIONS" {
        return Ok(Outcome::Response(options_response()));
    }

    let path = normalize_path(&request.path);
    let method = request.method.as_str();
    let is_head = method == "HEAD";
    let effective_method = if is_head { "GET" } else { method };

    let outcome = match (effective_method, path.as_str()) {
        ("GET", "/") => Outcome::Response(index_response()),
        ("GET", "/v1/models") => Outcome::Response(model_list_response(state)),
        ("GET", "/api/models") => Outcome::Response(model_list_response(state)),
        ("GET", "/api/tags") => Outcome::Response(Response::json(200, &ollama::encode_tags(&current_iso8601()))),
        ("GET", "/api/version") => Outcome::Response(Response::json(200, &ollama::encode_version())),
        ("GET", "/api/ps") => Outcome::Response(Response::json(200, &ollama::encode_ps())),
        ("GET", "/debug/health") => Outcome::Response(debug_health_response(state)),
        ("GET", "/debug/tools") => Outcome::Response(debug_tools_response(state)),
        ("GET", p) if p.starts_with("/v1/models/") => {
            let id = &p["/v1/models/".len()..];
            Outcome::Response(model_by_id_response(id, state)?)
        }
        ("GET", p) if p.starts_with("/api/models/") => {
            let id = &p["/api/models/".len()..];
            Outcome::Response(model_by_id_response(id, state)?)
        }
        ("POST", "/v1/chat/completions") => handle_chat_completions(&request.body, state).await?,
        ("POST", "/v1/completions") => handle_completions(&request.body, state).await?,
        ("POST", "/api/chat") => handle_ollama_chat(&request.body, state).await?,
        ("POST", "/api/generate") => handle_ollama_generate(&request.body, state).await?,
        ("POST", "/debug/echo") => Outcome::Response(debug_echo_response(request)),
        _ => return Err(HttpError::NotFound),
    };

    if is_head {
        if let Outcome::Response(resp) = outcome {
            return Ok(Outcome::Response(resp.without_body()));
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_strips_query_and_trailing_slash() {
        assert_eq!(normalize_path("/v1/models?x=1"), "/v1/models");
        assert_eq!(normalize_path("/v1/models/"), "/v1/models");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn normalize_path_is_idempotent() {
        for p in ["/a/b/", "/a/b", "/", "/a?x=1"] {
            let once = normalize_path(p);
            let twice = normalize_path(&once);
            assert_eq!(once, twice);
        }
    }
}
