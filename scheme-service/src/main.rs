mod classifier;
mod features;
mod intents;
mod steps;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use dialog_flow::{
    ExecutionStatus, FlowRunner, InMemorySessionStorage, Reply, Session, SessionStorage,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::classifier::{ForestClassifier, SchemeClassifier};
use crate::intents::IntentCorpus;
use crate::steps::{SURVEY_FLOW_ID, session_keys, survey_flow};

/// Command that starts (or restarts) a survey session.
const START_COMMAND: &str = "/start";

const INTRO_REPLY: &str =
    "Please answer the following survey for personalised scheme recommendations.";
const AGE_QUESTION: &str = "What is your age? eg. 1, 18, 33, etc.";
const RESTART_REPLY: &str =
    "Error occurred while conducting the survey. Please enter /start to start the survey again.";
const CHAT_FAILURE_REPLY: &str =
    "Something went wrong while generating a reply. Please try again.";

#[derive(Clone)]
struct AppState {
    flow_runner: Arc<FlowRunner>,
    session_storage: Arc<dyn SessionStorage>,
    corpus: Arc<IntentCorpus>,
    first_step_id: String,
}

#[derive(Debug, Deserialize)]
struct MessageParams {
    msg: Option<String>,
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct SurveyResponse {
    session_id: String,
    process: bool,
    #[serde(rename = "type")]
    kind: &'static str,
    response: ResponseBody,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ResponseBody {
    Simple(String),
    Complex {
        reply: String,
        options: Vec<String>,
    },
    Result {
        reply: String,
        schemes: serde_json::Value,
    },
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    process: bool,
    response: String,
}

#[derive(Debug, Serialize)]
struct SessionSnapshot {
    id: String,
    flow_id: String,
    current_step_id: String,
    answers: serde_json::Map<String, serde_json::Value>,
}

fn reply_to_body(reply: Reply) -> (&'static str, ResponseBody) {
    match reply {
        Reply::Text(text) => ("simple", ResponseBody::Simple(text)),
        Reply::Menu { prompt, options } => (
            "complex",
            ResponseBody::Complex {
                reply: prompt,
                options,
            },
        ),
        Reply::Outcome { prompt, payload } => (
            "result",
            ResponseBody::Result {
                reply: prompt,
                schemes: payload,
            },
        ),
    }
}

/// Generic retryable failure: nothing about the cause leaks to the caller.
fn failure_response(session_id: String) -> SurveyResponse {
    SurveyResponse {
        session_id,
        process: false,
        kind: "simple",
        response: ResponseBody::Simple(RESTART_REPLY.to_string()),
    }
}

/// Initialize structured tracing based on environment variables
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "scheme_service=debug,dialog_flow=debug,tower_http=debug".into());

    match log_format.as_str() {
        "pretty" => {
            // Human-readable logging for development
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            // Structured JSON logging for production
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}

/// Drive the survey one question forward for this session.
async fn advance_survey(
    Query(params): Query<MessageParams>,
    State(state): State<AppState>,
) -> Json<SurveyResponse> {
    let msg = params.msg.unwrap_or_default();

    if msg.trim() == START_COMMAND {
        let session_id = params
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let session = Session::new_from_step(
            session_id.clone(),
            SURVEY_FLOW_ID,
            &state.first_step_id,
        );
        if let Err(e) = state.session_storage.save(session).await {
            error!(session_id = %session_id, error = %e, "failed to create session");
            return Json(failure_response(session_id));
        }

        info!(session_id = %session_id, "survey session started");
        return Json(SurveyResponse {
            session_id,
            process: true,
            kind: "complex",
            response: ResponseBody::Complex {
                reply: INTRO_REPLY.to_string(),
                options: vec![AGE_QUESTION.to_string()],
            },
        });
    }

    let Some(session_id) = params.session_id else {
        return Json(failure_response(String::new()));
    };

    let session = match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            info!(session_id = %session_id, "session not found");
            return Json(failure_response(session_id));
        }
        Err(e) => {
            error!(session_id = %session_id, error = %e, "failed to get session");
            return Json(failure_response(session_id));
        }
    };

    // Record the latest user message, then run exactly one step.
    session.context.set(session_keys::USER_INPUT, msg);
    if let Err(e) = state.session_storage.save(session).await {
        error!(session_id = %session_id, error = %e, "failed to save session");
        return Json(failure_response(session_id));
    }

    let result = match state.flow_runner.run(&session_id).await {
        Ok(result) => result,
        Err(e) => {
            error!(session_id = %session_id, error = %e, "survey step failed");
            return Json(failure_response(session_id));
        }
    };

    let process = result.status == ExecutionStatus::WaitingForInput;
    match result.reply {
        Some(reply) => {
            let (kind, response) = reply_to_body(reply);
            Json(SurveyResponse {
                session_id,
                process,
                kind,
                response,
            })
        }
        None => Json(failure_response(session_id)),
    }
}

/// Free-text chat: intent match, then a canned response.
async fn chat(
    Query(params): Query<MessageParams>,
    State(state): State<AppState>,
) -> Json<ChatResponse> {
    let msg = params.msg.unwrap_or_default();
    let tag = state.corpus.match_intent(&msg);

    match state.corpus.pick_response(tag) {
        Ok(response) => Json(ChatResponse {
            process: false,
            response: response.to_string(),
        }),
        Err(e) => {
            error!(tag = %tag, error = %e, "response selection failed");
            Json(ChatResponse {
                process: false,
                response: CHAT_FAILURE_REPLY.to_string(),
            })
        }
    }
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => Ok(Json(SessionSnapshot {
            id: session.id.clone(),
            flow_id: session.flow_id.clone(),
            current_step_id: session.current_step_id.clone(),
            answers: session.context.snapshot(),
        })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "failed to get session");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let model_path = std::env::var("MODEL_PATH").unwrap_or_else(|_| "data/model.json".to_string());
    let intents_path =
        std::env::var("INTENTS_PATH").unwrap_or_else(|_| "data/intents.json".to_string());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let classifier: Arc<dyn SchemeClassifier> = Arc::new(
        ForestClassifier::load(&model_path)
            .with_context(|| format!("loading classifier model from {model_path}"))?,
    );
    let corpus = Arc::new(
        IntentCorpus::load(&intents_path)
            .with_context(|| format!("loading intent corpus from {intents_path}"))?,
    );

    let flow = Arc::new(survey_flow(classifier));
    let first_step_id = flow
        .first_step_id()
        .map(str::to_string)
        .context("survey flow has no steps")?;

    let session_storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
    let flow_runner = Arc::new(FlowRunner::new(flow, session_storage.clone()));

    let state = AppState {
        flow_runner,
        session_storage,
        corpus,
        first_step_id,
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/survey", get(advance_survey))
        .route("/chat", get(chat))
        .route("/session/{id}", get(get_session))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server running on http://{bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complex_reply_wire_shape() {
        let (kind, body) = reply_to_body(Reply::menu(
            "What is your gender? enter the number",
            vec!["male".to_string(), "female".to_string()],
        ));
        let response = SurveyResponse {
            session_id: "abc".to_string(),
            process: true,
            kind,
            response: body,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "complex");
        assert_eq!(value["process"], true);
        assert_eq!(value["response"]["options"][0], "male");
    }

    #[test]
    fn result_reply_wire_shape() {
        let schemes = serde_json::json!([{"scheme": "Health Cover", "link": "https://x"}]);
        let (kind, body) = reply_to_body(Reply::outcome("eligible schemes", schemes));
        let response = SurveyResponse {
            session_id: "abc".to_string(),
            process: false,
            kind,
            response: body,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "result");
        assert_eq!(value["response"]["schemes"][0]["scheme"], "Health Cover");
    }

    #[test]
    fn simple_reply_wire_shape() {
        let (kind, body) = reply_to_body(Reply::text("Please provide a valid positive number"));
        let response = SurveyResponse {
            session_id: "abc".to_string(),
            process: true,
            kind,
            response: body,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "simple");
        assert_eq!(value["response"], "Please provide a valid positive number");
    }
}
