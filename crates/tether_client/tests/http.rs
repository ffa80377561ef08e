use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use serde_json::{Value, json};
use tether_client::TetherClient;
use tether_core::prelude::{routes::*, *};
use tether_session::{JobSession, SessionConfig, StartError, WatcherConfig};

const AUDIO: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00";

#[derive(Clone, Default)]
struct Server {
    polls: Arc<AtomicUsize>,
    authorization: Arc<Mutex<Option<String>>>,
}

impl Server {
    fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    fn next_poll(&self) -> usize {
        self.polls.fetch_add(1, Ordering::SeqCst)
    }
}

async fn submit_video(
    State(server): State<Server>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    *server.authorization.lock().unwrap() = authorization;

    if body["prompt"].as_str().unwrap_or_default().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "prompt required" })),
        )
            .into_response();
    }

    Json(json!({ "jobId": "a1", "position": 3, "queueLength": 5, "estimatedWaitTime": 40 }))
        .into_response()
}

async fn video_status(State(server): State<Server>, Path(id): Path<String>) -> Response {
    match server.next_poll() {
        0 => (StatusCode::SERVICE_UNAVAILABLE, "upstream busy").into_response(),
        1 => Json(json!({ "status": "processing", "position": 1, "queueLength": 5 }))
            .into_response(),
        _ => Json(json!({ "status": "completed", "url": format!("https://cdn/{id}.mp4") }))
            .into_response(),
    }
}

async fn submit_speech() -> Json<Value> {
    Json(json!({ "jobId": "s1" }))
}

async fn speech_status(State(server): State<Server>) -> Response {
    match server.next_poll() {
        0 => Json(json!({ "status": "processing" })).into_response(),
        _ => ([(header::CONTENT_TYPE, "audio/mpeg")], Bytes::from_static(AUDIO)).into_response(),
    }
}

async fn submit_without_id() -> Json<Value> {
    Json(json!({ "position": 1 }))
}

async fn submit_image_prompt() -> Json<Value> {
    Json(json!({ "jobId": "p1" }))
}

async fn failed_status(State(server): State<Server>) -> Json<Value> {
    server.next_poll();
    Json(json!({ "status": "failed", "error": "quota exceeded" }))
}

async fn serve(server: Server) -> String {
    let app = Router::new()
        .route(VIDEO_SUBMIT, post(submit_video))
        .route(VIDEO_STATUS, get(video_status))
        .route(SPEECH_SUBMIT, post(submit_speech))
        .route(SPEECH_STATUS, get(speech_status))
        .route(SCRIPT_SUBMIT, post(submit_without_id))
        .route(SCRIPT_STATUS, get(failed_status))
        .route(IMAGE_PROMPT_SUBMIT, post(submit_image_prompt))
        .route(IMAGE_PROMPT_STATUS, get(failed_status))
        .with_state(server);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn fast() -> SessionConfig {
    SessionConfig {
        watcher: WatcherConfig::default().with_poll_interval(Duration::from_millis(20)),
        ..Default::default()
    }
}

async fn resolve<B>(session: &mut JobSession<B>) -> JobState<B::Output>
where
    B: JobBackend,
    B::Output: Clone,
{
    tokio::time::timeout(Duration::from_secs(5), session.wait_terminal())
        .await
        .expect("job did not resolve in time")
        .expect("session was not watching")
}

#[tokio::test]
async fn video_job_resolves_through_transient_error() {
    let server = Server::default();
    let url = serve(server.clone()).await;
    let client = TetherClient::new(url, Some("t0ken".into()));
    let mut session = JobSession::with_config(Arc::new(client.video()), fast());

    let handle = session
        .start(VideoRequest {
            prompt: "a fox at dawn".into(),
            duration_seconds: Some(8),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(handle.id, "a1");
    assert_eq!(handle.queue.position, Some(3));
    assert_eq!(handle.queue.estimated_wait_seconds, Some(40));

    let state = resolve(&mut session).await;
    assert_eq!(
        state.result().and_then(|output| output.str_field("url")),
        Some("https://cdn/a1.mp4")
    );
    assert_eq!(server.polls(), 3);
    assert_eq!(
        server.authorization.lock().unwrap().as_deref(),
        Some("Bearer t0ken")
    );
}

#[tokio::test]
async fn speech_job_completes_with_binary_body() {
    let server = Server::default();
    let url = serve(server.clone()).await;
    let client = TetherClient::new(url, None);
    let mut session = JobSession::with_config(Arc::new(client.speech()), fast());

    session
        .start(SpeechRequest {
            text: "Hello there".into(),
            voice_id: "narrator".into(),
        })
        .await
        .unwrap();

    let state = resolve(&mut session).await;
    assert_eq!(
        state.result(),
        Some(&JobOutput::Binary {
            content_type: "audio/mpeg".into(),
            data: Bytes::from_static(AUDIO),
        })
    );
    assert_eq!(server.polls(), 2);
}

#[tokio::test]
async fn rejected_submission_carries_server_message() {
    let url = serve(Server::default()).await;
    let client = TetherClient::new(url, None);
    let mut session = JobSession::with_config(Arc::new(client.video()), fast());

    let err = session
        .start(VideoRequest::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StartError::Submission(SubmissionError::Rejected {
            status: 400,
            message: "prompt required".into(),
        })
    );
    assert!(!session.is_watching());
}

#[tokio::test]
async fn missing_job_id_never_polls() {
    let server = Server::default();
    let url = serve(server.clone()).await;
    let client = TetherClient::new(url, None);
    let mut session = JobSession::with_config(Arc::new(client.script()), fast());

    let err = session
        .start(ScriptRequest {
            prompt: "product intro".into(),
            duration_seconds: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err, StartError::Submission(SubmissionError::MissingJobId));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.polls(), 0);
}

#[tokio::test]
async fn failed_job_reports_server_message() {
    let server = Server::default();
    let url = serve(server.clone()).await;
    let client = TetherClient::new(url, None);
    let mut session = JobSession::with_config(Arc::new(client.image_prompt()), fast());

    session
        .start(ImagePromptRequest {
            image_url: "https://cdn/in.png".into(),
        })
        .await
        .unwrap();

    let state = resolve(&mut session).await;
    assert_eq!(
        state.error().map(ToString::to_string).as_deref(),
        Some("quota exceeded")
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.polls(), 1);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let client = TetherClient::with_timeout(
        "http://127.0.0.1:9",
        None,
        Duration::from_secs(2),
    )
    .unwrap();

    let err = client
        .video()
        .submit(VideoRequest {
            prompt: "x".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::Network(_)));
    assert_eq!(err.to_string(), messages::SUBMISSION_FAILED);

    let poll = client.video().fetch_status("a1").await;
    assert!(matches!(poll, Err(PollError::Network(_))));
}
