use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use wahlomat_core::assistant::{AssistantClient, AssistantRequest};
use wahlomat_core::credential::Credential;
use wahlomat_core::error::WahlError;
use wahlomat_interaction::{HttpAssistantsApi, OpenAIAssistantClient};

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One request as seen by the fake service.
#[derive(Debug, Clone)]
struct RecordedRequest {
    method: String,
    target: String,
    authorization: Option<String>,
    beta: Option<String>,
    body: String,
}

impl RecordedRequest {
    fn line(&self) -> String {
        format!("{} {}", self.method, self.target)
    }

    fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

type Responder = dyn Fn(&RecordedRequest, usize) -> (u16, String) + Send + Sync;

/// Minimal HTTP/1.1 service on a local port. Every connection carries one request
/// and is closed after the response.
struct FakeService {
    address: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeService {
    async fn start(responder: Arc<Responder>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake service listener");
        let address = listener.local_addr().expect("fake service local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = recorded.clone();
                let responder = responder.clone();
                tokio::spawn(async move {
                    serve_one(stream, recorded, responder).await;
                });
            }
        });

        Self {
            address,
            requests,
            handle,
        }
    }

    fn base_url(&self) -> String {
        format!("http://{}/v1", self.address)
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_one(
    mut stream: TcpStream,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Arc<Responder>,
) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(read) => read,
        };
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    let mut beta = None;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match name.trim().to_ascii_lowercase().as_str() {
            "content-length" => content_length = value.parse().unwrap_or(0),
            "authorization" => authorization = Some(value),
            "openai-beta" => beta = Some(value),
            _ => {}
        }
    }

    while buffer.len() < header_end + content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(read) => buffer.extend_from_slice(&chunk[..read]),
        }
    }
    let body_end = (header_end + content_length).min(buffer.len());
    let body = String::from_utf8_lossy(&buffer[header_end..body_end]).to_string();

    let request = RecordedRequest {
        method,
        target,
        authorization,
        beta,
        body,
    };

    let seen = {
        let mut recorded = recorded.lock().expect("requests lock");
        let seen = recorded
            .iter()
            .filter(|r| r.line() == request.line())
            .count();
        recorded.push(request.clone());
        seen
    };

    let (status, payload) = responder(&request, seen);
    let response = format!(
        "HTTP/1.1 {status} Fake\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{payload}",
        payload.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Answers like the Assistants service for a run that is polled twice.
fn assistants_responder() -> Arc<Responder> {
    Arc::new(|request: &RecordedRequest, seen: usize| {
        let payload = match (request.method.as_str(), request.target.as_str()) {
            ("POST", "/v1/threads") => json!({ "id": "thread_1", "object": "thread" }),
            ("POST", "/v1/threads/thread_1/messages") => {
                json!({ "id": "msg_1", "object": "thread.message" })
            }
            ("POST", "/v1/threads/thread_1/runs") => {
                json!({ "id": "run_1", "object": "thread.run", "status": "queued" })
            }
            ("GET", "/v1/threads/thread_1/runs/run_1") => {
                let status = if seen == 0 { "in_progress" } else { "completed" };
                json!({ "id": "run_1", "object": "thread.run", "status": status })
            }
            ("GET", "/v1/threads/thread_1/messages?order=desc&limit=20") => json!({
                "object": "list",
                "data": [
                    {
                        "id": "msg_2",
                        "role": "assistant",
                        "content": [
                            { "type": "text", "text": { "value": "Climate is important", "annotations": [] } }
                        ]
                    },
                    {
                        "id": "msg_1",
                        "role": "user",
                        "content": [
                            { "type": "text", "text": { "value": "Climate policy?", "annotations": [] } }
                        ]
                    }
                ]
            }),
            ("DELETE", "/v1/threads/thread_1") => {
                json!({ "id": "thread_1", "object": "thread.deleted", "deleted": true })
            }
            _ => {
                return (
                    404,
                    json!({ "error": { "message": format!("no route for {}", request.line()) } })
                        .to_string(),
                );
            }
        };
        (200, payload.to_string())
    })
}

fn client_for(service: &FakeService) -> OpenAIAssistantClient {
    OpenAIAssistantClient::new(Arc::new(HttpAssistantsApi::new(service.base_url())))
        .with_poll_interval(Duration::from_millis(10))
        .with_run_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_full_request_sequence_on_the_wire() {
    let service = FakeService::start(assistants_responder()).await;
    let client = client_for(&service);
    let credential = Credential::new("sk-test").unwrap();
    let request = AssistantRequest {
        credential: &credential,
        assistant_id: "asst_main",
        message: "Climate policy?",
    };

    let reply = timeout(TEST_TIMEOUT, client.ask(request, &CancellationToken::new()))
        .await
        .expect("request should finish");

    assert_eq!(reply, Ok("Climate is important".to_string()));

    let requests = service.requests();
    let lines: Vec<String> = requests.iter().map(RecordedRequest::line).collect();
    assert_eq!(
        lines,
        vec![
            "POST /v1/threads",
            "POST /v1/threads/thread_1/messages",
            "POST /v1/threads/thread_1/runs",
            "GET /v1/threads/thread_1/runs/run_1",
            "GET /v1/threads/thread_1/runs/run_1",
            "GET /v1/threads/thread_1/messages?order=desc&limit=20",
            "DELETE /v1/threads/thread_1",
        ]
    );

    for request in &requests {
        assert_eq!(
            request.authorization.as_deref(),
            Some("Bearer sk-test"),
            "{}",
            request.line()
        );
        assert_eq!(request.beta.as_deref(), Some("assistants=v2"), "{}", request.line());
    }

    assert_eq!(
        requests[1].json_body(),
        json!({ "role": "user", "content": "Climate policy?" })
    );
    assert_eq!(requests[2].json_body(), json!({ "assistant_id": "asst_main" }));
}

#[tokio::test]
async fn test_error_envelope_becomes_remote_call_with_status() {
    let responder: Arc<Responder> = Arc::new(|_: &RecordedRequest, _: usize| {
        let payload = json!({
            "error": {
                "message": "Incorrect API key provided: sk-wrong.",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        });
        (401, payload.to_string())
    });
    let service = FakeService::start(responder).await;
    let client = client_for(&service);
    let credential = Credential::new("sk-wrong").unwrap();
    let request = AssistantRequest {
        credential: &credential,
        assistant_id: "asst_main",
        message: "Climate policy?",
    };

    let err = timeout(TEST_TIMEOUT, client.ask(request, &CancellationToken::new()))
        .await
        .expect("request should finish")
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(
        err,
        WahlError::remote_status(401, "Incorrect API key provided: sk-wrong.")
    );
    // Nothing was created, so nothing is released
    let lines: Vec<String> = service.requests().iter().map(RecordedRequest::line).collect();
    assert_eq!(lines, vec!["POST /v1/threads"]);
}
