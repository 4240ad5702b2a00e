use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::api::{
    ChatRequest, ChatResponse, Endpoint, ExercisePayload, QuizPayload, SessionRequest,
};
use crate::core::transport::{TransportError, TutorTransport};

/// A request the mock backend received: request line, content type and JSON body.
pub type CapturedRequest = (String, String, serde_json::Value);

pub struct MockBackend {
    pub addr: SocketAddr,
    pub captured: Arc<tokio::sync::Mutex<Vec<CapturedRequest>>>,
    pub task: JoinHandle<Result<(), String>>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Serves one canned `(status, body)` reply per accepted connection, in order.
pub async fn spawn_mock_backend(replies: Vec<(u16, String)>) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    let captured = Arc::new(tokio::sync::Mutex::new(Vec::new()));
    let captured_for_server = Arc::clone(&captured);

    let task = tokio::spawn(async move {
        for (status, body) in replies {
            let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
            let (request_line, headers, raw_body) = read_http_request(&mut stream).await?;
            let content_type = headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
                .map(|(_, value)| value.clone())
                .unwrap_or_default();
            let body_json: serde_json::Value =
                serde_json::from_slice(&raw_body).map_err(|err| err.to_string())?;
            captured_for_server
                .lock()
                .await
                .push((request_line, content_type, body_json));

            let reason = if status < 300 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\nconnection: close\r\ncontent-length: {}\r\n\r\n{}",
                body.len(),
                body
            );
            stream
                .write_all(response.as_bytes())
                .await
                .map_err(|err| err.to_string())?;
        }
        Ok::<(), String>(())
    });

    MockBackend {
        addr,
        captured,
        task,
    }
}

async fn read_http_request(
    stream: &mut TcpStream,
) -> Result<(String, Vec<(String, String)>, Vec<u8>), String> {
    let mut buffer = Vec::new();
    let mut header_end = None;
    while header_end.is_none() {
        let mut chunk = [0_u8; 1024];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        header_end = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .map(|index| index + 4);
    }

    let header_end = header_end.expect("header end should exist");
    let header_text =
        std::str::from_utf8(&buffer[..header_end]).map_err(|err| err.to_string())?;
    let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or_else(|| "Missing HTTP request line".to_string())?
        .to_string();

    let mut headers = Vec::new();
    let mut content_length = 0_usize;
    for line in lines {
        let mut parts = line.splitn(2, ':');
        let Some(name) = parts.next() else {
            continue;
        };
        let value = parts.next().unwrap_or_default().trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
        }
        headers.push((name.to_string(), value));
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = vec![0_u8; content_length - body.len()];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP body".to_string());
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok((request_line, headers, body))
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("test client should build")
}

pub fn failure(endpoint: Endpoint) -> TransportError {
    TransportError::Status {
        endpoint,
        status: 500,
        body: "boom".to_string(),
    }
}

type Scripted<T> = Mutex<VecDeque<Result<T, TransportError>>>;

/// In-memory transport that replays queued replies and records requests.
///
/// When built with [`ScriptedTransport::gated`], every call waits for
/// [`ScriptedTransport::release`] before answering.
#[derive(Default)]
pub struct ScriptedTransport {
    chats: Scripted<ChatResponse>,
    exercises: Scripted<ExercisePayload>,
    quizzes: Scripted<QuizPayload>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub session_requests: Mutex<Vec<(Endpoint, SessionRequest)>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let transport = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (transport, gate)
    }

    pub fn push_chat(&self, reply: Result<ChatResponse, TransportError>) {
        self.chats.lock().unwrap().push_back(reply);
    }

    pub fn push_exercise(&self, reply: Result<ExercisePayload, TransportError>) {
        self.exercises.lock().unwrap().push_back(reply);
    }

    pub fn push_quiz(&self, reply: Result<QuizPayload, TransportError>) {
        self.quizzes.lock().unwrap().push_back(reply);
    }

    pub fn request_count(&self) -> usize {
        self.chat_requests.lock().unwrap().len() + self.session_requests.lock().unwrap().len()
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

fn next_reply<T>(queue: &Scripted<T>, endpoint: Endpoint) -> Result<T, TransportError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(failure(endpoint)))
}

#[async_trait]
impl TutorTransport for ScriptedTransport {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, TransportError> {
        self.chat_requests.lock().unwrap().push(request);
        self.wait_for_gate().await;
        next_reply(&self.chats, Endpoint::Chat)
    }

    async fn exercise(&self, request: SessionRequest) -> Result<ExercisePayload, TransportError> {
        self.session_requests
            .lock()
            .unwrap()
            .push((Endpoint::Exercise, request));
        self.wait_for_gate().await;
        next_reply(&self.exercises, Endpoint::Exercise)
    }

    async fn quiz(&self, request: SessionRequest) -> Result<QuizPayload, TransportError> {
        self.session_requests
            .lock()
            .unwrap()
            .push((Endpoint::Quiz, request));
        self.wait_for_gate().await;
        next_reply(&self.quizzes, Endpoint::Quiz)
    }
}

pub fn exercise(value: serde_json::Value) -> ExercisePayload {
    serde_json::from_value(value).expect("exercise fixture should decode")
}

pub fn quiz(value: serde_json::Value) -> QuizPayload {
    serde_json::from_value(value).expect("quiz fixture should decode")
}

pub fn chat(value: serde_json::Value) -> ChatResponse {
    serde_json::from_value(value).expect("chat fixture should decode")
}
