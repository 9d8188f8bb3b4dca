use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ClientSettings;
use crate::dispatch::retry::retry_with_backoff;
use crate::dispatch::{ComponentMetadata, ComponentResponse, GenerationRequest, ImageKind};
use crate::error::{RequestMode, TransportFailure, V0Error};
use crate::parsers::component::extract_component_code;
use crate::parsers::{FALLBACK_COMPONENT_NAME, component_name, import_sources, is_fence};
use crate::validate;

const MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024; // 2MB

/// Prompt sent by the connectivity probe.
const PROBE_PROMPT: &str = "test";

pub struct V0Client {
    client: Client,
    api_key: String,
    settings: ClientSettings,
}

impl std::fmt::Debug for V0Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V0Client")
            .field("api_key", &"[REDACTED]")
            .field("settings", &self.settings)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

impl ChatMessage {
    fn part_count(&self) -> usize {
        match &self.content {
            MessageContent::Text(_) => 1,
            MessageContent::Parts(parts) => parts.len(),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
    detail: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

impl V0Client {
    pub fn new(api_key: impl Into<String>, settings: ClientSettings) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("falling back to default HTTP client: {e}");
                Client::new()
            });

        Self {
            client,
            api_key: api_key.into(),
            settings,
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Text-only generation: one POST, validated content, extracted code.
    pub async fn generate(&self, req: &GenerationRequest) -> Result<ComponentResponse, V0Error> {
        let content = self.complete(req).await?;
        component_response(content)
    }

    /// Image-grounded generation. Images are validated (1-based index in the
    /// error) before anything is sent.
    pub async fn generate_multimodal(
        &self,
        req: &GenerationRequest,
    ) -> Result<ComponentResponse, V0Error> {
        validate_multimodal(req)?;
        // Image requests are never streamed.
        let body = self.request_body(req, multimodal_messages(req), false);
        let content = self.send(&body, RequestMode::Multimodal).await?;
        component_response(content)
    }

    /// [`generate`](Self::generate) with linear backoff on transient errors.
    pub async fn generate_with_retry(
        &self,
        req: &GenerationRequest,
    ) -> Result<ComponentResponse, V0Error> {
        let s = &self.settings;
        retry_with_backoff(s.max_attempts, s.backoff_step, |attempt| {
            tracing::debug!(attempt, "v0 generate attempt");
            self.generate(req)
        })
        .await
    }

    /// Validated, non-empty model text without the component guard. Used where
    /// the answer is prose (requirements analysis).
    ///
    /// With streaming enabled the chunks are collected into one string, so
    /// callers see the same result either way.
    pub async fn complete(&self, req: &GenerationRequest) -> Result<String, V0Error> {
        validate_text(req)?;
        if req.stream.unwrap_or(self.settings.stream) {
            let text = self.collect_stream(req).await?;
            return non_empty(text);
        }
        let body = self.request_body(req, text_messages(&req.prompt), false);
        self.send(&body, RequestMode::Text).await
    }

    pub async fn complete_with_retry(&self, req: &GenerationRequest) -> Result<String, V0Error> {
        let s = &self.settings;
        retry_with_backoff(s.max_attempts, s.backoff_step, |_| self.complete(req)).await
    }

    /// Minimal round trip. Any failure is reported as `false`; the detail is
    /// logged at debug level only.
    pub async fn test_connection(&self) -> bool {
        let body = ChatCompletionRequest {
            model: &self.settings.model,
            messages: text_messages(PROBE_PROMPT),
            temperature: None,
            stream: None,
            max_tokens: Some(self.settings.probe_max_tokens),
        };
        match self.send(&body, RequestMode::Text).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("v0 connectivity probe failed: {e}");
                false
            }
        }
    }

    /// Opens a `stream=true` POST and returns the response once the status is
    /// known to be a success.
    pub(crate) async fn open_stream(
        &self,
        req: &GenerationRequest,
    ) -> Result<reqwest::Response, V0Error> {
        validate_text(req)?;
        let body = self.request_body(req, text_messages(&req.prompt), true);

        let response = self
            .post(&body)
            .send()
            .await
            .map_err(|e| TransportFailure::Io(e).classify(RequestMode::Text))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped(response).await.unwrap_or_default();
            return Err(TransportFailure::Status { status, body }.classify(RequestMode::Text));
        }
        if response.content_length() == Some(0) {
            return Err(V0Error::MalformedResponse(
                "v0 API returned an empty streaming response body. Please retry the request."
                    .to_string(),
            ));
        }

        tracing::debug!(%status, "v0 stream opened");
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn request_body<'a>(
        &'a self,
        req: &GenerationRequest,
        messages: Vec<ChatMessage>,
        stream: bool,
    ) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.settings.model,
            messages,
            temperature: Some(req.temperature.unwrap_or(self.settings.temperature)),
            stream: Some(stream),
            max_tokens: None,
        }
    }

    fn post<T: Serialize>(&self, body: &T) -> reqwest::RequestBuilder {
        self.client
            .post(self.settings.endpoint())
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
    }

    async fn send(
        &self,
        body: &ChatCompletionRequest<'_>,
        mode: RequestMode,
    ) -> Result<String, V0Error> {
        tracing::debug!(
            model = body.model,
            temperature = ?body.temperature,
            stream = ?body.stream,
            parts = body.messages.iter().map(ChatMessage::part_count).sum::<usize>(),
            ?mode,
            "v0 chat completion request"
        );

        let response = self
            .post(body)
            .send()
            .await
            .map_err(|e| TransportFailure::Io(e).classify(mode))?;

        let status = response.status();
        if !status.is_success() {
            let text = read_capped(response).await.unwrap_or_default();
            let err = TransportFailure::Status { status, body: text }.classify(mode);
            tracing::warn!(%status, "v0 request failed: {err}");
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportFailure::Io(e).classify(mode))?;

        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(V0Error::MalformedResponse(format!(
                "v0 API response too large ({} bytes, max {MAX_RESPONSE_BYTES}). Please request a smaller component.",
                bytes.len()
            )));
        }

        let completion: ChatCompletion = serde_json::from_slice(&bytes).map_err(|e| {
            V0Error::MalformedResponse(format!(
                "Invalid response from v0 API: body is not a chat completion ({e}). The API may be experiencing issues."
            ))
        })?;

        message_content(completion)
    }
}

async fn read_capped(response: reqwest::Response) -> Option<String> {
    let bytes = response.bytes().await.ok()?;
    let capped = &bytes[..bytes.len().min(MAX_RESPONSE_BYTES)];
    Some(String::from_utf8_lossy(capped).into_owned())
}

// ---------------------------------------------------------------------------
// Validation and message building
// ---------------------------------------------------------------------------

fn validate_temperature(req: &GenerationRequest) -> Result<(), V0Error> {
    validate::validate_temperature(req.temperature).map_err(V0Error::Validation)
}

fn validate_text(req: &GenerationRequest) -> Result<(), V0Error> {
    if req.prompt.trim().is_empty() {
        return Err(V0Error::Validation(
            "Component generation requires a non-empty prompt describing the component to create"
                .to_string(),
        ));
    }
    validate_temperature(req)
}

fn validate_multimodal(req: &GenerationRequest) -> Result<(), V0Error> {
    if req.prompt.trim().is_empty() {
        return Err(V0Error::Validation(
            "Multimodal component generation requires a non-empty prompt describing what to create from the image(s)"
                .to_string(),
        ));
    }
    validate_temperature(req)?;

    if req.images.is_empty() {
        return Err(V0Error::Validation(
            "Multimodal generation requires at least one image (wireframe, design, or screenshot)"
                .to_string(),
        ));
    }

    for (i, image) in req.images.iter().enumerate() {
        let n = i + 1;
        if image.data.trim().is_empty() {
            return Err(V0Error::Validation(format!(
                "Image {n} has no data. Please provide valid base64 encoded image data."
            )));
        }
        if !image.kind.is_recognized() {
            return Err(V0Error::Validation(format!(
                "Image {n} has invalid type \"{}\". Must be one of: {}.",
                image.kind.as_str(),
                ImageKind::ALLOWED.join(", ")
            )));
        }
    }
    Ok(())
}

fn text_messages(prompt: &str) -> Vec<ChatMessage> {
    vec![ChatMessage {
        role: "user",
        content: MessageContent::Text(prompt.to_string()),
    }]
}

fn multimodal_messages(req: &GenerationRequest) -> Vec<ChatMessage> {
    let mut parts = vec![ContentPart::Text {
        text: req.prompt.clone(),
    }];

    parts.extend(req.images.iter().map(|image| ContentPart::ImageUrl {
        image_url: ImageUrl {
            url: image.data_uri(),
            detail: image.kind.detail(),
        },
    }));

    if let Some(instructions) = req.image_analysis_prompt.as_deref()
        && !instructions.trim().is_empty()
    {
        parts.push(ContentPart::Text {
            text: format!("\n\nImage Analysis Instructions: {instructions}"),
        });
    }

    vec![ChatMessage {
        role: "user",
        content: MessageContent::Parts(parts),
    }]
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

fn message_content(completion: ChatCompletion) -> Result<String, V0Error> {
    let choice = completion
        .choices
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| {
            V0Error::MalformedResponse(
                "Invalid response from v0 API: missing or empty choices array. The API may be experiencing issues."
                    .to_string(),
            )
        })?;

    let message = choice.message.ok_or_else(|| {
        V0Error::MalformedResponse(
            "Invalid response from v0 API: missing message in response choice. The API may be experiencing issues."
                .to_string(),
        )
    })?;

    non_empty(message.content.unwrap_or_default())
}

fn non_empty(content: String) -> Result<String, V0Error> {
    if content.trim().is_empty() {
        return Err(V0Error::MalformedResponse(
            "V0 API returned empty content. This may indicate the request was too complex or the service is experiencing issues. Please try simplifying your request."
                .to_string(),
        ));
    }
    Ok(content)
}

/// Builds the component result from raw model text, rejecting answers that
/// carry no code.
pub fn component_response(content: String) -> Result<ComponentResponse, V0Error> {
    let code = extract_code(&content);
    if code.is_empty() {
        return Err(V0Error::MalformedResponse(
            "V0 API response did not contain valid component code. Please try rephrasing your request with more specific requirements."
                .to_string(),
        ));
    }
    if !looks_like_code(&code) {
        return Err(V0Error::MalformedResponse(
            "Generated code does not appear to be a valid React component. Please try a more specific component description."
                .to_string(),
        ));
    }

    let metadata = ComponentMetadata {
        name: component_name(&content).unwrap_or_else(|| FALLBACK_COMPONENT_NAME.to_string()),
        description: "Generated component".to_string(),
        dependencies: import_sources(&content),
        framework: "react",
        styling: "tailwind",
        accessibility: true,
        typescript: true,
    };

    Ok(ComponentResponse {
        explanation: explanation(&content),
        code,
        metadata,
        raw: content,
    })
}

/// First script-tagged or untagged fenced block, trimmed; otherwise the whole
/// content.
pub fn extract_code(content: &str) -> String {
    extract_component_code(content)
}

/// Rejects prose. Looks for a declaration keyword as a whole word or an arrow
/// function; not a syntax check.
pub fn looks_like_code(code: &str) -> bool {
    const MARKERS: [&str; 4] = ["export", "function", "const", "class"];
    code.contains("=>")
        || code
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .any(|w| MARKERS.contains(&w))
}

/// Non-blank lines other than fence markers, imports and exports.
fn explanation(content: &str) -> Option<String> {
    let lines: Vec<&str> = content
        .lines()
        .filter(|l| {
            let t = l.trim();
            !t.is_empty() && !is_fence(t) && !t.starts_with("import") && !t.starts_with("export")
        })
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}
