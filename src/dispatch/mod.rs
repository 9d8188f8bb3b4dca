pub mod http;
pub mod retry;
pub mod stream;

use std::borrow::Cow;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Internal request type for one generation call. Built per tool invocation
/// and dropped after it.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Sampling temperature in [0, 2]. Falls back to the client default.
    pub temperature: Option<f64>,
    /// Falls back to the client default (false).
    pub stream: Option<bool>,
    /// Images for the multimodal variant, in prompt order.
    pub images: Vec<ImageInput>,
    /// Extra instruction appended after the images in multimodal mode.
    pub image_analysis_prompt: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    pub fn with_images(mut self, images: Vec<ImageInput>) -> Self {
        self.images = images;
        self
    }
}

/// Role an attached image plays in the prompt.
///
/// Unrecognised strings deserialize into [`ImageKind::Unrecognized`] so the
/// client can reject them with the offending image index instead of failing
/// the whole argument object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageKind {
    Wireframe,
    Design,
    Screenshot,
    Reference,
    Unrecognized(String),
}

impl ImageKind {
    pub const ALLOWED: [&'static str; 4] = ["wireframe", "design", "screenshot", "reference"];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Wireframe => "wireframe",
            Self::Design => "design",
            Self::Screenshot => "screenshot",
            Self::Reference => "reference",
            Self::Unrecognized(s) => s,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Vision detail hint: wireframes need full resolution to read layout.
    pub fn detail(&self) -> &'static str {
        match self {
            Self::Wireframe => "high",
            _ => "auto",
        }
    }
}

impl From<&str> for ImageKind {
    fn from(s: &str) -> Self {
        match s {
            "wireframe" => Self::Wireframe,
            "design" => Self::Design,
            "screenshot" => Self::Screenshot,
            "reference" => Self::Reference,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl Serialize for ImageKind {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ImageKind {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Ok(Self::from(s.as_str()))
    }
}

impl JsonSchema for ImageKind {
    fn schema_name() -> Cow<'static, str> {
        "ImageKind".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "enum": ["wireframe", "design", "screenshot", "reference"],
            "description": "Image role: wireframe, design, screenshot or reference"
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ImageInput {
    /// Base64-encoded image bytes (no data-URI prefix).
    pub data: String,
    /// Image role: "wireframe", "design", "screenshot" or "reference".
    #[serde(rename = "type")]
    pub kind: ImageKind,
    /// Optional note about what the image shows (max 500 characters).
    pub description: Option<String>,
}

impl ImageInput {
    /// MIME type sniffed from the base64 magic prefix. Defaults to JPEG.
    pub fn mime_type(&self) -> &'static str {
        let data = self.data.trim_start();
        if data.starts_with("iVBORw0KGgo") {
            "image/png"
        } else if data.starts_with("UklGR") {
            "image/webp"
        } else if data.starts_with("R0lGOD") {
            "image/gif"
        } else {
            "image/jpeg"
        }
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.data.trim())
    }
}

/// Metadata derived from generated content.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentMetadata {
    pub name: String,
    pub description: String,
    /// Module paths from `import … from "…"`, first appearance order.
    pub dependencies: Vec<String>,
    pub framework: &'static str,
    pub styling: &'static str,
    pub accessibility: bool,
    pub typescript: bool,
}

/// Result of one successful `generate` call.
#[derive(Debug, Clone)]
pub struct ComponentResponse {
    pub code: String,
    pub metadata: ComponentMetadata,
    pub explanation: Option<String>,
    /// Full model text, kept for the component/analysis parsers which need
    /// the sections outside the code fence.
    pub raw: String,
}

/// One element of a streaming generation.
///
/// `progress` is a presentation estimate only: it advances a fixed step per
/// chunk and stops at 95 until the terminal marker arrives. It says nothing
/// about how much of the answer has actually been produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamingResponse {
    pub chunk: String,
    pub progress: u8,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<serde_json::Value>,
}

impl StreamingResponse {
    pub fn terminal() -> Self {
        Self {
            chunk: String::new(),
            progress: 100,
            complete: true,
            usage_metadata: None,
        }
    }
}
