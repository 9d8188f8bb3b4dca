use std::sync::Arc;
use std::time::Instant;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use crate::catalog;
use crate::config::Config;
use crate::dispatch::GenerationRequest;
use crate::dispatch::http::V0Client;
use crate::error::V0Error;
use crate::parsers::{parse_analysis, parse_component};
use crate::prompts::{self, fill};
use crate::response::{
    AnalysisEnvelope, ComponentEnvelope, ImprovementEnvelope, TemplatesEnvelope, json_result,
};
use crate::tools::analyze::AnalyzeRequirementsRequest;
use crate::tools::configure::ConfigureRequest;
use crate::tools::existing_or_default;
use crate::tools::generate::GenerateComponentRequest;
use crate::tools::image::GenerateFromImageRequest;
use crate::tools::improve::ImproveComponentRequest;
use crate::tools::template::{GenerateFromTemplateRequest, ListTemplatesRequest};
use crate::validate;

/// Prompt used to recover a classified error after a failed connection test.
const DIAGNOSTIC_PROMPT: &str = "test connection";

#[derive(Clone)]
pub struct V0Server {
    client: Arc<V0Client>,
    tool_router: ToolRouter<Self>,
}

/// Maps a client failure to an MCP error carrying the operation prefix.
/// Caller mistakes become `invalid_params`; everything else is internal.
fn tool_error(operation: &str, e: V0Error) -> McpError {
    let message = format!("{operation} failed: {e}");
    tracing::warn!("{message}");
    if e.is_validation() {
        McpError::invalid_params(message, None)
    } else {
        McpError::internal_error(message, None)
    }
}

fn invalid(operation: &str, msg: String) -> McpError {
    McpError::invalid_params(format!("{operation} failed: {msg}"), None)
}

fn text_result(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

const ANALYZE: &str = "UI requirements analysis";
const GENERATE: &str = "Component generation";
const IMPROVE: &str = "Component improvement";
const IMAGE: &str = "Multimodal component generation";
const TEMPLATE: &str = "Template-based component generation";
const LIST: &str = "Template listing";
const CONFIGURE: &str = "Configuration";

#[tool_router]
impl V0Server {
    pub fn new(config: Config) -> Self {
        tracing::info!(model = %config.client.model, base_url = %config.client.base_url, "v0 client configured");
        let client = Arc::new(V0Client::new(config.api_key, config.client));
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "test_connection",
        description = "Test connection to the v0.dev API with detailed diagnostics.",
        annotations(read_only_hint = true)
    )]
    async fn test_connection(&self) -> Result<CallToolResult, McpError> {
        if self.client.test_connection().await {
            return Ok(text_result(
                "Connection test result: Successfully connected to v0.dev API".to_string(),
            ));
        }

        // test_connection only reports a bool; one real request recovers the reason.
        let req = GenerationRequest::new(DIAGNOSTIC_PROMPT).with_temperature(0.1);
        let text = match self.client.generate(&req).await {
            Ok(_) => {
                "Connection test result: API responded but test_connection failed unexpectedly"
                    .to_string()
            }
            Err(e) => {
                tracing::warn!("v0 connection test failed: {e}");
                format!("Connection test result: Failed to connect to v0.dev API. Error: {e}")
            }
        };
        Ok(text_result(text))
    }

    #[tool(
        name = "configure_v0",
        description = "Validate v0.dev API connectivity, optionally with a different API key. The key is used for this call only and never stored.",
        annotations(read_only_hint = true)
    )]
    async fn configure_v0(
        &self,
        Parameters(req): Parameters<ConfigureRequest>,
    ) -> Result<CallToolResult, McpError> {
        if !req.test_connection {
            return Ok(text_result(
                "v0.dev integration configured successfully. API connection not tested."
                    .to_string(),
            ));
        }

        let connected = match req.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(key) => {
                V0Client::new(key, self.client.settings().clone())
                    .test_connection()
                    .await
            }
            None => self.client.test_connection().await,
        };

        if !connected {
            let message = format!(
                "{CONFIGURE} failed: Failed to connect to v0.dev API. Verify the API key is valid and that api.v0.dev is reachable."
            );
            tracing::warn!("{message}");
            return Err(McpError::internal_error(message, None));
        }

        Ok(text_result(
            "v0.dev integration configured successfully. API connection verified.".to_string(),
        ))
    }

    #[tool(
        name = "analyze_requirements",
        description = "Break down UI requirements into a React component structure using shadcn/ui. Covers visual hierarchy, build order and component relationships; does not handle file paths or architecture.",
        annotations(read_only_hint = true)
    )]
    async fn analyze_requirements(
        &self,
        Parameters(req): Parameters<AnalyzeRequirementsRequest>,
    ) -> Result<CallToolResult, McpError> {
        validate::validate_required(&req.description, "Description")
            .map_err(|msg| invalid(ANALYZE, msg))?;

        let existing = existing_or_default(&req.existing_components);

        let prompt = fill(
            prompts::ANALYZE_REQUIREMENTS_PROMPT,
            &[
                ("description", req.description.as_str().into()),
                ("framework", req.framework.as_str().into()),
                ("existing_components", existing.into()),
            ],
        );

        let start = Instant::now();
        let raw = self
            .client
            .complete_with_retry(&GenerationRequest::new(prompt))
            .await
            .map_err(|e| tool_error(ANALYZE, e))?;

        let parsed = parse_analysis(&raw);
        tracing::info!(
            components = parsed.components_needed.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analysis complete"
        );
        json_result(&AnalysisEnvelope::from(parsed))
    }

    #[tool(
        name = "generate_component",
        description = "Generate a React/Next.js component with TypeScript, Tailwind CSS and shadcn/ui.",
        annotations(read_only_hint = true)
    )]
    async fn generate_component(
        &self,
        Parameters(req): Parameters<GenerateComponentRequest>,
    ) -> Result<CallToolResult, McpError> {
        validate::validate_component_name(&req.name).map_err(|msg| invalid(GENERATE, msg))?;
        validate::validate_description(&req.description).map_err(|msg| invalid(GENERATE, msg))?;
        validate::validate_existing_components(&req.existing_components)
            .map_err(|msg| invalid(GENERATE, msg))?;
        validate::validate_integration_context(req.integration_context.as_deref())
            .map_err(|msg| invalid(GENERATE, msg))?;

        let prompt = fill(
            prompts::GENERATE_COMPONENT_PROMPT,
            &[
                ("component_name", req.name.as_str().into()),
                ("component_type", req.kind.as_str().into()),
                ("description", req.description.as_str().into()),
                ("framework", req.framework.as_str().into()),
                ("responsive", req.responsive.into()),
                ("accessibility", req.accessibility.into()),
                (
                    "existing_components",
                    existing_or_default(&req.existing_components).into(),
                ),
                (
                    "integration_context",
                    req.integration_context_or_default().into(),
                ),
            ],
        );

        let request = GenerationRequest::new(prompt).with_stream(req.stream);
        let response = self
            .client
            .generate_with_retry(&request)
            .await
            .map_err(|e| tool_error(GENERATE, e))?;

        let parsed = parse_component(&response.raw);
        tracing::info!(component = %req.name, "component generated");
        json_result(&ComponentEnvelope::from_parsed(
            &req.name,
            parsed,
            req.accessibility,
            req.responsive,
        ))
    }

    #[tool(
        name = "improve_component",
        description = "Improve an existing React/Next.js component: applies the requested changes and visual refinements without changing its props interface.",
        annotations(read_only_hint = true)
    )]
    async fn improve_component(
        &self,
        Parameters(req): Parameters<ImproveComponentRequest>,
    ) -> Result<CallToolResult, McpError> {
        validate::validate_required(&req.name, "Component name")
            .map_err(|msg| invalid(IMPROVE, msg))?;
        validate::validate_required(&req.current_code, "Current code")
            .map_err(|msg| invalid(IMPROVE, msg))?;
        validate::validate_improvements(&req.improvements).map_err(|msg| invalid(IMPROVE, msg))?;

        let prompt = fill(
            prompts::IMPROVE_COMPONENT_PROMPT,
            &[
                ("current_code", req.current_code.as_str().into()),
                ("improvements_requested", req.improvements.as_slice().into()),
                ("framework", req.framework.as_str().into()),
            ],
        );

        let response = self
            .client
            .generate_with_retry(&GenerationRequest::new(prompt))
            .await
            .map_err(|e| tool_error(IMPROVE, e))?;

        let parsed = parse_component(&response.raw);
        json_result(&ImprovementEnvelope::new(
            &req.name,
            parsed.code,
            &response.raw,
        ))
    }

    #[tool(
        name = "generate_from_image",
        description = "Generate a React/Next.js component from wireframes, designs or screenshots (1 to 5 base64 images).",
        annotations(read_only_hint = true)
    )]
    async fn generate_from_image(
        &self,
        Parameters(req): Parameters<GenerateFromImageRequest>,
    ) -> Result<CallToolResult, McpError> {
        validate::validate_required(&req.name, "Component name")
            .map_err(|msg| invalid(IMAGE, msg))?;
        validate::validate_required(&req.description, "Description")
            .map_err(|msg| invalid(IMAGE, msg))?;
        validate::validate_images(&req.images).map_err(|msg| invalid(IMAGE, msg))?;

        let prompt = req.prompt();

        let mut request = GenerationRequest::new(prompt).with_images(req.images);
        request.image_analysis_prompt = req.image_analysis_prompt;

        let response = self
            .client
            .generate_multimodal(&request)
            .await
            .map_err(|e| tool_error(IMAGE, e))?;

        let parsed = parse_component(&response.raw);
        json_result(&ComponentEnvelope::from_parsed(
            &req.name,
            parsed,
            req.accessibility,
            req.responsive,
        ))
    }

    #[tool(
        name = "generate_from_template",
        description = "Generate a component from a UI pattern template (forms, cards, navigation, ...). Use `list_templates` for names and variants.",
        annotations(read_only_hint = true)
    )]
    async fn generate_from_template(
        &self,
        Parameters(req): Parameters<GenerateFromTemplateRequest>,
    ) -> Result<CallToolResult, McpError> {
        validate::validate_required(&req.template, "Template name")
            .map_err(|msg| invalid(TEMPLATE, msg))?;
        validate::validate_required(&req.name, "Component name")
            .map_err(|msg| invalid(TEMPLATE, msg))?;

        let template = catalog::get(&req.template).ok_or_else(|| {
            invalid(
                TEMPLATE,
                format!(
                    "Template '{}' not found. Available templates: {}.",
                    req.template,
                    catalog::names().join(", ")
                ),
            )
        })?;

        let variant = match req.variant.as_deref().filter(|v| !v.trim().is_empty()) {
            Some(name) => Some(template.variant(name).ok_or_else(|| {
                let known: Vec<&str> = template.variants.iter().map(|v| v.name.as_str()).collect();
                invalid(
                    TEMPLATE,
                    format!(
                        "Variant '{name}' not found for template '{}'. Available variants: {}.",
                        template.name,
                        if known.is_empty() {
                            "none".to_string()
                        } else {
                            known.join(", ")
                        }
                    ),
                )
            })?),
            None => None,
        };

        let mut prompt = fill(
            prompts::TEMPLATE_COMPONENT_PROMPT,
            &[
                ("component_name", req.name.as_str().into()),
                ("template", template.name.as_str().into()),
                ("template_description", template.description.as_str().into()),
                ("visual_pattern", template.visual_pattern.as_str().into()),
                ("shadcn_components", template.shadcn_components.as_slice().into()),
                (
                    "responsive_features",
                    template.responsive_features.as_slice().into(),
                ),
                (
                    "accessibility_features",
                    template.accessibility_features.as_slice().into(),
                ),
                (
                    "existing_components",
                    existing_or_default(&req.existing_components).into(),
                ),
                ("framework", req.framework.as_str().into()),
            ],
        );
        prompt.push_str(&prompts::template_extras(
            variant.map(|v| (v.name.as_str(), v.description.as_str(), v.modifications.as_slice())),
            &req.customizations,
        ));

        let response = self
            .client
            .generate_with_retry(&GenerationRequest::new(prompt))
            .await
            .map_err(|e| tool_error(TEMPLATE, e))?;

        let parsed = parse_component(&response.raw);
        json_result(&ComponentEnvelope::from_template(
            &req.name,
            parsed,
            template,
            &req.customizations,
        ))
    }

    #[tool(
        name = "list_templates",
        description = "List available UI pattern templates, optionally filtered by category and a search query.",
        annotations(read_only_hint = true)
    )]
    async fn list_templates(
        &self,
        Parameters(req): Parameters<ListTemplatesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let templates = catalog::select(req.category, req.query.as_deref());
        if catalog::all().is_empty() {
            return Err(McpError::internal_error(
                format!("{LIST} failed: the template catalog is empty. Rebuild the server with a valid catalog."),
                None,
            ));
        }
        json_result(&TemplatesEnvelope::new(
            req.category,
            req.framework,
            &templates,
        ))
    }
}

#[tool_handler]
impl ServerHandler for V0Server {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "v0-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "v0-mcp: UI component generation through the v0.dev API.\n\n\
                 Workflow:\n\
                 1. Call `test_connection` if generation fails unexpectedly.\n\
                 2. Call `analyze_requirements` to break a UI into components and a build order.\n\
                 3. Call `generate_component` for each component, foundational ones first.\n\
                    - `generate_from_image` when a wireframe, design or screenshot exists.\n\
                    - `list_templates` + `generate_from_template` for common patterns.\n\
                 4. Call `improve_component` to refine an existing component.\n\n\
                 Results are JSON. File placement and project integration are left to the caller."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
