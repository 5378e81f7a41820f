//! MCP server handler for the text editor tools.
//!
//! A manual [`ServerHandler`] implementation: tools are listed with schemas
//! generated from the argument structs in [`crate::types`], calls are
//! dispatched by name, and engine errors come back as `is_error` results
//! carrying the structured wire error, never as protocol faults. Resource
//! reads serve `text://{path}?lines={start}-{end}` URIs.

use crate::TextEditorTools;
use crate::browse;
use crate::error::EditorError;
use crate::resource;
use crate::types::*;
use rmcp::model as m;
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use schemars::JsonSchema;
use std::collections::HashSet;
use std::sync::Arc;

/// Tool names that never write to the filesystem.
pub const READ_ONLY_TOOLS: &[&str] = &[
    "get_text_file_contents",
    "peek_text_file_contents",
    "explore_directory_contents",
];

/// MCP server wrapper around [`TextEditorTools`].
pub struct TextEditorServer {
    tools: Arc<TextEditorTools>,
    /// None => expose all tools; Some(set) => only tools in the set.
    allowlist: Option<HashSet<String>>,
}

impl TextEditorServer {
    pub fn new(tools: Arc<TextEditorTools>) -> Self {
        Self {
            tools,
            allowlist: None,
        }
    }

    pub fn with_allowlist(
        tools: Arc<TextEditorTools>,
        allowlist: Option<HashSet<String>>,
    ) -> Self {
        // Normalize an empty set to None (treat as "all").
        let normalized = match allowlist {
            Some(set) if set.is_empty() => None,
            other => other,
        };
        Self {
            tools,
            allowlist: normalized,
        }
    }

    /// Restrict the surface to the read-only tools.
    pub fn read_only(tools: Arc<TextEditorTools>) -> Self {
        Self::with_allowlist(
            tools,
            Some(READ_ONLY_TOOLS.iter().map(|s| s.to_string()).collect()),
        )
    }

    fn is_allowed(&self, name: &str) -> bool {
        self.allowlist.as_ref().is_none_or(|set| set.contains(name))
    }

    fn tool_definitions(&self) -> Vec<m::Tool> {
        vec![
            tool_def::<GetTextFileContentsArgs>(
                "get_text_file_contents",
                "Read line ranges from text files. Returns the exact text of each range \
                 (terminators included) plus a whole-file hash and per-range hashes needed \
                 for subsequent edits. Line numbers are 1-based and inclusive; omit \
                 line_end to read to end of file.",
            ),
            tool_def::<PatchTextFileArgs>(
                "patch_text_file_contents",
                "Apply one or more patches to a text file. Requires the current file_hash \
                 and, per replaced range, its range_hash (both from get_text_file_contents). \
                 Patches must not overlap; line_end = line_start - 1 expresses a pure \
                 insertion; empty contents delete the range. All patches apply atomically \
                 or not at all.",
            ),
            tool_def::<CreateTextFileArgs>(
                "create_text_file",
                "Create a new text file. Refuses to overwrite an existing file; missing \
                 parent directories are created.",
            ),
            tool_def::<AppendTextFileArgs>(
                "append_text_file_contents",
                "Append content to the end of a text file. Requires the current file_hash; \
                 pass an empty file_hash to create a missing file.",
            ),
            tool_def::<AppendFromPathArgs>(
                "append_text_file_from_path",
                "Append the content of one text file to another without round-tripping it \
                 through the client. Requires the target's current file_hash.",
            ),
            tool_def::<DeleteTextFileArgs>(
                "delete_text_file_contents",
                "Delete line ranges from a text file. Requires the current file_hash and a \
                 range_hash per range; ranges must not overlap.",
            ),
            tool_def::<InsertTextFileArgs>(
                "insert_text_file_contents",
                "Insert content before or after a specific line. Provide exactly one of \
                 'after' or 'before'; requires the current file_hash.",
            ),
            tool_def::<ExploreDirectoryArgs>(
                "explore_directory_contents",
                "List a directory, optionally recursing into subdirectories, with a \
                 content hash per text file.",
            ),
            tool_def::<PeekTextFileArgs>(
                "peek_text_file_contents",
                "Read the first lines of one or more text files, with file hashes for \
                 follow-up edits.",
            ),
        ]
    }

    async fn dispatch(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, EditorError> {
        match name {
            "get_text_file_contents" => {
                let args: GetTextFileContentsArgs = parse_args(args)?;
                let out = self.tools.get_text_file_contents(args.files).await;
                Ok(serde_json::to_value(out)?)
            }
            "patch_text_file_contents" => {
                let args: PatchTextFileArgs = parse_args(args)?;
                let out = self
                    .tools
                    .patch_text_file_contents(
                        &args.file_path,
                        &args.file_hash,
                        args.patches,
                        args.encoding.as_deref(),
                    )
                    .await?;
                Ok(serde_json::to_value(out)?)
            }
            "create_text_file" => {
                let args: CreateTextFileArgs = parse_args(args)?;
                let out = self
                    .tools
                    .create_text_file(&args.file_path, &args.contents, args.encoding.as_deref())
                    .await?;
                Ok(serde_json::to_value(out)?)
            }
            "append_text_file_contents" => {
                let args: AppendTextFileArgs = parse_args(args)?;
                let out = self
                    .tools
                    .append_text_file_contents(
                        &args.file_path,
                        &args.file_hash,
                        &args.contents,
                        args.encoding.as_deref(),
                    )
                    .await?;
                Ok(serde_json::to_value(out)?)
            }
            "append_text_file_from_path" => {
                let args: AppendFromPathArgs = parse_args(args)?;
                let out = self
                    .tools
                    .append_text_file_from_path(
                        &args.source_file_path,
                        &args.target_file_path,
                        &args.target_file_hash,
                        args.encoding.as_deref(),
                    )
                    .await?;
                Ok(serde_json::to_value(out)?)
            }
            "delete_text_file_contents" => {
                let args: DeleteTextFileArgs = parse_args(args)?;
                let out = self
                    .tools
                    .delete_text_file_contents(
                        &args.file_path,
                        &args.file_hash,
                        args.ranges,
                        args.encoding.as_deref(),
                    )
                    .await?;
                Ok(serde_json::to_value(out)?)
            }
            "insert_text_file_contents" => {
                let args: InsertTextFileArgs = parse_args(args)?;
                let out = self
                    .tools
                    .insert_text_file_contents(
                        &args.file_path,
                        &args.file_hash,
                        &args.contents,
                        args.after,
                        args.before,
                        args.encoding.as_deref(),
                    )
                    .await?;
                Ok(serde_json::to_value(out)?)
            }
            "explore_directory_contents" => {
                let args: ExploreDirectoryArgs = parse_args(args)?;
                let out = self
                    .tools
                    .explore_directory_contents(
                        &args.directory_path,
                        args.include_subdirectories.unwrap_or(true),
                        args.include_file_hashes.unwrap_or(true),
                        args.encoding.as_deref(),
                    )
                    .await?;
                Ok(serde_json::to_value(out)?)
            }
            "peek_text_file_contents" => {
                let args: PeekTextFileArgs = parse_args(args)?;
                let out = self
                    .tools
                    .peek_text_file_contents(
                        &args.file_paths,
                        args.num_lines.unwrap_or(browse::DEFAULT_PEEK_LINES),
                        args.encoding.as_deref(),
                    )
                    .await;
                Ok(serde_json::to_value(out)?)
            }
            other => Err(EditorError::InvalidRequest(format!(
                "unknown tool: {other}"
            ))),
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(args: serde_json::Value) -> Result<T, EditorError> {
    serde_json::from_value(args)
        .map_err(|e| EditorError::InvalidRequest(format!("invalid arguments: {e}")))
}

fn tool_def<T: JsonSchema>(name: &'static str, description: &'static str) -> m::Tool {
    let schema = schemars::schema_for!(T);
    let schema_json =
        serde_json::to_value(&schema).unwrap_or_else(|_| serde_json::json!({"type": "object"}));
    m::Tool {
        name: name.into(),
        title: name.to_string().into(),
        description: Some(description.into()),
        input_schema: Arc::new(schema_json.as_object().cloned().unwrap_or_default()),
        annotations: None,
        output_schema: None,
        icons: None,
    }
}

// Allow manual_async_fn because the trait signature uses `impl Future` return types
#[allow(clippy::manual_async_fn)]
impl ServerHandler for TextEditorServer {
    fn initialize(
        &self,
        _params: m::InitializeRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::InitializeResult, m::ErrorData>> + Send + '_
    {
        async move {
            Ok(m::InitializeResult {
                server_info: m::Implementation {
                    name: env!("CARGO_PKG_NAME").to_string(),
                    title: env!("CARGO_PKG_NAME").to_string().into(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    website_url: None,
                    icons: None,
                },
                capabilities: m::ServerCapabilities::builder()
                    .enable_tools()
                    .enable_resources()
                    .build(),
                ..Default::default()
            })
        }
    }

    fn list_tools(
        &self,
        _req: Option<m::PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ListToolsResult, m::ErrorData>> + Send + '_
    {
        async move {
            let tools = self
                .tool_definitions()
                .into_iter()
                .filter(|t| self.is_allowed(&t.name))
                .collect();
            Ok(m::ListToolsResult {
                tools,
                next_cursor: None,
            })
        }
    }

    fn call_tool(
        &self,
        req: m::CallToolRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::CallToolResult, m::ErrorData>> + Send + '_
    {
        async move {
            if !self.is_allowed(&req.name) {
                return Ok(m::CallToolResult::error(vec![m::Content::text(format!(
                    "Tool '{}' not enabled on this server",
                    req.name
                ))]));
            }

            tracing::info!(tool = %req.name, "tool call");
            let args = serde_json::Value::Object(req.arguments.unwrap_or_default());
            match self.dispatch(&req.name, args).await {
                Ok(value) => {
                    let text = serde_json::to_string_pretty(&value)
                        .unwrap_or_else(|_| value.to_string());
                    Ok(m::CallToolResult {
                        content: vec![m::Content::text(text)],
                        structured_content: None,
                        is_error: Some(false),
                        meta: None,
                    })
                }
                Err(e) => {
                    let resp = e.to_response();
                    let text = serde_json::to_string_pretty(&resp)
                        .unwrap_or_else(|_| resp.reason.clone());
                    Ok(m::CallToolResult::error(vec![m::Content::text(text)]))
                }
            }
        }
    }

    fn read_resource(
        &self,
        req: m::ReadResourceRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ReadResourceResult, m::ErrorData>> + Send + '_
    {
        async move {
            let parsed = resource::parse_uri(&req.uri)
                .map_err(|e| m::ErrorData::invalid_request(e.to_string(), None))?;
            let read = self
                .tools
                .read_range(
                    &parsed.file_path,
                    parsed.line_start,
                    parsed.line_end,
                    None,
                )
                .await
                .map_err(|e| m::ErrorData::invalid_request(e.to_string(), None))?;
            Ok(m::ReadResourceResult {
                contents: vec![m::ResourceContents::TextResourceContents {
                    uri: req.uri.clone(),
                    mime_type: Some("text/plain".to_string()),
                    text: read.content,
                    meta: None,
                }],
            })
        }
    }

    fn ping(
        &self,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<(), m::ErrorData>> + Send + '_ {
        async { Ok(()) }
    }

    fn complete(
        &self,
        _req: m::CompleteRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::CompleteResult, m::ErrorData>> + Send + '_
    {
        async {
            Err(m::ErrorData::invalid_request(
                "Method not implemented",
                None,
            ))
        }
    }

    fn set_level(
        &self,
        _req: m::SetLevelRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<(), m::ErrorData>> + Send + '_ {
        async { Ok(()) }
    }

    fn get_prompt(
        &self,
        _req: m::GetPromptRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::GetPromptResult, m::ErrorData>> + Send + '_
    {
        async {
            Err(m::ErrorData::invalid_request(
                "Method not implemented",
                None,
            ))
        }
    }

    fn list_prompts(
        &self,
        _req: Option<m::PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ListPromptsResult, m::ErrorData>> + Send + '_
    {
        async {
            Ok(m::ListPromptsResult {
                prompts: vec![],
                next_cursor: None,
            })
        }
    }

    fn list_resources(
        &self,
        _req: Option<m::PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ListResourcesResult, m::ErrorData>> + Send + '_
    {
        async {
            Ok(m::ListResourcesResult {
                resources: vec![],
                next_cursor: None,
            })
        }
    }

    fn list_resource_templates(
        &self,
        _req: Option<m::PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ListResourceTemplatesResult, m::ErrorData>>
    + Send
    + '_ {
        async {
            Ok(m::ListResourceTemplatesResult {
                resource_templates: vec![],
                next_cursor: None,
            })
        }
    }

    fn subscribe(
        &self,
        _req: m::SubscribeRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<(), m::ErrorData>> + Send + '_ {
        async {
            Err(m::ErrorData::invalid_request(
                "Method not implemented",
                None,
            ))
        }
    }

    fn unsubscribe(
        &self,
        _req: m::UnsubscribeRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<(), m::ErrorData>> + Send + '_ {
        async {
            Err(m::ErrorData::invalid_request(
                "Method not implemented",
                None,
            ))
        }
    }
}
