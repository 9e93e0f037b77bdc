//! scadbox MCP Server
//!
//! An MCP server that exposes sandboxed project-file operations and a static
//! OpenSCAD reference as tools, so an AI agent can author `.scad` models
//! inside one project directory.

pub mod reference;
mod render;

use std::path::Path;
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    model::*,
    schemars::{self, JsonSchema},
    service::{RequestContext, RoleServer},
};
use scadbox::ProjectFiles;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

/// Parameters for `list_files`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListFilesParams {
    /// Only list files with this extension, e.g. "scad". Lists everything when empty.
    #[serde(default)]
    pub file_extension: Option<String>,
}

/// Parameters for `read_file`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadFileParams {
    /// Path of the file, relative to the project root.
    pub filename: String,
}

/// Parameters for `write_file`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WriteFileParams {
    /// Path of the file, relative to the project root.
    /// Missing parent directories are created.
    pub filename: String,

    /// Full content of the file.
    #[serde(default)]
    pub content: String,

    /// Replace the file if it already exists (default: false).
    #[serde(default, deserialize_with = "flag")]
    #[schemars(with = "bool")]
    pub overwrite: bool,
}

/// Parameters for `append_to_file`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AppendParams {
    /// Path of an existing file, relative to the project root.
    pub filename: String,

    /// Text added at the end of the file, verbatim.
    pub content: String,
}

/// Parameters for `get_scad_reference`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceParams {
    /// Reference category, e.g. "primitives". Lists categories when empty.
    #[serde(default)]
    pub category: String,
}

/// Parameters for `scad_quick_help`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct QuickHelpParams {
    /// Topic, e.g. "cube". Lists topics when empty.
    #[serde(default)]
    pub topic: String,
}

/// Tools that take no arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Accept `true`/`false` as booleans or as strings.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected true or false, got '{other}'"
            ))),
        },
    }
}

/// MCP Server that provides project file access and OpenSCAD reference tools
#[derive(Clone)]
pub struct ScadServer {
    files: Arc<ProjectFiles>,
}

impl std::fmt::Debug for ScadServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScadServer")
            .field("root", &self.files.root())
            .finish_non_exhaustive()
    }
}

impl ScadServer {
    /// Create a server confined to the given project root.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, scadbox::FsError> {
        Ok(Self::from_files(Arc::new(ProjectFiles::new(root)?)))
    }

    /// Create a server over an existing project handle.
    pub fn from_files(files: Arc<ProjectFiles>) -> Self {
        Self { files }
    }

    /// The canonical project root.
    pub fn root(&self) -> &Path {
        self.files.root()
    }

    /// Route a tool call by name.
    ///
    /// File-layer failures come back as tool results with `is_error` set;
    /// unknown tools and malformed arguments are protocol errors.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = %name, "tool call");
        match name {
            "list_files" => {
                let params: ListFilesParams = parse(arguments)?;
                let filter = params.file_extension.filter(|ext| !ext.trim().is_empty());
                let shown = filter.clone();
                self.file_op(move |files| {
                    let entries = files.list_files(filter.as_deref())?;
                    Ok(render::listing(&entries, shown.as_deref()))
                })
                .await
            }
            "read_file" => {
                let params: ReadFileParams = parse(arguments)?;
                self.file_op(move |files| {
                    let content = files.read_file(&params.filename)?;
                    Ok(render::file_content(&params.filename, &content))
                })
                .await
            }
            "write_file" => {
                let params: WriteFileParams = parse(arguments)?;
                self.file_op(move |files| {
                    let outcome =
                        files.write_file(&params.filename, &params.content, params.overwrite)?;
                    Ok(render::written(&params.filename, &outcome))
                })
                .await
            }
            "append_to_file" => {
                let params: AppendParams = parse(arguments)?;
                self.file_op(move |files| {
                    let outcome = files.append_to_file(&params.filename, &params.content)?;
                    Ok(render::appended(&params.filename, &outcome))
                })
                .await
            }
            "get_scad_syntax" => {
                let _: NoParams = parse(arguments)?;
                Ok(text_result(reference::syntax().to_string()))
            }
            "get_scad_reference" => {
                let params: ReferenceParams = parse(arguments)?;
                Ok(lookup_result(reference::reference(&params.category)))
            }
            "scad_quick_help" => {
                let params: QuickHelpParams = parse(arguments)?;
                Ok(lookup_result(reference::quick_help(&params.topic)))
            }
            _ => Err(McpError::invalid_params(
                format!("Unknown tool: {}", name),
                None,
            )),
        }
    }

    /// Run a file operation on the blocking pool and render its outcome.
    async fn file_op<F>(&self, op: F) -> Result<CallToolResult, McpError>
    where
        F: FnOnce(&ProjectFiles) -> scadbox::Result<String> + Send + 'static,
    {
        let files = Arc::clone(&self.files);
        let result = tokio::task::spawn_blocking(move || op(&files))
            .await
            .map_err(|e| McpError::internal_error(format!("file operation failed: {}", e), None))?;

        Ok(match result {
            Ok(text) => text_result(text),
            Err(e) => {
                tracing::warn!(kind = %e.kind(), error = %e, "file operation rejected");
                CallToolResult::error(vec![Content::text(format!("{}: {}", e.kind(), e))])
            }
        })
    }

    fn tools(&self) -> Vec<Tool> {
        vec![
            tool::<ListFilesParams>(
                "list_files",
                "List Project Files",
                "List the files in the project directory (not recursive). Pass file_extension \
                 (e.g. \"scad\") to only list files with that extension. OpenSCAD files are \
                 listed first; directories end with '/'.",
            ),
            tool::<ReadFileParams>(
                "read_file",
                "Read File",
                "Read a text file from the project directory. The filename is relative to the \
                 project root and cannot point outside it.",
            ),
            tool::<WriteFileParams>(
                "write_file",
                "Write File",
                "Create a file in the project directory with the given content. Fails if the \
                 file already exists unless overwrite is true; replacement is atomic.",
            ),
            tool::<AppendParams>(
                "append_to_file",
                "Append To File",
                "Append content to the end of an existing file in the project directory. \
                 Content is added verbatim; include a leading newline if needed. Fails if the \
                 file does not exist.",
            ),
            tool::<NoParams>(
                "get_scad_syntax",
                "OpenSCAD Syntax",
                "Return the OpenSCAD language syntax rules and flow-control forms.",
            ),
            tool::<ReferenceParams>(
                "get_scad_reference",
                "OpenSCAD Reference",
                "Return the OpenSCAD reference for a category (syntax, primitives, operations, \
                 variables, bestpractices, 3d, 2d, transformations, boolean, extrusions). Lists \
                 categories when called without one.",
            ),
            tool::<QuickHelpParams>(
                "scad_quick_help",
                "OpenSCAD Quick Help",
                "Return a one-line usage and example for a common OpenSCAD function or topic. \
                 Lists topics when called without one.",
            ),
        ]
    }
}

fn parse<P: DeserializeOwned>(arguments: Option<JsonObject>) -> Result<P, McpError> {
    serde_json::from_value(serde_json::Value::Object(arguments.unwrap_or_default()))
        .map_err(|e| McpError::invalid_params(format!("Invalid parameters: {}", e), None))
}

fn text_result(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

fn lookup_result(result: Result<String, reference::ReferenceError>) -> CallToolResult {
    match result {
        Ok(text) => text_result(text),
        Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
    }
}

fn tool<P: JsonSchema>(name: &'static str, title: &'static str, description: &'static str) -> Tool {
    let schema = schemars::schema_for!(P);
    let schema_json = serde_json::to_value(schema).unwrap_or_default();
    let input_schema = match schema_json {
        serde_json::Value::Object(map) => Arc::new(map),
        _ => Arc::new(serde_json::Map::new()),
    };

    Tool {
        name: name.into(),
        title: Some(title.into()),
        description: Some(description.into()),
        input_schema,
        output_schema: None,
        annotations: None,
        icons: None,
        meta: None,
    }
}

impl ServerHandler for ScadServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "scadbox gives access to the OpenSCAD project at {}. Use list_files, read_file, \
                 write_file and append_to_file to work on files inside that directory; paths \
                 are relative to it and cannot leave it. write_file never replaces an existing \
                 file unless overwrite is true. get_scad_syntax, get_scad_reference and \
                 scad_quick_help return OpenSCAD documentation.",
                self.root().display()
            )),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tools(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(request.name.as_ref(), request.arguments).await
    }
}
