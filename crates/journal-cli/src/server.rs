use std::sync::Arc;

use journal_core::{
    DEFAULT_LIST_LIMIT, DEFAULT_READ_ENTRIES, DEFAULT_TOC_DEPTH, SearchParams,
};
use journal_store::{JournalService, StoreError};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::render;

#[derive(Clone)]
pub struct JournalServer {
    service: Arc<Mutex<JournalService>>,
    /// Fallbacks for search arguments the client leaves out.
    search_defaults: SearchParams,
    tool_router: ToolRouter<Self>,
}

impl JournalServer {
    pub fn new(service: JournalService, search_defaults: SearchParams) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
            search_defaults,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_mcp_error(e: StoreError) -> McpError {
    match e {
        StoreError::InvalidPath(_) => McpError::invalid_params(e.to_string(), None),
        other => {
            tracing::error!("journal operation failed: {other}");
            McpError::internal_error(other.to_string(), None)
        }
    }
}

fn text(body: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(body)]))
}

fn default_read_entries() -> usize {
    DEFAULT_READ_ENTRIES
}

fn default_toc_depth() -> usize {
    DEFAULT_TOC_DEPTH
}

fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

// --- Tool parameter types ---

#[derive(Debug, Deserialize, JsonSchema)]
struct ReadRequest {
    /// Journal section path (e.g., 'project-alpha' or 'project-alpha/api-design')
    path: String,
    /// Whether to include recent entries in the response
    #[serde(default)]
    include_entries: bool,
    /// Maximum number of recent entries to include
    #[serde(default = "default_read_entries")]
    max_entries: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct WriteRequest {
    /// Journal section path
    path: String,
    /// Journal entry content describing what has changed/been learned
    entry: String,
    /// The broader kind of work being done
    work_context: String,
    /// Optional: Updated overview/synthesis (only when entry represents shift in understanding)
    overview: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchRequest {
    /// The broader kind of work being done
    work_context: String,
    /// Specific content being sought
    content: String,
    /// Minimum relevance score for results (default 0.5)
    salience_threshold: Option<f64>,
    /// Maximum number of results to return (default 10)
    max_results: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct TocRequest {
    /// Optional: Root path to start from (default: show all sections)
    path: Option<String>,
    /// Maximum depth to show in the tree
    #[serde(default = "default_toc_depth")]
    max_depth: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ListEntriesRequest {
    /// Journal section path
    path: String,
    /// Maximum number of entries to return
    #[serde(default = "default_list_limit")]
    limit: usize,
    /// Number of most recent entries to skip
    #[serde(default)]
    offset: usize,
}

#[tool_router]
impl JournalServer {
    #[tool(description = "Read a journal section overview or list entries")]
    async fn journal_read(
        &self,
        Parameters(req): Parameters<ReadRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut service = self.service.lock().await;
        let view = service
            .read(&req.path, req.include_entries, req.max_entries)
            .map_err(to_mcp_error)?;
        text(match view {
            Some(view) => render::section(&view),
            None => render::not_found(&req.path),
        })
    }

    #[tool(
        description = "Write to a journal section (add entry and optionally update overview)"
    )]
    async fn journal_write(
        &self,
        Parameters(req): Parameters<WriteRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut service = self.service.lock().await;
        let outcome = service
            .write(&req.path, &req.entry, &req.work_context, req.overview.as_deref())
            .map_err(to_mcp_error)?;
        text(render::write_outcome(&outcome))
    }

    #[tool(description = "Search journal entries by work context and content")]
    async fn journal_search(
        &self,
        Parameters(req): Parameters<SearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let params = SearchParams {
            salience_threshold: req
                .salience_threshold
                .unwrap_or(self.search_defaults.salience_threshold),
            max_results: req.max_results.unwrap_or(self.search_defaults.max_results),
        };
        if !params.salience_threshold.is_finite() {
            return Err(McpError::invalid_params(
                "salience_threshold must be a finite number",
                None,
            ));
        }

        let mut service = self.service.lock().await;
        let results = service
            .search(&req.work_context, &req.content, &params)
            .map_err(to_mcp_error)?;
        text(render::search_results(&results))
    }

    #[tool(description = "Get table of contents showing journal structure")]
    async fn journal_toc(
        &self,
        Parameters(req): Parameters<TocRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut service = self.service.lock().await;
        let nodes = service
            .toc(req.path.as_deref(), req.max_depth)
            .map_err(to_mcp_error)?;
        text(match nodes {
            Some(nodes) => render::toc(&nodes),
            None => render::not_found(req.path.as_deref().unwrap_or_default()),
        })
    }

    #[tool(description = "List recent entries from a journal section")]
    async fn journal_list_entries(
        &self,
        Parameters(req): Parameters<ListEntriesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut service = self.service.lock().await;
        let page = service
            .list_entries(&req.path, req.limit, req.offset)
            .map_err(to_mcp_error)?;
        text(match page {
            Some(page) => render::entry_page(&req.path, &page),
            None => render::not_found(&req.path),
        })
    }
}

#[tool_handler]
impl ServerHandler for JournalServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "A hierarchical journal of evolving understanding. Sections are addressed by \
                 slash-delimited paths (e.g. 'project-alpha/api-design') and are created on \
                 first write.\n\n\
                 - journal_write: append an entry describing what changed or was learned, tagged \
                   with the broader work context. Pass an overview only when understanding shifts.\n\
                 - journal_read / journal_list_entries: read a section's overview and recent entries.\n\
                 - journal_search: find entries by work context and content; recent entries rank higher.\n\
                 - journal_toc: show the section tree with entry counts."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
