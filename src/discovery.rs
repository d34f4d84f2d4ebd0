//! Static service descriptor served at the well-known discovery path.

use std::collections::HashMap;
use std::sync::OnceLock;

use jsonschema::Validator;
use serde::Serialize;
use serde_json::{json, Value};

/// Path an agent client fetches to learn which tools exist.
pub const WELL_KNOWN_PATH: &str = "/.well-known/mcp.json";

pub const SERVICE_NAME: &str = "Cupcake MCP";
pub const INSTRUCTIONS: &str = "Search cupcake orders";

pub const SEARCH_TOOL: &str = "search";
pub const FETCH_TOOL: &str = "fetch";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub version: String,
    pub instructions: String,
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(rename = "outputSchema")]
    pub output_schema: Value,
}

/// The descriptor for this process. Built on first use and never changed.
pub fn describe() -> &'static ServiceDescriptor {
    static DESCRIPTOR: OnceLock<ServiceDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(build_descriptor)
}

/// Look up a tool by name.
pub fn tool(name: &str) -> Option<&'static ToolDescriptor> {
    describe().tools.iter().find(|t| t.name == name)
}

/// Compiled `inputSchema` for a tool. All schemas are compiled on first use.
///
/// `None` for unknown tools, and for a tool whose schema failed to compile
/// (logged once).
pub fn input_validator(name: &str) -> Option<&'static Validator> {
    static VALIDATORS: OnceLock<HashMap<String, Validator>> = OnceLock::new();
    VALIDATORS
        .get_or_init(|| {
            describe()
                .tools
                .iter()
                .filter_map(|tool| match crate::schema::compile(&tool.input_schema) {
                    Ok(validator) => Some((tool.name.clone(), validator)),
                    Err(e) => {
                        tracing::error!(tool = %tool.name, "input schema does not compile: {e}");
                        None
                    }
                })
                .collect()
        })
        .get(name)
}

fn build_descriptor() -> ServiceDescriptor {
    ServiceDescriptor {
        name: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instructions: INSTRUCTIONS.to_string(),
        tools: vec![
            ToolDescriptor {
                name: SEARCH_TOOL.to_string(),
                description: "Keyword search over cupcake orders; returns ids of every record \
                              whose title, text or metadata contains any query word"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "required": ["query"],
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Whitespace-separated keywords, matched case-insensitively as substrings"
                        }
                    }
                }),
                output_schema: json!({
                    "type": "object",
                    "required": ["ids"],
                    "properties": {
                        "ids": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    }
                }),
            },
            ToolDescriptor {
                name: FETCH_TOOL.to_string(),
                description: "Fetch a full cupcake order record by id".to_string(),
                input_schema: json!({
                    "type": "object",
                    "required": ["id"],
                    "properties": {
                        "id": {
                            "type": "string",
                            "description": "Record id as returned by search"
                        }
                    }
                }),
                output_schema: json!({
                    "type": "object",
                    "required": ["id", "title", "text", "metadata"],
                    "properties": {
                        "id": { "type": "string" },
                        "title": { "type": "string" },
                        "text": { "type": "string" },
                        "metadata": {
                            "type": "object",
                            "additionalProperties": { "type": "string" }
                        }
                    }
                }),
            },
        ],
    }
}
