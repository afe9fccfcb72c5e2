//! JSON document frontend.

use schema_compare_core::SchemaGraph;
use tracing::{debug, info};

use super::SourceDescriptor;
use crate::error::{FrontendError, Result};
use crate::schema::DatabaseSchema;

/// Parses a schema document.
pub fn parse_document(contents: &str, origin: &str) -> Result<DatabaseSchema> {
    serde_json::from_str(contents).map_err(|e| FrontendError::extraction(origin, e))
}

/// Reads a JSON schema document and builds its (unvalidated) graph.
pub async fn load(descriptor: &SourceDescriptor) -> Result<SchemaGraph> {
    info!(source = %descriptor, "reading schema document");
    let contents = tokio::fs::read_to_string(descriptor.path()).await?;
    let document = parse_document(&contents, descriptor.as_str())?;
    let graph = document.to_graph(descriptor.as_str())?;
    debug!(
        tables = graph.table_count(),
        columns = graph.column_count(),
        foreign_keys = graph.foreign_keys().len(),
        "schema document loaded"
    );
    Ok(graph)
}
