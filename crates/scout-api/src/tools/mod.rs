//! Tools the server binds to the model

mod query_db;
mod visualization;

pub use query_db::QueryDb;
pub use visualization::GenerateVisualization;

use scout_graph::ToolRegistry;
use std::sync::Arc;

/// Chart tool always; `query_db` when a data source is configured
pub fn default_registry(data_source: Option<QueryDb>) -> ToolRegistry {
    let registry = ToolRegistry::new().register(Arc::new(GenerateVisualization));
    match data_source {
        Some(query_db) => registry.register(Arc::new(query_db)),
        None => registry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_registry() {
        assert_eq!(default_registry(None).names(), vec!["generate_visualization"]);

        let query_db = QueryDb::new("http://localhost:54321", None, 10, Duration::from_secs(5)).unwrap();
        assert_eq!(
            default_registry(Some(query_db)).names(),
            vec!["generate_visualization", "query_db"]
        );
    }
}
