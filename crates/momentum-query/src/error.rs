//! Error types for the query engine.

use momentum_core::error::MomentumError;

/// Errors from query execution.
///
/// The public [`execute`](crate::QueryExecutor::execute) surface converts
/// these into a summary envelope instead of propagating them, so callers
/// only see them through [`try_execute`](crate::QueryExecutor::try_execute).
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("comparison requires at least two entities of the same kind (found {0})")]
    ComparisonNeedsEntities(usize),
    #[error("execution error: {0}")]
    ExecutionError(String),
}

impl From<MomentumError> for QueryError {
    fn from(err: MomentumError) -> Self {
        QueryError::ExecutionError(err.to_string())
    }
}

impl From<QueryError> for MomentumError {
    fn from(err: QueryError) -> Self {
        MomentumError::Query(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_display() {
        let err = QueryError::ComparisonNeedsEntities(1);
        assert_eq!(
            err.to_string(),
            "comparison requires at least two entities of the same kind (found 1)"
        );

        let err = QueryError::ExecutionError("pipeline failed".to_string());
        assert_eq!(err.to_string(), "execution error: pipeline failed");
    }

    #[test]
    fn test_query_error_from_momentum_error() {
        let core_err = MomentumError::InvalidInput("bad moment".to_string());
        let query_err: QueryError = core_err.into();
        assert!(matches!(query_err, QueryError::ExecutionError(_)));
        assert!(query_err.to_string().contains("bad moment"));
    }

    #[test]
    fn test_momentum_error_from_query_error() {
        let query_err = QueryError::ComparisonNeedsEntities(0);
        let core_err: MomentumError = query_err.into();
        assert!(matches!(core_err, MomentumError::Query(_)));
        assert!(core_err.to_string().contains("at least two entities"));
    }

    #[test]
    fn test_query_error_comparison_boundary_values() {
        let err = QueryError::ComparisonNeedsEntities(0);
        assert!(err.to_string().contains("(found 0)"));

        let err = QueryError::ComparisonNeedsEntities(usize::MAX);
        assert!(err.to_string().contains(&usize::MAX.to_string()));
    }

    #[test]
    fn test_query_error_empty_inner_message() {
        let err = QueryError::ExecutionError(String::new());
        assert_eq!(err.to_string(), "execution error: ");
    }

    #[test]
    fn test_errors_implement_debug() {
        let err = QueryError::ComparisonNeedsEntities(2);
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("ComparisonNeedsEntities"));

        let err = QueryError::ExecutionError("x".to_string());
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("ExecutionError"));
    }
}
