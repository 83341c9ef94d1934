use async_trait::async_trait;
use compliance_rule_core::configuration_item::HistoryConfigurationItem;
use compliance_rule_core::contract::{HistoryLookup, PutEvaluationsRequest, PutEvaluationsResponse};
use compliance_rule_core::error::ServiceError;

pub const LOOKUP_HISTORY_OPERATION: &str = "GetResourceConfigHistory";
pub const SUBMIT_EVALUATIONS_OPERATION: &str = "PutEvaluations";

/// Compliance service calls made by the evaluation pipeline.
///
/// Implementations must be reentrant: one instance is shared by every
/// invocation handled in the same execution environment.
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Returns configuration items for the resource, most recent first.
    async fn lookup_history(
        &self,
        lookup: &HistoryLookup,
    ) -> Result<Vec<HistoryConfigurationItem>, ServiceError>;

    async fn submit_evaluations(
        &self,
        request: &PutEvaluationsRequest,
    ) -> Result<PutEvaluationsResponse, ServiceError>;
}
