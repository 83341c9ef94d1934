#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use compliance_rule_core::configuration_item::HistoryConfigurationItem;
use compliance_rule_core::contract::{HistoryLookup, PutEvaluationsRequest, PutEvaluationsResponse};
use compliance_rule_core::error::ServiceError;
use compliance_rule_lambda::adapters::config_service::ConfigService;

/// In-memory compliance service with scripted responses and captured calls.
pub struct RecordingConfigService {
    history: Result<Vec<HistoryConfigurationItem>, ServiceError>,
    acknowledgment: Result<PutEvaluationsResponse, ServiceError>,
    lookups: Mutex<Vec<HistoryLookup>>,
    submissions: Mutex<Vec<PutEvaluationsRequest>>,
}

impl Default for RecordingConfigService {
    fn default() -> Self {
        Self {
            history: Ok(Vec::new()),
            acknowledgment: Ok(PutEvaluationsResponse::default()),
            lookups: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(
        mut self,
        history: Result<Vec<HistoryConfigurationItem>, ServiceError>,
    ) -> Self {
        self.history = history;
        self
    }

    pub fn with_acknowledgment(
        mut self,
        acknowledgment: Result<PutEvaluationsResponse, ServiceError>,
    ) -> Self {
        self.acknowledgment = acknowledgment;
        self
    }

    pub fn lookups(&self) -> Vec<HistoryLookup> {
        self.lookups.lock().expect("poisoned mutex").clone()
    }

    pub fn submissions(&self) -> Vec<PutEvaluationsRequest> {
        self.submissions.lock().expect("poisoned mutex").clone()
    }
}

#[async_trait]
impl ConfigService for RecordingConfigService {
    async fn lookup_history(
        &self,
        lookup: &HistoryLookup,
    ) -> Result<Vec<HistoryConfigurationItem>, ServiceError> {
        self.lookups
            .lock()
            .expect("poisoned mutex")
            .push(lookup.clone());
        self.history.clone()
    }

    async fn submit_evaluations(
        &self,
        request: &PutEvaluationsRequest,
    ) -> Result<PutEvaluationsResponse, ServiceError> {
        self.submissions
            .lock()
            .expect("poisoned mutex")
            .push(request.clone());
        self.acknowledgment.clone()
    }
}
