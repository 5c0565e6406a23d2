//! API server state

use std::sync::Arc;

use crate::model::Classifier;

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// The classifier answering /predict
    pub classifier: Arc<Classifier>,

    /// Instance name reported by /health and startup logs
    pub instance: String,
}

impl AppState {
    pub fn new(classifier: Arc<Classifier>, instance: impl Into<String>) -> Self {
        Self {
            classifier,
            instance: instance.into(),
        }
    }

    /// Whether a trained model is serving predictions (as opposed to the
    /// placeholder stub).
    pub fn is_trained(&self) -> bool {
        self.classifier.is_trained()
    }
}
