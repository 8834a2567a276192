//! Simulated image classifier
//!
//! Stands in for a real model: waits the configured latency, then derives
//! the category from the image digest.

use std::time::Duration;

use crate::domain::classifier::{ImageClassifier, category_for_digest};
use crate::domain::report::IssueCategory;
use crate::error::{PortalError, PortalResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedClassifier {
    latency: Duration,
}

impl SimulatedClassifier {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl ImageClassifier for SimulatedClassifier {
    async fn classify(&self, image: &[u8]) -> PortalResult<IssueCategory> {
        if image.is_empty() {
            return Err(PortalError::InvalidImage("empty image".to_string()));
        }
        tokio::time::sleep(self.latency).await;
        let category = category_for_digest(image);
        tracing::debug!(bytes = image.len(), category = %category, "Image classified");
        Ok(category)
    }
}
