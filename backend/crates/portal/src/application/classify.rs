//! Classify Image Use Case
//!
//! Decodes an uploaded photo and asks the classifier for its category.

use platform::crypto::decode_base64_payload;
use std::sync::Arc;

use crate::domain::classifier::ImageClassifier;
use crate::domain::report::IssueCategory;
use crate::error::{PortalError, PortalResult};

/// Largest accepted photo after decoding
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Progress steps reported for the simulated upload
pub const UPLOAD_PROGRESS_STEP: u8 = 10;

#[derive(Debug, Clone)]
pub struct ClassifyOutput {
    pub category: IssueCategory,
    pub size_bytes: usize,
    /// Upload progress percentages, ending at 100
    pub progress: Vec<u8>,
}

pub struct ClassifyImageUseCase<C>
where
    C: ImageClassifier,
{
    classifier: Arc<C>,
}

impl<C> ClassifyImageUseCase<C>
where
    C: ImageClassifier,
{
    pub fn new(classifier: Arc<C>) -> Self {
        Self { classifier }
    }

    /// `image` is base64, optionally as a `data:` URL
    pub async fn execute(&self, image: &str) -> PortalResult<ClassifyOutput> {
        let bytes = decode_image(image)?;
        let category = self.classifier.classify(&bytes).await?;

        Ok(ClassifyOutput {
            category,
            size_bytes: bytes.len(),
            progress: (0..=100).step_by(usize::from(UPLOAD_PROGRESS_STEP)).collect(),
        })
    }
}

fn decode_image(image: &str) -> PortalResult<Vec<u8>> {
    let bytes =
        decode_base64_payload(image).map_err(|e| PortalError::InvalidImage(e.to_string()))?;
    if bytes.is_empty() {
        return Err(PortalError::InvalidImage("empty image".to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(PortalError::InvalidImage(format!(
            "image larger than {} MiB",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::SimulatedClassifier;

    fn use_case() -> ClassifyImageUseCase<SimulatedClassifier> {
        ClassifyImageUseCase::new(Arc::new(SimulatedClassifier::default()))
    }

    #[tokio::test]
    async fn test_classifies_data_url() {
        // "hello"
        let output = use_case()
            .execute("data:image/png;base64,aGVsbG8=")
            .await
            .unwrap();

        assert_eq!(output.category, IssueCategory::BrokenStreetLight);
        assert_eq!(output.size_bytes, 5);
        assert_eq!(output.progress.first(), Some(&0));
        assert_eq!(output.progress.last(), Some(&100));
        assert_eq!(output.progress.len(), 11);
    }

    #[tokio::test]
    async fn test_rejects_garbage() {
        let result = use_case().execute("%%% not base64 %%%").await;
        assert!(matches!(result, Err(PortalError::InvalidImage(_))));

        let result = use_case().execute("").await;
        assert!(matches!(result, Err(PortalError::InvalidImage(_))));
    }
}
