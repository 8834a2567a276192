//! Submit Report Use Case
//!
//! Validates the report form, settles its category, and issues a receipt.
//! Reports are not stored.

use auth::models::IdentityId;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::classify::ClassifyImageUseCase;
use crate::application::config::PortalConfig;
use crate::domain::classifier::ImageClassifier;
use crate::domain::report::{IssueCategory, ReportDraft, ReportId};
use crate::error::{PortalError, PortalResult};

/// Submit report input
#[derive(Debug, Clone, Default)]
pub struct SubmitReportInput {
    pub draft: ReportDraft,
    /// Base64 photo
    pub image: Option<String>,
    /// Category returned by an earlier classify call
    pub ai_classification: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReportReceipt {
    pub id: ReportId,
    pub title: String,
    pub location: String,
    /// AI classification when present, otherwise the chosen category
    pub category: IssueCategory,
    pub ai_classification: Option<IssueCategory>,
    pub has_image: bool,
    pub submitted_at: DateTime<Utc>,
}

pub struct SubmitReportUseCase<C>
where
    C: ImageClassifier,
{
    classifier: Arc<C>,
    config: Arc<PortalConfig>,
}

impl<C> SubmitReportUseCase<C>
where
    C: ImageClassifier,
{
    pub fn new(classifier: Arc<C>, config: Arc<PortalConfig>) -> Self {
        Self { classifier, config }
    }

    pub async fn execute(
        &self,
        input: SubmitReportInput,
        submitted_by: &IdentityId,
    ) -> PortalResult<ReportReceipt> {
        let report = input.draft.validate()?;
        let image = input.image.filter(|i| !i.trim().is_empty());

        let ai_classification = match (input.ai_classification.as_deref(), &image) {
            (Some(code), _) if !code.trim().is_empty() => Some(code.parse::<IssueCategory>()?),
            (_, Some(image)) => {
                let classify = ClassifyImageUseCase::new(self.classifier.clone());
                Some(classify.execute(image).await?.category)
            }
            _ => None,
        };

        let category = ai_classification.or(report.category).ok_or_else(|| {
            PortalError::Validation("Select a category or upload a photo".to_string())
        })?;

        tokio::time::sleep(self.config.submission_latency).await;

        let receipt = ReportReceipt {
            id: ReportId::new(),
            title: report.title,
            location: report.location,
            category,
            ai_classification,
            has_image: image.is_some(),
            submitted_at: Utc::now(),
        };

        tracing::info!(
            report_id = %receipt.id,
            submitted_by = %submitted_by,
            category = %receipt.category,
            ai_classified = receipt.ai_classification.is_some(),
            "Report submitted"
        );

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::SimulatedClassifier;

    fn use_case() -> SubmitReportUseCase<SimulatedClassifier> {
        SubmitReportUseCase::new(
            Arc::new(SimulatedClassifier::default()),
            Arc::new(PortalConfig::instant()),
        )
    }

    fn input(category: Option<&str>) -> SubmitReportInput {
        SubmitReportInput {
            draft: ReportDraft {
                title: "Leaking hydrant".to_string(),
                description: "Water running down the street".to_string(),
                location: "Elm St 12".to_string(),
                category: category.map(str::to_string),
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_chosen_category_without_image() {
        let receipt = use_case()
            .execute(input(Some("water_leak")), &IdentityId::new())
            .await
            .unwrap();

        assert_eq!(receipt.category, IssueCategory::WaterLeak);
        assert_eq!(receipt.ai_classification, None);
        assert!(!receipt.has_image);
    }

    #[tokio::test]
    async fn test_ai_classification_wins() {
        let mut input = input(Some("other"));
        input.ai_classification = Some("Graffiti".to_string());

        let receipt = use_case().execute(input, &IdentityId::new()).await.unwrap();
        assert_eq!(receipt.category, IssueCategory::Graffiti);
    }

    #[tokio::test]
    async fn test_image_is_classified_when_no_ai_result() {
        let mut input = input(None);
        input.image = Some("aGVsbG8=".to_string());

        let receipt = use_case().execute(input, &IdentityId::new()).await.unwrap();
        assert_eq!(receipt.category, IssueCategory::BrokenStreetLight);
        assert!(receipt.has_image);
    }

    #[tokio::test]
    async fn test_requires_some_category() {
        let result = use_case().execute(input(None), &IdentityId::new()).await;
        assert!(matches!(result, Err(PortalError::Validation(_))));
    }

    #[tokio::test]
    async fn test_each_submission_gets_new_id() {
        let a = use_case()
            .execute(input(Some("garbage")), &IdentityId::new())
            .await
            .unwrap();
        let b = use_case()
            .execute(input(Some("garbage")), &IdentityId::new())
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }
}
