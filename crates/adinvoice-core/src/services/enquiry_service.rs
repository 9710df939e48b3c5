//! Public enquiries

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::domain::{Enquiry, EnquiryInput, EnquiryStatus};
use crate::error::DomainError;
use crate::repositories::EnquiryRepository;

pub struct EnquiryService {
    enquiries: Arc<dyn EnquiryRepository>,
}

impl EnquiryService {
    pub fn new(enquiries: Arc<dyn EnquiryRepository>) -> Self {
        Self { enquiries }
    }

    pub async fn create(&self, input: EnquiryInput) -> Result<Enquiry, DomainError> {
        input.validate()?;
        let enquiry = self.enquiries.create(&input).await?;
        info!("Enquiry {} received", enquiry.id);
        Ok(enquiry)
    }

    pub async fn list(&self) -> Result<Vec<Enquiry>, DomainError> {
        self.enquiries.list().await
    }

    pub async fn set_status(&self, id: i64, status: EnquiryStatus) -> Result<Enquiry, DomainError> {
        self.enquiries
            .set_status(id, status)
            .await?
            .ok_or_else(|| DomainError::not_found("Enquiry", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockEnquiryRepository;

    #[tokio::test]
    async fn test_invalid_enquiry_not_stored() {
        let mut repo = MockEnquiryRepository::new();
        repo.expect_create().never();

        let input = EnquiryInput {
            name: "Meera".to_string(),
            email: "meera".to_string(),
            mobile: "9876543210".to_string(),
            subject: "Pricing".to_string(),
            message: "Hello".to_string(),
        };
        let err = EnquiryService::new(Arc::new(repo)).create(input).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_update_unknown_enquiry() {
        let mut repo = MockEnquiryRepository::new();
        repo.expect_set_status().returning(|_, _| Ok(None));

        let err = EnquiryService::new(Arc::new(repo))
            .set_status(3, EnquiryStatus::Resolved)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Enquiry", .. }));
    }
}
