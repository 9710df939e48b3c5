//! Merchant support tickets

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::domain::{NewSupportTicket, Principal, SupportTicket, SupportTicketInput, TicketStatus};
use crate::error::DomainError;
use crate::repositories::SupportRepository;

pub struct SupportService {
    tickets: Arc<dyn SupportRepository>,
}

impl SupportService {
    pub fn new(tickets: Arc<dyn SupportRepository>) -> Self {
        Self { tickets }
    }

    /// Open a ticket for the caller's tenant
    pub async fn create(
        &self,
        principal: &Principal,
        input: SupportTicketInput,
    ) -> Result<SupportTicket, DomainError> {
        input.validate()?;
        let tenant_id = principal.tenant_id.ok_or(DomainError::TenantRequired)?;

        let ticket = self
            .tickets
            .create(&NewSupportTicket {
                tenant_id,
                user_id: Some(principal.user_id),
                subject: input.subject.trim().to_string(),
                description: input.description,
            })
            .await?;
        info!("Support ticket {} opened by user {}", ticket.id, principal.user_id);
        Ok(ticket)
    }

    pub async fn list(&self) -> Result<Vec<SupportTicket>, DomainError> {
        self.tickets.list_all().await
    }

    pub async fn set_status(&self, id: i64, status: &str) -> Result<SupportTicket, DomainError> {
        let status = TicketStatus::parse_transition(status)?;
        self.tickets
            .set_status(id, status)
            .await?
            .ok_or_else(|| DomainError::not_found("Support ticket", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockSupportRepository;
    use chrono::Utc;

    fn ticket(id: i64, status: TicketStatus) -> SupportTicket {
        SupportTicket {
            id,
            tenant_id: 2,
            user_id: Some(9),
            subject: "Cannot print".to_string(),
            description: "PDF is blank".to_string(),
            status,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_ticket_uses_callers_tenant() {
        let mut repo = MockSupportRepository::new();
        repo.expect_create()
            .withf(|t: &NewSupportTicket| t.tenant_id == 2 && t.user_id == Some(9))
            .returning(|_| Ok(ticket(1, TicketStatus::Open)));

        let principal = Principal {
            user_id: 9,
            role: "admin".to_string(),
            tenant_id: Some(2),
            is_superuser: false,
        };
        let input = SupportTicketInput {
            subject: "Cannot print".to_string(),
            description: "PDF is blank".to_string(),
        };
        let created = SupportService::new(Arc::new(repo)).create(&principal, input).await.unwrap();
        assert_eq!(created.status, TicketStatus::Open);
    }

    #[tokio::test]
    async fn test_reopen_is_rejected() {
        let mut repo = MockSupportRepository::new();
        repo.expect_set_status().never();

        let err = SupportService::new(Arc::new(repo)).set_status(1, "open").await.unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Invalid status");
    }

    #[tokio::test]
    async fn test_resolve_unknown_ticket() {
        let mut repo = MockSupportRepository::new();
        repo.expect_set_status().returning(|_, _| Ok(None));

        let err = SupportService::new(Arc::new(repo)).set_status(5, "resolved").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
