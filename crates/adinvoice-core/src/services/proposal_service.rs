// ============================================================================
// AdInvoice Core - Proposal Service
// File: crates/adinvoice-core/src/services/proposal_service.rs
// ============================================================================

use std::sync::Arc;

use adinvoice_shared::constants::PROPOSAL_NUMBER_PREFIX;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    document_number, Proposal, ProposalInput, ProposalItem, ProposalStats, ProposalStatus,
    ProposalSummary, TenantContext,
};
use crate::error::DomainError;
use crate::repositories::{ClientRepository, ProposalRepository};

pub struct ProposalService {
    proposals: Arc<dyn ProposalRepository>,
    clients: Arc<dyn ClientRepository>,
}

impl ProposalService {
    pub fn new(proposals: Arc<dyn ProposalRepository>, clients: Arc<dyn ClientRepository>) -> Self {
        Self { proposals, clients }
    }

    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: ProposalInput,
    ) -> Result<Proposal, DomainError> {
        input.validate()?;
        let date = input.date.unwrap_or_else(|| Utc::now().date_naive());
        let proposal = Proposal::from_input(
            ProposalInput { date: Some(date), ..input },
            document_number(PROPOSAL_NUMBER_PREFIX, date),
        )?;

        self.proposals.create(ctx, &proposal).await?;
        info!(
            "Proposal {} ({}) created in tenant {}",
            proposal.proposal_number, proposal.id, ctx.tenant_id
        );
        Ok(proposal)
    }

    pub async fn list(&self, ctx: &TenantContext) -> Result<Vec<ProposalSummary>, DomainError> {
        self.proposals.list(ctx).await
    }

    /// Proposals addressed to a client company, matched by name
    pub async fn list_for_client(
        &self,
        ctx: &TenantContext,
        client_id: Uuid,
    ) -> Result<Vec<ProposalSummary>, DomainError> {
        let client = self
            .clients
            .find(ctx, client_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Client", client_id))?;
        self.proposals.list_by_client_name(ctx, &client.name).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<Proposal, DomainError> {
        self.proposals
            .find(ctx, id)
            .await?
            .filter(|p| !p.is_deleted)
            .ok_or_else(|| DomainError::not_found("Proposal", id))
    }

    pub async fn items(&self, ctx: &TenantContext, id: Uuid) -> Result<Vec<ProposalItem>, DomainError> {
        self.get(ctx, id).await?;
        self.proposals.items(ctx, id).await
    }

    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: ProposalInput,
    ) -> Result<Proposal, DomainError> {
        input.validate()?;
        let mut proposal = self.get(ctx, id).await?;
        let replace_items = proposal.apply(input);
        self.proposals.update(ctx, &proposal, replace_items).await?;
        Ok(proposal)
    }

    pub async fn set_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        status: &str,
    ) -> Result<Proposal, DomainError> {
        let status = ProposalStatus::parse_requested(status)?;
        let mut proposal = self.get(ctx, id).await?;
        proposal.status = status;
        proposal.updated_at = Utc::now();
        self.proposals.update(ctx, &proposal, false).await?;
        info!("Proposal {} marked {}", id, status.as_str());
        Ok(proposal)
    }

    /// Move to trash
    pub async fn trash(&self, ctx: &TenantContext, id: Uuid) -> Result<(), DomainError> {
        self.get(ctx, id).await?;
        self.proposals.set_trashed(ctx, id, true).await?;
        info!("Proposal {} moved to trash", id);
        Ok(())
    }

    pub async fn stats(&self, ctx: &TenantContext) -> Result<ProposalStats, DomainError> {
        self.proposals.stats(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::ClientCompany;
    use crate::domain::proposal::tests::{input_with_items, item};
    use crate::repositories::{MockClientRepository, MockProposalRepository};
    use crate::services::testing::ctx;
    use rust_decimal_macros::dec;

    fn service(proposals: MockProposalRepository) -> ProposalService {
        ProposalService::new(Arc::new(proposals), Arc::new(MockClientRepository::new()))
    }

    fn stored() -> Proposal {
        Proposal::from_input(
            input_with_items(vec![item("Design", 1, dec!(100), dec!(18))]),
            "PROP-20250110-1111".to_string(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_generates_number_and_totals() {
        let mut proposals = MockProposalRepository::new();
        proposals.expect_create().times(1).returning(|_, _| Ok(()));

        let input = input_with_items(vec![item("Design", 2, dec!(50), dec!(10))]);
        let proposal = service(proposals).create(&ctx(), input).await.unwrap();

        assert!(proposal.proposal_number.starts_with("PROP-20250110-"));
        assert_eq!(proposal.grand_total, dec!(110.00));
    }

    #[tokio::test]
    async fn test_trashed_proposal_is_hidden() {
        let mut proposals = MockProposalRepository::new();
        proposals.expect_find().returning(|_, _| {
            let mut p = stored();
            p.is_deleted = true;
            Ok(Some(p))
        });

        let err = service(proposals).get(&ctx(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Proposal", .. }));
    }

    #[tokio::test]
    async fn test_invalid_status_is_rejected_before_lookup() {
        let mut proposals = MockProposalRepository::new();
        proposals.expect_find().never();

        let err = service(proposals)
            .set_status(&ctx(), Uuid::new_v4(), "won")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_update_replaces_items() {
        let mut proposals = MockProposalRepository::new();
        proposals.expect_find().returning(|_, _| Ok(Some(stored())));
        proposals
            .expect_update()
            .withf(|_, p: &Proposal, replace: &bool| *replace && p.grand_total == dec!(30))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let input = ProposalInput {
            items: Some(vec![item("Audit", 3, dec!(10), dec!(0))]),
            ..Default::default()
        };
        let proposal = service(proposals).update(&ctx(), Uuid::new_v4(), input).await.unwrap();
        assert_eq!(proposal.items.len(), 1);
    }

    #[tokio::test]
    async fn test_list_for_client_matches_name() {
        let client = ClientCompany::from_input(crate::domain::ClientCompanyInput {
            name: Some("Globex".to_string()),
            ..Default::default()
        })
        .unwrap();
        let client_id = client.id;

        let mut clients = MockClientRepository::new();
        clients.expect_find().returning(move |_, _| Ok(Some(client.clone())));
        let mut proposals = MockProposalRepository::new();
        proposals
            .expect_list_by_client_name()
            .withf(|_, name: &str| name == "Globex")
            .returning(|_, _| Ok(vec![]));

        let service = ProposalService::new(Arc::new(proposals), Arc::new(clients));
        assert!(service.list_for_client(&ctx(), client_id).await.unwrap().is_empty());
    }
}
