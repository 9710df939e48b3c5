//! Proposal repository trait (port, tenant database)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Proposal, ProposalItem, ProposalStats, ProposalSummary, TenantContext, TrashedItem};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// Non-trashed proposals, newest first
    async fn list(&self, ctx: &TenantContext) -> Result<Vec<ProposalSummary>, DomainError>;
    async fn list_by_client_name(&self, ctx: &TenantContext, client_name: &str) -> Result<Vec<ProposalSummary>, DomainError>;
    /// Proposal with its items, trashed or not
    async fn find(&self, ctx: &TenantContext, id: Uuid) -> Result<Option<Proposal>, DomainError>;
    async fn items(&self, ctx: &TenantContext, id: Uuid) -> Result<Vec<ProposalItem>, DomainError>;
    async fn create(&self, ctx: &TenantContext, proposal: &Proposal) -> Result<(), DomainError>;
    /// Save header fields, and the item set when `replace_items`
    async fn update(&self, ctx: &TenantContext, proposal: &Proposal, replace_items: bool) -> Result<(), DomainError>;
    async fn set_trashed(&self, ctx: &TenantContext, id: Uuid, trashed: bool) -> Result<bool, DomainError>;
    async fn purge(&self, ctx: &TenantContext, id: Uuid) -> Result<bool, DomainError>;
    async fn list_trashed(&self, ctx: &TenantContext) -> Result<Vec<TrashedItem>, DomainError>;
    async fn stats(&self, ctx: &TenantContext) -> Result<ProposalStats, DomainError>;
    async fn count(&self, ctx: &TenantContext) -> Result<i64, DomainError>;
}
