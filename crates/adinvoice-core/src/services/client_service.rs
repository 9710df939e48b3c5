//! Client companies of a tenant

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{ClientCompany, ClientCompanyInput, TenantContext};
use crate::error::DomainError;
use crate::repositories::ClientRepository;

const DUPLICATE_CLIENT: &str = "Client company with this name already exists";

pub struct ClientService {
    clients: Arc<dyn ClientRepository>,
}

impl ClientService {
    pub fn new(clients: Arc<dyn ClientRepository>) -> Self {
        Self { clients }
    }

    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: ClientCompanyInput,
    ) -> Result<ClientCompany, DomainError> {
        input.validate()?;
        let client = ClientCompany::from_input(input)
            .ok_or_else(|| DomainError::ValidationError("Client name is required".to_string()))?;

        if self.clients.name_taken(ctx, &client.name, None).await? {
            return Err(DomainError::AlreadyExists(DUPLICATE_CLIENT.to_string()));
        }

        self.clients.create(ctx, &client).await?;
        info!("Client {} created in tenant {}", client.id, ctx.tenant_id);
        Ok(client)
    }

    pub async fn list(&self, ctx: &TenantContext) -> Result<Vec<ClientCompany>, DomainError> {
        self.clients.list(ctx).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<ClientCompany, DomainError> {
        self.clients
            .find(ctx, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Client", id))
    }

    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: ClientCompanyInput,
    ) -> Result<ClientCompany, DomainError> {
        input.validate()?;
        let mut client = self.get(ctx, id).await?;

        if let Some(name) = input.name.as_deref().map(str::trim) {
            if self.clients.name_taken(ctx, name, Some(id)).await? {
                return Err(DomainError::AlreadyExists(DUPLICATE_CLIENT.to_string()));
            }
        }

        client.apply(input);
        self.clients.update(ctx, &client).await?;
        Ok(client)
    }

    pub async fn delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), DomainError> {
        if !self.clients.delete(ctx, id).await? {
            return Err(DomainError::not_found("Client", id));
        }
        info!("Client {} deleted from tenant {}", id, ctx.tenant_id);
        Ok(())
    }

    /// Flip `is_active`
    pub async fn toggle_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> Result<ClientCompany, DomainError> {
        let mut client = self.get(ctx, id).await?;
        client.apply(ClientCompanyInput {
            is_active: Some(!client.is_active),
            ..Default::default()
        });
        self.clients.update(ctx, &client).await?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockClientRepository;
    use crate::services::testing::ctx;

    fn named(name: &str) -> ClientCompanyInput {
        ClientCompanyInput { name: Some(name.to_string()), ..Default::default() }
    }

    #[tokio::test]
    async fn test_create_client() {
        let mut clients = MockClientRepository::new();
        clients
            .expect_name_taken()
            .withf(|_, name: &str, exclude: &Option<Uuid>| name == "Globex" && exclude.is_none())
            .returning(|_, _, _| Ok(false));
        clients.expect_create().times(1).returning(|_, _| Ok(()));

        let service = ClientService::new(Arc::new(clients));
        let client = service.create(&ctx(), named("  Globex ")).await.unwrap();
        assert_eq!(client.name, "Globex");
    }

    #[tokio::test]
    async fn test_create_duplicate_name() {
        let mut clients = MockClientRepository::new();
        clients.expect_name_taken().returning(|_, _, _| Ok(true));
        clients.expect_create().never();

        let service = ClientService::new(Arc::new(clients));
        let err = service.create(&ctx(), named("GLOBEX")).await.unwrap_err();
        assert_eq!(err.to_string(), DUPLICATE_CLIENT);
    }

    #[tokio::test]
    async fn test_create_without_name() {
        let service = ClientService::new(Arc::new(MockClientRepository::new()));
        let err = service.create(&ctx(), ClientCompanyInput::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_toggle_status_flips_flag() {
        let existing = ClientCompany::from_input(named("Globex")).unwrap();
        let id = existing.id;

        let mut clients = MockClientRepository::new();
        clients.expect_find().returning(move |_, _| Ok(Some(existing.clone())));
        clients
            .expect_update()
            .withf(|_, client: &ClientCompany| !client.is_active)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = ClientService::new(Arc::new(clients));
        let client = service.toggle_status(&ctx(), id).await.unwrap();
        assert!(!client.is_active);
    }

    #[tokio::test]
    async fn test_delete_unknown_client() {
        let mut clients = MockClientRepository::new();
        clients.expect_delete().returning(|_, _| Ok(false));

        let service = ClientService::new(Arc::new(clients));
        let err = service.delete(&ctx(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Client", .. }));
    }
}
