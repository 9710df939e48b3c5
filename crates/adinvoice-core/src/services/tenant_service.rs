// ============================================================================
// AdInvoice Core - Tenant Service
// File: crates/adinvoice-core/src/services/tenant_service.rs
// Description: Tenant provisioning, routing resolution and lifecycle
// ============================================================================
//! Tenant registry service: every tenant owns exactly one database, created
//! at tenant creation and reached through a lazily registered pool.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::domain::{
    generate_db_name, NewTenant, Principal, Tenant, TenantAction, TenantContext, TenantDetails,
    TenantOwner, TenantUpdate,
};
use crate::error::DomainError;
use crate::repositories::{TenantDatabases, TenantRepository, UserRepository};

pub struct TenantService {
    tenants: Arc<dyn TenantRepository>,
    users: Arc<dyn UserRepository>,
    databases: Arc<dyn TenantDatabases>,
}

impl TenantService {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        users: Arc<dyn UserRepository>,
        databases: Arc<dyn TenantDatabases>,
    ) -> Self {
        Self { tenants, users, databases }
    }

    /// Create a tenant and provision its database.
    ///
    /// Provisioning is compensated: on any failure after the registry row
    /// exists, the pool is deregistered, the database dropped (only if this
    /// call created it) and the row deleted before the error is returned.
    pub async fn create(&self, input: NewTenant) -> Result<Tenant, DomainError> {
        input.validate()?;
        let name = input.name.trim().to_string();

        if self.tenants.find_by_name(&name).await?.is_some() {
            warn!("Tenant creation rejected: name already exists: {}", name);
            return Err(DomainError::TenantNameAlreadyExists(name));
        }

        if let Some(owner_id) = input.owner_id {
            self.users
                .find_by_id(owner_id)
                .await?
                .ok_or(DomainError::UserNotFound)?;
        }

        let db_name = generate_db_name(&name);
        let tenant = self.tenants.create(&name, &db_name, input.owner_id).await?;
        info!("Tenant {} registered with database {}", tenant.id, tenant.db_name);

        if let Err(e) = self.databases.create_database(&tenant.db_name).await {
            error!("Creating database {} failed: {}", tenant.db_name, e);
            self.rollback(&tenant, false).await;
            return Err(e);
        }

        if let Err(e) = self.attach(&tenant).await {
            error!("Provisioning tenant {} failed: {}", tenant.id, e);
            self.rollback(&tenant, true).await;
            return Err(e);
        }

        info!("Tenant {} created with database {}", tenant.name, tenant.db_name);
        Ok(tenant)
    }

    async fn attach(&self, tenant: &Tenant) -> Result<(), DomainError> {
        self.databases.register(&tenant.db_name).await?;
        self.databases.migrate(&tenant.db_name).await?;
        if let Some(owner_id) = tenant.owner_id {
            self.users.set_tenant(owner_id, Some(tenant.id)).await?;
        }
        Ok(())
    }

    async fn rollback(&self, tenant: &Tenant, database_created: bool) {
        self.databases.deregister(&tenant.db_name).await;

        if database_created {
            if let Err(e) = self.databases.drop_database(&tenant.db_name).await {
                error!("Rollback: dropping database {} failed: {}", tenant.db_name, e);
            }
        }

        if let Err(e) = self.tenants.delete(tenant.id).await {
            error!("Rollback: deleting tenant row {} failed: {}", tenant.id, e);
        }
    }

    /// Resolve a tenant id to its routing context, registering the pool on first use.
    pub async fn resolve(&self, tenant_id: i64) -> Result<TenantContext, DomainError> {
        let tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or(DomainError::TenantNotFound)?;

        if !tenant.is_active {
            warn!("Refusing request for disabled tenant {}", tenant_id);
            return Err(DomainError::TenantNotActive);
        }

        if !self.databases.is_registered(&tenant.db_name) {
            debug!("Registering pool for tenant {} ({})", tenant.id, tenant.db_name);
            self.databases.register(&tenant.db_name).await?;
        }

        Ok(tenant.context())
    }

    /// Resolve on behalf of a caller; non-superusers may only address their own tenant.
    pub async fn resolve_for(
        &self,
        principal: &Principal,
        tenant_id: Option<i64>,
    ) -> Result<TenantContext, DomainError> {
        let tenant_id = tenant_id.ok_or(DomainError::TenantRequired)?;

        if !principal.is_superuser && principal.tenant_id != Some(tenant_id) {
            warn!(
                "User {} attempted to access tenant {} (own tenant: {:?})",
                principal.user_id, tenant_id, principal.tenant_id
            );
            return Err(DomainError::TenantAccessDenied(tenant_id));
        }

        self.resolve(tenant_id).await
    }

    pub async fn get(&self, id: i64) -> Result<TenantDetails, DomainError> {
        let tenant = self
            .tenants
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TenantNotFound)?;
        self.with_owner(tenant).await
    }

    pub async fn list(&self) -> Result<Vec<TenantDetails>, DomainError> {
        let tenants = self.tenants.list().await?;
        try_join_all(tenants.into_iter().map(|t| self.with_owner(t))).await
    }

    async fn with_owner(&self, tenant: Tenant) -> Result<TenantDetails, DomainError> {
        let owner = match tenant.owner_id {
            Some(owner_id) => self.users.find_by_id(owner_id).await?.map(TenantOwner::from),
            None => None,
        };
        Ok(TenantDetails::new(tenant, owner))
    }

    /// Enable/disable or rename. `db_name` is immutable and silently ignored.
    pub async fn update(&self, id: i64, update: TenantUpdate) -> Result<Tenant, DomainError> {
        update.validate()?;
        let tenant = self
            .tenants
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TenantNotFound)?;

        if update.db_name.is_some() {
            debug!("Ignoring db_name in update of tenant {}", id);
        }

        if let Some(action) = update.action.as_deref() {
            let action = TenantAction::parse(action).ok_or_else(|| {
                DomainError::ValidationError("Invalid action. Use 'enable' or 'disable'.".to_string())
            })?;
            let enable = action == TenantAction::Enable;
            let updated = self.tenants.set_active(id, enable).await?;
            if !enable {
                self.databases.deregister(&tenant.db_name).await;
            }
            info!("Tenant {} {}", id, if enable { "enabled" } else { "disabled" });
            return Ok(updated);
        }

        match update.name {
            Some(name) => {
                let name = name.trim().to_string();
                if let Some(existing) = self.tenants.find_by_name(&name).await? {
                    if existing.id != id {
                        return Err(DomainError::TenantNameAlreadyExists(name));
                    }
                }
                self.tenants.rename(id, &name).await
            }
            None => Ok(tenant),
        }
    }

    /// Drop the tenant database and remove the registry entry.
    pub async fn delete(&self, id: i64) -> Result<Tenant, DomainError> {
        let tenant = self
            .tenants
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TenantNotFound)?;

        self.databases.deregister(&tenant.db_name).await;
        self.databases.drop_database(&tenant.db_name).await?;
        self.users.clear_tenant(id).await?;
        self.tenants.delete(id).await?;

        info!("Tenant '{}' and database '{}' deleted", tenant.name, tenant.db_name);
        Ok(tenant)
    }

    /// Active tenants, for fan-out queries
    pub async fn active_contexts(&self) -> Result<Vec<TenantContext>, DomainError> {
        let tenants = self.tenants.list_active().await?;
        let mut contexts = Vec::with_capacity(tenants.len());
        for tenant in tenants {
            if !self.databases.is_registered(&tenant.db_name) {
                self.databases.register(&tenant.db_name).await?;
            }
            contexts.push(tenant.context());
        }
        Ok(contexts)
    }

    pub async fn count(&self) -> Result<i64, DomainError> {
        Ok(self.tenants.list().await?.len() as i64)
    }

    /// Bring every active tenant database up to date. Failures are logged
    /// and skipped; returns the number of databases migrated.
    pub async fn migrate_all(&self) -> Result<usize, DomainError> {
        let tenants = self.tenants.list_active().await?;
        let mut migrated = 0;

        for tenant in tenants {
            let result = async {
                self.databases.register(&tenant.db_name).await?;
                self.databases.migrate(&tenant.db_name).await
            }
            .await;

            match result {
                Ok(()) => migrated += 1,
                Err(e) => error!("Migrating tenant database {} failed: {}", tenant.db_name, e),
            }
        }

        info!("Migrated {} tenant database(s)", migrated);
        Ok(migrated)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::user::tests::sample_user;
    use crate::repositories::{MockTenantDatabases, MockTenantRepository, MockUserRepository};
    use chrono::Utc;

    pub(crate) fn tenant(id: i64, active: bool) -> Tenant {
        Tenant {
            id,
            name: format!("Tenant {}", id),
            db_name: format!("tenant_{}_123456", id),
            owner_id: Some(1),
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn principal(tenant_id: Option<i64>, superuser: bool) -> Principal {
        Principal { user_id: 1, role: "admin".to_string(), tenant_id, is_superuser: superuser }
    }

    fn service(
        tenants: MockTenantRepository,
        users: MockUserRepository,
        databases: MockTenantDatabases,
    ) -> TenantService {
        TenantService::new(Arc::new(tenants), Arc::new(users), Arc::new(databases))
    }

    fn creating_repo() -> MockTenantRepository {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_name().returning(|_| Ok(None));
        tenants.expect_create().returning(|name, db_name, owner_id| {
            Ok(Tenant {
                name: name.to_string(),
                db_name: db_name.to_string(),
                owner_id,
                ..tenant(7, true)
            })
        });
        tenants
    }

    fn owner_repo() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(sample_user(id))));
        users
    }

    #[tokio::test]
    async fn test_create_provisions_database() {
        let tenants = creating_repo();
        let mut users = owner_repo();
        users
            .expect_set_tenant()
            .withf(|user_id, tenant_id| *user_id == 1 && *tenant_id == Some(7))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut databases = MockTenantDatabases::new();
        databases
            .expect_create_database()
            .withf(|name: &str| name.starts_with("acme_corp_"))
            .times(1)
            .returning(|_| Ok(()));
        databases.expect_register().times(1).returning(|_| Ok(()));
        databases.expect_migrate().times(1).returning(|_| Ok(()));

        let service = service(tenants, users, databases);
        let tenant = service
            .create(NewTenant { name: "Acme Corp".to_string(), owner_id: Some(1) })
            .await
            .unwrap();

        assert_eq!(tenant.name, "Acme Corp");
        assert!(tenant.db_name.starts_with("acme_corp_"));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_name().returning(|_| Ok(Some(tenant(3, true))));
        tenants.expect_create().never();

        let service = service(tenants, MockUserRepository::new(), MockTenantDatabases::new());
        let err = service
            .create(NewTenant { name: "Tenant 3".to_string(), owner_id: None })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::TenantNameAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_failed_migration_is_compensated() {
        let mut tenants = creating_repo();
        tenants.expect_delete().withf(|id| *id == 7).times(1).returning(|_| Ok(()));

        let mut databases = MockTenantDatabases::new();
        databases.expect_create_database().times(1).returning(|_| Ok(()));
        databases.expect_register().times(1).returning(|_| Ok(()));
        databases
            .expect_migrate()
            .times(1)
            .returning(|_| Err(DomainError::ProvisioningError("migration failed".to_string())));
        databases.expect_deregister().times(1).returning(|_| ());
        databases.expect_drop_database().times(1).returning(|_| Ok(()));

        let service = service(tenants, owner_repo(), databases);
        let err = service
            .create(NewTenant { name: "Acme".to_string(), owner_id: Some(1) })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ProvisioningError(_)));
    }

    #[tokio::test]
    async fn test_failed_create_database_keeps_existing_database() {
        let mut tenants = creating_repo();
        tenants.expect_delete().times(1).returning(|_| Ok(()));

        let mut databases = MockTenantDatabases::new();
        databases
            .expect_create_database()
            .returning(|_| Err(DomainError::ProvisioningError("exists".to_string())));
        databases.expect_deregister().times(1).returning(|_| ());
        databases.expect_drop_database().never();
        databases.expect_migrate().never();

        let service = service(tenants, MockUserRepository::new(), databases);
        let result = service
            .create(NewTenant { name: "Acme".to_string(), owner_id: None })
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_resolve_registers_lazily() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(|id| Ok(Some(tenant(id, true))));

        let mut databases = MockTenantDatabases::new();
        databases.expect_is_registered().times(1).returning(|_| false);
        databases
            .expect_register()
            .withf(|alias: &str| alias == "tenant_4_123456")
            .times(1)
            .returning(|_| Ok(()));

        let service = service(tenants, MockUserRepository::new(), databases);
        let ctx = service.resolve(4).await.unwrap();

        assert_eq!(ctx, TenantContext { tenant_id: 4, db_alias: "tenant_4_123456".to_string() });
    }

    #[tokio::test]
    async fn test_resolve_disabled_tenant_refused() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(|id| Ok(Some(tenant(id, false))));
        let mut databases = MockTenantDatabases::new();
        databases.expect_register().never();

        let service = service(tenants, MockUserRepository::new(), databases);
        assert!(matches!(service.resolve(4).await, Err(DomainError::TenantNotActive)));
    }

    #[tokio::test]
    async fn test_resolve_unknown_tenant() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(|_| Ok(None));

        let service = service(tenants, MockUserRepository::new(), MockTenantDatabases::new());
        assert!(matches!(service.resolve(99).await, Err(DomainError::TenantNotFound)));
    }

    #[tokio::test]
    async fn test_resolve_for_guards_other_tenants() {
        let service = service(
            MockTenantRepository::new(),
            MockUserRepository::new(),
            MockTenantDatabases::new(),
        );

        let err = service.resolve_for(&principal(Some(1), false), Some(2)).await.unwrap_err();
        assert!(matches!(err, DomainError::TenantAccessDenied(2)));

        let err = service.resolve_for(&principal(Some(1), false), None).await.unwrap_err();
        assert!(matches!(err, DomainError::TenantRequired));
    }

    #[tokio::test]
    async fn test_resolve_for_superuser_any_tenant() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(|id| Ok(Some(tenant(id, true))));
        let mut databases = MockTenantDatabases::new();
        databases.expect_is_registered().returning(|_| true);

        let service = service(tenants, MockUserRepository::new(), databases);
        let ctx = service.resolve_for(&principal(None, true), Some(5)).await.unwrap();
        assert_eq!(ctx.tenant_id, 5);
    }

    #[tokio::test]
    async fn test_update_ignores_db_name() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(|id| Ok(Some(tenant(id, true))));
        tenants.expect_rename().never();
        tenants.expect_set_active().never();

        let service = service(tenants, MockUserRepository::new(), MockTenantDatabases::new());
        let updated = service
            .update(
                2,
                TenantUpdate { db_name: Some("hijack".to_string()), ..Default::default() },
            )
            .await
            .unwrap();

        assert_eq!(updated.db_name, "tenant_2_123456");
    }

    #[tokio::test]
    async fn test_disable_closes_pool() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(|id| Ok(Some(tenant(id, true))));
        tenants
            .expect_set_active()
            .withf(|id, active| *id == 2 && !*active)
            .returning(|id, _| Ok(tenant(id, false)));
        let mut databases = MockTenantDatabases::new();
        databases.expect_deregister().times(1).returning(|_| ());

        let service = service(tenants, MockUserRepository::new(), databases);
        let updated = service
            .update(2, TenantUpdate { action: Some("disable".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_update_invalid_action() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(|id| Ok(Some(tenant(id, true))));

        let service = service(tenants, MockUserRepository::new(), MockTenantDatabases::new());
        let err = service
            .update(2, TenantUpdate { action: Some("archive".to_string()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_delete_drops_database() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(|id| Ok(Some(tenant(id, true))));
        tenants.expect_delete().times(1).returning(|_| Ok(()));
        let mut users = MockUserRepository::new();
        users.expect_clear_tenant().times(1).returning(|_| Ok(()));
        let mut databases = MockTenantDatabases::new();
        databases.expect_deregister().times(1).returning(|_| ());
        databases
            .expect_drop_database()
            .withf(|name: &str| name == "tenant_3_123456")
            .times(1)
            .returning(|_| Ok(()));

        let service = service(tenants, users, databases);
        let deleted = service.delete(3).await.unwrap();
        assert_eq!(deleted.id, 3);
    }

    #[tokio::test]
    async fn test_migrate_all_skips_failures() {
        let mut tenants = MockTenantRepository::new();
        tenants
            .expect_list_active()
            .returning(|| Ok(vec![tenant(1, true), tenant(2, true)]));
        let mut databases = MockTenantDatabases::new();
        databases.expect_register().returning(|_| Ok(()));
        databases.expect_migrate().returning(|alias| {
            if alias == "tenant_1_123456" {
                Err(DomainError::ProvisioningError("boom".to_string()))
            } else {
                Ok(())
            }
        });

        let service = service(tenants, MockUserRepository::new(), databases);
        assert_eq!(service.migrate_all().await.unwrap(), 1);
    }
}
