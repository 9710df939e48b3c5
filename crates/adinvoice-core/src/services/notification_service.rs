//! Platform notifications with per-user read marks

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::domain::{
    NewNotification, Notification, NotificationInput, NotificationType, NotificationView,
    Principal, SenderType,
};
use crate::error::DomainError;
use crate::repositories::NotificationRepository;

pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Global notification from the platform operator
    pub async fn create_global(&self, input: NotificationInput) -> Result<Notification, DomainError> {
        input.validate()?;
        let notification = self
            .notifications
            .create(&NewNotification {
                sender_type: SenderType::SuperAdmin,
                notification_type: input.notification_type.unwrap_or(NotificationType::Announcement),
                message: input.message,
                tenant_id: None,
            })
            .await?;
        info!("Global notification {} created", notification.id);
        Ok(notification)
    }

    /// Notification scoped to the caller's tenant
    pub async fn create_for_tenant(
        &self,
        principal: &Principal,
        input: NotificationInput,
    ) -> Result<Notification, DomainError> {
        input.validate()?;
        let tenant_id = principal.tenant_id.ok_or(DomainError::PermissionDenied)?;
        let notification = self
            .notifications
            .create(&NewNotification {
                sender_type: SenderType::ClientAdmin,
                notification_type: input.notification_type.unwrap_or(NotificationType::Update),
                message: input.message,
                tenant_id: Some(tenant_id),
            })
            .await?;
        info!("Tenant {} notification {} created", tenant_id, notification.id);
        Ok(notification)
    }

    pub async fn list(&self, principal: &Principal) -> Result<Vec<NotificationView>, DomainError> {
        self.notifications
            .list_for(principal.tenant_id, principal.user_id)
            .await
    }

    pub async fn mark_read(&self, principal: &Principal, id: i64) -> Result<(), DomainError> {
        if !self.notifications.exists(id).await? {
            return Err(DomainError::not_found("Notification", id));
        }
        self.notifications.mark_read(id, principal.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockNotificationRepository;
    use chrono::Utc;

    fn principal(tenant_id: Option<i64>) -> Principal {
        Principal { user_id: 9, role: "admin".to_string(), tenant_id, is_superuser: false }
    }

    fn saved(new: &NewNotification) -> Notification {
        Notification {
            id: 1,
            sender_type: new.sender_type,
            notification_type: new.notification_type,
            message: new.message.clone(),
            tenant_id: new.tenant_id,
            created_at: Utc::now(),
        }
    }

    fn input(message: &str) -> NotificationInput {
        NotificationInput { message: message.to_string(), notification_type: None }
    }

    #[tokio::test]
    async fn test_global_defaults_to_announcement() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_create().returning(|n| Ok(saved(n)));

        let n = NotificationService::new(Arc::new(repo))
            .create_global(input("Maintenance tonight"))
            .await
            .unwrap();
        assert_eq!(n.notification_type, NotificationType::Announcement);
        assert_eq!(n.sender_type, SenderType::SuperAdmin);
        assert!(n.tenant_id.is_none());
    }

    #[tokio::test]
    async fn test_tenant_notification_is_scoped() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_create().returning(|n| Ok(saved(n)));

        let n = NotificationService::new(Arc::new(repo))
            .create_for_tenant(&principal(Some(4)), input("New price list"))
            .await
            .unwrap();
        assert_eq!(n.tenant_id, Some(4));
        assert_eq!(n.notification_type, NotificationType::Update);
    }

    #[tokio::test]
    async fn test_tenant_notification_needs_tenant() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_create().never();

        let err = NotificationService::new(Arc::new(repo))
            .create_for_tenant(&principal(None), input("Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let err = NotificationService::new(Arc::new(MockNotificationRepository::new()))
            .create_global(input(""))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_mark_read_unknown_notification() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_mark_read().never();

        let err = NotificationService::new(Arc::new(repo))
            .mark_read(&principal(Some(1)), 77)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_mark_read_is_repeatable() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_exists().returning(|_| Ok(true));
        repo.expect_mark_read().times(2).returning(|_, _| Ok(()));

        let service = NotificationService::new(Arc::new(repo));
        service.mark_read(&principal(Some(1)), 3).await.unwrap();
        service.mark_read(&principal(Some(1)), 3).await.unwrap();
    }
}
