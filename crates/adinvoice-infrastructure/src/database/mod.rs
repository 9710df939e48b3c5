//! Database module (PostgreSQL adapters)

pub mod connection;
pub mod tenant_pools;
pub mod postgres;

pub use connection::{create_pool, run_control_migrations};
pub use tenant_pools::PgTenantDatabases;
pub use postgres::{
    PgAccessRepository, PgCatalogRepository, PgClientRepository, PgEnquiryRepository,
    PgInvoiceRepository, PgNotificationRepository, PgProposalRepository, PgReceiptRepository,
    PgSupportRepository, PgTenantRepository, PgUserRepository,
};

use adinvoice_core::error::DomainError;
use tracing::error;

/// Log a failed query and turn it into a `DatabaseError`
pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        error!("Database error {}: {}", context, e);
        DomainError::DatabaseError(e.to_string())
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Decode a text enum column
pub(crate) fn decode<T>(
    value: &str,
    parse: fn(&str) -> Option<T>,
    column: &'static str,
) -> Result<T, DomainError> {
    parse(value).ok_or_else(|| {
        error!("Unexpected value '{}' in column {}", value, column);
        DomainError::DatabaseError(format!("invalid {} value: {}", column, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adinvoice_core::domain::UserRole;

    #[test]
    fn test_decode_known_and_unknown_values() {
        assert_eq!(decode("staff", UserRole::parse, "role").unwrap(), UserRole::Staff);
        assert!(matches!(
            decode("owner", UserRole::parse, "role"),
            Err(DomainError::DatabaseError(_))
        ));
    }
}
