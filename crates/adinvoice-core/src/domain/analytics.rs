//! Dashboard analytics views

use std::ops::AddAssign;

use serde::Serialize;

use crate::domain::notification::Notification;

/// Document counts held in one tenant database
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TenantCounts {
    pub proposals: i64,
    pub invoices: i64,
    pub receipts: i64,
    pub clients: i64,
    pub products_services: i64,
}

impl AddAssign for TenantCounts {
    fn add_assign(&mut self, other: Self) {
        self.proposals += other.proposals;
        self.invoices += other.invoices;
        self.receipts += other.receipts;
        self.clients += other.clients;
        self.products_services += other.products_services;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantAnalytics {
    pub tenant_id: i64,
    #[serde(flatten)]
    pub counts: TenantCounts,
    pub latest_notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformAnalytics {
    #[serde(flatten)]
    pub counts: TenantCounts,
    pub tenants: i64,
    pub merchants: i64,
    pub approved_merchants: i64,
    pub enquiries: i64,
    pub notifications: Vec<Notification>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_add() {
        let mut total = TenantCounts::default();
        total += TenantCounts { proposals: 2, invoices: 1, receipts: 0, clients: 4, products_services: 3 };
        total += TenantCounts { proposals: 1, invoices: 1, receipts: 5, clients: 0, products_services: 0 };
        assert_eq!(
            total,
            TenantCounts { proposals: 3, invoices: 2, receipts: 5, clients: 4, products_services: 3 }
        );
    }
}
