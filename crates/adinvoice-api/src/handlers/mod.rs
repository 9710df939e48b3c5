//! HTTP handlers, one module per API area

pub mod health;
pub mod tenants;
pub mod users;
pub mod access;
pub mod clients;
pub mod products;
pub mod proposals;
pub mod invoices;
pub mod receipts;
pub mod trash;
pub mod notifications;
pub mod support;
pub mod enquiries;
pub mod analytics;
