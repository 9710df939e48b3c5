//! Application-wide constants

pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 3600;
pub const TOKEN_TYPE_ACCESS: &str = "access";

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const TEMP_PASSWORD_LENGTH: usize = 10;

/// PostgreSQL truncates identifiers longer than this.
pub const MAX_DB_IDENTIFIER_LENGTH: usize = 63;
pub const DB_NAME_SUFFIX_LENGTH: usize = 6;

pub const PROPOSAL_NUMBER_PREFIX: &str = "PROP";
pub const INVOICE_NUMBER_PREFIX: &str = "INV";
pub const RECEIPT_NUMBER_PREFIX: &str = "R";
pub const DOCUMENT_NUMBER_ATTEMPTS: usize = 5;

pub const DEFAULT_INVOICE_TEMPLATE: &str = "saffron";
pub const DEFAULT_INVOICE_UNIT: &str = "pc";
pub const DEFAULT_RECEIPT_CLIENT_NAME: &str = "Unknown Client";

pub const LATEST_NOTIFICATIONS_ON_DASHBOARD: i64 = 3;
