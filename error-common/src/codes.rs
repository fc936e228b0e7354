// Error codes implementation
// This module contains standardized error codes shared by every Credgate crate

pub mod configuration {
    pub const MISSING_SETTING: &str = "CFG_1001";
    pub const INVALID_SETTING: &str = "CFG_1002";
    pub const UNKNOWN_CONNECTION: &str = "CFG_1003";
}

pub mod authentication {
    pub const INVALID_CREDENTIALS: &str = "AUTH_2001";
    pub const IDENTITY_NOT_FOUND: &str = "AUTH_2002";
    pub const IDENTITY_AMBIGUOUS: &str = "AUTH_2003";
    pub const UNCATEGORIZED: &str = "AUTH_2004";
}

pub mod validation {
    pub const NO_RECORD_FOUND: &str = "VALIDATION_3001";
}

pub mod database {
    pub const CONNECTION_FAILED: &str = "DB_4001";
    pub const QUERY_FAILED: &str = "DB_4002";
    pub const UNSUPPORTED_OPERATION: &str = "DB_4003";
}
