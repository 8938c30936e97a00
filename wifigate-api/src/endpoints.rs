//! Endpoint paths, relative to the configured API base.

/// Account creation.
pub const REGISTER: &str = "register/";

/// Login; exchanges credentials for a token.
pub const TOKEN: &str = "token/";

/// Remaining quota (bearer auth).
pub const USAGE: &str = "usage/";

/// Issue a one-time code to the account's phone (bearer auth).
pub const PHONE_TOKEN: &str = "phone/token/";

/// Verify a one-time code (bearer auth).
pub const PHONE_VERIFY: &str = "phone/verify/";

/// Joins `endpoint` onto `base`, which must end in a slash.
pub fn join(base: &str, endpoint: &str) -> String {
    format!("{base}{}", endpoint.trim_start_matches('/'))
}
