/// Error code registry
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2099: Authentication / session errors
/// - 2100-2199: Project resolution errors
/// - 3000-3999: Storage errors
/// - 4000-4999: Remote call errors
/// - 7000-7999: Validation errors
/// - 9000-9999: Other errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_TOML: u16 = 1002;
    pub const CONFIG_MISSING_REQUIRED: u16 = 1004;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;
    pub const CONFIG_INVALID_URL: u16 = 1006;

    // Authentication errors (2000-2099)
    pub const AUTH_GENERIC: u16 = 2000;
    pub const AUTH_REJECTED: u16 = 2001;
    pub const AUTH_UNREACHABLE: u16 = 2002;
    pub const AUTH_NO_SESSION_ID: u16 = 2003;

    // Project errors (2100-2199)
    pub const PROJECT_UNRESOLVABLE: u16 = 2100;
    pub const PROJECT_EMPTY_ID: u16 = 2101;

    // Storage errors (3000-3999)
    pub const STORAGE_GENERIC: u16 = 3000;
    pub const STORAGE_IO_ERROR: u16 = 3001;
    pub const STORAGE_PERMISSION_DENIED: u16 = 3002;
    pub const STORAGE_NOT_FOUND: u16 = 3004;
    pub const STORAGE_SERIALIZATION_ERROR: u16 = 3011;
    pub const STORAGE_DESERIALIZATION_ERROR: u16 = 3012;

    // Remote call errors (4000-4999)
    pub const REMOTE_GENERIC: u16 = 4000;
    pub const REMOTE_FAULT: u16 = 4001;
    pub const REMOTE_TIMEOUT: u16 = 4002;
    pub const REMOTE_HTTP_STATUS: u16 = 4003;
    pub const REMOTE_MALFORMED_RESPONSE: u16 = 4004;
    pub const REMOTE_TRANSPORT: u16 = 4005;

    // Validation errors (7000-7999)
    pub const VALIDATION_GENERIC: u16 = 7000;
    pub const VALIDATION_INVALID_FORMAT: u16 = 7005;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
}
