/// Error code registry for tripagg
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Query definition errors
/// - 3000-3999: Run (engine) errors
/// - 4000-4999: Output errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_PARSE_ERROR: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1003;

    // Query errors (2000-2999)
    pub const QUERY_UNKNOWN: u16 = 2001;
    pub const QUERY_DUPLICATE: u16 = 2002;
    pub const QUERY_INVALID: u16 = 2003;
    pub const QUERY_LOAD_FAILED: u16 = 2004;

    // Engine errors (3000-3999)
    pub const SOURCE_OPEN_FAILED: u16 = 3001;
    pub const SOURCE_READ_FAILED: u16 = 3002;
    pub const WORKER_FAILED: u16 = 3003;
    pub const READER_FAILED: u16 = 3004;
    pub const CHUNK_MISSING: u16 = 3005;
    pub const INVALID_SETTINGS: u16 = 3006;

    // Output errors (4000-4999)
    pub const OUTPUT_WRITE_FAILED: u16 = 4001;
    pub const OUTPUT_SERIALIZE_FAILED: u16 = 4002;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1000 => "Generic configuration error",
        1001 => "Configuration file not found",
        1002 => "Failed to parse configuration",
        1003 => "Invalid value in configuration",

        2001 => "Query name is not registered",
        2002 => "Query name is already registered",
        2003 => "Query definition is inconsistent",
        2004 => "Failed to load query definitions",

        3001 => "Input file could not be opened",
        3002 => "Input could not be read",
        3003 => "A worker terminated abnormally",
        3004 => "The line reader terminated abnormally",
        3005 => "A chunk result never arrived",
        3006 => "Invalid engine settings",

        4001 => "Failed to write results",
        4002 => "Failed to serialize results",

        _ => "Unknown error code",
    }
}
