//! Constants for the download module (origin, timeouts).

/// Base URL of the Arquivo Pessoa origin.
pub const BASE_URL: &str = "http://arquivopessoa.net";

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout (30 seconds; poem PDFs are small).
pub const READ_TIMEOUT_SECS: u64 = 30;
