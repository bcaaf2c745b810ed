//! All the portal URL-s and well-known add-on paths

pub const BASE_URL: &str = "https://eduvulcan.pl";
pub const AP_PATH: &str = "/api/ap";
pub const QUERY_USER_INFO_PATH: &str = "/Account/QueryUserInfo";

pub const DEFAULT_OPTIONS_PATH: &str = "/data/options.json";
pub const DEFAULT_TOKEN_PATH: &str = "/config/eduvulcan_token.json";
pub const FETCHER_BINARY: &str = "eduvulcan-token-fetcher";
