// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Environment and configuration utilities.

use std::env;

/// Environment variable that overrides the default PDS host.
pub const PDS_ENV: &str = "BSKYPOST_PDS";

/// The PDS that hosts most Bluesky accounts.
pub const DEFAULT_PDS: &str = "https://bsky.social";

/// Returns the base URL of the personal data server (PDS) that posts are
/// sent to.
///
/// By default this is `https://bsky.social`, unless the user has defined
/// `$BSKYPOST_PDS` in the environment. Trailing slashes are removed so
/// XRPC paths can be appended directly.
///
/// # Examples
///
/// `pds_host` will return a default value if `$BSKYPOST_PDS` is not set:
///
/// ```
/// use bskypost::conf::pds_host;
/// # use temp_env::with_var_unset;
/// # with_var_unset("BSKYPOST_PDS", || {
/// assert_eq!(pds_host(), "https://bsky.social");
/// # });
/// ```
///
/// In this example, `$BSKYPOST_PDS` was set to a self-hosted PDS:
///
/// ```
/// use bskypost::conf::pds_host;
/// # use temp_env::with_var;
/// # with_var("BSKYPOST_PDS", Some("https://pds.example.com/"), || {
/// assert_eq!(pds_host(), "https://pds.example.com");
/// # });
/// ```
pub fn pds_host() -> String {
    let host = env::var(PDS_ENV)
        .ok()
        .filter(|host| !host.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PDS.to_string());
    normalize_host(&host)
}

/// Trims whitespace and trailing slashes from a PDS host.
pub fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('/').to_string()
}
