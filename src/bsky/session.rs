// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Logging in to a Bluesky account.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A handle and app password used to log in.
///
/// App passwords are generated under Settings → Privacy and Security →
/// App Passwords in the Bluesky app. Do not use your main password.
#[derive(Clone, Serialize)]
pub struct Credentials {
    identifier: String,
    password: String,
}

impl Credentials {
    /// Creates credentials for the account with the given `identifier`
    /// (usually a handle) and app `password`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bskypost::bsky::Credentials;
    /// let credentials = Credentials::new("alice.bsky.social", "abcd-efgh-ijkl-mnop");
    /// assert_eq!(credentials.identifier(), "alice.bsky.social");
    /// ```
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        let identifier = identifier.into();
        let password = password.into();
        Self {
            identifier,
            password,
        }
    }

    /// The handle or DID of the account.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated session.
///
/// Sessions only live as long as a single invocation and are passed
/// explicitly to every call that needs them.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    access_jwt: String,
    did: String,
    #[serde(default)]
    handle: Option<String>,
}

impl Session {
    /// Creates a session from an access token and the account's DID.
    pub fn new(access_jwt: impl Into<String>, did: impl Into<String>) -> Self {
        let access_jwt = access_jwt.into();
        let did = did.into();
        Self {
            access_jwt,
            did,
            handle: None,
        }
    }

    /// The DID of the logged-in account, which is also the repository
    /// that records are written to.
    pub fn did(&self) -> &str {
        &self.did
    }

    /// The handle of the logged-in account, if the server reported it.
    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }

    /// Value of the `Authorization` header for authenticated requests.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_jwt)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_jwt", &"<redacted>")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .finish()
    }
}
