// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Bluesky API sessions and services for communicating with a PDS over HTTP.

pub mod service;
pub mod session;

pub use service::{Blob, BlueskyService, RecordResponse, Service};
pub use session::{Credentials, Session};
