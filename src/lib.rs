// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! bskypost is a command-line tool for sending a post to the [Bluesky]
//! social network. It logs in with an app password, turns any @mentions
//! and links in the post's text into rich text facets, uploads any
//! attached images, and publishes the post, printing the server's response
//! as JSON.
//!
//! # Examples
//!
//! (In all examples, replace `alice.bsky.social` with your own handle and
//! `app-password` with an [app password] generated for your account.)
//!
//! Send a simple post:
//!
//! ```bash
//! bskypost alice.bsky.social app-password 'Hello, world!'
//! ```
//!
//! Mention another account and link to a web page. Mentions of handles
//! that do not exist are left as plain text:
//!
//! ```bash
//! bskypost alice.bsky.social app-password 'Thanks @bob.bsky.social! https://example.com'
//! ```
//!
//! Attach up to four images, each with optional alt text. The first
//! `--alt` describes the first `--image`, and so on; images without alt
//! text get an empty description:
//!
//! ```bash
//! bskypost alice.bsky.social app-password 'My pets' \
//!     --image cat.png --alt 'A cat asleep in a sunbeam' \
//!     --image dog.jpg
//! ```
//!
//! Images must be no larger than 1,000,000 bytes.
//!
//! Post to an account hosted on a different PDS:
//!
//! ```bash
//! bskypost --pds https://pds.example.com alice.example.com app-password 'Hi!'
//! ```
//!
//! The PDS can also be set with the `$BSKYPOST_PDS` environment variable.
//! Add `-v` (or `-vv`, `-vvv`) to see what the tool is doing.
//!
//! # License
//!
//! bskypost is licensed under the terms of the [Apache License 2.0]. Please
//! see the LICENSE file accompanying this source code or visit the previous
//! link for more information on licensing.
//!
//! [Apache License 2.0]: https://www.apache.org/licenses/LICENSE-2.0
//! [app password]: https://bsky.app/settings/app-passwords
//! [Bluesky]: https://bsky.app/

pub mod bsky;
pub mod cli;
pub mod clock;
pub mod conf;
pub mod facet;
pub mod http;
pub mod post;
pub mod poster;

#[cfg(test)]
mod test_utils;
