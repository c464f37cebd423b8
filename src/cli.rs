// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Drives the command-line program.

use crate::bsky::{BlueskyService, Credentials};
use crate::clock::SystemClock;
use crate::conf;
use crate::http::HTTPError;
use crate::post::ImageAttachment;
use crate::poster::{Draft, Error as PublishError, Poster};
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use serde_json::Value;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use thiserror::Error;

/// Prints `message` to stderr and exits with `error_code`.
pub fn die(error_code: i32, message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(error_code);
}

/// Program configuration.
#[derive(Debug, Parser)]
#[command(version)]
#[command(about = "Send post to Bluesky social network", long_about = None)]
pub struct Config {
    #[command(flatten)]
    verbosity: Verbosity,

    /// Bluesky handle
    #[arg(value_name = "BSKY_HANDLE")]
    bsky_handle: String,

    /// Bluesky app password
    #[arg(value_name = "APP_PASSWORD")]
    app_password: String,

    /// Post text
    #[arg(value_name = "POST_TEXT")]
    post_text: String,

    /// Attach the image at PATH (may be repeated, up to 4 times)
    #[arg(long = "image", value_name = "PATH")]
    images: Vec<PathBuf>,

    /// Alt text for the image in the same position (may be repeated)
    #[arg(long = "alt", value_name = "TEXT")]
    alts: Vec<String>,

    /// PDS to post to [default: $BSKYPOST_PDS or https://bsky.social]
    #[arg(long, value_name = "URL")]
    pds: Option<String>,
}

impl Config {
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Credentials for logging in.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.bsky_handle, &self.app_password)
    }

    /// The post to publish, with images paired to their alt texts.
    pub fn draft(&self) -> Draft {
        let images = ImageAttachment::pair(self.images.clone(), self.alts.clone());
        Draft::new(&self.post_text).images(images)
    }

    /// The PDS to post to, preferring `--pds` over the environment.
    pub fn pds_host(&self) -> String {
        match &self.pds {
            Some(host) => conf::normalize_host(host),
            None => conf::pds_host(),
        }
    }
}

/// A failure while running the program.
#[derive(Debug, Error)]
pub enum RunError {
    /// The HTTP client could not be set up.
    #[error("Could not set up HTTP client: {0}")]
    Setup(#[from] HTTPError),

    /// Publishing the post failed.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The server's response could not be printed.
    #[error("Could not write response: {0}")]
    Output(#[from] io::Error),
}

/// Runs the command-line program.
#[derive(Debug)]
pub struct Runner {
    config: Config,
}

impl Runner {
    /// Create a new program runner using the given `config`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the command-line program using its stored configuration options.
    ///
    /// The server's response to the new post is printed as JSON. If the
    /// server rejects the post, its response is still printed before the
    /// error is returned.
    pub async fn run(&self) -> Result<(), RunError> {
        let service = BlueskyService::new(self.config.pds_host())?;
        let poster = Poster::new(service);
        let result = poster
            .publish(
                &self.config.credentials(),
                &self.config.draft(),
                &SystemClock::default(),
            )
            .await;

        report(result, &mut io::stdout().lock())
    }
}

/// Writes the server's response from a publish `result` to `out`.
///
/// A rejected post's response is written too, and the rejection is then
/// returned as the error.
fn report(result: Result<Value, PublishError>, out: &mut impl Write) -> Result<(), RunError> {
    match result {
        Ok(body) => {
            writeln!(out, "{}", pretty(&body))?;
            Ok(())
        }
        Err(err) => {
            if let PublishError::Rejected { body, .. } = &err {
                writeln!(out, "{}", pretty(body))?;
            }
            Err(err.into())
        }
    }
}

fn pretty(body: &Value) -> String {
    serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string())
}
