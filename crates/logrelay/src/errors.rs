// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for the relay.

use std::net::SocketAddr;

/// Failure to classify a raw log line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The line carries no `MM/DD/YYYY - HH:MM:SS: ` header.
    #[error("could not parse message")]
    NoMatch,
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    /// A numeric capture did not fit its field.
    #[error("invalid value {value:?} for field {field}")]
    InvalidField { field: &'static str, value: String },
}

/// Startup configuration errors. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port {arg:?}: {source}")]
    InvalidPort {
        arg: String,
        source: std::num::ParseIntError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while setting up the UDP listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("couldn't bind to address {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("couldn't read local address: {0}")]
    LocalAddr(std::io::Error),
}

/// Outcome of a failed admin API call. Only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("error sending request: {0}")]
    Transport(reqwest::Error),

    #[error("admin API responded {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("error reading response body: {0}")]
    Body(reqwest::Error),
}

/// Failure to deliver a reply datagram to its sender.
#[derive(Debug, thiserror::Error)]
#[error("couldn't send reply to {addr}: {source}")]
pub struct ReplyError {
    pub addr: SocketAddr,
    pub source: std::io::Error,
}
