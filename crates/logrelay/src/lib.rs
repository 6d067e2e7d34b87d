// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Relays Counter-Strike server logs received over UDP.
//!
//! Each datagram is classified into an [`event::Event`], appended to a dated JSON
//! transcript, relayed to the HTTP admin API when its category routes there, and echoed
//! back to the sender.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod admin_api;
pub mod config;
pub mod errors;
pub mod event;
pub mod listener;
pub mod parser;
pub mod pipeline;
pub mod router;
pub mod sanitize;
pub mod transcript;
