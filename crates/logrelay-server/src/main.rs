// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod logger;

use std::{process::ExitCode, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use logrelay::{
    admin_api::{build_client_or_direct, AdminApiClient},
    config::RelayConfig,
    listener::{ListenerConfig, LogListener},
    pipeline::EventPipeline,
    transcript::{self, Transcript},
};

pub fn main() -> ExitCode {
    if let Err(e) = init_logging(&RelayConfig::log_level_from_env()) {
        eprintln!("Unable to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Error creating config on relay startup: {e}");
            return ExitCode::FAILURE;
        }
    };

    // must run while the process is still single-threaded
    let offset = transcript::local_offset();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Unable to start the async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let transcript = Transcript::new(config.transcript_dir.clone(), offset);
    runtime.block_on(run(config, transcript))
}

async fn run(config: RelayConfig, transcript: Transcript) -> ExitCode {
    let client = match build_client_or_direct(config.https_proxy.as_deref(), config.http_timeout)
    {
        Ok(client) => client,
        Err(e) => {
            error!("Unable to build the admin API client: {e}");
            return ExitCode::FAILURE;
        }
    };
    let sink = Arc::new(AdminApiClient::new(client, &config.admin_api_url));
    debug!("Relaying events to {}", config.admin_api_url);

    let pipeline = EventPipeline::new(sink, transcript);
    let listener = match LogListener::new(
        &ListenerConfig {
            host: config.host.clone(),
            port: config.port,
        },
        pipeline,
        CancellationToken::new(),
    )
    .await
    {
        Ok(listener) => listener,
        Err(e) => {
            error!("Unable to start the UDP listener: {e}");
            return ExitCode::FAILURE;
        }
    };

    match listener.local_addr() {
        Ok(addr) => info!("Listening on {addr}"),
        Err(e) => info!("Listening on {}:{} ({e})", config.host, config.port),
    }

    listener.spin().await;
    ExitCode::SUCCESS
}

fn init_logging(log_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_new(logger::env_filter_directives(log_level))?)
        .with_ansi(false)
        .event_format(logger::Formatter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    debug!("Logging subsystem enabled");
    Ok(())
}
