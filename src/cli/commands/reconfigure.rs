//! Reconfigure command implementation.
//!
//! Reads a change request, runs the workflow and writes a single JSON
//! envelope to stdout. Logs go to stderr.

use crate::cli::args::ReconfigureArgs;
use crate::core::Workflow;
use crate::models::config::AppConfig;
use crate::models::report::{Envelope, WorkflowError};
use crate::models::request::ChangeRequest;
use crate::models::rollback::RollbackProgress;
use crate::services::Services;
use crate::Result;
use std::io::Read;
use tracing::Instrument;
use uuid::Uuid;

/// Run the reconfigure command. Returns whether the change succeeded.
pub async fn reconfigure(args: &ReconfigureArgs, config: &AppConfig) -> Result<bool> {
    let envelope = run(args, config).await;
    println!("{}", envelope.to_json(args.pretty)?);
    Ok(envelope.is_success())
}

/// Produce the envelope for one invocation. Never fails: every error becomes
/// an error record.
pub async fn run(args: &ReconfigureArgs, config: &AppConfig) -> Envelope {
    let span = tracing::info_span!("reconfigure", invocation = %Uuid::new_v4());

    async move {
        let request = match read_request(args) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!("Unable to read request: {}", e);
                return Envelope::Error(WorkflowError::new(&e, RollbackProgress::not_needed()));
            }
        };

        tracing::info!(
            "Reconfiguring [{}] server={} ca_server={:?}",
            request.section,
            request.server,
            request.ca_server
        );

        let services = Services::from_config(config);
        let workflow = Workflow::new(&services.store, &services.prober, &services.agent);

        match workflow.run(&request).await {
            Ok(result) => {
                tracing::info!("Reconfiguration complete");
                Envelope::Result(result)
            }
            Err(failure) => {
                tracing::error!("Reconfiguration failed: {}", failure.error);
                Envelope::Error(WorkflowError::from(&failure))
            }
        }
    }
    .instrument(span)
    .await
}

/// Build the request from flags, or parse it from `--input` / stdin.
fn read_request(args: &ReconfigureArgs) -> Result<ChangeRequest> {
    if let Some(server) = &args.server {
        return Ok(ChangeRequest {
            server: server.clone(),
            ca_server: args.ca_server.clone().filter(|s| !s.trim().is_empty()),
            port: args.port,
            section: args.section.clone(),
            verify_connection: args.verify_connection,
        });
    }

    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    ChangeRequest::from_json(&text)
}
