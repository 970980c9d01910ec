//! Execution routing: local assembly or remote delegation, by payload size.
//!
//! The route decision is a pure function of the total input size and the
//! configured ceilings; it is never duplicated elsewhere. Both destinations
//! run the identical [`Assembler`] contract, so the chosen path changes
//! where the work happens and which ceiling applies, never the produced
//! layout.
//!
//! Ceilings are checked before any image is decoded: a request that cannot
//! fit anywhere fails with a size-limit error without touching a pixel.

use crate::assemble::{Assembler, ConversionOutput};
use crate::config::{Limits, PdfOptions};
use crate::error::ConvertError;
use crate::input::{self, ImageInput};
use crate::remote::RemoteClient;
use tracing::info;

/// Where a conversion will execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPath {
    /// Assemble in this process.
    Local,
    /// Delegate to the configured remote endpoint.
    Remote,
}

/// Pick the execution path for a payload of `total` bytes.
///
/// Exactly at the local threshold still routes local; one byte over goes
/// remote. Without a remote endpoint an over-threshold payload is rejected
/// outright, and payloads beyond the remote ceiling are rejected even when
/// an endpoint exists.
pub fn decide(
    total: u64,
    limits: &Limits,
    remote_configured: bool,
) -> Result<ExecutionPath, ConvertError> {
    if total <= limits.max_local_bytes {
        return Ok(ExecutionPath::Local);
    }

    if !remote_configured {
        return Err(ConvertError::RemoteDisabled {
            total,
            limit: limits.max_local_bytes,
        });
    }

    if total <= limits.max_remote_bytes {
        Ok(ExecutionPath::Remote)
    } else {
        Err(ConvertError::PayloadTooLarge {
            total,
            limit: limits.max_remote_bytes,
        })
    }
}

/// Entry point for one conversion: validates, routes, and executes.
pub struct Router {
    limits: Limits,
    assembler: Assembler,
    remote: Option<RemoteClient>,
}

impl Router {
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            assembler: Assembler::new(),
            remote: None,
        }
    }

    /// Enable remote delegation for payloads above the local ceiling.
    pub fn with_remote(mut self, remote: RemoteClient) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Replace the local assembler (to attach an observer or cancel flag).
    pub fn with_assembler(mut self, assembler: Assembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Convert `images` into one PDF, locally or remotely.
    ///
    /// Options are clamped and inputs validated before the route decision;
    /// every failure happens before any processing begins.
    pub async fn convert(
        &self,
        images: Vec<ImageInput>,
        options: PdfOptions,
    ) -> Result<ConversionOutput, ConvertError> {
        let options = options.clamped();
        input::validate(&images, &self.limits)?;

        let total = input::total_size(&images);
        match decide(total, &self.limits, self.remote.is_some())? {
            ExecutionPath::Local => {
                info!(total, images = images.len(), "Routing to local assembly");
                self.assembler.assemble(images, options).await
            }
            ExecutionPath::Remote => match &self.remote {
                Some(remote) => {
                    info!(total, images = images.len(), "Routing to remote endpoint");
                    remote.convert(&images, &options).await
                }
                None => Err(ConvertError::RemoteDisabled {
                    total,
                    limit: self.limits.max_local_bytes,
                }),
            },
        }
    }
}
