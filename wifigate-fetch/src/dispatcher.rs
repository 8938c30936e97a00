//! The resilient fetch dispatcher.
//!
//! The dispatcher takes one logical request, works out which bridges can
//! carry it, and either races them (first accepted response wins) or tries
//! them one after another. Every failed attempt is recorded and returned
//! with the result, so callers can show why the API was unreachable.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use wifigate_core::{
    ApiResponse, Bridge, BridgeFailure, DispatchMode, FailureReason, LogicalRequest, SkippedBridge,
};

use crate::error::{DispatchError, TransportError};
use crate::host::http::{HttpClient, Transport};
use crate::intercept::{Verdict, accept_status};
use crate::registry::BridgeRegistry;
use crate::settings::DispatchSettings;
use crate::transform::{ResponseUnwrap, transform, unwrap_envelope};

const REMEDIATION: &str = "Check that the API and relay hosts are on the hotspot's allow-list, \
or try again from a network without a captive portal.";

// ============================================================================
// Dispatch Outcome
// ============================================================================

/// The outcome of one dispatch.
///
/// Each dispatch builds a fresh outcome, so the log only ever describes the
/// call that produced it.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// The winning response or the aggregate failure.
    pub result: Result<ApiResponse, DispatchError>,
    /// Name of the bridge whose response was accepted.
    pub winner: Option<String>,
    /// Failed attempts, in the order they settled.
    pub log: Vec<BridgeFailure>,
    /// Bridges left out as incompatible with the request.
    pub skipped: Vec<SkippedBridge>,
    /// Total duration of the dispatch.
    pub duration: Duration,
}

impl DispatchOutcome {
    /// Returns true if a response was accepted.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the accepted response, if any.
    pub fn response(&self) -> Option<&ApiResponse> {
        self.result.as_ref().ok()
    }

    /// Returns the number of attempts that settled before the dispatch did.
    pub fn attempts_count(&self) -> usize {
        self.log.len() + usize::from(self.winner.is_some())
    }
}

enum Settlement {
    Won { bridge: String, response: ApiResponse },
    Exhausted,
    Abandoned(BridgeFailure),
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Sends logical requests over whichever bridge gets through.
pub struct Dispatcher {
    registry: RwLock<BridgeRegistry>,
    transport: Arc<dyn Transport>,
    settings: DispatchSettings,
}

impl Dispatcher {
    /// Creates a dispatcher from its parts.
    pub fn new(
        registry: BridgeRegistry,
        transport: Arc<dyn Transport>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            registry: RwLock::new(registry),
            transport,
            settings,
        }
    }

    /// Creates a builder for customizing the dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Returns the dispatch settings.
    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Returns a snapshot of the bridges in current preference order.
    pub fn bridges(&self) -> Vec<Bridge> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .bridges()
            .to_vec()
    }

    /// Dispatches `request` over every compatible bridge.
    ///
    /// Always settles with exactly one of a response or a
    /// [`DispatchError`]; never takes longer than
    /// [`DispatchSettings::worst_case`] plus scheduling overhead.
    #[instrument(skip(self, request), fields(method = %request.method, mode = %self.settings.mode))]
    pub async fn dispatch(&self, request: &LogicalRequest) -> DispatchOutcome {
        let start = Instant::now();
        let (bridges, skipped) = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .compatible_with(request);

        if bridges.is_empty() {
            warn!(skipped = skipped.len(), "No compatible bridge");
            return DispatchOutcome {
                result: Err(DispatchError::NoCompatibleBridge {
                    method: request.method,
                    skipped: skipped.clone(),
                }),
                winner: None,
                log: Vec::new(),
                skipped,
                duration: start.elapsed(),
            };
        }

        info!(count = bridges.len(), skipped = skipped.len(), "Dispatching request");

        let mut log = Vec::new();
        let settlement = match self.settings.mode {
            DispatchMode::Race => self.race(&bridges, request, &mut log).await,
            DispatchMode::Sequential => self.sequential(&bridges, request, &mut log).await,
        };

        let (result, winner) = match settlement {
            Settlement::Won { bridge, response } => {
                info!(bridge = %bridge, status = response.status, failures = log.len(), "Bridge accepted");
                if self.settings.mode == DispatchMode::Sequential && self.settings.promote_winner {
                    self.registry
                        .write()
                        .unwrap_or_else(PoisonError::into_inner)
                        .promote(&bridge);
                }
                (Ok(response), Some(bridge))
            }
            Settlement::Exhausted => {
                warn!(failures = log.len(), "All bridges failed");
                let error = DispatchError::AllBridgesFailed {
                    summary: summarize(&log),
                    failures: log.clone(),
                };
                (Err(error), None)
            }
            Settlement::Abandoned(failure) => {
                warn!(bridge = %failure.bridge, reason = %failure.reason, "Dispatch abandoned");
                (Err(DispatchError::Abandoned(failure)), None)
            }
        };

        DispatchOutcome {
            result,
            winner,
            log,
            skipped,
            duration: start.elapsed(),
        }
    }

    /// Polls every attempt concurrently on this task; the first accepted
    /// response wins and the rest are dropped, which aborts them.
    async fn race(
        &self,
        bridges: &[Bridge],
        request: &LogicalRequest,
        log: &mut Vec<BridgeFailure>,
    ) -> Settlement {
        let mut attempts: FuturesUnordered<_> = bridges
            .iter()
            .map(|bridge| async move { (bridge, self.attempt(bridge, request).await) })
            .collect();

        while let Some((bridge, result)) = attempts.next().await {
            match result {
                Ok(response) => {
                    return Settlement::Won {
                        bridge: bridge.name.clone(),
                        response,
                    };
                }
                Err(failure) => log.push(failure),
            }
        }

        Settlement::Exhausted
    }

    /// Tries bridges strictly in order.
    async fn sequential(
        &self,
        bridges: &[Bridge],
        request: &LogicalRequest,
        log: &mut Vec<BridgeFailure>,
    ) -> Settlement {
        for bridge in bridges {
            match self.attempt(bridge, request).await {
                Ok(response) => {
                    return Settlement::Won {
                        bridge: bridge.name.clone(),
                        response,
                    };
                }
                Err(failure) => {
                    if failure.reason.is_terminal() {
                        log.push(failure.clone());
                        return Settlement::Abandoned(failure);
                    }
                    log.push(failure);
                }
            }
        }

        Settlement::Exhausted
    }

    /// One attempt on one bridge: rewrite, send under a deadline, check for
    /// interception, unwrap, and apply the acceptance rule.
    async fn attempt(&self, bridge: &Bridge, request: &LogicalRequest) -> Result<ApiResponse, BridgeFailure> {
        let start = Instant::now();
        let fail = |reason: FailureReason| {
            let failure = BridgeFailure::new(bridge.name.clone(), reason, start.elapsed());
            warn!(
                bridge = %failure.bridge,
                reason = %failure.reason,
                duration = ?failure.elapsed,
                "Bridge failed"
            );
            failure
        };

        let outbound = transform(request, bridge, self.settings.post_encoding).map_err(fail)?;
        let deadline = self.settings.timeout_for(bridge);
        debug!(bridge = %bridge.name, url = %outbound.url, deadline = ?deadline, "Attempting bridge");

        let raw = match tokio::time::timeout(deadline, self.transport.send(&outbound)).await {
            Err(_) => return Err(fail(FailureReason::Timeout(deadline))),
            Ok(Err(error)) => return Err(fail(error.into_reason(deadline))),
            Ok(Ok(response)) => response,
        };

        if self.settings.detector.inspect(&raw) == Verdict::Intercepted {
            return Err(fail(FailureReason::Interception));
        }

        let (response, relay_attributable) = match outbound.unwrap {
            ResponseUnwrap::None => (raw, bridge.is_relayed()),
            ResponseUnwrap::JsonEnvelope => {
                if !raw.is_success() {
                    return Err(fail(FailureReason::HttpError(raw.status)));
                }
                (unwrap_envelope(&raw).map_err(fail)?, false)
            }
        };

        accept_status(&response, relay_attributable).map_err(fail)?;
        debug!(bridge = %bridge.name, status = response.status, duration = ?start.elapsed(), "Bridge answered");
        Ok(response)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn summarize(failures: &[BridgeFailure]) -> String {
    let trail = failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("Could not reach the API over any network path ({trail}). {REMEDIATION}")
}

// ============================================================================
// Dispatcher Builder
// ============================================================================

/// Builder for constructing a [`Dispatcher`].
pub struct DispatcherBuilder {
    registry: Option<BridgeRegistry>,
    transport: Option<Arc<dyn Transport>>,
    settings: DispatchSettings,
}

impl DispatcherBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            registry: None,
            transport: None,
            settings: DispatchSettings::default(),
        }
    }

    /// Sets the bridge registry.
    #[must_use]
    pub fn registry(mut self, registry: BridgeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the dispatch settings.
    #[must_use]
    pub fn settings(mut self, settings: DispatchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the mode.
    #[must_use]
    pub fn mode(mut self, mode: DispatchMode) -> Self {
        self.settings.mode = mode;
        self
    }

    /// Builds the dispatcher, creating an [`HttpClient`] if no transport
    /// was given.
    pub fn build(self) -> Result<Dispatcher, TransportError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpClient::new()?),
        };

        Ok(Dispatcher::new(
            self.registry.unwrap_or_default(),
            transport,
            self.settings,
        ))
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
