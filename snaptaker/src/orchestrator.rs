//! Backup orchestration: flush, snapshot exchange, reporting
//!
//! One cycle moves through
//! `Idle -> Flushing -> AwaitingProtocol -> {Reporting, Failed} -> Idle`.
//! Only one cycle may be in flight; a trigger that arrives meanwhile is
//! dropped and the invoker is told so.
//!
//! # Execution contexts
//!
//! The cycle is split so the host can keep world access exclusive:
//!
//! - [`Orchestrator::begin_cycle`] captures the label and flushes, on the
//!   context that owns world state.
//! - [`PendingExchange::execute`] performs the daemon exchange and owns
//!   nothing but the request, so it can run on any task.
//! - [`Orchestrator::finish_cycle`] reports and consults the departure
//!   tracker, back on the owning context.
//!
//! [`Orchestrator::run_snapshot`] chains the three for callers that do not
//! need the split.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::activity::ActivityTracker;
use crate::constants::activity::{DEFAULT_DEPARTURE_COMMAND, DEPARTURE_WINDOW_MILLIS};
use crate::constants::messages;
use crate::detector::{DayBoundaryDetector, DayEvent, TickSample};
use crate::errors::{OrchestratorError, ProtocolError};
use crate::flusher::{Flusher, PersistenceDomain};
use crate::notify::{Invoker, NotificationSink};
use crate::protocol::{success_detail, DaemonReply, SnapshotClient, SnapshotRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Trigger {
    /// Operator command; replies go to the named invoker
    Manual { invoker: String },
    /// Day rollover detected by the tick loop
    Scheduled,
}

impl Trigger {
    pub fn invoker(&self) -> Invoker {
        match self {
            Trigger::Manual { invoker } => Invoker::Remote(invoker.clone()),
            Trigger::Scheduled => Invoker::Console,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CyclePhase {
    Idle,
    Flushing,
    AwaitingProtocol,
    Reporting,
    Failed,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Flushing => "flushing",
            CyclePhase::AwaitingProtocol => "awaiting_protocol",
            CyclePhase::Reporting => "reporting",
            CyclePhase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Transient per-process state; nothing here survives a restart
#[derive(Debug, Clone, Default)]
pub struct OrchestratorState {
    pub detector: DayBoundaryDetector,
    pub activity: ActivityTracker,
}

impl OrchestratorState {
    pub fn new(prewarn_window: u64) -> Self {
        Self {
            detector: DayBoundaryDetector::with_prewarn_window(prewarn_window),
            activity: ActivityTracker::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub departure_window_millis: i64,
    pub departure_command: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            departure_window_millis: DEPARTURE_WINDOW_MILLIS,
            departure_command: DEFAULT_DEPARTURE_COMMAND.to_string(),
        }
    }
}

/// Outcome of one cycle; never persisted
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotResult {
    pub cycle_id: Uuid,
    pub label: String,
    pub trigger: Trigger,
    pub succeeded: bool,
    pub raw_response: String,
    pub save_duration_millis: u64,
    pub protocol_duration_millis: u64,
    pub error_kind: Option<String>,
    pub departure_notified: bool,
    pub finished_at: DateTime<Utc>,
}

impl SnapshotResult {
    /// Daemon detail after the success prefix
    pub fn detail(&self) -> Option<&str> {
        if !self.succeeded {
            return None;
        }
        success_detail(&self.raw_response)
    }
}

/// What the invoker was told plus the full result
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub message: String,
    pub result: SnapshotResult,
}

/// Result of the on-context half of a cycle
pub enum CycleStart<C> {
    /// Flush done; the exchange may now run off-context
    Exchange(PendingExchange<C>),
    /// Cycle already ended (flush failure)
    Finished(CycleReport),
}

/// A flushed cycle waiting for its daemon exchange
pub struct PendingExchange<C> {
    client: Arc<C>,
    cycle_id: Uuid,
    request: SnapshotRequest,
    trigger: Trigger,
    save_duration_millis: u64,
}

impl<C: SnapshotClient> PendingExchange<C> {
    pub fn request(&self) -> &SnapshotRequest {
        &self.request
    }

    pub async fn execute(self) -> ExchangeOutcome {
        let started = Instant::now();
        let reply = self.client.request_snapshot(&self.request).await;
        ExchangeOutcome {
            cycle_id: self.cycle_id,
            request: self.request,
            trigger: self.trigger,
            save_duration_millis: self.save_duration_millis,
            protocol_duration_millis: started.elapsed().as_millis() as u64,
            reply,
        }
    }
}

/// Finished daemon exchange, handed back to the owning context
#[derive(Debug)]
pub struct ExchangeOutcome {
    cycle_id: Uuid,
    request: SnapshotRequest,
    trigger: Trigger,
    save_duration_millis: u64,
    protocol_duration_millis: u64,
    reply: Result<DaemonReply, ProtocolError>,
}

pub struct Orchestrator<C, N> {
    client: Arc<C>,
    sink: Arc<N>,
    settings: OrchestratorSettings,
    state: OrchestratorState,
    phase: CyclePhase,
    last_result: Option<SnapshotResult>,
}

impl<C, N> Orchestrator<C, N>
where
    C: SnapshotClient,
    N: NotificationSink,
{
    pub fn new(
        client: Arc<C>,
        sink: Arc<N>,
        settings: OrchestratorSettings,
        state: OrchestratorState,
    ) -> Self {
        Self {
            client,
            sink,
            settings,
            state,
            phase: CyclePhase::Idle,
            last_result: None,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn state(&self) -> &OrchestratorState {
        &self.state
    }

    pub fn last_result(&self) -> Option<&SnapshotResult> {
        self.last_result.as_ref()
    }

    /// Feed one tick sample; broadcasts the pre-warning itself and returns
    /// the detector's intent so the caller can start a scheduled cycle.
    pub fn on_tick(&mut self, sample: TickSample) -> DayEvent {
        let event = self.state.detector.observe(sample);
        match event {
            DayEvent::PreWarn => {
                info!("Day {} ends soon, announcing backup", sample.day());
                self.sink.broadcast(messages::PREWARN);
            }
            DayEvent::Trigger => {
                info!("Day rollover detected at full time {}", sample.full_time());
            }
            DayEvent::None => {}
        }
        event
    }

    /// Secondary pre-warn path for the "enough participants sleeping" event
    pub fn on_ready(&mut self, sample: TickSample) -> DayEvent {
        let event = self.state.detector.observe_ready(sample);
        if event == DayEvent::PreWarn {
            info!("Enough participants ready on day {}, announcing backup", sample.day());
            self.sink.broadcast(messages::PREWARN);
        }
        event
    }

    pub fn record_departure(&mut self, at_millis: i64) {
        self.state.activity.record_departure(at_millis);
    }

    /// Capture the label and flush every domain. Must run on the context
    /// that owns `domains`.
    #[instrument(skip(self, domains))]
    pub fn begin_cycle<D: PersistenceDomain>(
        &mut self,
        trigger: Trigger,
        game_time: u64,
        domains: &mut [D],
    ) -> Result<CycleStart<C>, OrchestratorError> {
        if self.phase != CyclePhase::Idle {
            warn!(
                "Dropping {:?} snapshot trigger, cycle is {}",
                trigger, self.phase
            );
            self.sink.notify(&trigger.invoker(), messages::CYCLE_BUSY);
            return Err(OrchestratorError::Busy {
                phase: self.phase.to_string(),
            });
        }

        let cycle_id = Uuid::new_v4();
        let request = SnapshotRequest::from_game_time(game_time);
        info!("Starting snapshot cycle {} ({:?}) as {}", cycle_id, trigger, request.label);

        self.transition(CyclePhase::Flushing);
        let report = match Flusher::flush_all(domains) {
            Ok(report) => report,
            Err(e) => {
                let err = OrchestratorError::from(e);
                let report = self.report_failure(cycle_id, &request, trigger, 0, 0, String::new(), &err);
                return Ok(CycleStart::Finished(report));
            }
        };

        self.transition(CyclePhase::AwaitingProtocol);
        Ok(CycleStart::Exchange(PendingExchange {
            client: self.client.clone(),
            cycle_id,
            request,
            trigger,
            save_duration_millis: report.duration_millis,
        }))
    }

    /// Interpret the daemon exchange and notify. `now_millis` is the wall
    /// clock used for the departure heuristic.
    #[instrument(skip(self, outcome), fields(label = %outcome.request.label))]
    pub fn finish_cycle(&mut self, outcome: ExchangeOutcome, now_millis: i64) -> CycleReport {
        if self.phase != CyclePhase::AwaitingProtocol {
            warn!("Finishing cycle {} while {}", outcome.cycle_id, self.phase);
        }

        let ExchangeOutcome {
            cycle_id,
            request,
            trigger,
            save_duration_millis,
            protocol_duration_millis,
            reply,
        } = outcome;

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                let err = OrchestratorError::from(e);
                return self.report_failure(
                    cycle_id,
                    &request,
                    trigger,
                    save_duration_millis,
                    protocol_duration_millis,
                    String::new(),
                    &err,
                );
            }
        };

        if !reply.raw().is_empty() {
            info!("Response: {}", reply.raw());
        }

        if !reply.succeeded() {
            let err = OrchestratorError::DaemonRejected {
                label: request.label.clone(),
                response: reply.raw().to_string(),
            };
            return self.report_failure(
                cycle_id,
                &request,
                trigger,
                save_duration_millis,
                protocol_duration_millis,
                reply.into_raw(),
                &err,
            );
        }

        self.transition(CyclePhase::Reporting);
        let invoker = trigger.invoker();
        let message = format!(
            "Snapshot created: {} (save: {}ms, snapshot: {}ms)",
            reply.raw(),
            save_duration_millis,
            protocol_duration_millis
        );
        self.sink.notify(&invoker, &message);
        self.sink.broadcast(&format!(
            "Backup created: {} (save: {}ms, snapshot: {}ms)",
            request.label, save_duration_millis, protocol_duration_millis
        ));

        let departure_notified = self
            .state
            .activity
            .should_notify_departure(now_millis, self.settings.departure_window_millis);
        if departure_notified {
            info!("Participant left recently, notifying operator channel");
            self.sink.dispatch_operator_command(&self.settings.departure_command);
            self.state.activity.consume();
        }

        let result = SnapshotResult {
            cycle_id,
            label: request.label,
            trigger,
            succeeded: true,
            raw_response: reply.into_raw(),
            save_duration_millis,
            protocol_duration_millis,
            error_kind: None,
            departure_notified,
            finished_at: Utc::now(),
        };
        info!("Snapshot cycle {} completed: {}", cycle_id, result.label);

        self.complete(message, result)
    }

    /// Run one full cycle inline
    pub async fn run_snapshot<D: PersistenceDomain>(
        &mut self,
        trigger: Trigger,
        game_time: u64,
        domains: &mut [D],
        now_millis: impl FnOnce() -> i64,
    ) -> Result<CycleReport, OrchestratorError> {
        match self.begin_cycle(trigger, game_time, domains)? {
            CycleStart::Finished(report) => Ok(report),
            CycleStart::Exchange(pending) => {
                let outcome = pending.execute().await;
                Ok(self.finish_cycle(outcome, now_millis()))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn report_failure(
        &mut self,
        cycle_id: Uuid,
        request: &SnapshotRequest,
        trigger: Trigger,
        save_duration_millis: u64,
        protocol_duration_millis: u64,
        raw_response: String,
        err: &OrchestratorError,
    ) -> CycleReport {
        self.transition(CyclePhase::Failed);
        error!("Snapshot creation failed: {}", err);

        let message = match err {
            OrchestratorError::Flush(_) => messages::FLUSH_FAILED,
            OrchestratorError::DaemonRejected { .. } => messages::DAEMON_REJECTED,
            _ => messages::PROTOCOL_FAILED,
        }
        .to_string();

        self.sink.notify(&trigger.invoker(), &message);
        self.sink.broadcast(messages::BACKUP_FAILED_BROADCAST);

        let result = SnapshotResult {
            cycle_id,
            label: request.label.clone(),
            trigger,
            succeeded: false,
            raw_response,
            save_duration_millis,
            protocol_duration_millis,
            error_kind: Some(err.kind().to_string()),
            departure_notified: false,
            finished_at: Utc::now(),
        };

        self.complete(message, result)
    }

    fn complete(&mut self, message: String, result: SnapshotResult) -> CycleReport {
        self.last_result = Some(result.clone());
        self.transition(CyclePhase::Idle);
        CycleReport { message, result }
    }

    fn transition(&mut self, next: CyclePhase) {
        debug!("Cycle phase {} -> {}", self.phase, next);
        self.phase = next;
    }
}
