//! Headless host runtime
//!
//! A single task owns the clock, the loaded worlds, the roster and the
//! orchestrator. Everything else talks to it through [`HostHandle`], so world
//! state is only ever touched from this task. The daemon exchange is the one
//! piece of a cycle that runs elsewhere; its outcome comes back as an event.

pub mod clock;
pub mod roster;
pub mod world;

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use self::clock::SimClock;
use self::roster::{Participant, Position, Roster};
use self::world::World;
use crate::clock::ClockSource;
use crate::config::Config;
use crate::constants;
use crate::detector::DayEvent;
use crate::errors::HostError;
use crate::flusher::Flusher;
use crate::notify::NotificationSink;
use crate::orchestrator::{
    CyclePhase, CycleReport, CycleStart, ExchangeOutcome, Orchestrator, OrchestratorSettings,
    OrchestratorState, SnapshotResult, Trigger,
};
use crate::protocol::SnapshotClient;
use crate::sleep::SleepStatusProvider;

const EVENT_QUEUE_DEPTH: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, HostError>>;

enum HostCommand {
    Snapshot { invoker: String, reply: Reply<CycleReport> },
    Join { name: String, world: Option<String>, position: Position, reply: Reply<Participant> },
    Leave { name: String, reply: Reply<()> },
    Sleep { name: String, reply: Reply<()> },
    Wake { name: String, reply: Reply<()> },
    SetPosition { name: String, position: Position, reply: Reply<Participant> },
    Position { name: String, reply: Reply<String> },
    Status { reply: oneshot::Sender<HostStatus> },
}

enum HostEvent {
    Command(HostCommand),
    ExchangeFinished(ExchangeOutcome),
}

/// Point-in-time view of the host, served by the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct HostStatus {
    pub game_time: u64,
    pub full_time: u64,
    pub day: u64,
    pub cycle_time: u64,
    pub phase: CyclePhase,
    pub worlds: Vec<String>,
    pub participants: Vec<Participant>,
    pub last_departure_at_millis: Option<i64>,
    pub last_result: Option<SnapshotResult>,
}

/// Cloneable front door to the runtime task
#[derive(Clone)]
pub struct HostHandle {
    events: mpsc::Sender<HostEvent>,
}

impl HostHandle {
    /// Manual snapshot; resolves once the cycle has been reported
    pub async fn snapshot(&self, invoker: &str) -> Result<CycleReport, HostError> {
        let invoker = invoker.to_string();
        self.request(|reply| HostCommand::Snapshot { invoker, reply }).await
    }

    pub async fn join(&self, name: &str, world: Option<String>, position: Position) -> Result<Participant, HostError> {
        let name = name.to_string();
        self.request(|reply| HostCommand::Join { name, world, position, reply }).await
    }

    pub async fn leave(&self, name: &str) -> Result<(), HostError> {
        let name = name.to_string();
        self.request(|reply| HostCommand::Leave { name, reply }).await
    }

    pub async fn sleep(&self, name: &str) -> Result<(), HostError> {
        let name = name.to_string();
        self.request(|reply| HostCommand::Sleep { name, reply }).await
    }

    pub async fn wake(&self, name: &str) -> Result<(), HostError> {
        let name = name.to_string();
        self.request(|reply| HostCommand::Wake { name, reply }).await
    }

    pub async fn set_position(&self, name: &str, position: Position) -> Result<Participant, HostError> {
        let name = name.to_string();
        self.request(|reply| HostCommand::SetPosition { name, position, reply }).await
    }

    /// Position diagnostic: the participant announces where they are
    pub async fn position(&self, name: &str) -> Result<String, HostError> {
        let name = name.to_string();
        self.request(|reply| HostCommand::Position { name, reply }).await
    }

    pub async fn status(&self) -> Result<HostStatus, HostError> {
        let (tx, rx) = oneshot::channel();
        self.send(HostCommand::Status { reply: tx }).await?;
        rx.await.map_err(|_| HostError::Stopped)
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> HostCommand) -> Result<T, HostError> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await.map_err(|_| HostError::Stopped)?
    }

    async fn send(&self, command: HostCommand) -> Result<(), HostError> {
        self.events
            .send(HostEvent::Command(command))
            .await
            .map_err(|_| HostError::Stopped)
    }
}

pub struct HostRuntime<C, N> {
    config: Arc<Config>,
    clock: SimClock,
    worlds: Vec<World>,
    roster: Roster,
    orchestrator: Orchestrator<C, N>,
    sink: Arc<N>,
    pending_reply: Option<Reply<CycleReport>>,
    pending_ready_checks: Vec<String>,
    sleep_ticks: u64,
    events_tx: mpsc::Sender<HostEvent>,
    events_rx: mpsc::Receiver<HostEvent>,
}

impl<C, N> HostRuntime<C, N>
where
    C: SnapshotClient,
    N: NotificationSink + 'static,
{
    /// Load every configured world and restore the clock from the primary one
    pub fn new(config: Arc<Config>, client: Arc<C>, sink: Arc<N>) -> Result<(Self, HostHandle)> {
        let worlds = config
            .worlds
            .iter()
            .map(|w| World::load(&config.data_dir, &w.name))
            .collect::<Result<Vec<_>>>()?;

        let primary = worlds
            .first()
            .ok_or_else(|| anyhow!("At least one world must be configured"))?;
        let clock = SimClock::new(primary.level().game_time, primary.level().full_time);
        info!(
            "Host clock restored at game time {} (day {}, tick {})",
            clock.game_time(),
            clock.sample().day(),
            clock.sample().cycle_time()
        );

        let settings = OrchestratorSettings {
            departure_window_millis: config.departure_window_millis(),
            departure_command: config.departure_operator_command.clone(),
        };
        let orchestrator = Orchestrator::new(
            client,
            sink.clone(),
            settings,
            OrchestratorState::new(config.prewarn_window_ticks),
        );

        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let handle = HostHandle {
            events: events_tx.clone(),
        };

        Ok((
            Self {
                config,
                clock,
                worlds,
                roster: Roster::new(),
                orchestrator,
                sink,
                pending_reply: None,
                pending_ready_checks: Vec::new(),
                sleep_ticks: 0,
                events_tx,
                events_rx,
            },
            handle,
        ))
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn orchestrator(&self) -> &Orchestrator<C, N> {
        &self.orchestrator
    }

    /// Tick until `shutdown` resolves, then flush every world once more
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        let mut ticker = interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            "Host runtime started with {} worlds at {} ticks/s",
            self.worlds.len(),
            self.config.tick_rate_per_second
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => self.tick(),
                Some(event) = self.events_rx.recv() => self.handle_event(event),
            }
        }

        self.shutdown();
    }

    /// Advance the host by one tick
    pub fn tick(&mut self) {
        self.clock.advance();

        let ready_worlds = std::mem::take(&mut self.pending_ready_checks);
        for world in ready_worlds {
            if self.is_night()
                && self.roster.enough_sleeping(&world, self.config.players_sleeping_percentage)
            {
                self.orchestrator.on_ready(self.clock.sample());
            }
        }

        self.advance_night_skip();
        self.sync_world_clocks();

        if self.orchestrator.on_tick(self.clock.sample()) == DayEvent::Trigger {
            self.start_cycle(Trigger::Scheduled, None);
        }
    }

    /// Wait for the next queued command or exchange result and apply it
    pub async fn step(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Command(command) => self.handle_command(command),
            HostEvent::ExchangeFinished(outcome) => {
                let report = self
                    .orchestrator
                    .finish_cycle(outcome, Utc::now().timestamp_millis());
                if let Some(reply) = self.pending_reply.take() {
                    let _ = reply.send(Ok(report));
                }
            }
        }
    }

    fn handle_command(&mut self, command: HostCommand) {
        match command {
            HostCommand::Snapshot { invoker, reply } => {
                self.start_cycle(Trigger::Manual { invoker }, Some(reply));
            }
            HostCommand::Join { name, world, position, reply } => {
                let _ = reply.send(self.join(&name, world, position));
            }
            HostCommand::Leave { name, reply } => {
                let result = self.roster.leave(&name).map_err(HostError::from).map(|_| {
                    info!("{} left the game", name);
                    self.orchestrator
                        .record_departure(Utc::now().timestamp_millis());
                });
                let _ = reply.send(result);
            }
            HostCommand::Sleep { name, reply } => {
                let _ = reply.send(self.sleep(&name));
            }
            HostCommand::Wake { name, reply } => {
                let _ = reply.send(self.roster.wake(&name).map_err(HostError::from));
            }
            HostCommand::SetPosition { name, position, reply } => {
                let result = self
                    .roster
                    .set_position(&name, position)
                    .cloned()
                    .map_err(HostError::from);
                if let Ok(participant) = &result {
                    if let Some(world) = self.world_mut(&participant.world) {
                        world.set_participant(&participant.name, participant.position);
                    }
                }
                let _ = reply.send(result);
            }
            HostCommand::Position { name, reply } => {
                let result = match self.roster.get(&name) {
                    Some(participant) => {
                        let text = participant.describe_position();
                        self.sink.broadcast(&format!("<{}> {}", name, text));
                        Ok(text)
                    }
                    None => Err(HostError::from(roster::RosterError::NotOnline(name))),
                };
                let _ = reply.send(result);
            }
            HostCommand::Status { reply } => {
                let _ = reply.send(self.status());
            }
        }
    }

    fn join(&mut self, name: &str, world: Option<String>, position: Position) -> Result<Participant, HostError> {
        let world = match world {
            Some(world) => world,
            None => self.worlds[0].level().name.clone(),
        };
        if self.world_mut(&world).is_none() {
            return Err(HostError::UnknownWorld(world));
        }

        let participant = self.roster.join(name, &world, position)?.clone();
        if let Some(loaded) = self.world_mut(&world) {
            loaded.set_participant(name, position);
        }
        info!("{} joined {}", name, world);
        Ok(participant)
    }

    fn sleep(&mut self, name: &str) -> Result<(), HostError> {
        if self.roster.get(name).is_none() {
            return Err(roster::RosterError::NotOnline(name.to_string()).into());
        }
        if !self.is_night() {
            return Err(HostError::NotNight {
                cycle_time: self.clock.sample().cycle_time(),
            });
        }

        let world = self.roster.sleep(name)?;
        debug!("{} entered a bed in {}", name, world);
        // evaluated on the next tick, once the sleep state has settled
        self.pending_ready_checks.push(world);
        Ok(())
    }

    fn is_night(&self) -> bool {
        self.clock.sample().cycle_time() >= constants::clock::NIGHT_START
    }

    fn start_cycle(&mut self, trigger: Trigger, reply: Option<Reply<CycleReport>>) {
        self.sync_world_clocks();
        let game_time = self.clock.game_time();

        match self.orchestrator.begin_cycle(trigger, game_time, &mut self.worlds) {
            Err(e) => {
                if let Some(reply) = reply {
                    let _ = reply.send(Err(e.into()));
                }
            }
            Ok(CycleStart::Finished(report)) => {
                if let Some(reply) = reply {
                    let _ = reply.send(Ok(report));
                }
            }
            Ok(CycleStart::Exchange(pending)) => {
                self.pending_reply = reply;
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    let outcome = pending.execute().await;
                    if events.send(HostEvent::ExchangeFinished(outcome)).await.is_err() {
                        warn!("Host runtime stopped before the snapshot exchange finished");
                    }
                });
            }
        }
    }

    fn advance_night_skip(&mut self) {
        let primary = self.worlds[0].level().name.clone();
        if !self.is_night() {
            // sunrise gets everyone out of bed
            self.roster.wake_all(&primary);
            self.sleep_ticks = 0;
            return;
        }
        if !self
            .roster
            .enough_sleeping(&primary, self.config.players_sleeping_percentage)
        {
            self.sleep_ticks = 0;
            return;
        }

        self.sleep_ticks += 1;
        if self.sleep_ticks >= self.config.sleep_ticks_to_skip_night {
            info!("Enough participants asleep in {}, skipping the night", primary);
            self.clock.skip_to_next_day();
            self.roster.wake_all(&primary);
            self.sleep_ticks = 0;
        }
    }

    fn sync_world_clocks(&mut self) {
        let (game_time, full_time) = (self.clock.game_time(), self.clock.full_time());
        for world in self.worlds.iter_mut() {
            world.set_clock(game_time, full_time);
        }
    }

    fn world_mut(&mut self, name: &str) -> Option<&mut World> {
        self.worlds.iter_mut().find(|w| w.level().name == name)
    }

    fn status(&self) -> HostStatus {
        let sample = self.clock.sample();
        HostStatus {
            game_time: self.clock.game_time(),
            full_time: self.clock.full_time(),
            day: sample.day(),
            cycle_time: sample.cycle_time(),
            phase: self.orchestrator.phase(),
            worlds: self.worlds.iter().map(|w| w.level().name.clone()).collect(),
            participants: self.roster.online().cloned().collect(),
            last_departure_at_millis: self.orchestrator.state().activity.last_departure_at_millis(),
            last_result: self.orchestrator.last_result().cloned(),
        }
    }

    fn shutdown(&mut self) {
        if self.orchestrator.phase() != CyclePhase::Idle {
            warn!("Shutting down with snapshot cycle {}", self.orchestrator.phase());
        }
        if let Some(reply) = self.pending_reply.take() {
            let _ = reply.send(Err(HostError::Stopped));
        }

        self.sync_world_clocks();
        match Flusher::flush_all(&mut self.worlds) {
            Ok(report) => info!("Saved {} worlds on shutdown", report.domains.len()),
            Err(e) => error!("Failed to save worlds on shutdown: {}", e),
        }
    }
}

