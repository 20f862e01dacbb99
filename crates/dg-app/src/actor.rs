//! Simulation actor.
//!
//! One thread owns the `Simulation` and the `TickScheduler`. Every producer
//! (operator handles, the report worker, the timers) reaches it through a
//! single command channel, so all updates are applied serially and every
//! query answers from the latest state.

use std::ops::ControlFlow;
use std::sync::mpsc::{
    Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError, channel, sync_channel,
};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use dg_controls::{AlertLevel, ControlMode, JogConfig, JogDirection};
use dg_sim::{
    AlertChange, Simulation, SimulationConfig, SimulationSnapshot, SystemState, Tariffs,
    WateringOrder,
};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::report::{OrderReport, OrderReporter, ReportMessage, ReportWorker};
use crate::scheduler::{ScheduledAction, TickScheduler};

/// Event pushed to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Tick(SystemState),
    AlertChanged(AlertChange),
    ModeChanged(ControlMode),
    RunningChanged(bool),
    OrderStarted(WateringOrder),
    OrderCompleted(WateringOrder),
    OrderCancelled(WateringOrder),
    Report(ReportMessage),
}

/// Answer to a status query.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub state: SystemState,
    pub mode: ControlMode,
    pub running: bool,
    pub alert: AlertLevel,
    pub config: SimulationConfig,
    pub tariffs: Tariffs,
    pub active_order: Option<WateringOrder>,
    pub last_completed: Option<WateringOrder>,
}

type Reply<T> = Sender<AppResult<T>>;

pub enum Command {
    Start,
    Stop,
    /// Advance one tick immediately, running or not.
    Step { reply: Reply<SystemState> },
    SetMode(ControlMode),
    SetTargetLevel { level: f64, reply: Reply<()> },
    SetSimulationSpeed { speed_ms: u64, reply: Reply<()> },
    SetRain {
        is_raining: bool,
        intensity: f64,
        reply: Reply<()>,
    },
    SetElecRate {
        rate_per_kwh: f64,
        reply: Reply<()>,
    },
    JogPress(JogDirection),
    JogRelease,
    StartOrder {
        client_name: String,
        hectares: f64,
        reply: Reply<WateringOrder>,
    },
    CancelOrder { reply: Reply<WateringOrder> },
    Status { reply: Sender<SessionStatus> },
    Snapshot { reply: Sender<SimulationSnapshot> },
    Subscribe(SyncSender<SimEvent>),
    Report(ReportMessage),
    Shutdown,
}

/// Optional collaborators of the actor.
#[derive(Default)]
pub struct ActorOptions {
    pub jog: JogConfig,
    /// Export collaborator for completed orders
    pub reporter: Option<Box<dyn OrderReporter>>,
}

struct Actor {
    sim: Simulation,
    scheduler: TickScheduler,
    jog: JogConfig,
    subscribers: Vec<SyncSender<SimEvent>>,
    reports: Option<ReportWorker>,
}

impl Actor {
    fn run(mut self, rx: Receiver<Command>) -> Simulation {
        loop {
            let command = match self.scheduler.timeout(Instant::now()) {
                Some(timeout) => match rx.recv_timeout(timeout) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match rx.recv() {
                    Ok(command) => Some(command),
                    Err(_) => break,
                },
            };
            if let Some(command) = command {
                if self.handle(command).is_break() {
                    break;
                }
            }
            self.run_due(Instant::now());
        }

        if let Some(worker) = self.reports.take() {
            worker.shutdown();
        }
        info!(tick = self.sim.state().tick, "simulation actor stopped");
        self.sim
    }

    fn handle(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Start => {
                if self.scheduler.start(Instant::now()) {
                    self.publish(SimEvent::RunningChanged(true));
                }
            }
            Command::Stop => {
                if self.scheduler.stop() {
                    self.publish(SimEvent::RunningChanged(false));
                }
            }
            Command::Step { reply } => {
                let result = self.tick().map(|_| self.sim.state().clone());
                let _ = reply.send(result);
            }
            Command::SetMode(mode) => {
                if mode != self.sim.mode() {
                    self.sim.set_mode(mode);
                    if mode == ControlMode::Auto {
                        self.scheduler.release_jog();
                    }
                    self.publish(SimEvent::ModeChanged(mode));
                }
            }
            Command::SetTargetLevel { level, reply } => {
                let _ = reply.send(self.rejecting(|sim| sim.set_target_level(level)));
            }
            Command::SetSimulationSpeed { speed_ms, reply } => {
                let result = self.rejecting(|sim| sim.set_simulation_speed(speed_ms));
                if result.is_ok() {
                    self.scheduler.set_tick_period(speed_ms, Instant::now());
                }
                let _ = reply.send(result);
            }
            Command::SetRain {
                is_raining,
                intensity,
                reply,
            } => {
                let _ = reply.send(self.rejecting(|sim| sim.set_rain(is_raining, intensity)));
            }
            Command::SetElecRate {
                rate_per_kwh,
                reply,
            } => {
                let _ = reply.send(self.rejecting(|sim| sim.set_elec_rate(rate_per_kwh)));
            }
            Command::JogPress(direction) => {
                if self.sim.mode() == ControlMode::Manual {
                    self.sim.jog(direction, self.jog.press_step);
                    self.scheduler.press_jog(direction, Instant::now());
                } else {
                    debug!(?direction, "jog press ignored in AUTO mode");
                }
            }
            Command::JogRelease => self.scheduler.release_jog(),
            Command::StartOrder {
                client_name,
                hectares,
                reply,
            } => {
                let result = self.sim.start_order(&client_name, hectares);
                if let Ok(order) = &result {
                    self.publish(SimEvent::OrderStarted(order.clone()));
                }
                let _ = reply.send(result.map_err(AppError::from));
            }
            Command::CancelOrder { reply } => {
                let result = self.sim.cancel_order();
                if let Ok(order) = &result {
                    self.publish(SimEvent::OrderCancelled(order.clone()));
                }
                let _ = reply.send(result.map_err(AppError::from));
            }
            Command::Status { reply } => {
                let _ = reply.send(self.status());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.sim.snapshot());
            }
            Command::Subscribe(subscriber) => self.subscribers.push(subscriber),
            Command::Report(message) => self.publish(SimEvent::Report(message)),
            Command::Shutdown => {
                self.scheduler.stop();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn rejecting<F>(&mut self, apply: F) -> AppResult<()>
    where
        F: FnOnce(&mut Simulation) -> dg_sim::SimResult<()>,
    {
        apply(&mut self.sim).map_err(|e| {
            warn!(error = %e, "command rejected");
            AppError::from(e)
        })
    }

    fn run_due(&mut self, now: Instant) {
        for action in self.scheduler.poll(now) {
            match action {
                ScheduledAction::JogRepeat(direction) => {
                    self.sim.jog(direction, self.jog.repeat_step);
                }
                ScheduledAction::Tick => {
                    if let Err(e) = self.tick() {
                        error!(error = %e, "tick failed, stopping scheduler");
                        if self.scheduler.stop() {
                            self.publish(SimEvent::RunningChanged(false));
                        }
                    }
                }
            }
        }
    }

    fn tick(&mut self) -> AppResult<()> {
        let summary = self.sim.tick()?;
        self.publish(SimEvent::Tick(summary.state));
        if let Some(change) = summary.alert_change {
            self.publish(SimEvent::AlertChanged(change));
        }
        if let Some(order) = summary.completed {
            self.submit_report(&order);
            self.publish(SimEvent::OrderCompleted(order));
        }
        Ok(())
    }

    fn submit_report(&self, order: &WateringOrder) {
        let Some(worker) = &self.reports else {
            return;
        };
        let queued = OrderReport::from_order(order, self.sim.tariffs())
            .and_then(|report| worker.submit(report));
        if let Err(e) = queued {
            warn!(id = %order.id, error = %e, "order report not queued");
        }
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.sim.state().clone(),
            mode: self.sim.mode(),
            running: self.scheduler.is_running(),
            alert: self.sim.alert_level(),
            config: self.sim.config().clone(),
            tariffs: self.sim.tariffs().clone(),
            active_order: self.sim.active_order().cloned(),
            last_completed: self.sim.last_completed().cloned(),
        }
    }

    /// Deliver to every subscriber without blocking. Lagging subscribers miss
    /// events; disconnected ones are dropped.
    fn publish(&mut self, event: SimEvent) {
        self.subscribers
            .retain(|subscriber| match subscriber.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    debug!("subscriber lagging, event dropped");
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
    }
}

/// Handle to a running simulation actor.
pub struct SimulationHandle {
    tx: Sender<Command>,
    thread: Option<JoinHandle<Simulation>>,
}

impl SimulationHandle {
    pub fn spawn(sim: Simulation, options: ActorOptions) -> AppResult<Self> {
        options
            .jog
            .validate()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        let (tx, rx) = channel();
        let reports = options.reporter.map(|reporter| {
            let tx = tx.clone();
            ReportWorker::start(reporter, move |message| {
                let _ = tx.send(Command::Report(message));
            })
        });

        let actor = Actor {
            scheduler: TickScheduler::new(sim.config().simulation_speed_ms, &options.jog),
            sim,
            jog: options.jog,
            subscribers: Vec::new(),
            reports,
        };
        let thread = thread::Builder::new()
            .name("dg-sim-actor".to_string())
            .spawn(move || actor.run(rx))?;

        Ok(Self {
            tx,
            thread: Some(thread),
        })
    }

    pub fn send(&self, command: Command) -> AppResult<()> {
        self.tx.send(command).map_err(|_| AppError::ActorStopped)
    }

    fn request<T>(&self, make: impl FnOnce(Sender<T>) -> Command) -> AppResult<T> {
        let (reply, rx) = channel();
        self.send(make(reply))?;
        rx.recv().map_err(|_| AppError::ActorStopped)
    }

    pub fn start(&self) -> AppResult<()> {
        self.send(Command::Start)
    }

    pub fn stop(&self) -> AppResult<()> {
        self.send(Command::Stop)
    }

    pub fn step(&self) -> AppResult<SystemState> {
        self.request(|reply| Command::Step { reply })?
    }

    pub fn set_mode(&self, mode: ControlMode) -> AppResult<()> {
        self.send(Command::SetMode(mode))
    }

    pub fn set_target_level(&self, level: f64) -> AppResult<()> {
        self.request(|reply| Command::SetTargetLevel { level, reply })?
    }

    pub fn set_simulation_speed(&self, speed_ms: u64) -> AppResult<()> {
        self.request(|reply| Command::SetSimulationSpeed { speed_ms, reply })?
    }

    pub fn set_rain(&self, is_raining: bool, intensity: f64) -> AppResult<()> {
        self.request(|reply| Command::SetRain {
            is_raining,
            intensity,
            reply,
        })?
    }

    pub fn set_elec_rate(&self, rate_per_kwh: f64) -> AppResult<()> {
        self.request(|reply| Command::SetElecRate {
            rate_per_kwh,
            reply,
        })?
    }

    pub fn jog_press(&self, direction: JogDirection) -> AppResult<()> {
        self.send(Command::JogPress(direction))
    }

    pub fn jog_release(&self) -> AppResult<()> {
        self.send(Command::JogRelease)
    }

    pub fn start_order(&self, client_name: &str, hectares: f64) -> AppResult<WateringOrder> {
        let client_name = client_name.to_string();
        self.request(|reply| Command::StartOrder {
            client_name,
            hectares,
            reply,
        })?
    }

    pub fn cancel_order(&self) -> AppResult<WateringOrder> {
        self.request(|reply| Command::CancelOrder { reply })?
    }

    pub fn status(&self) -> AppResult<SessionStatus> {
        self.request(|reply| Command::Status { reply })
    }

    pub fn snapshot(&self) -> AppResult<SimulationSnapshot> {
        self.request(|reply| Command::Snapshot { reply })
    }

    /// Subscribe to events. At most `capacity` undelivered events are
    /// buffered; further events are dropped for this subscriber.
    pub fn subscribe(&self, capacity: usize) -> AppResult<Receiver<SimEvent>> {
        let (tx, rx) = sync_channel(capacity.max(1));
        self.send(Command::Subscribe(tx))?;
        Ok(rx)
    }

    /// Stop the actor and take back the simulation.
    pub fn shutdown(mut self) -> AppResult<Simulation> {
        self.join()
    }

    fn join(&mut self) -> AppResult<Simulation> {
        let thread = self.thread.take().ok_or(AppError::ActorStopped)?;
        let _ = self.tx.send(Command::Shutdown);
        thread
            .join()
            .map_err(|_| AppError::Simulation("simulation actor panicked".to_string()))
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.join();
        }
    }
}
