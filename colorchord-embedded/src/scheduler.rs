//! The self-posting cooperative processing task.
//!
//! The platform's task dispatcher delivers one [`TaskEvent`] at a time. Each
//! invocation first re-posts an idle event, so the loop keeps running even
//! when the work below is skipped, then:
//!
//! 1. lets the [`ResourceGate`] observe the activity flag,
//! 2. drains every queued sample through the [`SampleConditioner`],
//!    handing each completed frame to [`FrameOutput`],
//! 3. forwards an idle tick to the service layer if the event was the idle
//!    self-post.
//!
//! Samples are conditioned strictly in arrival order and each frame is
//! emitted immediately on its 128th sample.

use crate::config::Settings;
use crate::control::{CommonServices, TickKind};
use crate::dsp::SampleConditioner;
use crate::gate::{GateState, ResourceGate, SamplingTimer};
use crate::io::SampleSource;
use crate::output::{AnalysisEngine, FrameOutput, LedDriver};
use crate::watchdog::DeferredStart;

/// A message delivered to the processing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskEvent {
    pub sig: u32,
    pub par: u32,
}

impl TaskEvent {
    /// The event the task posts to itself.
    pub const IDLE: TaskEvent = TaskEvent { sig: 0, par: 0 };

    pub const fn new(sig: u32, par: u32) -> Self {
        TaskEvent { sig, par }
    }

    /// Whether this is the idle self-post rather than an external signal.
    pub const fn is_idle(&self) -> bool {
        self.sig == 0 && self.par == 0
    }
}

/// Mutable state shared by the processing task and the watchdog.
///
/// Created once at boot and kept for the life of the process.
#[derive(Debug)]
pub struct ProcContext {
    pub conditioner: SampleConditioner,
    pub output: FrameOutput,
    pub gate: ResourceGate,
    pub deferred: DeferredStart,
}

impl ProcContext {
    pub const fn new(deferred: DeferredStart) -> Self {
        ProcContext {
            conditioner: SampleConditioner::new(),
            output: FrameOutput::new(),
            gate: ResourceGate::new(),
            deferred,
        }
    }
}

/// Borrowed collaborators the processing task works with.
pub struct Io<'a, S: ?Sized, E: ?Sized, L: ?Sized, T: ?Sized, C: ?Sized> {
    pub source: &'a mut S,
    pub engine: &'a mut E,
    pub leds: &'a mut L,
    pub timer: &'a mut T,
    pub services: &'a mut C,
}

/// What one invocation of the task did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Iteration {
    /// Samples drained and conditioned.
    pub samples: usize,
    /// Frame-complete signals raised.
    pub frames: usize,
    /// Gate transition observed, if any.
    pub gate: Option<GateState>,
    /// Whether the idle tick was forwarded.
    pub idle_tick: bool,
}

/// Single-slot event queue plus the task body.
#[derive(Debug, Default)]
pub struct TaskScheduler {
    slot: Option<TaskEvent>,
    dispatched: u32,
}

impl TaskScheduler {
    pub const fn new() -> Self {
        TaskScheduler {
            slot: None,
            dispatched: 0,
        }
    }

    /// Queue an event for the task.
    ///
    /// The queue holds one event. Posting into a full queue returns `false`
    /// and changes nothing; the pending event already guarantees another run.
    pub fn post(&mut self, event: TaskEvent) -> bool {
        if self.slot.is_some() {
            return false;
        }
        self.slot = Some(event);
        true
    }

    /// Whether an event is waiting to be dispatched.
    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    /// Invocations performed so far.
    pub fn dispatched(&self) -> u32 {
        self.dispatched
    }

    /// Dispatch the queued event, if there is one.
    pub fn run_pending<S, E, L, T, C>(
        &mut self,
        ctx: &mut ProcContext,
        settings: &Settings,
        io: &mut Io<'_, S, E, L, T, C>,
    ) -> Option<Iteration>
    where
        S: SampleSource + ?Sized,
        E: AnalysisEngine + ?Sized,
        L: LedDriver + ?Sized,
        T: SamplingTimer + ?Sized,
        C: CommonServices + ?Sized,
    {
        let event = self.slot.take()?;
        Some(self.dispatch(event, ctx, settings, io))
    }

    /// Run the task body for `event`.
    pub fn dispatch<S, E, L, T, C>(
        &mut self,
        event: TaskEvent,
        ctx: &mut ProcContext,
        settings: &Settings,
        io: &mut Io<'_, S, E, L, T, C>,
    ) -> Iteration
    where
        S: SampleSource + ?Sized,
        E: AnalysisEngine + ?Sized,
        L: LedDriver + ?Sized,
        T: SamplingTimer + ?Sized,
        C: CommonServices + ?Sized,
    {
        self.post(TaskEvent::IDLE);
        self.dispatched = self.dispatched.wrapping_add(1);

        let mut it = Iteration {
            gate: ctx.gate.evaluate(settings.colorchord_active, io.timer),
            ..Iteration::default()
        };

        while let Some(raw) = io.source.pop_sample() {
            it.samples += 1;
            if ctx.conditioner.consume(raw, settings.initial_amp, io.engine) {
                it.frames += 1;
                ctx.output.new_frame(settings, io.engine, io.leds);
            }
        }

        if event.is_idle() {
            io.services.tick(TickKind::Idle);
            it.idle_tick = true;
        }
        it
    }
}
