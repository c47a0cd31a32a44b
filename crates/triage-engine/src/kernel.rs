//! The `Kernel` struct and its dispatch loop.

use tracing::{debug, trace};
use triage_core::{ProcessId, ResourceId, SimTime};

use crate::{
    Admission, Context, Discipline, EngineResult, Preemption, Process, Resource, ResourcePool,
    Scheduler, Signal, Step, Wake,
};

// ── Process table ─────────────────────────────────────────────────────────────

struct Slot<W> {
    /// `None` while the process is being resumed, and while the slot is free.
    process: Option<Box<dyn Process<W>>>,
    /// Bumped on every interrupt and on exit so that a cancelled timeout is
    /// recognised as stale when it eventually pops.
    token:   u64,
}

/// Every live process of a run, indexed by [`ProcessId`].  Slots of exited
/// processes are handed to later spawns.
pub(crate) struct ProcessTable<W> {
    slots: Vec<Slot<W>>,
    free:  Vec<ProcessId>,
    live:  usize,
}

impl<W> ProcessTable<W> {
    fn new() -> Self {
        Self { slots: Vec::new(), free: Vec::new(), live: 0 }
    }

    /// Add a process and schedule its `Start` at the current instant.
    pub(crate) fn install(
        &mut self,
        process:   Box<dyn Process<W>>,
        scheduler: &mut Scheduler,
    ) -> ProcessId {
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id.index()].process = Some(process);
                id
            }
            None => {
                let Ok(id) = ProcessId::try_from(self.slots.len()) else {
                    panic!("process table exhausted at {} live processes", self.live);
                };
                self.slots.push(Slot { process: Some(process), token: 0 });
                id
            }
        };
        self.live += 1;
        let token = self.slots[id.index()].token;
        scheduler.schedule(0.0, Wake::Resume { process: id, token, signal: Signal::Start });
        id
    }

    /// Retire the slot of an exited process.  Bumping the token turns any
    /// wake-up still addressed to it into a stale one.
    fn retire(&mut self, id: ProcessId) {
        self.slots[id.index()].token += 1;
        self.free.push(id);
        self.live -= 1;
    }
}

// ── RunStats ──────────────────────────────────────────────────────────────────

/// What [`Kernel::run_until`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunStats {
    /// Events popped and dispatched (stale wake-ups included).
    pub events:         u64,
    /// Clock value when the run stopped.
    pub stopped_at:     SimTime,
    /// Processes spawned but not yet exited.  Those left suspended at the
    /// horizon are simply never observed again.
    pub live_processes: usize,
    /// Events still queued at or after the horizon.
    pub pending_events: usize,
    /// Size of the process table.  Bounded by the peak number of live
    /// processes, not by the number ever spawned.
    pub process_slots:  usize,
}

// ── Kernel ────────────────────────────────────────────────────────────────────

/// One simulation run's scheduler, resources, processes and world state.
///
/// Each run owns a private kernel; nothing is shared between kernels, so
/// independent runs may execute on different threads.
///
/// ```rust,ignore
/// let mut kernel = Kernel::new(MyWorld::default());
/// let desk = kernel.add_resource("desk", 1, Discipline::Fifo)?;
/// kernel.spawn(Customer::new(desk));
/// kernel.run_until(SimTime::new(60.0));
/// let world = kernel.into_world();
/// ```
pub struct Kernel<W> {
    scheduler:  Scheduler,
    resources:  ResourcePool,
    processes:  ProcessTable<W>,
    world:      W,
    dispatched: u64,
}

impl<W> Kernel<W> {
    pub fn new(world: W) -> Self {
        Self {
            scheduler:  Scheduler::new(),
            resources:  ResourcePool::new(),
            processes:  ProcessTable::new(),
            world,
            dispatched: 0,
        }
    }

    // ── Set-up ────────────────────────────────────────────────────────────

    /// Create a resource owned by this run.
    pub fn add_resource(
        &mut self,
        name:       impl Into<String>,
        capacity:   usize,
        discipline: Discipline,
    ) -> EngineResult<ResourceId> {
        self.resources.add(name, capacity, discipline)
    }

    /// Mutable access to a resource, e.g. to subscribe a listener.
    pub fn resource_mut(&mut self, id: ResourceId) -> &mut Resource {
        &mut self.resources[id]
    }

    /// Start `process` at the current instant.
    pub fn spawn(&mut self, process: impl Process<W> + 'static) -> ProcessId {
        self.processes.install(Box::new(process), &mut self.scheduler)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    pub fn resources(&self) -> &ResourcePool {
        &self.resources
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Consume the kernel and hand back the world state.
    pub fn into_world(self) -> W {
        self.world
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Dispatch every event due strictly before `horizon`, then move the
    /// clock to `horizon`.
    ///
    /// Processes still suspended at the horizon stay suspended; this is not
    /// an error.  Calling again with a later horizon continues the run.
    pub fn run_until(&mut self, horizon: SimTime) -> RunStats {
        let start = self.dispatched;
        while let Some(wake) = self.scheduler.next_due(horizon) {
            self.dispatched += 1;
            self.dispatch(wake);
        }
        self.scheduler.finish_at(horizon);

        let stats = RunStats {
            events:         self.dispatched - start,
            stopped_at:     self.scheduler.now(),
            live_processes: self.processes.live,
            pending_events: self.scheduler.pending(),
            process_slots:  self.processes.slots.len(),
        };
        debug!(
            events = stats.events, live = stats.live_processes,
            pending = stats.pending_events, "stopped at {}", stats.stopped_at
        );
        stats
    }

    // ── Core dispatch ─────────────────────────────────────────────────────

    fn dispatch(&mut self, wake: Wake) {
        match wake {
            Wake::Resume { process, token, signal } => {
                let current = self.processes.slots[process.index()].token;
                if current != token {
                    trace!(%process, token, current, "dropping superseded wake-up");
                    return;
                }
                self.drive(process, signal);
            }
            Wake::Allocate(resource) => {
                let now = self.scheduler.now();
                while let Some(grant) = self.resources[resource].allocate(now) {
                    self.resources[resource].confirm_grant(now, &grant);
                    trace!(process = %grant.process, %resource, "slot handed over from queue");
                    self.drive(grant.process, Signal::Granted(grant));
                }
            }
        }
    }

    /// Resume `pid` with `signal` and keep resuming it until it suspends on
    /// something that cannot complete at the current instant.
    fn drive(&mut self, pid: ProcessId, mut signal: Signal) {
        let Some(mut process) = self.processes.slots[pid.index()].process.take() else {
            trace!(%pid, "wake-up for a process that already exited");
            return;
        };

        let keep = loop {
            let step = {
                let mut ctx = Context {
                    me:        pid,
                    world:     &mut self.world,
                    scheduler: &mut self.scheduler,
                    resources: &mut self.resources,
                    processes: &mut self.processes,
                };
                process.resume(signal, &mut ctx)
            };
            let now = self.scheduler.now();

            match step {
                Step::Hold(delay) => {
                    let token = self.processes.slots[pid.index()].token;
                    self.scheduler.schedule(
                        delay,
                        Wake::Resume { process: pid, token, signal: Signal::Timeout },
                    );
                    break true;
                }

                Step::Request { resource, priority } => {
                    match self.resources[resource].request(now, pid, priority) {
                        Admission::Granted(grant) => {
                            self.resources[resource].confirm_grant(now, &grant);
                            signal = Signal::Granted(grant);
                        }
                        Admission::Queued(_) => break true,
                        Admission::Preempting { grant, preempted } => {
                            self.interrupt(preempted);
                            self.resources[resource].confirm_grant(now, &grant);
                            signal = Signal::Granted(grant);
                        }
                    }
                }

                Step::Exit => break false,
            }
        };

        if keep {
            self.processes.slots[pid.index()].process = Some(process);
        } else {
            self.processes.retire(pid);
            trace!(%pid, "process exited");
        }
    }

    /// Cancel the victim's pending timeout and deliver the interrupt as a
    /// zero-delay event.
    fn interrupt(&mut self, preempted: Preemption) {
        let slot = &mut self.processes.slots[preempted.victim.index()];
        slot.token += 1;
        let token = slot.token;
        self.scheduler.schedule(
            0.0,
            Wake::Resume {
                process: preempted.victim,
                token,
                signal:  Signal::Interrupted(preempted),
            },
        );
    }
}
