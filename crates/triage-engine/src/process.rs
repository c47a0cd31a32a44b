//! The `Process` trait — the extension point for simulated activities.

use triage_core::{ProcessId, ResourceId, SimTime};

use crate::kernel::ProcessTable;
use crate::{Grant, Preemption, Priority, Resource, ResourcePool, Scheduler, Wake};

/// Why a process is being resumed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Signal {
    /// First resumption, at the instant the process was spawned.
    Start,
    /// The `Hold` the process suspended on has elapsed.
    Timeout,
    /// The requested slot is now held.
    Granted(Grant),
    /// A slot this process held was taken by a more urgent request.  Any
    /// `Hold` the process was suspended on has been cancelled.
    Interrupted(Preemption),
}

/// What a process suspends on after handling a signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// Wait `delay` time units, then resume with [`Signal::Timeout`].
    Hold(f64),
    /// Wait for a slot on `resource`, then resume with [`Signal::Granted`].
    Request {
        resource: ResourceId,
        priority: Priority,
    },
    /// Terminate.  The process is dropped and never resumed again.
    Exit,
}

/// A cooperatively scheduled activity.
///
/// Implementations are explicit state machines: each call handles one
/// signal, performs any non-suspending work through the [`Context`]
/// (releasing slots, spawning processes, writing to the run's world state)
/// and returns the [`Step`] to suspend on.
///
/// `W` is the run-scoped world state shared by every process of a run.
///
/// # Example
///
/// ```rust,ignore
/// struct Ticker { period: f64 }
///
/// impl Process<Vec<SimTime>> for Ticker {
///     fn resume(&mut self, _signal: Signal, ctx: &mut Context<'_, Vec<SimTime>>) -> Step {
///         let now = ctx.now();
///         ctx.world().push(now);
///         Step::Hold(self.period)
///     }
/// }
/// ```
pub trait Process<W> {
    fn resume(&mut self, signal: Signal, ctx: &mut Context<'_, W>) -> Step;
}

/// What a process may touch while it is being resumed.
///
/// Built by the kernel for a single `resume` call.  All borrows end when the
/// call returns.
pub struct Context<'a, W> {
    pub(crate) me:        ProcessId,
    pub(crate) world:     &'a mut W,
    pub(crate) scheduler: &'a mut Scheduler,
    pub(crate) resources: &'a mut ResourcePool,
    pub(crate) processes: &'a mut ProcessTable<W>,
}

impl<W> Context<'_, W> {
    /// The process being resumed.
    #[inline]
    pub fn me(&self) -> ProcessId {
        self.me
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    /// Mutable access to the run's world state.
    #[inline]
    pub fn world(&mut self) -> &mut W {
        &mut *self.world
    }

    /// Read-only view of one resource.
    #[inline]
    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id]
    }

    /// Read-only view of all resources.
    #[inline]
    pub fn resources(&self) -> &ResourcePool {
        &*self.resources
    }

    /// Give back the slot held by `grant`.  If requests are waiting, a
    /// zero-delay allocation is scheduled at the current instant.
    pub fn release(&mut self, grant: &Grant) {
        let now = self.scheduler.now();
        if self.resources[grant.resource].release(now, grant.request) {
            self.scheduler.schedule(0.0, Wake::Allocate(grant.resource));
        }
    }

    /// Start a new process at the current instant.  The caller does not
    /// wait for it.
    pub fn spawn(&mut self, process: impl Process<W> + 'static) -> ProcessId {
        self.processes.install(Box::new(process), &mut *self.scheduler)
    }
}
