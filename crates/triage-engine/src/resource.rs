//! Finite-capacity resources with a wait queue.
//!
//! # Disciplines
//!
//! | Discipline   | Queue order                          | Preempts |
//! |--------------|--------------------------------------|----------|
//! | `Fifo`       | arrival order                        | no       |
//! | `Priority`   | priority ascending, then arrival     | no       |
//! | `Preemptive` | priority ascending, then arrival     | yes      |
//!
//! Lower priority values are more urgent.  A preemptive request whose
//! priority is strictly better than the worst priority currently holding a
//! slot takes that slot over; ties never preempt.  Among equally bad holders
//! the most recently granted one is evicted.
//!
//! # Slot hand-over
//!
//! [`Resource::release`] only frees the slot.  Handing it to the next queued
//! request is a separate step ([`Resource::allocate`]) that the kernel runs as
//! a zero-delay event at the same instant.  While that event is pending a new
//! request joins the queue instead of jumping it.

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use tracing::debug;
use triage_core::{ProcessId, RequestId, ResourceId, SimTime};

use crate::{EngineError, EngineResult, ResourceListener, ResourceSnapshot};

/// Request priority.  Lower is more urgent.
pub type Priority = i32;

/// Priority used when a caller has no opinion.
pub const DEFAULT_PRIORITY: Priority = 0;

/// Admission policy of a resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Discipline {
    #[default]
    Fifo,
    Priority,
    Preemptive,
}

/// An allocated slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grant {
    pub resource:   ResourceId,
    pub request:    RequestId,
    pub process:    ProcessId,
    pub priority:   Priority,
    pub granted_at: SimTime,
}

/// Delivered to a process whose slot was taken over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Preemption {
    pub resource: ResourceId,
    /// The process that lost its slot.
    pub victim:   ProcessId,
    /// The victim's revoked request; it must not be released.
    pub revoked:  RequestId,
    /// The process that took the slot.
    pub by:       ProcessId,
    /// Time the victim held the slot before it was taken.
    pub usage:    f64,
}

/// Outcome of [`Resource::request`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Admission {
    /// A slot was free and is now held.
    Granted(Grant),
    /// No slot available; the request waits in the queue.
    Queued(RequestId),
    /// A worse-priority holder was evicted and its slot handed over.
    Preempting { grant: Grant, preempted: Preemption },
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    request:  RequestId,
    process:  ProcessId,
    priority: Priority,
}

// ── Resource ──────────────────────────────────────────────────────────────────

/// A finite-capacity server with a wait queue.
///
/// Capacity is fixed for the lifetime of the resource.  The holder count
/// never exceeds it; a violation panics.
pub struct Resource {
    id:           ResourceId,
    name:         String,
    capacity:     usize,
    discipline:   Discipline,
    holders:      Vec<Grant>,
    /// Keyed by `(priority, request)`; FIFO resources key every entry with
    /// priority 0 so the request counter alone decides the order.
    queue:        BTreeMap<(Priority, RequestId), Pending>,
    next_request: RequestId,
    listeners:    Vec<Box<dyn ResourceListener>>,
}

impl Resource {
    /// Create a resource.  Fails if `capacity` is zero.
    pub fn new(
        id:         ResourceId,
        name:       impl Into<String>,
        capacity:   usize,
        discipline: Discipline,
    ) -> EngineResult<Self> {
        let name = name.into();
        if capacity == 0 {
            return Err(EngineError::ZeroCapacity { name });
        }
        Ok(Self {
            id,
            name,
            capacity,
            discipline,
            holders:      Vec::new(),
            queue:        BTreeMap::new(),
            next_request: RequestId(0),
            listeners:    Vec::new(),
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// Slots currently allocated.
    pub fn in_use(&self) -> usize {
        self.holders.len()
    }

    /// Requests waiting for a slot.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Grants currently holding a slot, in grant order.
    pub fn holders(&self) -> &[Grant] {
        &self.holders
    }

    pub fn snapshot(&self, at: SimTime) -> ResourceSnapshot {
        ResourceSnapshot {
            resource: self.id,
            at,
            in_use:   self.holders.len(),
            queued:   self.queue.len(),
            capacity: self.capacity,
        }
    }

    /// Register a listener.  Listeners fire in registration order.
    pub fn subscribe(&mut self, listener: Box<dyn ResourceListener>) {
        self.listeners.push(listener);
    }

    // ── Operations ────────────────────────────────────────────────────────

    /// Ask for one slot on behalf of `process`.
    pub fn request(&mut self, now: SimTime, process: ProcessId, priority: Priority) -> Admission {
        let request = self.next_request;
        self.next_request = request.next();

        let admission = if self.holders.len() < self.capacity && self.queue.is_empty() {
            Admission::Granted(self.hold(now, request, process, priority))
        } else if let Some(victim_idx) = self.preemption_victim(priority) {
            let victim = self.holders.remove(victim_idx);
            let preempted = Preemption {
                resource: self.id,
                victim:   victim.process,
                revoked:  victim.request,
                by:       process,
                usage:    now.since(victim.granted_at),
            };
            debug!(
                resource = %self.name, victim = %victim.process, by = %process,
                usage = preempted.usage, "slot preempted"
            );
            let grant = self.hold(now, request, process, priority);
            Admission::Preempting { grant, preempted }
        } else {
            let key = match self.discipline {
                Discipline::Fifo => (DEFAULT_PRIORITY, request),
                Discipline::Priority | Discipline::Preemptive => (priority, request),
            };
            self.queue.insert(key, Pending { request, process, priority });
            Admission::Queued(request)
        };

        let snapshot = self.snapshot(now);
        for l in &mut self.listeners {
            l.on_request(&snapshot);
        }
        admission
    }

    /// Free the slot held by `request`.
    ///
    /// Returns `true` if requests are waiting, i.e. the caller must schedule
    /// an allocation at the current instant.
    ///
    /// # Panics
    /// Panics if `request` does not hold a slot on this resource.
    pub fn release(&mut self, now: SimTime, request: RequestId) -> bool {
        let idx = self
            .holders
            .iter()
            .position(|g| g.request == request);
        let Some(idx) = idx else {
            panic!("release of {request} which holds no slot on resource {:?}", self.name);
        };
        self.holders.remove(idx);

        let snapshot = self.snapshot(now);
        for l in &mut self.listeners {
            l.on_release(&snapshot);
        }
        !self.queue.is_empty()
    }

    /// Hand one free slot to the head of the queue, if both exist.
    ///
    /// Call repeatedly until it returns `None`.
    pub fn allocate(&mut self, now: SimTime) -> Option<Grant> {
        if self.holders.len() >= self.capacity {
            return None;
        }
        let (_, next) = self.queue.pop_first()?;
        Some(self.hold(now, next.request, next.process, next.priority))
    }

    /// Notify listeners that `grant` was obtained.  The kernel calls this
    /// exactly once per grant, right before resuming the grantee.
    pub fn confirm_grant(&mut self, now: SimTime, grant: &Grant) {
        let snapshot = self.snapshot(now);
        for l in &mut self.listeners {
            l.on_grant(&snapshot, grant);
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn hold(
        &mut self,
        now:      SimTime,
        request:  RequestId,
        process:  ProcessId,
        priority: Priority,
    ) -> Grant {
        assert!(
            self.holders.len() < self.capacity,
            "resource {:?} over-allocated: {} holders, capacity {}",
            self.name,
            self.holders.len() + 1,
            self.capacity,
        );
        let grant = Grant { resource: self.id, request, process, priority, granted_at: now };
        self.holders.push(grant);
        grant
    }

    /// Index of the holder a request with `priority` may evict, if any.
    fn preemption_victim(&self, priority: Priority) -> Option<usize> {
        if self.discipline != Discipline::Preemptive || self.holders.len() < self.capacity {
            return None;
        }
        // Worst priority first, then latest grant.
        let (idx, worst) = self
            .holders
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.priority
                    .cmp(&b.priority)
                    .then(a.granted_at.cmp(&b.granted_at))
                    .then(a.request.cmp(&b.request))
            })?;
        (worst.priority > priority).then_some(idx)
    }
}

// ── ResourcePool ──────────────────────────────────────────────────────────────

/// All resources of one run, indexed by [`ResourceId`].
#[derive(Default)]
pub struct ResourcePool {
    resources: Vec<Resource>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resource and return its id.
    pub fn add(
        &mut self,
        name:       impl Into<String>,
        capacity:   usize,
        discipline: Discipline,
    ) -> EngineResult<ResourceId> {
        let id = ResourceId::try_from(self.resources.len())
            .map_err(|_| EngineError::TooManyResources(self.resources.len()))?;
        self.resources.push(Resource::new(id, name, capacity, discipline)?);
        Ok(id)
    }

    pub fn get(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Index<ResourceId> for ResourcePool {
    type Output = Resource;

    fn index(&self, id: ResourceId) -> &Resource {
        &self.resources[id.index()]
    }
}

impl IndexMut<ResourceId> for ResourcePool {
    fn index_mut(&mut self, id: ResourceId) -> &mut Resource {
        &mut self.resources[id.index()]
    }
}
