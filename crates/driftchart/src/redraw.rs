//! Coalesced redraw scheduling.
//!
//! Gestures, resizes and new samples can arrive many times between two host
//! frames. Each one calls [`RedrawScheduler::request`]; only the first call
//! after a redraw moves the scheduler from `Idle` to `Pending` (and pokes the
//! host through the optional notifier), later calls just accumulate their
//! [`RedrawFlags`]. When the host reaches its frame boundary it calls
//! [`RedrawScheduler::fire`], which runs the redraw exactly once with the
//! union of the requested flags. The redraw reads chart state when it runs,
//! never a snapshot taken at request time.

use std::fmt;

bitflags::bitflags! {
    /// What changed since the last redraw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RedrawFlags: u8 {
        /// Samples changed: geometry must be rebuilt.
        const DATA = 0b0000_0001;
        /// Zoom or pan changed: only the transform needs updating.
        const VIEW = 0b0000_0010;
        /// Viewport was resized.
        const BOUNDS = 0b0000_0100;
    }
}

impl RedrawFlags {
    /// Check if path geometry must be rebuilt (not just re-transformed).
    pub fn needs_geometry_rebuild(&self) -> bool {
        self.contains(Self::DATA)
    }

    /// Check if only the transform changed.
    pub fn is_transform_only(&self) -> bool {
        !self.is_empty() && !self.contains(Self::DATA)
    }
}

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedrawState {
    /// Nothing scheduled.
    #[default]
    Idle,
    /// One redraw is scheduled for the next frame.
    Pending(RedrawFlags),
}

type Notifier = Box<dyn FnMut() + Send>;

/// Trailing-edge redraw debouncer.
#[derive(Default)]
pub struct RedrawScheduler {
    state: RedrawState,
    notifier: Option<Notifier>,
    /// Requests absorbed into an already pending redraw
    coalesced: u64,
    /// Redraws executed
    fired: u64,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scheduler that calls `notifier` on every `Idle -> Pending`
    /// transition, e.g. to ask the windowing layer for an animation frame.
    pub fn with_notifier<F>(notifier: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self {
            notifier: Some(Box::new(notifier)),
            ..Self::default()
        }
    }

    /// Install or replace the notifier, keeping state and counters.
    ///
    /// If a redraw is already pending the new notifier is called at once, so
    /// the host does not miss it.
    pub fn set_notifier<F>(&mut self, notifier: F)
    where
        F: FnMut() + Send + 'static,
    {
        let pending = self.is_pending();
        let notify = self.notifier.insert(Box::new(notifier));
        if pending {
            notify();
        }
    }

    /// Ask for a redraw.
    ///
    /// Returns `true` if this call scheduled a new redraw, `false` if it was
    /// merged into the pending one.
    pub fn request(&mut self, flags: RedrawFlags) -> bool {
        match self.state {
            RedrawState::Idle => {
                self.state = RedrawState::Pending(flags);
                if let Some(notify) = self.notifier.as_mut() {
                    notify();
                }
                true
            }
            RedrawState::Pending(pending) => {
                self.state = RedrawState::Pending(pending | flags);
                self.coalesced += 1;
                false
            }
        }
    }

    /// Take the pending flags, returning the scheduler to `Idle`.
    pub fn take(&mut self) -> Option<RedrawFlags> {
        match std::mem::take(&mut self.state) {
            RedrawState::Idle => None,
            RedrawState::Pending(flags) => {
                self.fired += 1;
                Some(flags)
            }
        }
    }

    /// Run `redraw` if a redraw is pending.
    ///
    /// The scheduler is back in `Idle` before `redraw` runs, so a request made
    /// while redrawing schedules the next frame.
    pub fn fire<R>(&mut self, redraw: impl FnOnce(RedrawFlags) -> R) -> Option<R> {
        self.take().map(redraw)
    }

    #[inline]
    pub fn state(&self) -> RedrawState {
        self.state
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, RedrawState::Pending(_))
    }

    /// Requests merged into an already pending redraw.
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }

    /// Redraws executed so far.
    pub fn fired_count(&self) -> u64 {
        self.fired
    }
}

impl fmt::Debug for RedrawScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedrawScheduler")
            .field("state", &self.state)
            .field("has_notifier", &self.notifier.is_some())
            .field("coalesced", &self.coalesced)
            .field("fired", &self.fired)
            .finish()
    }
}
