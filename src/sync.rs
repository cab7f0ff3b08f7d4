// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Waiting on sync fences before CPU access.
//!
//! Before the CPU may touch a buffer, any GPU or display work writing to it must finish.
//! That work is represented by a sync fence: a file descriptor that signals on completion.
//!
//! The wait policy is fixed:
//!
//! 1. A negative descriptor means there is nothing to wait for.
//! 2. Wait up to [`INITIAL_TIMEOUT`].  A fence that takes this long usually means something
//!    is wrong, so it is reported.
//! 3. Wait again with no timeout.  If that fails too, give up.
//! 4. Optionally close the descriptor, only once the wait has succeeded.
//!
//! The policy lives in [`WaitPhase`] and [`FenceWaiter`].  The primitive that actually waits
//! ([`SyncPrimitive`]) and the place diagnostics go ([`Diagnostics`]) are parameters, so the
//! escalation can be exercised without a kernel fence.  [`FenceWaiter::new`] plugs in the
//! kernel and logwise.

use std::os::fd::RawFd;
use std::time::Duration;

use nix::errno::Errno;

use crate::error::FenceError;
use crate::sys::KernelSync;

/// How long the first wait may block before escalating to an unbounded wait.
pub const INITIAL_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    Bounded(Duration),
    Forever,
}

/// Something that can block on a fence descriptor and release it.
pub trait SyncPrimitive {
    /// Blocks until `fence` signals or `timeout` expires.  A timeout is an error (`ETIME`).
    fn wait(&self, fence: RawFd, timeout: Timeout) -> Result<(), Errno>;
    fn close(&self, fence: RawFd) -> Result<(), Errno>;
}

impl<P: SyncPrimitive + ?Sized> SyncPrimitive for &P {
    fn wait(&self, fence: RawFd, timeout: Timeout) -> Result<(), Errno> {
        (**self).wait(fence, timeout)
    }

    fn close(&self, fence: RawFd) -> Result<(), Errno> {
        (**self).close(fence)
    }
}

/// A noteworthy thing that happened while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// The bounded wait failed; an unbounded wait follows.
    TimedOut { fence: RawFd, errno: Errno },
    /// The unbounded wait failed.  Terminal.
    WaitFailed { fence: RawFd, errno: Errno },
    /// The fence signaled but the descriptor couldn't be closed.  Terminal.
    CloseFailed { fence: RawFd, errno: Errno },
}

/// Sink for [`SyncEvent`]s.
pub trait Diagnostics {
    fn report(&self, event: &SyncEvent);
}

impl<D: Diagnostics + ?Sized> Diagnostics for &D {
    fn report(&self, event: &SyncEvent) {
        (**self).report(event)
    }
}

/// Sends [`SyncEvent`]s to logwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogwiseDiagnostics;

impl Diagnostics for LogwiseDiagnostics {
    fn report(&self, event: &SyncEvent) {
        match *event {
            SyncEvent::TimedOut { fence, errno } => {
                logwise::warn_sync!(
                    "Timed out on sync wait for fence {fence}, err = {err}",
                    fence = logwise::privacy::LogIt(&fence),
                    err = logwise::privacy::LogIt(&errno)
                );
            }
            SyncEvent::WaitFailed { fence, errno } => {
                logwise::error_sync!(
                    "sync wait error on fence {fence} = {err}",
                    fence = logwise::privacy::LogIt(&fence),
                    err = logwise::privacy::LogIt(&errno)
                );
            }
            SyncEvent::CloseFailed { fence, errno } => {
                logwise::error_sync!(
                    "Unable to close fence fd {fence}, err = {err}",
                    fence = logwise::privacy::LogIt(&fence),
                    err = logwise::privacy::LogIt(&errno)
                );
            }
        }
    }
}

/// Where a fence wait currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPhase {
    BoundedWait,
    UnboundedWait,
    Done,
    Failed(Errno),
}

impl WaitPhase {
    /// The timeout to wait with in this phase, or `None` once terminal.
    pub fn timeout(self) -> Option<Timeout> {
        match self {
            WaitPhase::BoundedWait => Some(Timeout::Bounded(INITIAL_TIMEOUT)),
            WaitPhase::UnboundedWait => Some(Timeout::Forever),
            WaitPhase::Done | WaitPhase::Failed(_) => None,
        }
    }

    /// Applies the outcome of this phase's wait, returning the next phase and anything
    /// worth reporting.
    pub fn advance(self, fence: RawFd, outcome: Result<(), Errno>) -> (WaitPhase, Option<SyncEvent>) {
        match (self, outcome) {
            (WaitPhase::BoundedWait | WaitPhase::UnboundedWait, Ok(())) => (WaitPhase::Done, None),
            (WaitPhase::BoundedWait, Err(errno)) => (
                WaitPhase::UnboundedWait,
                Some(SyncEvent::TimedOut { fence, errno }),
            ),
            (WaitPhase::UnboundedWait, Err(errno)) => (
                WaitPhase::Failed(errno),
                Some(SyncEvent::WaitFailed { fence, errno }),
            ),
            (terminal, _) => (terminal, None),
        }
    }
}

/// Drives the [`WaitPhase`] policy over a [`SyncPrimitive`].
///
/// Stateless between calls; one waiter may be shared by any number of threads as long as
/// its parts allow it.
#[derive(Debug, Clone, Default)]
pub struct FenceWaiter<P = KernelSync, D = LogwiseDiagnostics> {
    primitive: P,
    diagnostics: D,
}

impl FenceWaiter {
    /// A waiter on kernel fences that logs through logwise.
    pub const fn new() -> Self {
        FenceWaiter {
            primitive: KernelSync,
            diagnostics: LogwiseDiagnostics,
        }
    }
}

impl<P: SyncPrimitive, D: Diagnostics> FenceWaiter<P, D> {
    pub fn with_parts(primitive: P, diagnostics: D) -> Self {
        FenceWaiter {
            primitive,
            diagnostics,
        }
    }

    /// Blocks until `fence` signals.
    ///
    /// This may block indefinitely; there is no cancellation.  With `close_after`, the
    /// descriptor is consumed on success and closed exactly once.  On a wait failure it is
    /// left open.
    pub fn wait(&self, fence: RawFd, close_after: bool) -> Result<(), FenceError> {
        if fence < 0 {
            return Ok(());
        }

        let mut phase = WaitPhase::BoundedWait;
        while let Some(timeout) = phase.timeout() {
            let outcome = self.primitive.wait(fence, timeout);
            let (next, event) = phase.advance(fence, outcome);
            if let Some(event) = event {
                self.diagnostics.report(&event);
            }
            phase = next;
        }
        if let WaitPhase::Failed(errno) = phase {
            return Err(FenceError::Wait(errno));
        }
        if close_after {
            if let Err(errno) = self.primitive.close(fence) {
                self.diagnostics.report(&SyncEvent::CloseFailed { fence, errno });
                return Err(FenceError::Close(errno));
            }
        }
        Ok(())
    }
}

/// Waits on a kernel fence, returning 0 on success or a negated errno.
///
/// This is the shape the gralloc entry points hand back to the framework.
pub fn sync_wait(fence: RawFd, close_fence: bool) -> i32 {
    match FenceWaiter::new().wait(fence, close_fence) {
        Ok(()) => 0,
        Err(e) => e.to_status(),
    }
}
