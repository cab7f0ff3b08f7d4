// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0

//! Kernel sync-file primitives.
//!
//! A sync fence is a file descriptor that becomes readable once its fence signals.  This
//! module waits on one with `poll(2)` and releases it with `close(2)`, the same way libsync
//! does.

use std::os::fd::{BorrowedFd, RawFd};
use std::time::Instant;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};

use crate::sync::{SyncPrimitive, Timeout};

/// [`SyncPrimitive`] backed by the kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelSync;

/// When a wait has to give up.  Fixed once per wait, so retries after a signal only get
/// the time that is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deadline {
    At(Instant),
    Never,
}

impl Deadline {
    fn starting_at(now: Instant, timeout: Timeout) -> Self {
        match timeout {
            Timeout::Forever => Deadline::Never,
            Timeout::Bounded(d) => now.checked_add(d).map_or(Deadline::Never, Deadline::At),
        }
    }

    fn remaining(self, now: Instant) -> PollTimeout {
        match self {
            Deadline::Never => PollTimeout::NONE,
            Deadline::At(at) => {
                let left = at.saturating_duration_since(now);
                u16::try_from(left.as_millis())
                    .map(PollTimeout::from)
                    .unwrap_or(PollTimeout::MAX)
            }
        }
    }
}

impl SyncPrimitive for KernelSync {
    fn wait(&self, fence: RawFd, timeout: Timeout) -> Result<(), Errno> {
        if fence < 0 {
            return Err(Errno::EINVAL);
        }
        // SAFETY: the caller owns `fence` for the duration of the call; the borrow does not
        // outlive this function.
        let fd = unsafe { BorrowedFd::borrow_raw(fence) };
        let deadline = Deadline::starting_at(Instant::now(), timeout);
        loop {
            let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
            match poll(&mut fds, deadline.remaining(Instant::now())) {
                Ok(0) => return Err(Errno::ETIME),
                Ok(_) => {
                    let revents = fds[0].revents().unwrap_or(PollFlags::empty());
                    if revents.intersects(PollFlags::POLLERR | PollFlags::POLLNVAL) {
                        return Err(Errno::EINVAL);
                    }
                    return Ok(());
                }
                Err(Errno::EINTR | Errno::EAGAIN) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn close(&self, fence: RawFd) -> Result<(), Errno> {
        nix::unistd::close(fence)
    }
}
