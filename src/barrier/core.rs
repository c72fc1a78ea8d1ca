use std::sync::{Condvar, Mutex};
use std::time::Duration;

use thiserror::Error;

/// The two input halves the workers hand over through the barrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Half {
    First,
    Second,
}

impl Half {
    #[inline]
    fn index(self) -> usize {
        match self {
            Half::First => 0,
            Half::Second => 1,
        }
    }
}

/// Progress of one half through the handshake.
/// Strictly monotonic: a flag never moves backward within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    NotReady,
    Ready,
    Done,
}

/// A wait on the barrier gave up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaitError {
    /// The peer did not reach the checkpoint within the bound.
    #[error("peer did not reach the checkpoint within {0:?}")]
    TimedOut(Duration),

    /// The peer aborted the run.
    #[error("peer aborted the run")]
    Aborted,
}

#[derive(Debug)]
struct State {
    halves: [Phase; 2],
    aborted: bool,
}

/// Two-checkpoint rendezvous between the letter worker and the digit worker.
///
/// Per half, the letter worker raises `ready` once its bytes for that half
/// of the input are in place, and the digit worker raises `done` once the
/// digit expansions for the same half are. All waiting blocks on a condvar.
/// The mutex guarding the flags also orders the buffer writes: anything
/// written before a `signal_*` call is visible to the thread whose matching
/// `await_*` returns.
///
/// Every wait is bounded, and `abort` wakes all waiters, so a failed peer
/// surfaces as an error instead of a hang.
#[derive(Debug)]
pub struct PhaseBarrier {
    state: Mutex<State>,
    cond: Condvar,
}

impl PhaseBarrier {
    /// Fresh barrier with both halves not ready.
    pub fn new() -> Self {
        PhaseBarrier {
            state: Mutex::new(State {
                halves: [Phase::NotReady; 2],
                aborted: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Mark the letter bytes of `half` as written.
    pub fn signal_ready(&self, half: Half) {
        self.advance(half, Phase::Ready);
    }

    /// Mark the digit bytes of `half` as written.
    pub fn signal_done(&self, half: Half) {
        self.advance(half, Phase::Done);
    }

    fn advance(&self, half: Half, to: Phase) {
        let mut state = self.state.lock().unwrap();
        let slot = &mut state.halves[half.index()];
        if *slot < to {
            *slot = to;
        }
        self.cond.notify_all();
    }

    /// Block until `half` is at least ready.
    pub fn await_ready(&self, half: Half, timeout: Duration) -> Result<(), WaitError> {
        self.await_phase(half, Phase::Ready, timeout)
    }

    /// Block until `half` is done.
    pub fn await_done(&self, half: Half, timeout: Duration) -> Result<(), WaitError> {
        self.await_phase(half, Phase::Done, timeout)
    }

    fn await_phase(&self, half: Half, goal: Phase, timeout: Duration) -> Result<(), WaitError> {
        let state = self.state.lock().unwrap();
        let (state, _wait) = self
            .cond
            .wait_timeout_while(state, timeout, |s| {
                !s.aborted && s.halves[half.index()] < goal
            })
            .unwrap();

        // A flag past the goal still satisfies the wait (monotonic compare):
        // only expiry and abort are errors.
        if state.halves[half.index()] >= goal {
            Ok(())
        } else if state.aborted {
            Err(WaitError::Aborted)
        } else {
            Err(WaitError::TimedOut(timeout))
        }
    }

    /// Wake every waiter with `Aborted`. A worker that fails calls this so
    /// its peer does not sit out the full timeout.
    pub fn abort(&self) {
        let mut state = self.state.lock().unwrap();
        state.aborted = true;
        self.cond.notify_all();
    }
}

impl Default for PhaseBarrier {
    fn default() -> Self {
        Self::new()
    }
}
