use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::barrier::{Half, PhaseBarrier, WaitError};
use crate::rule::{self, MARKER, Rewrite};

use super::cells::OutputCells;

/// Upper bound on every barrier wait. Only a failed or wedged peer can
/// make a wait last this long.
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the cooperative transform.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The output buffer does not hold exactly the transformed length.
    #[error("output buffer holds {got} bytes, transform needs {need}")]
    LengthMismatch { need: usize, got: usize },

    /// The output buffer could not be allocated.
    #[error("cannot allocate {len} bytes for the output buffer")]
    OutOfMemory { len: usize },

    /// The letter worker gave up waiting on the digit worker.
    #[error("letter worker: {0}")]
    LetterWorker(WaitError),

    /// The digit worker gave up waiting on the letter worker.
    #[error("digit worker: {0}")]
    DigitWorker(WaitError),

    /// The digit worker terminated abnormally before finishing its halves.
    #[error("digit worker panicked")]
    DigitWorkerPanicked,
}

/// Apply the rewrite rule with the two cooperating workers, writing into a
/// caller-supplied buffer of exactly `rule::output_len(input)` bytes.
///
/// The calling thread is the letter worker; the digit worker lives on a
/// scoped thread for the duration of the call. The input splits at its
/// midpoint and each half is handed over through the barrier: the letter
/// worker writes a half's letters and passthrough bytes and signals ready,
/// the digit worker fills in the same half's digit expansions and signals
/// done. The letter worker takes the halves strictly in turn, so a run
/// walks ready/done on the first half, then ready/done on the second.
///
/// Both workers re-derive every output position from the rule alone, one
/// prefix sum each, so nothing but the two flags ever crosses between them.
pub fn transform_into(input: &[u8], out: &mut [u8]) -> Result<(), TransformError> {
    let need = rule::output_len(input);
    if out.len() != need {
        return Err(TransformError::LengthMismatch {
            need,
            got: out.len(),
        });
    }

    let mid = input.len() / 2;
    let cells = OutputCells::new(out);
    let barrier = PhaseBarrier::new();

    let result = thread::scope(|s| {
        let digit = s.spawn(|| digit_pass(input, mid, &cells, &barrier));
        let letter = letter_pass(input, mid, &cells, &barrier);

        let digit = match digit.join() {
            Ok(r) => r,
            Err(_) => return Err(TransformError::DigitWorkerPanicked),
        };

        match (letter, digit) {
            (Ok(()), Ok(())) => Ok(()),
            (Ok(()), Err(d)) => Err(TransformError::DigitWorker(d)),
            // An aborted wait is the echo of the peer's failure, not a cause.
            (Err(WaitError::Aborted), Err(d)) => Err(TransformError::DigitWorker(d)),
            (Err(l), _) => Err(TransformError::LetterWorker(l)),
        }
    });

    #[cfg(debug_assertions)]
    if result.is_ok() {
        cells.assert_covered();
    }

    result
}

/// Apply the rewrite rule into a freshly allocated buffer.
pub fn transform(input: &[u8]) -> Result<Vec<u8>, TransformError> {
    let len = rule::output_len(input);
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| TransformError::OutOfMemory { len })?;
    out.resize(len, 0);
    transform_into(input, &mut out)?;
    Ok(out)
}

fn letter_pass(
    input: &[u8],
    mid: usize,
    cells: &OutputCells<'_>,
    barrier: &PhaseBarrier,
) -> Result<(), WaitError> {
    let result = letter_run(input, mid, cells, barrier);
    if result.is_err() {
        barrier.abort();
    }
    result
}

fn letter_run(
    input: &[u8],
    mid: usize,
    cells: &OutputCells<'_>,
    barrier: &PhaseBarrier,
) -> Result<(), WaitError> {
    let pos = letter_half(&input[..mid], 0, cells);
    barrier.signal_ready(Half::First);
    barrier.await_done(Half::First, SYNC_TIMEOUT)?;

    let pos = letter_half(&input[mid..], pos, cells);
    debug_assert_eq!(pos, cells.len());
    barrier.signal_ready(Half::Second);
    barrier.await_done(Half::Second, SYNC_TIMEOUT)
}

fn digit_pass(
    input: &[u8],
    mid: usize,
    cells: &OutputCells<'_>,
    barrier: &PhaseBarrier,
) -> Result<(), WaitError> {
    let result = digit_run(input, mid, cells, barrier);
    if result.is_err() {
        barrier.abort();
    }
    result
}

fn digit_run(
    input: &[u8],
    mid: usize,
    cells: &OutputCells<'_>,
    barrier: &PhaseBarrier,
) -> Result<(), WaitError> {
    barrier.await_ready(Half::First, SYNC_TIMEOUT)?;
    let pos = digit_half(&input[..mid], 0, cells);
    barrier.signal_done(Half::First);

    barrier.await_ready(Half::Second, SYNC_TIMEOUT)?;
    let pos = digit_half(&input[mid..], pos, cells);
    debug_assert_eq!(pos, cells.len());
    barrier.signal_done(Half::Second);
    Ok(())
}

/// Letter-worker pass over one half: write letters and passthrough bytes,
/// step over the space digit expansions will occupy. `pos` is the output
/// cursor where this half begins; returns it advanced past the half.
fn letter_half(half: &[u8], mut pos: usize, cells: &OutputCells<'_>) -> usize {
    for &byte in half {
        match rule::rewrite(byte) {
            Rewrite::Upper(b) | Rewrite::Copy(b) => {
                // SAFETY: `pos` is this byte's slot under the rule, and
                // non-digit slots belong to the letter worker alone.
                unsafe { cells.write(pos, b) };
                pos += 1;
            }
            Rewrite::Markers(n) => pos += n as usize,
        }
    }
    pos
}

/// Digit-worker pass over one half: write marker runs, step over
/// everything else.
fn digit_half(half: &[u8], mut pos: usize, cells: &OutputCells<'_>) -> usize {
    for &byte in half {
        match rule::rewrite(byte) {
            Rewrite::Markers(n) => {
                for _ in 0..n {
                    // SAFETY: digit expansion slots belong to the digit
                    // worker alone; `pos` stays inside this byte's run.
                    unsafe { cells.write(pos, MARKER) };
                    pos += 1;
                }
            }
            Rewrite::Upper(_) | Rewrite::Copy(_) => pos += 1,
        }
    }
    pos
}
