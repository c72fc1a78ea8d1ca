use std::marker::PhantomData;

#[cfg(debug_assertions)]
use std::sync::atomic::{AtomicU8, Ordering};

/// Shared view of the output region that both workers write through.
///
/// There is no lock on the bytes. The rewrite rule partitions the region:
/// for every input byte, exactly one worker owns the output range that byte
/// maps to, so concurrent writers never touch the same index. `write` states
/// that contract; debug builds count every write per index and panic on a
/// violation, and `assert_covered` checks that no index was left out.
pub(crate) struct OutputCells<'a> {
    ptr: *mut u8,
    len: usize,
    #[cfg(debug_assertions)]
    written: Box<[AtomicU8]>,
    _buf: PhantomData<&'a mut [u8]>,
}

// SAFETY: the only mutation is `write`, whose contract keeps concurrent
// writers on disjoint indices, the same footing as a `&mut [u8]` split
// into disjoint parts and handed to two threads.
unsafe impl Sync for OutputCells<'_> {}

impl<'a> OutputCells<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        OutputCells {
            ptr: buf.as_mut_ptr(),
            len: buf.len(),
            #[cfg(debug_assertions)]
            written: (0..buf.len()).map(|_| AtomicU8::new(0)).collect(),
            _buf: PhantomData,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Write one output byte.
    ///
    /// # Safety
    /// `idx` must be in bounds, and no other `write` to the same index may
    /// happen for the lifetime of this value. Callers uphold this through
    /// the rule's category partition.
    pub(crate) unsafe fn write(&self, idx: usize, byte: u8) {
        debug_assert!(idx < self.len);
        #[cfg(debug_assertions)]
        {
            let prev = self.written[idx].fetch_add(1, Ordering::Relaxed);
            assert_eq!(prev, 0, "output byte {idx} written twice");
        }
        // SAFETY: in bounds per the contract, and no concurrent writer
        // shares this index.
        unsafe { self.ptr.add(idx).write(byte) };
    }

    /// Panic if any output byte was never written. Called after both
    /// workers have been joined, so every write is visible here.
    #[cfg(debug_assertions)]
    pub(crate) fn assert_covered(&self) {
        for (idx, cell) in self.written.iter().enumerate() {
            assert_eq!(
                cell.load(Ordering::Relaxed),
                1,
                "output byte {idx} never written"
            );
        }
    }
}
