/// Use mimalloc as the global allocator for the binary.
/// 2-3x faster than glibc malloc for small allocations,
/// with better thread-local caching.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod barrier;
pub mod common;
pub mod error;
pub mod output;
pub mod rule;
pub mod transform;
