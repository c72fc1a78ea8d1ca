mod core;


pub use self::core::{Half, PhaseBarrier, WaitError};
