mod cells;
mod core;

#[cfg(test)]
mod tests;

pub use self::core::{SYNC_TIMEOUT, TransformError, transform, transform_into};
