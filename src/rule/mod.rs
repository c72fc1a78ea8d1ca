mod core;


pub use self::core::{MARKER, Rewrite, apply, output_len, rewrite};
