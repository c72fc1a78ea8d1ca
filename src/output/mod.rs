mod core;


pub use self::core::{OutputFile, RunReport, count_markers, footer_line, run};
