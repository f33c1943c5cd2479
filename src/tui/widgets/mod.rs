//! Custom TUI widgets

mod canvas;
mod file_list;

pub use canvas::*;
pub use file_list::*;
