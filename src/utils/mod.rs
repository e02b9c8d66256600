pub mod combinatorics;
pub mod time_window;

pub use combinatorics::*;
pub use time_window::*;
