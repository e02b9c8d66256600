pub mod dashboard;
pub mod draw;
pub mod evaluation;
pub mod frequency;
pub mod purchase;
pub mod recommend;
pub mod ticket;

pub use dashboard::*;
pub use draw::*;
pub use evaluation::*;
pub use frequency::*;
pub use purchase::*;
pub use recommend::*;
pub use ticket::*;
