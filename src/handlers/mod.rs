pub mod dashboard;
pub mod draw;
pub mod evaluate;
pub mod purchase;
pub mod recommend;

pub use dashboard::dashboard_config;
pub use draw::draw_config;
pub use evaluate::evaluate_config;
pub use purchase::purchase_config;
pub use recommend::recommend_config;
