pub mod draw_numbers;
pub mod draws;
pub mod purchase_numbers;
pub mod purchase_results;
pub mod purchases;
pub mod recommend_numbers;
pub mod recommend_results;
pub mod recommend_runs;

pub use draw_numbers as draw_number_entity;
pub use draws as draw_entity;
pub use purchase_numbers as purchase_number_entity;
pub use purchase_results as purchase_result_entity;
pub use purchases as purchase_entity;
pub use recommend_numbers as recommend_number_entity;
pub use recommend_results as recommend_result_entity;
pub use recommend_runs as recommend_run_entity;
