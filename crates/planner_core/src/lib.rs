pub mod board_api;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod planner;
pub mod report;
pub mod request;
pub mod storage;
pub mod team_api;
pub mod user_api;
mod validate;

pub use planner::Planner;
