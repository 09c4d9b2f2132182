pub mod refresh_action;
pub mod refresh_control;
pub mod strategy;
