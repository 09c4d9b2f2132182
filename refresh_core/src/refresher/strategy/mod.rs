pub mod launch_strategy;
pub mod refresh_handler;
