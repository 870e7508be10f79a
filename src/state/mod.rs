pub mod aggregator;
pub mod app_settings;
pub mod app_state;
pub mod countdown;
pub mod filters;
pub mod messages;
pub mod network;
pub mod refresher;
pub mod route;
pub mod schedule;
pub mod search;
