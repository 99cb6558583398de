pub mod cards;
pub mod config;
pub mod dashboard;
pub mod demo_feed;
pub mod http_client;
pub mod logging;
pub mod notify;
pub mod source;
pub mod state;
pub mod stats_fetch;
pub mod timer;
pub mod tween;
