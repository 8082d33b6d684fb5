pub mod config;
pub mod dashboard;
pub mod graph;
pub mod metrics;
pub mod monitor;
pub mod panel;
pub mod schedule;
pub mod widget;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, Frame, Renderer};
pub use monitor::{Command, Monitor};
pub use schedule::Scheduler;
