pub mod app;
pub mod clock;
pub mod config;
pub mod cycle;
pub mod display;
pub mod effects;
pub mod errors;
pub mod handlers;
pub mod keep_awake;
pub mod models;
pub mod page;
pub mod runtime;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use cycle::CycleTracker;
pub use page::Page;
pub use state::AppState;
