//! tranquil-app: the IO shell around tranquil-core.
//!
//! Owns persistence, configuration, the AI boundary, notification dispatch,
//! audio, and the async flow worker, wired together by [`app::App`].

pub mod ai;
pub mod app;
pub mod audio;
pub mod config;
pub mod flows;
pub mod notify;
pub mod store;

pub use ai::AiClient;
pub use app::{App, Language, Toast};
pub use audio::{AudioSession, AudioSink, NullSink};
pub use config::{Config, load_config, save_config};
pub use flows::{FlowEvent, FlowFetch, spawn_worker};
pub use notify::{
    DeliveryWorker, DispatchOutcome, NotificationDispatcher, NotificationPayload,
    NotificationRequest, WorkerEvent,
};
pub use store::Store;
