#![forbid(unsafe_code)]

pub mod app_services;
pub mod completion;
pub mod config;
pub mod error;
pub mod notice;
pub mod progress;
pub mod quiz;
pub mod saved_words;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use completion::CompletionRegistry;
pub use config::QuizConfig;
pub use error::{AppServicesError, QuizError, SavedWordsServiceError};
pub use notice::NoticeLatch;
pub use progress::{ProgressGateway, StoredProgress};
pub use quiz::QuizSession;
pub use saved_words::SavedWordsService;
