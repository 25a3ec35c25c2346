#![forbid(unsafe_code)]

pub mod app_services;
pub mod content_service;
pub mod error;
pub mod favorite_service;
pub mod quiz_service;
pub mod session;
pub mod streak_service;

pub use wordtrail_core::Clock;

pub use app_services::AppServices;
pub use content_service::{ContentConfig, ContentMode, ContentService, GeneratedContent};
pub use error::{
    BridgeError, ContentServiceError, FavoriteServiceError, QuizServiceError, SessionError,
    StreakServiceError,
};
pub use favorite_service::FavoriteService;
pub use quiz_service::QuizProgressService;
pub use session::{SessionBridge, SessionContext, SessionWorkflow, TopicPlacement};
pub use streak_service::StreakService;
