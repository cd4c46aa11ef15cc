mod repository;

pub use repository::SqliteNotificationRepository;
