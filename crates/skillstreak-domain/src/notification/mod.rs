mod aggregate;
mod repository;
mod value_objects;

pub use aggregate::Notification;
pub use repository::NotificationRepository;
pub use value_objects::{NewNotification, NotificationKind};
