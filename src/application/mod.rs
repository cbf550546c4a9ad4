pub mod catalog_service;
pub mod notification_queue;
pub mod notifier;
pub mod order_service;
pub mod otp_service;
pub mod relay_service;
pub mod user_service;
