pub mod lifecycle;
pub mod notifications;
