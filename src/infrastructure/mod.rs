pub mod memory_store;
pub mod redis_store;
pub mod console_notifier;
pub mod ntfy_notifier;
pub mod multi_notifier;
