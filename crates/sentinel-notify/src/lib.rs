//! Alert delivery through the Telegram Bot API.

pub mod client;
pub mod error;

pub use client::TelegramNotifier;
pub use error::NotifyError;
