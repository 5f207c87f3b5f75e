//! External service clients.

pub mod mailer;

pub use mailer::HttpNotifier;
