// src/notify/mod.rs

pub mod adoption;
pub mod mailer;

pub use adoption::{AdoptionNotifier, NotificationDecision};
pub use mailer::{HttpMailer, LogMailer, MailError, MailMessage, MailTemplate, Mailer, MemoryMailer};
