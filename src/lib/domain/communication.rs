//! Communication module: message composition and dispatch

pub mod dialer;
pub mod emails;
pub mod html;
pub mod mailer;
pub mod telemetry;
