//! RP helpdesk: scripted decision-tree support bot.

pub mod bot;
pub mod channels;
pub mod config;
pub mod dialogs;
pub mod error;
pub mod profile;
pub mod router;
pub mod routes;
pub mod store;
pub mod topics;
