//! HTTP handlers, one module per area of the back-office.
//!
//! Handlers stay thin: extract, call one repository method, shape the
//! response. Every rule lives in maguva-core or maguva-db.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod report;
pub mod tailor;
pub mod vendors;

use serde::Serialize;

/// `{"message": "..."}` body for deletes and other acknowledgements.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}
