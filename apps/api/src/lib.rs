//! Content-management API for a small business website: jobs, gallery
//! images, services, page content, admin accounts, uploads and notification
//! email.

pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod errors;
pub mod extract;
pub mod logging;
pub mod media;
pub mod models;
pub mod notify;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;
