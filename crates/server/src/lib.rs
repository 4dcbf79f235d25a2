pub mod api;
pub mod auth;
pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod mailer;
pub mod secrets;
pub mod service;
pub mod store;
pub mod validation;
