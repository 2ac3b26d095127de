//! Warehouse - inventory backend with runtime-defined category schemas
//!
//! Categories declare typed fields at runtime, form submissions are validated
//! and stored against them, and a UI descriptor tree tells clients what to render.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod entity;
pub mod error;
pub mod forms;
pub mod schema;
pub mod storage;
pub mod ui;
