//! Test harness for copying Dog CEO breed images into Yandex Disk
//!
//! Resolves a breed to one random image per sub-breed, has the disk fetch
//! each image into a folder, and polls the disk until the folder contents
//! settle.

pub mod app;
pub mod catalog;
pub mod error;
pub mod models;
pub mod retry;
pub mod storage;

pub use error::{Error, Result};
