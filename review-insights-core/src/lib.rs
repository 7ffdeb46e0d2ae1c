pub mod cache;
pub mod config;
pub mod data_loading;
pub mod entity;
pub mod error;
pub mod hasher;
pub mod insights;
pub mod lexicon;
pub mod preparation;
pub mod progress;
pub mod sentiment;
