pub mod catalog;
pub mod config;
pub mod edit;
pub mod error;
pub mod feed;
pub mod filter;
pub mod pipeline;
pub mod proxy;
pub mod tui;
