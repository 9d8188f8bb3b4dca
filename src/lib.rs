pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod parsers;
pub mod prompts;
pub mod response;
pub mod server;
pub mod tools;
pub mod validate;
