pub mod aggregate;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod geocode;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod trigger;
pub mod validate;
pub mod viewport;
