//! Domain services

pub mod quotes;

pub use quotes::QuoteService;
