//! Terminal presentation

pub mod output;
