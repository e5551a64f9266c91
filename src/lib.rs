//! Terminal dashboard for exploring a global landslide event catalogue.
//!
//! The CSV is loaded once into a [`records::Table`]. Every selector change
//! re-filters it ([`filter`]) and re-aggregates the visible charts
//! ([`aggregate`], [`views`]); [`ui`] draws the result with ratatui.

pub mod aggregate;
pub mod app;
pub mod braille;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod layout;
pub mod map;
pub mod records;
pub mod summary;
pub mod ui;
pub mod views;
