//! Bellfir CLI - driver for the bell filter design pipeline
//!
//! Loads a layered [`config::DriverConfig`], runs the design, and exports
//! audio and analysis data. All numerical work lives in `bellfir-dsp`.

pub mod commands;
pub mod config;
pub mod export;
