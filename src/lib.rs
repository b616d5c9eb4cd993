//! Crew Tax Engine
//!
//! This crate turns airline-crew duty records (flights and non-flying duty
//! days) into a German wage-tax deduction report: per-diem meal allowances,
//! the commute distance deduction, flat uniform cleaning costs and hotel
//! tips, broken down by month.
//!
//! # Example
//!
//! ```no_run
//! use crew_tax_engine::calculation::calculate_tax;
//! use crew_tax_engine::config::ConfigLoader;
//! use crew_tax_engine::models::{AircraftCategory, Flight};
//! use chrono::NaiveDate;
//!
//! let config = ConfigLoader::load("./config/de").unwrap();
//! let flights = vec![Flight {
//!     date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
//!     departure: "FRA".to_string(),
//!     arrival: "JFK".to_string(),
//!     departure_time: "10:00".to_string(),
//!     arrival_time: "12:45".to_string(),
//!     duty_code: "FL".to_string(),
//!     flight_number: "LH400".to_string(),
//!     block_time: "8:45".to_string(),
//!     aircraft_category: AircraftCategory::LongHaul,
//!     country: None,
//!     is_continuation: false,
//! }];
//!
//! let report = calculate_tax(&flights, &[], config.default_settings(), config.tables()).unwrap();
//! println!("{}", serde_json::to_string_pretty(&report.tax_calculation).unwrap());
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;

#[cfg(test)]
pub(crate) mod fixtures;
