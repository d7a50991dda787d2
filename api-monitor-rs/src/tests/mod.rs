//! Unit and integration tests for the API monitor
//!
//! HTTP behaviour is exercised against WireMock servers; nothing here talks
//! to a real InfluxDB.

pub mod config_tests;
