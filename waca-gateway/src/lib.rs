//! HTTP gateway for the waca compile service.
//!
//! Exposes version, board and library listings and sketch compilation on top
//! of a [`waca_executor::CompileRunner`]. Configuration comes from a TOML file
//! plus environment overrides, see [`config::GatewayConfig`].

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod routes;
