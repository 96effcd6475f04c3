//! Auth and user collection actions against a mock backend.

#![cfg(not(target_arch = "wasm32"))]

mod auth;
mod common;
mod users;
