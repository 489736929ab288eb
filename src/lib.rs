//! Travel journal: a REST API for user-owned travel records, plus a typed
//! client that mirrors the single-page app's session and list handling.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;

pub mod crypto {
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod claims;
    pub mod travel;
    pub mod user;
}

pub mod repositories {
    pub mod memory;
    pub mod travel;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod travels;
    pub mod uploads;
}

pub mod handlers {
    pub mod auth;
    pub mod health;
    pub mod travels;
    pub mod uploads;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod rate_limit;
}

pub mod validation {
    pub mod auth;
    pub mod json;
    pub mod travel;
}

pub mod client {
    pub mod api;
    pub mod controller;
    pub mod session;
}
