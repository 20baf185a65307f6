//! storefront-admin
//! ----------------
//! Administrative client for a storefront REST API. The crate centres on
//! session gating: a durable session store, a route guard for protected
//! pages, a per-action authorization policy and an HTTP client that attaches
//! the session's bearer token. Pages and a command-line front end are built
//! on top of those pieces.

pub mod config;
pub mod error;
pub mod identity;
pub mod api;
pub mod pages;
pub mod cli;
