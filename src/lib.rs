// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Member Auth Server - member management backend
//!
//! Registration, login, account recovery and profile maintenance for members,
//! protected by stateless HS256 bearer tokens.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Token issuance and validation, request authentication, access policy
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup
//! - `storage` - Member database (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
