// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP implementation of the Hublink integration contract.

pub mod client;

pub use client::HttpIntegrationApi;
