// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the controller and its external collaborators.

pub mod api;
pub mod callback;

pub use api::IntegrationApi;
pub use callback::{CallbackResultPort, Navigator};
