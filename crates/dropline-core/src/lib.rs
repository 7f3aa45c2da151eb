// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Dropline delivery notifier.
//!
//! This crate provides the foundational error type, domain enumerations,
//! adapter traits, phone normalization, and the delivery-window
//! calculator used throughout the Dropline workspace.

pub mod error;
pub mod phone;
pub mod traits;
pub mod types;
pub mod window;

// Re-export key items at crate root for ergonomic imports.
pub use error::DroplineError;
pub use types::{
    ConversationState, CustomerResponse, HealthStatus, NotificationStatus, TurnRole,
};
pub use window::DeliveryWindow;

// Re-export adapter traits at crate root.
pub use traits::{RoutePlanner, SmsSender, UnassignedStop};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropline_error_has_all_variants() {
        // Verify all 6 error variants exist and can be constructed.
        let _config = DroplineError::Config("test".into());
        let _storage = DroplineError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _sms = DroplineError::Sms {
            message: "test".into(),
            source: None,
        };
        let _oracle = DroplineError::Oracle {
            message: "test".into(),
            source: None,
        };
        let _provider = DroplineError::Provider {
            message: "test".into(),
            source: None,
        };
        let _internal = DroplineError::Internal("test".into());
    }

    #[test]
    fn trait_objects_are_constructible() {
        // If either trait loses object safety, this stops compiling.
        fn _assert_sms(_: &dyn SmsSender) {}
        fn _assert_planner(_: &dyn RoutePlanner) {}
    }
}
