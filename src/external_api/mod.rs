// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
pub mod x509;

pub use x509::{parse_certificates, CertificateDetails, X509Validator};

/// Outcome of one validator call. `messages` are human readable and may be shown to API consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub messages: Vec<String>,
}

impl Validation {
    pub fn ok() -> Validation {
        Validation {
            valid: true,
            messages: Vec::new(),
        }
    }

    pub fn invalid(messages: Vec<String>) -> Validation {
        Validation {
            valid: false,
            messages,
        }
    }

    /// Valid when no message was collected.
    pub fn from_messages(messages: Vec<String>) -> Validation {
        Validation {
            valid: messages.is_empty(),
            messages,
        }
    }
}

// The transport validator wraps everything the credential resolver needs from a cryptographic stack.
// Callers pass it in; X509Validator is the default and tests use a mock.
pub trait TransportValidator: Send + Sync {
    fn validate_private_key(&self, key: &[u8]) -> Validation;

    fn validate_certificate(&self, certificate: &[u8], key: Option<&[u8]>, hostname: &str)
        -> Validation;
}
