// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::external_api::{parse_certificates, CertificateDetails, TransportValidator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value written by provisioning tooling into a credential slot that has no real value yet.
pub const PLACEHOLDER_VALUE: &str = "xx";

pub const TLS_CERT_KEY: &str = "tls.crt";
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialStatus {
    Pending,
    Consistent,
    Invalid,
    NotAvailable,
}

impl CredentialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialStatus::Pending => "Pending",
            CredentialStatus::Consistent => "Consistent",
            CredentialStatus::Invalid => "Invalid",
            CredentialStatus::NotAvailable => "NotAvailable",
        }
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// StoredCredentialObject is the credential payload currently persisted under one name.
///
/// Values are only ever inspected for presence, the placeholder, and by the transport validator.
/// `Debug` prints keys only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoredCredentialObject {
    pub name: String,
    data: BTreeMap<String, Vec<u8>>,
}

impl StoredCredentialObject {
    pub fn new(name: impl Into<String>) -> StoredCredentialObject {
        StoredCredentialObject {
            name: name.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    fn value(&self, key: &str) -> Option<&[u8]> {
        self.data.get(key).map(Vec::as_slice)
    }

    /// The value under `key` unless it is absent, empty or the placeholder.
    fn provided(&self, key: &str) -> Option<&[u8]> {
        self.value(key)
            .filter(|value| !value.is_empty() && !is_placeholder(value))
    }
}

impl fmt::Debug for StoredCredentialObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredentialObject")
            .field("name", &self.name)
            .field("keys", &self.data.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn is_placeholder(value: &[u8]) -> bool {
    value == PLACEHOLDER_VALUE.as_bytes()
}

/// Status of a plain secret slot: `Pending` until a non-placeholder value is stored under `key`.
pub fn resolve_generic(key: &str, stored: Option<&StoredCredentialObject>) -> CredentialStatus {
    match stored.and_then(|stored| stored.value(key)) {
        Some(value) if !is_placeholder(value) => CredentialStatus::Consistent,
        _ => CredentialStatus::Pending,
    }
}

/// Status of a slot mirrored from an external vault, which is `NotAvailable` until the mirror writes it.
pub fn resolve_external(key: &str, stored: Option<&StoredCredentialObject>) -> CredentialStatus {
    match stored.and_then(|stored| stored.value(key)) {
        Some(value) if !is_placeholder(value) => CredentialStatus::Consistent,
        _ => CredentialStatus::NotAvailable,
    }
}

/// A certificate and key pair slot for an external hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDeclaration {
    pub secret_name: String,
    pub hostname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportResolution {
    pub certificate: CredentialStatus,
    pub certificate_messages: Vec<String>,
    pub private_key: CredentialStatus,
    pub private_key_messages: Vec<String>,
    pub certificates: Vec<CertificateDetails>,
}

impl TransportResolution {
    /// Both halves folded into one status: any `Invalid` wins over any `Pending`.
    pub fn status(&self) -> CredentialStatus {
        let halves = [self.certificate, self.private_key];
        if halves.contains(&CredentialStatus::Invalid) {
            CredentialStatus::Invalid
        } else if halves.contains(&CredentialStatus::Pending) {
            CredentialStatus::Pending
        } else {
            CredentialStatus::Consistent
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.private_key_messages
            .iter()
            .chain(self.certificate_messages.iter())
            .cloned()
            .collect()
    }
}

fn presence(value: Option<&[u8]>) -> CredentialStatus {
    match value {
        Some(_) => CredentialStatus::Consistent,
        None => CredentialStatus::Pending,
    }
}

/// Resolves a certificate and key pair. Each half is `Pending` until provided; once both are, the
/// validator decides whether either is `Invalid`.
pub fn resolve_transport<V>(
    declared: &CredentialDeclaration,
    stored: Option<&StoredCredentialObject>,
    validator: &V,
) -> TransportResolution
where
    V: TransportValidator + ?Sized,
{
    let certificate = stored.and_then(|stored| stored.provided(TLS_CERT_KEY));
    let key = stored.and_then(|stored| stored.provided(TLS_PRIVATE_KEY_KEY));

    let mut resolution = TransportResolution {
        certificate: presence(certificate),
        certificate_messages: Vec::new(),
        private_key: presence(key),
        private_key_messages: Vec::new(),
        certificates: certificate.map(parse_certificates).unwrap_or_default(),
    };

    if let (Some(certificate), Some(key)) = (certificate, key) {
        let key_validation = validator.validate_private_key(key);
        if !key_validation.valid {
            resolution.private_key = CredentialStatus::Invalid;
            resolution.private_key_messages = key_validation.messages;
        }
        let certificate_validation =
            validator.validate_certificate(certificate, Some(key), &declared.hostname);
        if !certificate_validation.valid {
            resolution.certificate = CredentialStatus::Invalid;
            resolution.certificate_messages = certificate_validation.messages;
        }
    }
    resolution
}
