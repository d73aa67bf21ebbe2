// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::external_api::{TransportValidator, Validation};
use chrono::{DateTime, Utc};
use rustls::crypto::ring::sign::any_supported_type;
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use rustls::sign::CertifiedKey;
use serde::Serialize;
use tracing::debug;
use x509_parser::prelude::*;

/// Display fields of one certificate in a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDetails {
    pub subject: String,
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub dns_names: Vec<String>,
}

/// Extracts display fields from every certificate in a PEM bundle.
///
/// Never fails: unreadable PEM data yields an empty list and certificates that do not parse are skipped.
pub fn parse_certificates(pem: &[u8]) -> Vec<CertificateDetails> {
    let chain = match CertificateDer::pem_slice_iter(pem).collect::<Result<Vec<_>, _>>() {
        Ok(chain) => chain,
        Err(err) => {
            debug!("no certificate details extracted: {:?}", err);
            return Vec::new();
        }
    };
    chain
        .iter()
        .filter_map(|der| match X509Certificate::from_der(der.as_ref()) {
            Ok((_, certificate)) => Some(describe(&certificate)),
            Err(err) => {
                debug!("skipping unparseable certificate: {}", err);
                None
            }
        })
        .collect()
}

fn describe(certificate: &X509Certificate<'_>) -> CertificateDetails {
    let dns_names = match certificate.subject_alternative_name() {
        Ok(Some(san)) => san
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::DNSName(dns) => Some(dns.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    let validity = certificate.validity();
    CertificateDetails {
        subject: certificate.subject().to_string(),
        issuer: certificate.issuer().to_string(),
        not_before: to_utc(&validity.not_before),
        not_after: to_utc(&validity.not_after),
        dns_names,
    }
}

fn to_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

/// X509Validator performs the standard X.509 and private key format checks.
///
/// Validity windows are checked against the instant the validator was built for, so results do not
/// depend on when a check happens to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X509Validator {
    now: DateTime<Utc>,
}

impl X509Validator {
    pub fn new() -> X509Validator {
        X509Validator::at(Utc::now())
    }

    pub fn at(now: DateTime<Utc>) -> X509Validator {
        X509Validator { now }
    }
}

impl Default for X509Validator {
    fn default() -> Self {
        X509Validator::new()
    }
}

impl TransportValidator for X509Validator {
    fn validate_private_key(&self, key: &[u8]) -> Validation {
        let der = match PrivateKeyDer::from_pem_slice(key) {
            Ok(der) => der,
            Err(err) => {
                return Validation::invalid(vec![format!(
                    "private key is not PEM encoded: {:?}",
                    err
                )])
            }
        };
        match any_supported_type(&der) {
            Ok(_) => Validation::ok(),
            Err(err) => Validation::invalid(vec![format!("unsupported private key: {}", err)]),
        }
    }

    fn validate_certificate(
        &self,
        certificate: &[u8],
        key: Option<&[u8]>,
        hostname: &str,
    ) -> Validation {
        let chain = match CertificateDer::pem_slice_iter(certificate).collect::<Result<Vec<_>, _>>()
        {
            Ok(chain) => chain,
            Err(err) => {
                return Validation::invalid(vec![format!(
                    "certificate is not PEM encoded: {:?}",
                    err
                )])
            }
        };
        let leaf = match chain.first() {
            Some(leaf) => leaf,
            None => return Validation::invalid(vec!["no certificate found".to_string()]),
        };
        let parsed = match X509Certificate::from_der(leaf.as_ref()) {
            Ok((_, parsed)) => parsed,
            Err(err) => {
                return Validation::invalid(vec![format!("failed to parse certificate: {}", err)])
            }
        };

        let mut messages = Vec::new();
        let validity = parsed.validity();
        if self.now.timestamp() < validity.not_before.timestamp() {
            messages.push(format!(
                "certificate is not valid before {}",
                to_utc(&validity.not_before).to_rfc3339()
            ));
        }
        if self.now.timestamp() > validity.not_after.timestamp() {
            messages.push(format!(
                "certificate expired at {}",
                to_utc(&validity.not_after).to_rfc3339()
            ));
        }
        let mismatch = if hostname.starts_with("*.") {
            wildcard_mismatch(&parsed, hostname)
        } else {
            hostname_mismatch(leaf, hostname)
        };
        if let Some(message) = mismatch {
            messages.push(message);
        }
        if let Some(message) = key.and_then(|key| key_mismatch(&chain, key)) {
            messages.push(message);
        }
        Validation::from_messages(messages)
    }
}

fn hostname_mismatch(leaf: &CertificateDer<'_>, hostname: &str) -> Option<String> {
    let server_name = match ServerName::try_from(hostname) {
        Ok(server_name) => server_name,
        Err(_) => return Some(format!("{:?} is not a valid hostname", hostname)),
    };
    let end_entity = match webpki::EndEntityCert::try_from(leaf) {
        Ok(end_entity) => end_entity,
        Err(err) => {
            return Some(format!(
                "certificate is not a valid end-entity certificate: {:?}",
                err
            ))
        }
    };
    end_entity
        .verify_is_valid_for_subject_name(&server_name)
        .err()
        .map(|_| format!("certificate is not valid for {}", hostname))
}

// A wildcard declaration is not a server name; it must appear literally among the SAN DNS names.
fn wildcard_mismatch(leaf: &X509Certificate<'_>, hostname: &str) -> Option<String> {
    let listed = describe(leaf)
        .dns_names
        .iter()
        .any(|name| name.eq_ignore_ascii_case(hostname));
    (!listed).then(|| format!("certificate is not valid for {}", hostname))
}

// Key format problems are reported by validate_private_key; here an unreadable key only skips the check.
fn key_mismatch(chain: &[CertificateDer<'static>], key: &[u8]) -> Option<String> {
    let der = PrivateKeyDer::from_pem_slice(key).ok()?;
    let signing_key = any_supported_type(&der).ok()?;
    match CertifiedKey::new(chain.to_vec(), signing_key).keys_match() {
        Ok(()) => None,
        Err(rustls::Error::InconsistentKeys(rustls::InconsistentKeys::KeyMismatch)) => {
            Some("private key does not match certificate".to_string())
        }
        Err(err) => {
            debug!("unable to compare private key with certificate: {}", err);
            None
        }
    }
}
