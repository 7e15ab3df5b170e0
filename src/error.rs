// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AddonError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),

    #[error("Secret lookup for '{reference}' failed: {message}")]
    SecretLookupError { reference: String, message: String },

    #[error("Malformed secret document: {0}")]
    SecretFormatError(String),

    #[error("Dependency cycle between descriptors: {0}")]
    GraphCycleError(String),

    #[error("Duplicate descriptor name: {0}")]
    DuplicateDescriptor(String),

    #[error("Descriptor '{descriptor}' depends on unknown descriptor '{dependency}'")]
    DanglingDependency {
        descriptor: String,
        dependency: String,
    },

    #[error("Failed to serialize {0}")]
    SerializationError(String),

    #[error("HelmChart CRD unavailable: {0}")]
    CrdUnavailable(String),
}

impl AddonError {
    pub(crate) fn lookup(reference: &str, message: impl Into<String>) -> Self {
        AddonError::SecretLookupError {
            reference: reference.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AddonError>;
