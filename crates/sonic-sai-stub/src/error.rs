//! Stub errors and their SAI status codes.
//!
//! Every failure returned by the stub carries a [`SaiStatus`] code so callers
//! that speak the SAI status vocabulary can compare against it directly,
//! while Rust callers match on the typed [`SaiError`] variants.

use std::fmt;
use thiserror::Error;

/// `sai_status_t` values returned by the stub.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaiStatus {
    Success = 0,
    Failure = -1,
    NotSupported = -2,
    InsufficientResources = -4,
    InvalidParameter = -5,
    ItemAlreadyExists = -6,
    ItemNotFound = -7,
    BufferOverflow = -8,
    Uninitialized = -12,
    MandatoryAttributeMissing = -14,
    NotImplemented = -15,
    ObjectInUse = -17,
}

impl SaiStatus {
    /// Returns the raw `sai_status_t` value.
    pub const fn code(&self) -> i32 {
        *self as i32
    }

    pub fn is_success(&self) -> bool {
        *self == SaiStatus::Success
    }

    /// Returns the status carried by an operation result.
    pub fn of<T>(result: &SaiResult<T>) -> Self {
        match result {
            Ok(_) => SaiStatus::Success,
            Err(e) => e.status(),
        }
    }
}

impl fmt::Display for SaiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SaiStatus::Success => "SAI_STATUS_SUCCESS",
            SaiStatus::Failure => "SAI_STATUS_FAILURE",
            SaiStatus::NotSupported => "SAI_STATUS_NOT_SUPPORTED",
            SaiStatus::InsufficientResources => "SAI_STATUS_INSUFFICIENT_RESOURCES",
            SaiStatus::InvalidParameter => "SAI_STATUS_INVALID_PARAMETER",
            SaiStatus::ItemAlreadyExists => "SAI_STATUS_ITEM_ALREADY_EXISTS",
            SaiStatus::ItemNotFound => "SAI_STATUS_ITEM_NOT_FOUND",
            SaiStatus::BufferOverflow => "SAI_STATUS_BUFFER_OVERFLOW",
            SaiStatus::Uninitialized => "SAI_STATUS_UNINITIALIZED",
            SaiStatus::MandatoryAttributeMissing => "SAI_STATUS_MANDATORY_ATTRIBUTE_MISSING",
            SaiStatus::NotImplemented => "SAI_STATUS_NOT_IMPLEMENTED",
            SaiStatus::ObjectInUse => "SAI_STATUS_OBJECT_IN_USE",
        };
        write!(f, "{}", s)
    }
}

/// Error type for SAI stub operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaiError {
    /// Malformed or missing input.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// A mandatory create attribute was not supplied.
    #[error("Mandatory attribute missing: {attribute}")]
    MandatoryAttributeMissing { attribute: String },

    /// The identity does not resolve to a live object.
    #[error("Item not found: {item}")]
    NotFound { item: String },

    /// The item is already present.
    #[error("Item already exists: {item}")]
    AlreadyExists { item: String },

    /// A fixed-capacity table or group is full.
    #[error("Insufficient resources: {resource}")]
    InsufficientResources { resource: String },

    /// The object still has dependents.
    #[error("Object in use: {object}")]
    ObjectInUse { object: String },

    /// The requested feature is not supported by the stub.
    #[error("Feature not supported: {feature}")]
    NotSupported { feature: String },

    /// The operation is not implemented by the stub.
    #[error("Not implemented: {operation}")]
    NotImplemented { operation: String },

    /// Caller-supplied object list is too small.
    #[error("Buffer overflow: {required} entries required, {capacity} available")]
    BufferOverflow { required: u32, capacity: u32 },

    /// The switch has not been initialized.
    #[error("SAI not initialized")]
    Uninitialized,
}

impl SaiError {
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        SaiError::InvalidParameter {
            message: message.into(),
        }
    }

    /// Creates a mandatory attribute missing error.
    pub fn mandatory_attribute_missing(attribute: impl Into<String>) -> Self {
        SaiError::MandatoryAttributeMissing {
            attribute: attribute.into(),
        }
    }

    pub fn not_found(item: impl Into<String>) -> Self {
        SaiError::NotFound { item: item.into() }
    }

    pub fn already_exists(item: impl Into<String>) -> Self {
        SaiError::AlreadyExists { item: item.into() }
    }

    /// Creates an insufficient resources error.
    pub fn insufficient_resources(resource: impl Into<String>) -> Self {
        SaiError::InsufficientResources {
            resource: resource.into(),
        }
    }

    pub fn object_in_use(object: impl Into<String>) -> Self {
        SaiError::ObjectInUse {
            object: object.into(),
        }
    }

    pub fn not_supported(feature: impl Into<String>) -> Self {
        SaiError::NotSupported {
            feature: feature.into(),
        }
    }

    /// Creates a not implemented error.
    pub fn not_implemented(operation: impl Into<String>) -> Self {
        SaiError::NotImplemented {
            operation: operation.into(),
        }
    }

    /// Returns the SAI status code for this error.
    pub fn status(&self) -> SaiStatus {
        match self {
            SaiError::InvalidParameter { .. } => SaiStatus::InvalidParameter,
            SaiError::MandatoryAttributeMissing { .. } => SaiStatus::MandatoryAttributeMissing,
            SaiError::NotFound { .. } => SaiStatus::ItemNotFound,
            SaiError::AlreadyExists { .. } => SaiStatus::ItemAlreadyExists,
            SaiError::InsufficientResources { .. } => SaiStatus::InsufficientResources,
            SaiError::ObjectInUse { .. } => SaiStatus::ObjectInUse,
            SaiError::NotSupported { .. } => SaiStatus::NotSupported,
            SaiError::NotImplemented { .. } => SaiStatus::NotImplemented,
            SaiError::BufferOverflow { .. } => SaiStatus::BufferOverflow,
            SaiError::Uninitialized => SaiStatus::Uninitialized,
        }
    }
}

/// Result of a stub SAI call.
pub type SaiResult<T> = Result<T, SaiError>;
