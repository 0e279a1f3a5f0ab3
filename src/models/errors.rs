//! Centralized Error Handling Module
//!
//! Every way an analysis can fail maps to one `AnalysisError` variant with a
//! unique code, so logs and the gateway can report failures consistently.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - ADDR_xxx: caller input errors
//! - HTTP_xxx / NET_xxx: transport errors
//! - JOB_xxx: backend job outcomes

use std::fmt;

/// Failure of a single `analyze` call
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Address failed validation; no request was made
    InvalidAddress {
        address: String,
        expected_len: usize,
    },
    /// Backend answered with a non-2xx status
    Transport {
        status: u16,
        /// Response body, kept for diagnostics
        body: Option<String>,
    },
    /// Request never produced an HTTP response (connect, timeout, decode)
    Network { message: String },
    /// Backend returned a shape outside the expected state set
    ProtocolViolation {
        reason: String,
        payload: serde_json::Value,
    },
    /// Backend reported the job itself as failed
    JobFailed { message: String },
    /// Poll budget exhausted before the job completed
    Timeout { attempts: u32 },
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    AddressInvalid,
    HttpStatus,
    NetworkFailed,
    ProtocolViolation,
    JobFailed,
    PollTimeout,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddressInvalid => "ADDR_INVALID",
            Self::HttpStatus => "HTTP_STATUS",
            Self::NetworkFailed => "NET_FAILED",
            Self::ProtocolViolation => "JOB_PROTOCOL_VIOLATION",
            Self::JobFailed => "JOB_FAILED",
            Self::PollTimeout => "JOB_TIMEOUT",
        }
    }
}

impl AnalysisError {
    pub fn invalid_address(address: impl Into<String>, expected_len: usize) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            expected_len,
        }
    }

    pub fn transport(status: u16, body: Option<String>) -> Self {
        Self::Transport { status, body }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn protocol(reason: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::ProtocolViolation {
            reason: reason.into(),
            payload,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidAddress { .. } => ErrorCode::AddressInvalid,
            Self::Transport { .. } => ErrorCode::HttpStatus,
            Self::Network { .. } => ErrorCode::NetworkFailed,
            Self::ProtocolViolation { .. } => ErrorCode::ProtocolViolation,
            Self::JobFailed { .. } => ErrorCode::JobFailed,
            Self::Timeout { .. } => ErrorCode::PollTimeout,
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code().as_str()
    }

    /// HTTP status code carried by a transport failure
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw backend payload of a protocol violation
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::ProtocolViolation { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Message shown in the single error slot of the session
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidAddress { expected_len, .. } => format!(
                "Invalid Solana address. Please enter a valid {}-character address.",
                expected_len
            ),
            Self::Transport { status, .. } => {
                format!("Analysis service returned HTTP error {}", status)
            }
            Self::Network { message } => format!("Could not reach the analysis service: {}", message),
            Self::ProtocolViolation { .. } => {
                "Analysis service returned an unexpected response".to_string()
            }
            Self::JobFailed { message } => format!("Analysis failed: {}", message),
            Self::Timeout { .. } => {
                "Timed out waiting for analysis results. Please try again later.".to_string()
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress {
                address,
                expected_len,
            } => write!(
                f,
                "[{}] address {:?} is not {} characters long",
                self.code_str(),
                address,
                expected_len
            ),
            Self::Transport { status, .. } => {
                write!(f, "[{}] backend returned status {}", self.code_str(), status)
            }
            Self::Network { message } => write!(f, "[{}] {}", self.code_str(), message),
            Self::ProtocolViolation { reason, payload } => {
                write!(f, "[{}] {}: {}", self.code_str(), reason, payload)
            }
            Self::JobFailed { message } => write!(f, "[{}] {}", self.code_str(), message),
            Self::Timeout { attempts } => write!(
                f,
                "[{}] no result after {} poll attempts",
                self.code_str(),
                attempts
            ),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("request timeout")
        } else if err.is_connect() {
            Self::network("connection failed")
        } else {
            Self::network(err.to_string())
        }
    }
}
