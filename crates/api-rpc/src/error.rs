//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use smartq_core::error::{AppError, ErrorKind};

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const THROTTLED: i32 = 4003;
    pub const INVALID_STATE: i32 = 4004;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let code = match &err {
        // Storage failures keep their own code so clients can tell them apart
        AppError::Database(_) => code::DB_ERROR,
        other => match other.kind() {
            ErrorKind::Validation => code::VALIDATION_ERROR,
            ErrorKind::NotFound => code::NOT_FOUND,
            ErrorKind::Conflict => code::CONFLICT,
            ErrorKind::InvalidState => code::INVALID_STATE,
            ErrorKind::Internal => code::INTERNAL_ERROR,
        },
    };
    ErrorObjectOwned::owned(code, err.to_string(), None::<()>)
}

/// Re-code a params decoding failure as a validation error
pub fn invalid_params(err: ErrorObjectOwned) -> ErrorObjectOwned {
    let message = match err.data() {
        Some(detail) => format!("{}: {}", err.message(), detail.get().trim_matches('"')),
        None => err.message().to_string(),
    };
    ErrorObjectOwned::owned(code::VALIDATION_ERROR, message, None::<()>)
}

pub fn throttled() -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        code::THROTTLED,
        "Rate limit exceeded. Please slow down.",
        None::<()>,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartq_core::domain::{DomainError, TicketStatus};

    #[test]
    fn test_error_codes_follow_kind() {
        let cases = vec![
            (AppError::Validation("bad".into()), code::VALIDATION_ERROR),
            (AppError::NotFound("Queue q".into()), code::NOT_FOUND),
            (AppError::Conflict("busy".into()), code::CONFLICT),
            (AppError::Database("disk".into()), code::DB_ERROR),
            (AppError::Internal("boom".into()), code::INTERNAL_ERROR),
            (
                DomainError::NotServing {
                    ticket_id: "t".into(),
                    status: TicketStatus::Waiting,
                }
                .into(),
                code::INVALID_STATE,
            ),
            (DomainError::QueueInactive("q".into()).into(), code::NOT_FOUND),
        ];

        for (err, expected) in cases {
            let message = err.to_string();
            let obj = to_rpc_error(err);
            assert_eq!(obj.code(), expected, "{}", message);
            assert_eq!(obj.message(), message);
        }
    }

    #[test]
    fn test_invalid_params_keeps_detail() {
        let parse_failure = ErrorObjectOwned::owned(
            jsonrpsee::types::error::INVALID_PARAMS_CODE,
            "Invalid params",
            Some("missing field `queueId`"),
        );
        let obj = invalid_params(parse_failure);
        assert_eq!(obj.code(), code::VALIDATION_ERROR);
        assert!(obj.message().contains("missing field `queueId`"));
    }

    #[test]
    fn test_throttled_code() {
        assert_eq!(throttled().code(), code::THROTTLED);
    }
}
