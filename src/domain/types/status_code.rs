//! OICP status codes

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::codec::accessors::{Fields, Obj};
use crate::support::errors::CodecError;

/// Numeric status code; unknown codes are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatusCodes {
    Success,
    HubjectSystemError,
    HubjectDatabaseError,
    DataTransactionError,
    UnauthorizedAccess,
    InconsistentEvseId,
    InconsistentEvcoId,
    SystemError,
    DataError,
    QrCodeAuthenticationFailed,
    RfidAuthenticationFailedInvalidUid,
    RfidAuthenticationFailedCardNotReadable,
    PinAuthenticationFailed,
    NoValidContract,
    InvalidEvcoId,
    ServiceNotAvailable,
    SessionIsInvalid,
    CommunicationToEvseFailed,
    NoEvConnectedToEvse,
    EvseAlreadyReserved,
    EvseAlreadyInUse,
    UnknownEvseId,
    EvseOutOfService,
    Other(String),
}

const TABLE: &[(StatusCodes, &str, &str)] = &[
    (StatusCodes::Success, "000", "Success"),
    (StatusCodes::HubjectSystemError, "001", "Hubject system error"),
    (StatusCodes::HubjectDatabaseError, "002", "Hubject database error"),
    (StatusCodes::DataTransactionError, "009", "Data transaction error"),
    (StatusCodes::UnauthorizedAccess, "017", "Unauthorized Access"),
    (StatusCodes::InconsistentEvseId, "018", "Inconsistent EvseID"),
    (StatusCodes::InconsistentEvcoId, "019", "Inconsistent EvcoID"),
    (StatusCodes::SystemError, "021", "System error"),
    (StatusCodes::DataError, "022", "Data error"),
    (StatusCodes::QrCodeAuthenticationFailed, "101", "QR Code Authentication failed - Invalid Credentials"),
    (StatusCodes::RfidAuthenticationFailedInvalidUid, "102", "RFID Authentication failed - invalid UID"),
    (StatusCodes::RfidAuthenticationFailedCardNotReadable, "103", "RFID Authentication failed - card not readable"),
    (StatusCodes::PinAuthenticationFailed, "105", "PIN Authentication failed - invalid PIN"),
    (StatusCodes::NoValidContract, "300", "No valid contract"),
    (StatusCodes::InvalidEvcoId, "310", "Invalid EvcoID"),
    (StatusCodes::ServiceNotAvailable, "320", "Service not available"),
    (StatusCodes::SessionIsInvalid, "400", "Session is invalid"),
    (StatusCodes::CommunicationToEvseFailed, "501", "Communication to EVSE failed"),
    (StatusCodes::NoEvConnectedToEvse, "510", "No EV connected to EVSE"),
    (StatusCodes::EvseAlreadyReserved, "601", "EVSE already reserved"),
    (StatusCodes::EvseAlreadyInUse, "602", "EVSE already in use / wrong token"),
    (StatusCodes::UnknownEvseId, "603", "Unknown EVSE ID"),
    (StatusCodes::EvseOutOfService, "700", "EVSE out of service"),
];

impl StatusCodes {
    pub fn code(&self) -> &str {
        match self {
            Self::Other(code) => code,
            known => TABLE
                .iter()
                .find(|(c, _, _)| c == known)
                .map(|(_, code, _)| *code)
                .unwrap_or("021"),
        }
    }

    pub fn default_description(&self) -> Option<&'static str> {
        TABLE
            .iter()
            .find(|(c, _, _)| c == self)
            .map(|(_, _, description)| *description)
    }

    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        TABLE
            .iter()
            .find(|(_, code, _)| *code == s)
            .map(|(c, _, _)| c.clone())
            .unwrap_or_else(|| Self::Other(s.to_string()))
    }
}

impl fmt::Display for StatusCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for StatusCodes {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// `StatusCode` element: code plus optional description and additional info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCode {
    pub code: StatusCodes,
    pub description: Option<String>,
    pub additional_info: Option<String>,
}

impl StatusCode {
    pub fn new(code: StatusCodes) -> Self {
        Self {
            code,
            description: None,
            additional_info: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_additional_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = Some(info.into());
        self
    }

    pub fn success() -> Self {
        Self::new(StatusCodes::Success).with_description("Success")
    }

    pub fn data_error(description: impl Into<String>, additional_info: Option<String>) -> Self {
        Self {
            code: StatusCodes::DataError,
            description: Some(description.into()),
            additional_info,
        }
    }

    pub fn system_error(description: impl Into<String>, additional_info: Option<String>) -> Self {
        Self {
            code: StatusCodes::SystemError,
            description: Some(description.into()),
            additional_info,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == StatusCodes::Success
    }

    pub(crate) fn to_value(&self) -> Value {
        Obj::new()
            .text("Code", &self.code)
            .opt_text("Description", self.description.as_deref())
            .opt_text("AdditionalInfo", self.additional_info.as_deref())
            .build()
    }

    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            code: f.required("Code")?,
            description: f.optional_str("Description")?,
            additional_info: f.optional_str("AdditionalInfo")?,
        })
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(description) = &self.description {
            write!(f, " {}", description)?;
        }
        if let Some(info) = &self.additional_info {
            write!(f, " ({})", info)?;
        }
        Ok(())
    }
}
