//! User identification: exactly one of the supported credential variants.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::codec::accessors::{Fields, Obj};
use crate::domain::identifiers::{EvcoId, Uid};
use crate::domain::types::enums::RfidType;
use crate::support::errors::CodecError;

const RFID_MIFARE_FAMILY: &str = "RFIDMifareFamilyIdentification";
const RFID: &str = "RFIDIdentification";
const QR_CODE: &str = "QRCodeIdentification";
const PLUG_AND_CHARGE: &str = "PlugAndChargeIdentification";
const REMOTE: &str = "RemoteIdentification";

/// Variant keys in the order they are resolved.
pub const VARIANTS: [&str; 5] = [RFID_MIFARE_FAMILY, RFID, QR_CODE, PLUG_AND_CHARGE, REMOTE];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfidIdentification {
    pub uid: Uid,
    pub evco_id: Option<EvcoId>,
    pub rfid_type: RfidType,
    pub printed_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pin {
    Plain(String),
    Hashed {
        value: String,
        function: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identification {
    RfidMifareFamily { uid: Uid },
    Rfid(RfidIdentification),
    QrCode { evco_id: EvcoId, pin: Pin },
    PlugAndCharge { evco_id: EvcoId },
    Remote { evco_id: EvcoId },
}

impl Identification {
    pub fn from_uid(uid: Uid) -> Self {
        Self::RfidMifareFamily { uid }
    }

    pub fn remote(evco_id: EvcoId) -> Self {
        Self::Remote { evco_id }
    }

    pub fn uid(&self) -> Option<&Uid> {
        match self {
            Self::RfidMifareFamily { uid } => Some(uid),
            Self::Rfid(rfid) => Some(&rfid.uid),
            _ => None,
        }
    }

    pub fn evco_id(&self) -> Option<&EvcoId> {
        match self {
            Self::RfidMifareFamily { .. } => None,
            Self::Rfid(rfid) => rfid.evco_id.as_ref(),
            Self::QrCode { evco_id, .. }
            | Self::PlugAndCharge { evco_id }
            | Self::Remote { evco_id } => Some(evco_id),
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        let (key, inner) = match self {
            Self::RfidMifareFamily { uid } => (RFID_MIFARE_FAMILY, Obj::new().text("UID", uid)),
            Self::Rfid(rfid) => (
                RFID,
                Obj::new()
                    .text("UID", &rfid.uid)
                    .opt_text("EvcoID", rfid.evco_id.as_ref())
                    .text("RFID", rfid.rfid_type)
                    .opt_text("PrintedNumber", rfid.printed_number.as_deref())
                    .opt_timestamp("ExpiryDate", rfid.expiry_date.as_ref()),
            ),
            Self::QrCode { evco_id, pin } => {
                let obj = Obj::new().text("EvcoID", evco_id);
                let obj = match pin {
                    Pin::Plain(pin) => obj.text("PIN", pin),
                    Pin::Hashed { value, function } => obj.value(
                        "HashedPIN",
                        Obj::new()
                            .text("Value", value)
                            .opt_text("Function", function.as_deref())
                            .build(),
                    ),
                };
                (QR_CODE, obj)
            }
            Self::PlugAndCharge { evco_id } => (PLUG_AND_CHARGE, Obj::new().text("EvcoID", evco_id)),
            Self::Remote { evco_id } => (REMOTE, Obj::new().text("EvcoID", evco_id)),
        };
        Obj::new().value(key, inner.build()).build()
    }

    /// Exactly one variant must be present.
    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        let present: Vec<&str> = VARIANTS.iter().copied().filter(|k| f.has(k)).collect();
        let key = match present.as_slice() {
            [key] => *key,
            [] => {
                return Err(CodecError::Choice {
                    context: "Identification",
                    reason: "no identification variant present".into(),
                })
            }
            many => {
                return Err(CodecError::Choice {
                    context: "Identification",
                    reason: format!("more than one variant present: {}", many.join(", ")),
                })
            }
        };

        match key {
            RFID_MIFARE_FAMILY => {
                let inner = f.required_object(RFID_MIFARE_FAMILY)?;
                Ok(Self::RfidMifareFamily {
                    uid: inner.required("UID")?,
                })
            }
            RFID => {
                let inner = f.required_object(RFID)?;
                Ok(Self::Rfid(RfidIdentification {
                    uid: inner.required("UID")?,
                    evco_id: inner.optional("EvcoID")?,
                    rfid_type: inner.required("RFID")?,
                    printed_number: inner.optional_str("PrintedNumber")?,
                    expiry_date: inner.optional("ExpiryDate")?,
                }))
            }
            QR_CODE => {
                let inner = f.required_object(QR_CODE)?;
                let pin = match (inner.optional_str("PIN")?, inner.optional_object("HashedPIN")?) {
                    (Some(pin), None) => Pin::Plain(pin),
                    (None, Some(hashed)) => Pin::Hashed {
                        value: hashed.required_str("Value")?,
                        function: hashed.optional_str("Function")?,
                    },
                    _ => {
                        return Err(CodecError::Choice {
                            context: QR_CODE,
                            reason: "exactly one of PIN and HashedPIN is required".into(),
                        })
                    }
                };
                Ok(Self::QrCode {
                    evco_id: inner.required("EvcoID")?,
                    pin,
                })
            }
            PLUG_AND_CHARGE => Ok(Self::PlugAndCharge {
                evco_id: f.required_object(PLUG_AND_CHARGE)?.required("EvcoID")?,
            }),
            _ => Ok(Self::Remote {
                evco_id: f.required_object(REMOTE)?.required("EvcoID")?,
            }),
        }
    }
}

impl fmt::Display for Identification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RfidMifareFamily { uid } => write!(f, "UID:{}", uid),
            Self::Rfid(rfid) => write!(f, "RFID:{}", rfid.uid),
            Self::QrCode { evco_id, .. } => write!(f, "QRCode:{}", evco_id),
            Self::PlugAndCharge { evco_id } => write!(f, "PnC:{}", evco_id),
            Self::Remote { evco_id } => write!(f, "Remote:{}", evco_id),
        }
    }
}
