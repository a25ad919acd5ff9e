//! Validated protocol identifiers
//!
//! Construction either yields the canonical form or fails with
//! [`IdentifierError`](crate::support::errors::IdentifierError).

pub mod evco_id;
pub mod evse_id;
pub mod operator_id;
pub mod provider_id;
pub mod session_id;
pub mod text;
pub mod uid;

pub use evco_id::EvcoId;
pub use evse_id::EvseId;
pub use operator_id::{IdFormat, OperatorId};
pub use provider_id::ProviderId;
pub use session_id::SessionId;
pub use text::{CpoPartnerSessionId, EmpPartnerSessionId, PartnerProductId, ProductId};
pub use uid::{PhoneNumber, Uid};
