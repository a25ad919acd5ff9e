pub mod identifiers;
pub mod records;
pub mod types;
pub mod version;

// Re-export commonly used types
pub use identifiers::{
    CpoPartnerSessionId, EmpPartnerSessionId, EvcoId, EvseId, OperatorId, PartnerProductId,
    PhoneNumber, ProductId, ProviderId, SessionId, Uid,
};
pub use records::{
    ChargeDetailRecord, EvseDataRecord, EvsePricing, EvseStatusRecord, OperatorEvseData,
    OperatorEvseStatus, PricingProductData,
};
pub use types::{Identification, StatusCode, StatusCodes};
pub use version::OicpVersion;
