//! Aggregate records carried by the push, pull and CDR operations

pub mod charge_detail_record;
pub mod evse_data_record;
pub mod evse_status_record;
pub mod operator_data;
pub mod pricing;

pub use charge_detail_record::{ChargeDetailRecord, ChargeDetailRecordBuilder, MeterValue};
pub use evse_data_record::{EvseDataRecord, EvseDataRecordBuilder};
pub use evse_status_record::EvseStatusRecord;
pub use operator_data::{OperatorEvseData, OperatorEvseStatus};
pub use pricing::{
    AdditionalReference, Currency, EvsePricing, PricingProductData, PricingProductDataRecord,
    ProviderScope,
};
