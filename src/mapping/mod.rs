//! OICP <-> WWCP domain mapper
//!
//! Identifier conversions are partial and return `Option`; enumeration
//! conversions are total `From` impls; aggregate conversions return
//! `Result<_, MappingError>` and carry what the target cannot express in
//! its custom-data bag.

pub mod enums;
pub mod evse;
pub mod identifiers;
pub mod session;

use crate::wwcp::EvseStatusType;

pub use enums::{auth_start_result_type, auth_stop_result_type, power_type};
pub use evse::{
    apply_charging_facility_class, apply_evse_status_record, as_charging_facility_class,
    evse_data_record_to_wwcp, wwcp_evse_to_evse_data_record, wwcp_evse_to_evse_status_record,
};
pub use identifiers::{ToOicp, ToWwcp};
pub use session::{
    authorization_start_to_wwcp, authorization_stop_to_wwcp, charge_detail_record_to_wwcp,
    identification_to_wwcp, wwcp_to_charge_detail_record, wwcp_to_identification,
};

/// Custom-data key of the source record stashed on a generic EVSE.
pub const OICP_EVSE_DATA_RECORD: &str = "OICP.EVSEDataRecord";
/// Custom-data key of the source record stashed on a generic CDR.
pub const OICP_CHARGE_DETAIL_RECORD: &str = "OICP.ChargeDetailRecord";
/// Prefix of generic-only EVSE data exported to OICP records.
pub const WWCP_EVSE_PREFIX: &str = "WWCP.EVSE.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapperOptions {
    /// Status recorded on freshly mapped EVSEs.
    pub initial_status: Option<EvseStatusType>,
    pub max_history_size: usize,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            initial_status: None,
            max_history_size: 50,
        }
    }
}
