//! Per-version XML schema description
//!
//! The JSON object model uses the OICP 2.3 element names. For the SOAP
//! versions this table says how those names, lists and namespaces look on
//! the wire.

use crate::domain::version::OicpVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Authorization,
    EvseData,
    EvseStatus,
    DynamicPricing,
    CommonTypes,
}

impl Namespace {
    pub const ALL: [Namespace; 5] = [
        Self::Authorization,
        Self::EvseData,
        Self::EvseStatus,
        Self::DynamicPricing,
        Self::CommonTypes,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Authorization => "Authorization",
            Self::EvseData => "EVSEData",
            Self::EvseStatus => "EVSEStatus",
            Self::DynamicPricing => "DynamicPricing",
            Self::CommonTypes => "CommonTypes",
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::EvseData => "evsedata",
            Self::EvseStatus => "evsestatus",
            Self::DynamicPricing => "dynamicpricing",
            Self::CommonTypes => "commontypes",
        }
    }
}

/// Wrapper element -> item element.
const LIST_WRAPPERS: &[(&str, &str)] = &[
    ("Plugs", "Plug"),
    ("ChargingFacilities", "ChargingFacility"),
    ("ChargingModes", "ChargingMode"),
    ("AuthenticationModes", "AuthenticationMode"),
    ("PaymentOptions", "PaymentOption"),
    ("ValueAddedServices", "ValueAddedService"),
    ("ChargingStationNames", "InfoText"),
    ("AdditionalInfo", "InfoText"),
    ("AuthorizationStopIdentifications", "Identification"),
    ("PricingProductDataRecords", "PricingProductDataRecord"),
    ("AdditionalReferences", "AdditionalReference"),
    ("ProviderIDs", "ProviderID"),
    ("EvseIDProductList", "ProductID"),
    ("OperatorIds", "OperatorID"),
    ("CountryCodes", "CountryCode"),
];

/// Elements (and their descendants) that live in the CommonTypes namespace.
const COMMON_ELEMENTS: &[&str] = &[
    "eRoamingAcknowledgement",
    "StatusCode",
    "RFIDMifareFamilyIdentification",
    "RFIDIdentification",
    "QRCodeIdentification",
    "PlugAndChargeIdentification",
    "RemoteIdentification",
    "Google",
    "DecimalDegree",
    "DegreeMinuteSeconds",
    "InfoText",
];

/// Elements whose children live in the CommonTypes namespace.
const COMMON_CHILDREN: &[&str] = &["Address"];

/// Elements carrying attributes: `{"lang": "de", "value": "..."}`
/// becomes `<InfoText lang="de">...</InfoText>`.
const ATTRIBUTE_ELEMENTS: &[(&str, &[&str])] = &[("InfoText", &["lang"])];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    version: OicpVersion,
}

impl Schema {
    pub fn new(version: OicpVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> OicpVersion {
        self.version
    }

    pub fn namespace_uri(&self, ns: Namespace) -> String {
        let version = match ns {
            Namespace::DynamicPricing => "v1.0",
            _ => self.version.path_segment(),
        };
        format!("http://www.hubject.com/b2b/services/{}/{}", ns.path(), version)
    }

    /// Namespace of a message root element.
    pub fn root_namespace(&self, root: &str) -> Namespace {
        match root {
            "eRoamingAcknowledgement" => Namespace::CommonTypes,
            "eRoamingPushEvseData" | "eRoamingPullEvseData" | "eRoamingEvseData" => Namespace::EvseData,
            "eRoamingPushEvseStatus" | "eRoamingPullEvseStatus" | "eRoamingEvseStatus" => {
                Namespace::EvseStatus
            }
            "eRoamingPushPricingProductData" | "eRoamingPushEVSEPricing" => Namespace::DynamicPricing,
            _ => Namespace::Authorization,
        }
    }

    /// Wire name of a model key in `ns`, or `None` if this version does not
    /// carry the element.
    pub fn xml_name<'a>(&self, ns: Namespace, key: &'a str) -> Option<&'a str> {
        match key {
            "EvseID" => Some(match ns {
                Namespace::Authorization => "EVSEID",
                _ => "EvseId",
            }),
            "CPOPartnerSessionID" if self.version == OicpVersion::V2_0 => Some("PartnerSessionID"),
            "EMPPartnerSessionID" if self.version == OicpVersion::V2_0 => None,
            "meterValues" => Some("MeterValue"),
            other => Some(other),
        }
    }

    /// Model key for a wire name; the inverse of [`xml_name`](Self::xml_name).
    pub fn model_name<'a>(&self, name: &'a str) -> &'a str {
        match name {
            "EVSEID" | "EvseId" => "EvseID",
            "PartnerSessionID" => "CPOPartnerSessionID",
            "MeterValue" => "meterValues",
            other => other,
        }
    }

    pub fn list_item(&self, wrapper: &str) -> Option<&'static str> {
        LIST_WRAPPERS
            .iter()
            .find(|(w, _)| *w == wrapper)
            .map(|(_, item)| *item)
    }

    pub fn is_common(&self, name: &str) -> bool {
        COMMON_ELEMENTS.contains(&name)
    }

    pub fn has_common_children(&self, name: &str) -> bool {
        COMMON_CHILDREN.contains(&name)
    }

    pub fn attributes_of(&self, name: &str) -> Option<&'static [&'static str]> {
        ATTRIBUTE_ELEMENTS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, attrs)| *attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_differences() {
        let v20 = Schema::new(OicpVersion::V2_0);
        let v22 = Schema::new(OicpVersion::V2_2);

        assert_eq!(v20.xml_name(Namespace::Authorization, "CPOPartnerSessionID"), Some("PartnerSessionID"));
        assert_eq!(v20.xml_name(Namespace::Authorization, "EMPPartnerSessionID"), None);
        assert_eq!(v22.xml_name(Namespace::Authorization, "EMPPartnerSessionID"), Some("EMPPartnerSessionID"));
        assert_eq!(v22.xml_name(Namespace::Authorization, "EvseID"), Some("EVSEID"));
        assert_eq!(v22.xml_name(Namespace::EvseStatus, "EvseID"), Some("EvseId"));
        assert_eq!(v20.model_name("PartnerSessionID"), "CPOPartnerSessionID");
    }

    #[test]
    fn namespaces() {
        let schema = Schema::new(OicpVersion::V2_1);
        assert_eq!(
            schema.namespace_uri(Namespace::EvseData),
            "http://www.hubject.com/b2b/services/evsedata/v2.1"
        );
        assert_eq!(schema.root_namespace("eRoamingAcknowledgement"), Namespace::CommonTypes);
        assert_eq!(schema.root_namespace("eRoamingAuthorizeStart"), Namespace::Authorization);
    }
}
