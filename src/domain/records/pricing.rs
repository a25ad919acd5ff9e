//! Dynamic pricing data (OICP 2.2 and later)

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::codec::accessors::{Fields, Obj};
use crate::domain::identifiers::{EvseId, OperatorId, PartnerProductId, ProductId, ProviderId};
use crate::domain::types::{ReferenceUnit, Schedule};
use crate::support::custom_data::CustomData;
use crate::support::errors::{CodecError, IdentifierError};

/// ISO 4217 currency code.
pub type Currency = String;

#[derive(Debug, Clone, PartialEq)]
pub struct AdditionalReference {
    pub reference: String,
    pub reference_unit: ReferenceUnit,
    pub price_per_reference_unit: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingProductDataRecord {
    pub product_id: ProductId,
    pub reference_unit: ReferenceUnit,
    pub product_price_currency: Currency,
    pub price_per_reference_unit: Decimal,
    /// Kilowatts
    pub maximum_product_charging_power: Decimal,
    pub is_valid_24_hours: bool,
    pub product_availability_times: Vec<Schedule>,
    pub additional_references: Vec<AdditionalReference>,
}

impl PricingProductDataRecord {
    pub fn new(
        product_id: ProductId,
        reference_unit: ReferenceUnit,
        currency: impl Into<Currency>,
        price: Decimal,
        max_power: Decimal,
    ) -> Self {
        Self {
            product_id,
            reference_unit,
            product_price_currency: currency.into(),
            price_per_reference_unit: price,
            maximum_product_charging_power: max_power,
            is_valid_24_hours: true,
            product_availability_times: Vec::new(),
            additional_references: Vec::new(),
        }
    }

    fn to_value(&self) -> Value {
        Obj::new()
            .text("ProductID", &self.product_id)
            .text("ReferenceUnit", self.reference_unit)
            .text("ProductPriceCurrency", &self.product_price_currency)
            .number("PricePerReferenceUnit", self.price_per_reference_unit)
            .number("MaximumProductChargingPower", self.maximum_product_charging_power)
            .boolean("IsValid24hours", self.is_valid_24_hours)
            .list(
                "ProductAvailabilityTimes",
                self.product_availability_times.iter().map(|s| s.to_value("Periods")),
            )
            .list(
                "AdditionalReferences",
                self.additional_references.iter().map(|r| {
                    Obj::new()
                        .text("AdditionalReference", &r.reference)
                        .text("AdditionalReferenceUnit", r.reference_unit)
                        .number("PricePerAdditionalReferenceUnit", r.price_per_reference_unit)
                        .build()
                }),
            )
            .build()
    }

    fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            product_id: f.required("ProductID")?,
            reference_unit: f.required("ReferenceUnit")?,
            product_price_currency: f.required_str("ProductPriceCurrency")?,
            price_per_reference_unit: f.required("PricePerReferenceUnit")?,
            maximum_product_charging_power: f.required("MaximumProductChargingPower")?,
            is_valid_24_hours: f.required_bool("IsValid24hours")?,
            product_availability_times: f
                .objects("ProductAvailabilityTimes", |o| Schedule::from_fields(o, "Periods"))?,
            additional_references: f.objects("AdditionalReferences", |r| {
                Ok(AdditionalReference {
                    reference: r.required_str("AdditionalReference")?,
                    reference_unit: r.required("AdditionalReferenceUnit")?,
                    price_per_reference_unit: r.required("PricePerAdditionalReferenceUnit")?,
                })
            })?,
        })
    }
}

/// Pricing products one operator offers to one (or every) provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingProductData {
    pub operator_id: OperatorId,
    pub operator_name: Option<String>,
    pub provider_id: ProviderScope,
    pub pricing_default_price: Decimal,
    pub pricing_default_price_currency: Currency,
    pub pricing_default_reference_unit: ReferenceUnit,
    pub records: Vec<PricingProductDataRecord>,
    pub last_update: Option<DateTime<Utc>>,
    pub custom_data: CustomData,
}

impl PricingProductData {
    pub(crate) fn to_value(&self) -> Value {
        Obj::new()
            .text("OperatorID", &self.operator_id)
            .opt_text("OperatorName", self.operator_name.as_deref())
            .text("ProviderID", &self.provider_id)
            .number("PricingDefaultPrice", self.pricing_default_price)
            .text("PricingDefaultPriceCurrency", &self.pricing_default_price_currency)
            .text("PricingDefaultReferenceUnit", self.pricing_default_reference_unit)
            .list(
                "PricingProductDataRecords",
                self.records.iter().map(|r| r.to_value()),
            )
            .opt_timestamp("lastUpdate", self.last_update.as_ref())
            .build()
    }

    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            operator_id: f.required("OperatorID")?,
            operator_name: f.optional_str("OperatorName")?,
            provider_id: f.required("ProviderID")?,
            pricing_default_price: f.required("PricingDefaultPrice")?,
            pricing_default_price_currency: f.required_str("PricingDefaultPriceCurrency")?,
            pricing_default_reference_unit: f.required("PricingDefaultReferenceUnit")?,
            records: f.objects("PricingProductDataRecords", PricingProductDataRecord::from_fields)?,
            last_update: f.optional("lastUpdate")?,
            custom_data: CustomData::new(),
        })
    }
}

/// A specific provider, or `*` for all of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderScope {
    All,
    Provider(ProviderId),
}

impl fmt::Display for ProviderScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Provider(id) => id.fmt(f),
        }
    }
}

impl FromStr for ProviderScope {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "*" => Ok(Self::All),
            other => ProviderId::parse(other).map(Self::Provider),
        }
    }
}

/// Which products apply at one EVSE, for which providers.
#[derive(Debug, Clone, PartialEq)]
pub struct EvsePricing {
    pub evse_id: EvseId,
    pub provider_ids: Vec<ProviderScope>,
    pub product_ids: Vec<PartnerProductId>,
    pub custom_data: CustomData,
}

impl EvsePricing {
    pub fn new(evse_id: EvseId) -> Self {
        Self {
            evse_id,
            provider_ids: vec![ProviderScope::All],
            product_ids: Vec::new(),
            custom_data: CustomData::new(),
        }
    }

    pub fn with_product(mut self, product: PartnerProductId) -> Self {
        self.product_ids.push(product);
        self
    }

    pub(crate) fn to_value(&self) -> Value {
        Obj::new()
            .text("EvseID", &self.evse_id)
            .text_list("ProviderIDs", &self.provider_ids)
            .text_list("EvseIDProductList", &self.product_ids)
            .build()
    }

    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            evse_id: f.required("EvseID")?,
            provider_ids: f.list_of("ProviderIDs")?,
            product_ids: f.list_of("EvseIDProductList")?,
            custom_data: CustomData::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::WeekDay;
    use chrono::NaiveTime;

    #[test]
    fn pricing_product_data_round_trip() {
        let mut record = PricingProductDataRecord::new(
            ProductId::parse("AC1").unwrap(),
            ReferenceUnit::KilowattHour,
            "EUR",
            Decimal::new(39, 2),
            Decimal::new(22, 0),
        );
        record.product_availability_times.push(
            Schedule::new(WeekDay::Everyday).with_period(
                NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
            ),
        );

        let data = PricingProductData {
            operator_id: OperatorId::parse("DE*GEF").unwrap(),
            operator_name: Some("GraphDefined".into()),
            provider_id: ProviderScope::All,
            pricing_default_price: Decimal::new(45, 2),
            pricing_default_price_currency: "EUR".into(),
            pricing_default_reference_unit: ReferenceUnit::KilowattHour,
            records: vec![record],
            last_update: None,
            custom_data: CustomData::new(),
        };

        let body = data.to_value();
        assert_eq!(body["ProviderID"], "*");
        let parsed = PricingProductData::from_fields(Fields::new("PricingProductData", &body).unwrap()).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn provider_scope_tokens() {
        assert_eq!("*".parse::<ProviderScope>().unwrap(), ProviderScope::All);
        assert!(matches!("DE-GDF".parse::<ProviderScope>().unwrap(), ProviderScope::Provider(_)));
        assert!("nope".parse::<ProviderScope>().is_err());
    }
}
