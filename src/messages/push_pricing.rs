//! Dynamic pricing pushes: pricing products and their assignment to EVSEs.
//! Both exist from OICP 2.2 on.

use serde_json::Value;

use super::{Acknowledgement, Operation, OperationKind, RequestContext};
use crate::codec::{CodecContext, Fields, Obj, WireRequest};
use crate::domain::identifiers::OperatorId;
use crate::domain::records::{EvsePricing, PricingProductData};
use crate::domain::types::ActionType;
use crate::support::errors::CodecError;

const PRODUCT_ROOT: &str = "eRoamingPushPricingProductData";
const EVSE_PRICING_ROOT: &str = "eRoamingPushEVSEPricing";

pub struct PushPricingProductData;

impl Operation for PushPricingProductData {
    const KIND: OperationKind = OperationKind::PushPricingProductData;

    type Request = PushPricingProductDataRequest;
    type Response = Acknowledgement<PushPricingProductDataRequest>;
}

pub struct PushEvsePricing;

impl Operation for PushEvsePricing {
    const KIND: OperationKind = OperationKind::PushEvsePricing;

    type Request = PushEvsePricingRequest;
    type Response = Acknowledgement<PushEvsePricingRequest>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushPricingProductDataRequest {
    pub action_type: ActionType,
    pub pricing_product_data: PricingProductData,
    pub context: RequestContext,
}

impl PushPricingProductDataRequest {
    pub fn new(action_type: ActionType, pricing_product_data: PricingProductData) -> Self {
        Self {
            action_type,
            pricing_product_data,
            context: RequestContext::new(),
        }
    }

    pub fn operator_id(&self) -> &OperatorId {
        &self.pricing_product_data.operator_id
    }
}

impl WireRequest for PushPricingProductDataRequest {
    const ROOT: &'static str = PRODUCT_ROOT;

    fn decode(body: &Value, ctx: &CodecContext) -> Result<Self, CodecError> {
        let f = Fields::new(PRODUCT_ROOT, body)?;
        Ok(Self {
            action_type: f.required("ActionType")?,
            pricing_product_data: PricingProductData::from_fields(f.required_object("PricingProductData")?)?,
            context: ctx.request_context.clone(),
        })
    }

    fn encode(&self, _ctx: &CodecContext) -> Value {
        Obj::new()
            .text("ActionType", self.action_type)
            .value("PricingProductData", self.pricing_product_data.to_value())
            .build()
    }

    fn context(&self) -> &RequestContext {
        &self.context
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushEvsePricingRequest {
    pub action_type: ActionType,
    pub operator_id: OperatorId,
    pub evse_pricing: Vec<EvsePricing>,
    pub context: RequestContext,
}

impl PushEvsePricingRequest {
    pub fn new(action_type: ActionType, operator_id: OperatorId, evse_pricing: Vec<EvsePricing>) -> Self {
        Self {
            action_type,
            operator_id,
            evse_pricing,
            context: RequestContext::new(),
        }
    }
}

impl WireRequest for PushEvsePricingRequest {
    const ROOT: &'static str = EVSE_PRICING_ROOT;

    fn decode(body: &Value, ctx: &CodecContext) -> Result<Self, CodecError> {
        let f = Fields::new(EVSE_PRICING_ROOT, body)?;
        let operator_id = match f.optional::<OperatorId>("OperatorID")? {
            Some(id) => id,
            None => ctx.operator_id.clone().ok_or(CodecError::MissingField {
                context: EVSE_PRICING_ROOT,
                field: "OperatorID",
            })?,
        };
        Ok(Self {
            action_type: f.required("ActionType")?,
            operator_id,
            evse_pricing: f.objects("EVSEPricing", EvsePricing::from_fields)?,
            context: ctx.request_context.clone(),
        })
    }

    /// The REST binding carries the operator in the path only.
    fn encode(&self, ctx: &CodecContext) -> Value {
        let obj = Obj::new().text("ActionType", self.action_type);
        let obj = if ctx.is_rest() {
            obj
        } else {
            obj.text("OperatorID", &self.operator_id)
        };
        obj.list("EVSEPricing", self.evse_pricing.iter().map(|p| p.to_value()))
            .build()
    }

    fn context(&self) -> &RequestContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_request, encode_request, read, render};
    use crate::domain::identifiers::{EvseId, PartnerProductId, ProductId};
    use crate::domain::records::{PricingProductDataRecord, ProviderScope};
    use crate::domain::types::ReferenceUnit;
    use crate::domain::version::OicpVersion;
    use crate::support::custom_data::CustomData;
    use rust_decimal::Decimal;

    fn evse_pricing_request() -> PushEvsePricingRequest {
        PushEvsePricingRequest::new(
            ActionType::FullLoad,
            OperatorId::parse("DE*GEF").unwrap(),
            vec![
                EvsePricing::new(EvseId::parse("DE*GEF*E1").unwrap())
                    .with_product(PartnerProductId::parse("AC1").unwrap()),
            ],
        )
    }

    #[test]
    fn evse_pricing_operator_from_path_in_rest() {
        let original = evse_pricing_request();
        let ctx = CodecContext::new(OicpVersion::V2_3);
        let body = original.encode(&ctx);
        assert!(body.get("OperatorID").is_none());

        assert!(PushEvsePricingRequest::decode(&body, &ctx).is_err());
        let ctx = ctx.with_operator(OperatorId::try_parse("DE*GEF"));
        assert_eq!(PushEvsePricingRequest::decode(&body, &ctx).unwrap(), original);
    }

    #[test]
    fn evse_pricing_soap_carries_operator() {
        let original = evse_pricing_request();
        let ctx = CodecContext::new(OicpVersion::V2_2);
        let text = render(&encode_request(&original, &ctx, None), OicpVersion::V2_2).unwrap();
        assert!(text.contains("<DynamicPricing:OperatorID>DE*GEF</DynamicPricing:OperatorID>"));

        let element = read(&text, OicpVersion::V2_2, EVSE_PRICING_ROOT).unwrap();
        let parsed: PushEvsePricingRequest = decode_request(&element, &ctx, None).unwrap().unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn pricing_product_data_round_trip() {
        let data = PricingProductData {
            operator_id: OperatorId::parse("DE*GEF").unwrap(),
            operator_name: None,
            provider_id: ProviderScope::All,
            pricing_default_price: Decimal::new(30, 2),
            pricing_default_price_currency: "EUR".into(),
            pricing_default_reference_unit: ReferenceUnit::KilowattHour,
            records: vec![PricingProductDataRecord::new(
                ProductId::parse("AC1").unwrap(),
                ReferenceUnit::KilowattHour,
                "EUR",
                Decimal::new(39, 2),
                Decimal::new(22, 0),
            )],
            last_update: None,
            custom_data: CustomData::new(),
        };
        let original = PushPricingProductDataRequest::new(ActionType::Insert, data);

        for version in [OicpVersion::V2_2, OicpVersion::V2_3] {
            let ctx = CodecContext::new(version);
            let text = render(&encode_request(&original, &ctx, None), version).unwrap();
            let element = read(&text, version, PRODUCT_ROOT).unwrap();
            let parsed: PushPricingProductDataRequest = decode_request(&element, &ctx, None).unwrap().unwrap();
            assert_eq!(parsed, original, "{}", version);
        }
    }
}
