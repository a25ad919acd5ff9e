//! Message model
//!
//! One request and one response type per OICP operation, tied together by an
//! [`Operation`] marker. Requests are shared as `Arc` once built and never
//! mutated; changes go through the matching builder.

pub mod acknowledgement;
pub mod authorize_remote;
pub mod authorize_start;
pub mod authorize_stop;
pub mod charge_detail_record;
pub mod pull_evse_data;
pub mod pull_evse_status;
pub mod push_evse_data;
pub mod push_evse_status;
pub mod push_pricing;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::codec::{WireRequest, WireResponse};
use crate::domain::version::OicpVersion;

pub use acknowledgement::{Acknowledgement, AcknowledgementBuilder};
pub use authorize_remote::{
    AuthorizeRemoteStart, AuthorizeRemoteStartRequest, AuthorizeRemoteStop,
    AuthorizeRemoteStopRequest,
};
pub use authorize_start::{
    AuthorizationStart, AuthorizationStartBuilder, AuthorizeStart, AuthorizeStartRequest,
    AuthorizeStartRequestBuilder,
};
pub use authorize_stop::{
    AuthorizationStop, AuthorizationStopBuilder, AuthorizeStop, AuthorizeStopRequest,
    AuthorizeStopRequestBuilder,
};
pub use charge_detail_record::{ChargeDetailRecordRequest, SendChargeDetailRecord};
pub use pull_evse_data::{
    PullEvseData, PullEvseDataRequest, PullEvseDataResponse, PullEvseDataResponseBuilder,
    SearchCenter,
};
pub use pull_evse_status::{
    PullEvseStatus, PullEvseStatusRequest, PullEvseStatusResponse, PullEvseStatusResponseBuilder,
};
pub use push_evse_data::{PushEvseData, PushEvseDataRequest};
pub use push_evse_status::{PushEvseStatus, PushEvseStatusRequest};
pub use push_pricing::{
    PushEvsePricing, PushEvsePricingRequest, PushPricingProductData,
    PushPricingProductDataRequest,
};

/// Every operation this crate speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    AuthorizeStart,
    AuthorizeStop,
    ChargeDetailRecord,
    PushEvseData,
    PushEvseStatus,
    PushPricingProductData,
    PushEvsePricing,
    PullEvseData,
    PullEvseStatus,
    AuthorizeRemoteStart,
    AuthorizeRemoteStop,
}

impl OperationKind {
    pub const ALL: [OperationKind; 11] = [
        Self::AuthorizeStart,
        Self::AuthorizeStop,
        Self::ChargeDetailRecord,
        Self::PushEvseData,
        Self::PushEvseStatus,
        Self::PushPricingProductData,
        Self::PushEvsePricing,
        Self::PullEvseData,
        Self::PullEvseStatus,
        Self::AuthorizeRemoteStart,
        Self::AuthorizeRemoteStop,
    ];

    /// Position in [`ALL`](Self::ALL); used to index counter tables.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthorizeStart => "AuthorizeStart",
            Self::AuthorizeStop => "AuthorizeStop",
            Self::ChargeDetailRecord => "ChargeDetailRecord",
            Self::PushEvseData => "PushEVSEData",
            Self::PushEvseStatus => "PushEVSEStatus",
            Self::PushPricingProductData => "PushPricingProductData",
            Self::PushEvsePricing => "PushEVSEPricing",
            Self::PullEvseData => "PullEVSEData",
            Self::PullEvseStatus => "PullEVSEStatus",
            Self::AuthorizeRemoteStart => "AuthorizeRemoteStart",
            Self::AuthorizeRemoteStop => "AuthorizeRemoteStop",
        }
    }

    pub fn service(&self) -> Service {
        match self {
            Self::AuthorizeStart
            | Self::AuthorizeStop
            | Self::ChargeDetailRecord
            | Self::AuthorizeRemoteStart
            | Self::AuthorizeRemoteStop => Service::Authorization,
            Self::PushEvseData | Self::PullEvseData => Service::EvseData,
            Self::PushEvseStatus | Self::PullEvseStatus => Service::EvseStatus,
            Self::PushPricingProductData | Self::PushEvsePricing => Service::DynamicPricing,
        }
    }

    /// Dynamic pricing exists from OICP 2.2 on.
    pub fn is_available(&self, version: OicpVersion) -> bool {
        self.service() != Service::DynamicPricing || version >= OicpVersion::V2_2
    }

    /// Operations addressed to an EMP carry `{providerID}` in their REST
    /// path, all others `{operatorID}`.
    pub fn is_provider_scoped(&self) -> bool {
        matches!(
            self,
            Self::PullEvseData
                | Self::PullEvseStatus
                | Self::AuthorizeRemoteStart
                | Self::AuthorizeRemoteStop
        )
    }

    /// OICP 2.3 REST path template.
    pub fn rest_path(&self) -> &'static str {
        match self {
            Self::AuthorizeStart => "/api/oicp/charging/v21/operators/{operatorID}/authorize/start",
            Self::AuthorizeStop => "/api/oicp/charging/v21/operators/{operatorID}/authorize/stop",
            Self::ChargeDetailRecord => "/api/oicp/cdrmgmt/v22/operators/{operatorID}/charge-detail-record",
            Self::PushEvseData => "/api/oicp/evsepush/v23/operators/{operatorID}/data-records",
            Self::PushEvseStatus => "/api/oicp/evsepush/v21/operators/{operatorID}/status-records",
            Self::PushPricingProductData => {
                "/api/oicp/dynamicpricing/v10/operators/{operatorID}/pricing-products"
            }
            Self::PushEvsePricing => "/api/oicp/dynamicpricing/v10/operators/{operatorID}/evse-pricing",
            Self::PullEvseData => "/api/oicp/evsepull/v23/providers/{providerID}/data-records",
            Self::PullEvseStatus => "/api/oicp/evsepull/v21/providers/{providerID}/status-records",
            Self::AuthorizeRemoteStart => {
                "/api/oicp/charging/v21/providers/{providerID}/authorize-remote/start"
            }
            Self::AuthorizeRemoteStop => {
                "/api/oicp/charging/v21/providers/{providerID}/authorize-remote/stop"
            }
        }
    }

    /// REST path with its party placeholder filled in.
    pub fn rest_path_for(&self, party: &str) -> String {
        self.rest_path()
            .replace("{operatorID}", party)
            .replace("{providerID}", party)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// OICP service an operation belongs to; decides the XML namespace and the
/// SOAP endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Authorization,
    EvseData,
    EvseStatus,
    DynamicPricing,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Self::Authorization,
        Self::EvseData,
        Self::EvseStatus,
        Self::DynamicPricing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Authorization => "eRoamingAuthorization",
            Self::EvseData => "eRoamingEvseData",
            Self::EvseStatus => "eRoamingEvseStatus",
            Self::DynamicPricing => "eRoamingDynamicPricing",
        }
    }

    /// SOAP endpoint path for OICP 2.0 - 2.2.
    pub fn soap_path(&self, version: OicpVersion) -> String {
        format!("/ws/{}/{}", version.path_segment(), self.name())
    }

    pub fn operations(&self) -> impl Iterator<Item = OperationKind> + '_ {
        OperationKind::ALL.into_iter().filter(move |k| k.service() == *self)
    }
}

/// Ties a request type to its response type.
pub trait Operation: Send + Sync + 'static {
    const KIND: OperationKind;

    type Request: WireRequest;
    type Response: WireResponse<Self::Request>;
}

/// Per-request metadata. Not part of structural equality.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub timestamp: DateTime<Utc>,
    /// Cooperative cancellation, observed by handlers.
    pub cancellation: CancellationToken,
    /// Correlates all events raised for one request.
    pub event_tracking_id: Uuid,
    /// Overrides the client's default round-trip timeout.
    pub timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            cancellation: CancellationToken::new(),
            event_tracking_id: Uuid::new_v4(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for RequestContext {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// Per-response metadata. Not part of structural equality.
#[derive(Debug, Clone)]
pub struct ResponseContext {
    pub timestamp: DateTime<Utc>,
    pub event_tracking_id: Option<Uuid>,
    /// Time from request to response, when known.
    pub runtime: Option<Duration>,
}

impl ResponseContext {
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            event_tracking_id: None,
            runtime: None,
        }
    }

    pub fn for_request(request: &RequestContext) -> Self {
        Self {
            timestamp: Utc::now(),
            event_tracking_id: Some(request.event_tracking_id),
            runtime: None,
        }
    }
}

impl Default for ResponseContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ResponseContext {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}
