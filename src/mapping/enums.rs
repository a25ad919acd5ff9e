//! Enumeration conversions between OICP and the generic model.
//!
//! Every conversion is total: values without a counterpart land on the
//! target's sentinel (`Unknown`, `Unspecified`).

use crate::domain::types::{
    Accessibility, AuthenticationMode, AuthorizationStatus, EvseStatus, PaymentOption, PlugType,
    PowerType, StatusCode, StatusCodes,
};
use crate::wwcp::{
    AccessibilityType, AuthMethod, AuthStartResultType, AuthStopResultType, ChargingConnector,
    CurrentType, EvseStatusType, PaymentMethod, SocketType,
};

impl From<EvseStatus> for EvseStatusType {
    fn from(status: EvseStatus) -> Self {
        match status {
            EvseStatus::Available => Self::Available,
            EvseStatus::Reserved => Self::Reserved,
            EvseStatus::Occupied => Self::Charging,
            EvseStatus::OutOfService => Self::OutOfService,
            EvseStatus::EvseNotFound => Self::UnknownEvse,
            EvseStatus::Unknown => Self::Unspecified,
        }
    }
}

impl From<EvseStatusType> for EvseStatus {
    fn from(status: EvseStatusType) -> Self {
        match status {
            EvseStatusType::Available => Self::Available,
            EvseStatusType::Reserved => Self::Reserved,
            EvseStatusType::Charging => Self::Occupied,
            EvseStatusType::OutOfService | EvseStatusType::Error => Self::OutOfService,
            EvseStatusType::UnknownEvse => Self::EvseNotFound,
            EvseStatusType::Offline | EvseStatusType::Unspecified => Self::Unknown,
        }
    }
}

impl From<PlugType> for ChargingConnector {
    fn from(plug: PlugType) -> Self {
        use SocketType::*;

        let (socket, cable_attached) = match plug {
            PlugType::SmallPaddleInductive => (SmallPaddleInductive, true),
            PlugType::LargePaddleInductive => (LargePaddleInductive, true),
            PlugType::AvconConnector => (Avcon, true),
            PlugType::TeslaConnector => (Tesla, true),
            PlugType::Nema5_20 => (Nema5_20, false),
            PlugType::TypeEFrenchStandard => (FrenchStandard, false),
            PlugType::TypeFSchuko => (Schuko, false),
            PlugType::TypeGBritishStandard => (BritishStandard, false),
            PlugType::TypeJSwissStandard => (SwissStandard, false),
            PlugType::Type1ConnectorCableAttached => (Type1, true),
            PlugType::Type2Outlet => (Type2, false),
            PlugType::Type2ConnectorCableAttached => (Type2, true),
            PlugType::Type3Outlet => (Type3, false),
            PlugType::Iec60309SinglePhase => (Iec60309SinglePhase, false),
            PlugType::Iec60309ThreePhase => (Iec60309ThreePhase, false),
            PlugType::CcsCombo2PlugCableAttached => (Ccs2, true),
            PlugType::CcsCombo1PlugCableAttached => (Ccs1, true),
            PlugType::Chademo => (Chademo, true),
            PlugType::Unspecified => (Unspecified, false),
        };
        ChargingConnector::new(socket, cable_attached)
    }
}

impl From<ChargingConnector> for PlugType {
    fn from(connector: ChargingConnector) -> Self {
        match connector.socket {
            SocketType::Type1 => Self::Type1ConnectorCableAttached,
            SocketType::Type2 if connector.cable_attached => Self::Type2ConnectorCableAttached,
            SocketType::Type2 => Self::Type2Outlet,
            SocketType::Type3 => Self::Type3Outlet,
            SocketType::Schuko => Self::TypeFSchuko,
            SocketType::FrenchStandard => Self::TypeEFrenchStandard,
            SocketType::BritishStandard => Self::TypeGBritishStandard,
            SocketType::SwissStandard => Self::TypeJSwissStandard,
            SocketType::Nema5_20 => Self::Nema5_20,
            SocketType::Iec60309SinglePhase => Self::Iec60309SinglePhase,
            SocketType::Iec60309ThreePhase => Self::Iec60309ThreePhase,
            SocketType::Ccs1 => Self::CcsCombo1PlugCableAttached,
            SocketType::Ccs2 => Self::CcsCombo2PlugCableAttached,
            SocketType::Chademo => Self::Chademo,
            SocketType::Tesla => Self::TeslaConnector,
            SocketType::Avcon => Self::AvconConnector,
            SocketType::SmallPaddleInductive => Self::SmallPaddleInductive,
            SocketType::LargePaddleInductive => Self::LargePaddleInductive,
            SocketType::Unspecified => Self::Unspecified,
        }
    }
}

impl From<AuthenticationMode> for AuthMethod {
    fn from(mode: AuthenticationMode) -> Self {
        match mode {
            AuthenticationMode::NfcRfidClassic => Self::RfidMifareClassic,
            AuthenticationMode::NfcRfidDesfire => Self::RfidMifareDesfire,
            AuthenticationMode::PnC => Self::PlugAndCharge,
            AuthenticationMode::Remote => Self::Remote,
            AuthenticationMode::DirectPayment => Self::DirectPayment,
            AuthenticationMode::NoAuthenticationRequired => Self::NoAuthentication,
            AuthenticationMode::Unknown => Self::Unknown,
        }
    }
}

impl From<AuthMethod> for AuthenticationMode {
    fn from(method: AuthMethod) -> Self {
        match method {
            AuthMethod::RfidMifareClassic => Self::NfcRfidClassic,
            AuthMethod::RfidMifareDesfire => Self::NfcRfidDesfire,
            AuthMethod::PlugAndCharge => Self::PnC,
            AuthMethod::Remote => Self::Remote,
            AuthMethod::DirectPayment => Self::DirectPayment,
            AuthMethod::NoAuthentication => Self::NoAuthenticationRequired,
            AuthMethod::Unknown => Self::Unknown,
        }
    }
}

impl From<PaymentOption> for PaymentMethod {
    fn from(option: PaymentOption) -> Self {
        match option {
            PaymentOption::NoPayment => Self::Free,
            PaymentOption::Direct => Self::Direct,
            PaymentOption::Contract => Self::Contract,
            PaymentOption::Unknown => Self::Unknown,
        }
    }
}

impl From<PaymentMethod> for PaymentOption {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Free => Self::NoPayment,
            PaymentMethod::Direct => Self::Direct,
            PaymentMethod::Contract => Self::Contract,
            PaymentMethod::Unknown => Self::Unknown,
        }
    }
}

impl From<Accessibility> for AccessibilityType {
    fn from(accessibility: Accessibility) -> Self {
        match accessibility {
            Accessibility::FreePubliclyAccessible => Self::FreePublic,
            Accessibility::RestrictedAccess => Self::Restricted,
            Accessibility::PayingPubliclyAccessible => Self::PayingPublic,
            Accessibility::TestStation => Self::TestStation,
            Accessibility::Unspecified => Self::Unspecified,
        }
    }
}

impl From<AccessibilityType> for Accessibility {
    fn from(accessibility: AccessibilityType) -> Self {
        match accessibility {
            AccessibilityType::FreePublic => Self::FreePubliclyAccessible,
            AccessibilityType::Restricted => Self::RestrictedAccess,
            AccessibilityType::PayingPublic => Self::PayingPubliclyAccessible,
            AccessibilityType::TestStation => Self::TestStation,
            AccessibilityType::Unspecified => Self::Unspecified,
        }
    }
}

impl From<PowerType> for CurrentType {
    fn from(power_type: PowerType) -> Self {
        match power_type {
            PowerType::Ac1Phase => Self::Ac1Phase,
            PowerType::Ac3Phase => Self::Ac3Phase,
            PowerType::Dc => Self::Dc,
        }
    }
}

/// OICP has no unspecified power type.
pub fn power_type(current_type: CurrentType) -> Option<PowerType> {
    match current_type {
        CurrentType::Ac1Phase => Some(PowerType::Ac1Phase),
        CurrentType::Ac3Phase => Some(PowerType::Ac3Phase),
        CurrentType::Dc => Some(PowerType::Dc),
        CurrentType::Unspecified => None,
    }
}

/// Result of an authorize start from status and status code.
pub fn auth_start_result_type(status: AuthorizationStatus, code: &StatusCode) -> AuthStartResultType {
    use StatusCodes::*;

    if status == AuthorizationStatus::Authorized {
        return AuthStartResultType::Authorized;
    }
    match code.code {
        QrCodeAuthenticationFailed
        | RfidAuthenticationFailedInvalidUid
        | RfidAuthenticationFailedCardNotReadable
        | PinAuthenticationFailed
        | InvalidEvcoId => AuthStartResultType::InvalidToken,
        SessionIsInvalid => AuthStartResultType::InvalidSessionId,
        CommunicationToEvseFailed => AuthStartResultType::CommunicationTimeout,
        HubjectSystemError | HubjectDatabaseError | DataTransactionError | SystemError | DataError
        | ServiceNotAvailable => AuthStartResultType::Error,
        _ => AuthStartResultType::NotAuthorized,
    }
}

pub fn auth_stop_result_type(status: AuthorizationStatus, code: &StatusCode) -> AuthStopResultType {
    use StatusCodes::*;

    if status == AuthorizationStatus::Authorized {
        return AuthStopResultType::Authorized;
    }
    match code.code {
        SessionIsInvalid => AuthStopResultType::InvalidSessionId,
        CommunicationToEvseFailed => AuthStopResultType::CommunicationTimeout,
        HubjectSystemError | HubjectDatabaseError | DataTransactionError | SystemError | DataError
        | ServiceNotAvailable => AuthStopResultType::Error,
        _ => AuthStopResultType::NotAuthorized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evse_status_round_trips_where_both_sides_know_it() {
        for status in EvseStatus::ALL {
            let generic = EvseStatusType::from(*status);
            assert_eq!(EvseStatus::from(generic), *status, "{:?}", status);
        }
        assert_eq!(EvseStatus::from(EvseStatusType::Offline), EvseStatus::Unknown);
    }

    #[test]
    fn every_plug_maps_and_comes_back() {
        for plug in PlugType::ALL {
            let connector = ChargingConnector::from(*plug);
            assert_eq!(PlugType::from(connector), *plug, "{:?}", plug);
        }
    }

    #[test]
    fn small_enums_are_total_both_ways() {
        for mode in AuthenticationMode::ALL {
            assert_eq!(AuthenticationMode::from(AuthMethod::from(*mode)), *mode);
        }
        for option in PaymentOption::ALL {
            assert_eq!(PaymentOption::from(PaymentMethod::from(*option)), *option);
        }
        for accessibility in Accessibility::ALL {
            assert_eq!(Accessibility::from(AccessibilityType::from(*accessibility)), *accessibility);
        }
        for power in PowerType::ALL {
            assert_eq!(power_type(CurrentType::from(*power)), Some(*power));
        }
        assert_eq!(power_type(CurrentType::Unspecified), None);
    }

    #[test]
    fn authorization_results_by_status_code() {
        let not = AuthorizationStatus::NotAuthorized;
        assert_eq!(
            auth_start_result_type(AuthorizationStatus::Authorized, &StatusCode::success()),
            AuthStartResultType::Authorized
        );
        assert_eq!(
            auth_start_result_type(not, &StatusCode::new(StatusCodes::NoValidContract)),
            AuthStartResultType::NotAuthorized
        );
        assert_eq!(
            auth_start_result_type(not, &StatusCode::new(StatusCodes::RfidAuthenticationFailedInvalidUid)),
            AuthStartResultType::InvalidToken
        );
        assert_eq!(
            auth_start_result_type(not, &StatusCode::system_error("boom", None)),
            AuthStartResultType::Error
        );
        assert_eq!(
            auth_stop_result_type(not, &StatusCode::new(StatusCodes::SessionIsInvalid)),
            AuthStopResultType::InvalidSessionId
        );
    }
}
