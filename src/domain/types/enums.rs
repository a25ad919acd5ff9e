//! Closed protocol enumerations and their wire tokens

use std::fmt;
use std::str::FromStr;

/// Declares an enum with its wire tokens.
///
/// With `fallback = Variant`, unknown tokens parse to that sentinel instead
/// of failing, so partners may send values that are not modelled yet.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident $(fallback = $fallback:ident)? {
            $($(#[$vmeta:meta])* $variant:ident => $token:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_wire(&self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }

            /// Exact token match, ignoring ASCII case.
            pub fn parse(s: &str) -> Option<Self> {
                let s = s.trim();
                $(if s.eq_ignore_ascii_case($token) {
                    return Some(Self::$variant);
                })+
                None
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_wire())
            }
        }

        wire_enum!(@from_str $name $($fallback)?);
    };

    (@from_str $name:ident $fallback:ident) => {
        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::parse(s).unwrap_or(Self::$fallback)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from(s))
            }
        }
    };

    (@from_str $name:ident) => {
        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s).ok_or_else(|| format!("unknown {} '{}'", stringify!($name), s))
            }
        }
    };
}

wire_enum!(
    AuthorizationStatus {
        Authorized => "Authorized",
        NotAuthorized => "NotAuthorized",
    }
);

wire_enum!(
    /// How a push operation applies to the receiver's data set.
    ActionType {
        FullLoad => "fullLoad",
        Update => "update",
        Insert => "insert",
        Delete => "delete",
    }
);

wire_enum!(
    EvseStatus fallback = Unknown {
        Available => "Available",
        Reserved => "Reserved",
        Occupied => "Occupied",
        OutOfService => "OutOfService",
        EvseNotFound => "EvseNotFound",
        Unknown => "Unknown",
    }
);

wire_enum!(
    PlugType fallback = Unspecified {
        SmallPaddleInductive => "Small Paddle Inductive",
        LargePaddleInductive => "Large Paddle Inductive",
        AvconConnector => "AVCON Connector",
        TeslaConnector => "Tesla Connector",
        Nema5_20 => "NEMA 5-20",
        TypeEFrenchStandard => "Type E French Standard",
        TypeFSchuko => "Type F Schuko",
        TypeGBritishStandard => "Type G British Standard",
        TypeJSwissStandard => "Type J Swiss Standard",
        Type1ConnectorCableAttached => "Type 1 Connector (Cable Attached)",
        Type2Outlet => "Type 2 Outlet",
        Type2ConnectorCableAttached => "Type 2 Connector (Cable Attached)",
        Type3Outlet => "Type 3 Outlet",
        Iec60309SinglePhase => "IEC 60309 Single Phase",
        Iec60309ThreePhase => "IEC 60309 Three Phase",
        CcsCombo2PlugCableAttached => "CCS Combo 2 Plug (Cable Attached)",
        CcsCombo1PlugCableAttached => "CCS Combo 1 Plug (Cable Attached)",
        Chademo => "CHAdeMO",
        Unspecified => "Unspecified",
    }
);

wire_enum!(
    AuthenticationMode fallback = Unknown {
        NfcRfidClassic => "NFC RFID Classic",
        NfcRfidDesfire => "NFC RFID DESFire",
        PnC => "PnC",
        Remote => "REMOTE",
        DirectPayment => "Direct Payment",
        NoAuthenticationRequired => "No Authentication Required",
        Unknown => "Unknown",
    }
);

wire_enum!(
    PaymentOption fallback = Unknown {
        NoPayment => "No Payment",
        Direct => "Direct",
        Contract => "Contract",
        Unknown => "Unknown",
    }
);

wire_enum!(
    ValueAddedService fallback = Unknown {
        Reservation => "Reservation",
        DynamicPricing => "DynamicPricing",
        ParkingSensors => "ParkingSensors",
        MaximumPowerCharging => "MaximumPowerCharging",
        PredictiveChargePointUsage => "PredictiveChargePointUsage",
        ChargingPlans => "ChargingPlans",
        RoofProvided => "RoofProvided",
        None => "None",
        Unknown => "Unknown",
    }
);

wire_enum!(
    Accessibility fallback = Unspecified {
        FreePubliclyAccessible => "Free publicly accessible",
        RestrictedAccess => "Restricted access",
        PayingPubliclyAccessible => "Paying publicly accessible",
        TestStation => "Test Station",
        Unspecified => "Unspecified",
    }
);

wire_enum!(
    AccessibilityLocation {
        OnStreet => "OnStreet",
        ParkingLot => "ParkingLot",
        ParkingGarage => "ParkingGarage",
        UndergroundParkingGarage => "UndergroundParkingGarage",
    }
);

wire_enum!(
    PowerType {
        Ac1Phase => "AC_1_PHASE",
        Ac3Phase => "AC_3_PHASE",
        Dc => "DC",
    }
);

wire_enum!(
    RfidType {
        MifareClassic => "mifareCls",
        MifareDesfire => "mifareDes",
        Calypso => "calypso",
        Nfc => "nfc",
        MifareFamily => "mifareFamily",
    }
);

wire_enum!(
    ReferenceUnit {
        Hour => "HOUR",
        KilowattHour => "KILOWATT_HOUR",
        Minute => "MINUTE",
    }
);

wire_enum!(
    CalibrationLawDataAvailability fallback = NotAvailable {
        Local => "Local",
        External => "External",
        NotAvailable => "Not Available",
    }
);

wire_enum!(
    DynamicInfoAvailable fallback = Auto {
        True => "true",
        False => "false",
        Auto => "auto",
    }
);

wire_enum!(
    /// Encoding requested for coordinates in pull responses.
    GeoCoordinatesFormat {
        Google => "Google",
        DecimalDegree => "DecimalDegree",
        DegreeMinuteSeconds => "DegreeMinuteSeconds",
    }
);

wire_enum!(
    WeekDay {
        Monday => "Monday",
        Tuesday => "Tuesday",
        Wednesday => "Wednesday",
        Thursday => "Thursday",
        Friday => "Friday",
        Saturday => "Saturday",
        Sunday => "Sunday",
        Workdays => "Workdays",
        Weekend => "Weekend",
        Everyday => "Everyday",
    }
);

wire_enum!(
    /// Charging facility tokens used by OICP 2.0 and 2.1.
    ChargingFacilityClass fallback = Unspecified {
        Ac1Phase100To120VUpTo10A => "100 - 120V, 1-Phase ≤10A",
        Ac1Phase100To120VUpTo16A => "100 - 120V, 1-Phase ≤16A",
        Ac1Phase100To120VUpTo32A => "100 - 120V, 1-Phase ≤32A",
        Ac1Phase200To240VUpTo10A => "200 - 240V, 1-Phase ≤10A",
        Ac1Phase200To240VUpTo16A => "200 - 240V, 1-Phase ≤16A",
        Ac1Phase200To240VUpTo32A => "200 - 240V, 1-Phase ≤32A",
        Ac1Phase200To240VOver32A => "200 - 240V, 1-Phase >32A",
        Ac3Phase380To480VUpTo16A => "380 - 480V, 3-Phase ≤16A",
        Ac3Phase380To480VUpTo32A => "380 - 480V, 3-Phase ≤32A",
        Ac3Phase380To480VUpTo63A => "380 - 480V, 3-Phase ≤63A",
        BatteryExchange => "Battery exchange",
        DcUpTo20kW => "DC Charging ≤20kW",
        DcUpTo50kW => "DC Charging ≤50kW",
        DcOver50kW => "DC Charging >50kW",
        Unspecified => "Unspecified",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for plug in PlugType::ALL {
            assert_eq!(PlugType::parse(plug.as_wire()), Some(*plug));
        }
        for class in ChargingFacilityClass::ALL {
            assert_eq!(ChargingFacilityClass::from(class.as_wire()), *class);
        }
        assert_eq!(ActionType::parse("FULLLOAD"), Some(ActionType::FullLoad));
    }

    #[test]
    fn unknown_tokens_fall_back_to_sentinel() {
        assert_eq!(EvseStatus::from("Charging"), EvseStatus::Unknown);
        assert_eq!(PlugType::from("Type 42"), PlugType::Unspecified);
        assert_eq!(Accessibility::from(""), Accessibility::Unspecified);
        assert_eq!("Bitcoin".parse::<PaymentOption>(), Ok(PaymentOption::Unknown));
    }

    #[test]
    fn strict_enums_reject_unknown_tokens() {
        assert!("Maybe".parse::<AuthorizationStatus>().is_err());
        assert!("AC_2_PHASE".parse::<PowerType>().is_err());
    }
}
