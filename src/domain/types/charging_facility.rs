//! Charging facilities: the structured form (OICP 2.2+) and the legacy
//! facility classes (OICP 2.0/2.1), with the bucketing between them.

use serde_json::Value;

use crate::codec::accessors::{Fields, Obj};
use crate::domain::types::enums::{ChargingFacilityClass, PowerType};
use crate::support::errors::CodecError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargingFacility {
    pub power_type: PowerType,
    /// Volts
    pub voltage: Option<u32>,
    /// Amperes
    pub amperage: Option<u32>,
    /// Kilowatts
    pub power: u32,
    pub charging_modes: Vec<String>,
}

impl ChargingFacility {
    pub fn new(power_type: PowerType, power: u32) -> Self {
        Self {
            power_type,
            voltage: None,
            amperage: None,
            power,
            charging_modes: Vec::new(),
        }
    }

    pub fn with_electrics(mut self, voltage: u32, amperage: u32) -> Self {
        self.voltage = Some(voltage);
        self.amperage = Some(amperage);
        self
    }

    pub fn class(&self) -> ChargingFacilityClass {
        bucket(self.power_type, self.voltage, self.amperage, Some(self.power))
    }

    /// Representative facility for a legacy class, if it describes one.
    pub fn from_class(class: ChargingFacilityClass) -> Option<Self> {
        let (power_type, electrics, power) = representative(class)?;
        let facility = Self::new(power_type, power);
        Some(match electrics {
            Some((voltage, amperage)) => facility.with_electrics(voltage, amperage),
            None => facility,
        })
    }

    pub(crate) fn to_value(&self) -> Value {
        Obj::new()
            .text("PowerType", self.power_type)
            .opt_number("Voltage", self.voltage)
            .opt_number("Amperage", self.amperage)
            .number("Power", self.power)
            .text_list("ChargingModes", &self.charging_modes)
            .build()
    }

    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            power_type: f.required("PowerType")?,
            voltage: f.optional("Voltage")?,
            amperage: f.optional("Amperage")?,
            power: f.required("Power")?,
            charging_modes: f.list_of("ChargingModes")?,
        })
    }

    /// Structured object or legacy class token.
    pub(crate) fn from_wire(value: &Value) -> Result<Option<Self>, CodecError> {
        match value {
            Value::String(token) => Ok(Self::from_class(ChargingFacilityClass::from(token.as_str()))),
            other => Self::from_fields(Fields::new("ChargingFacility", other)?).map(Some),
        }
    }
}

/// Classify electrics into a facility class.
///
/// AC single phase 100-120 V: <=10/<=16/<=32 A; 200-240 V: <=10/<=16/<=32/>32 A;
/// AC three phase 380-480 V: <=16/<=32/<=63 A; DC: <=20/<=50/>50 kW.
/// Everything else is `Unspecified`.
pub fn bucket(
    power_type: PowerType,
    voltage: Option<u32>,
    amperage: Option<u32>,
    power_kw: Option<u32>,
) -> ChargingFacilityClass {
    use ChargingFacilityClass::*;

    match power_type {
        PowerType::Dc => match power_kw {
            Some(p) if p <= 20 => DcUpTo20kW,
            Some(p) if p <= 50 => DcUpTo50kW,
            Some(_) => DcOver50kW,
            None => Unspecified,
        },
        PowerType::Ac1Phase => match (voltage, amperage) {
            (Some(v), Some(a)) if (100..=120).contains(&v) => match a {
                0..=10 => Ac1Phase100To120VUpTo10A,
                11..=16 => Ac1Phase100To120VUpTo16A,
                17..=32 => Ac1Phase100To120VUpTo32A,
                _ => Unspecified,
            },
            (Some(v), Some(a)) if (200..=240).contains(&v) => match a {
                0..=10 => Ac1Phase200To240VUpTo10A,
                11..=16 => Ac1Phase200To240VUpTo16A,
                17..=32 => Ac1Phase200To240VUpTo32A,
                _ => Ac1Phase200To240VOver32A,
            },
            _ => Unspecified,
        },
        PowerType::Ac3Phase => match (voltage, amperage) {
            (Some(v), Some(a)) if (380..=480).contains(&v) => match a {
                0..=16 => Ac3Phase380To480VUpTo16A,
                17..=32 => Ac3Phase380To480VUpTo32A,
                33..=63 => Ac3Phase380To480VUpTo63A,
                _ => Unspecified,
            },
            _ => Unspecified,
        },
    }
}

/// Power type, (volts, amperes) and kilowatts standing in for a class.
pub fn representative(
    class: ChargingFacilityClass,
) -> Option<(PowerType, Option<(u32, u32)>, u32)> {
    use ChargingFacilityClass::*;

    let ac1 = |v, a, p| Some((PowerType::Ac1Phase, Some((v, a)), p));
    let ac3 = |a, p| Some((PowerType::Ac3Phase, Some((400, a)), p));
    let dc = |p| Some((PowerType::Dc, None, p));

    match class {
        Ac1Phase100To120VUpTo10A => ac1(110, 10, 1),
        Ac1Phase100To120VUpTo16A => ac1(110, 16, 2),
        Ac1Phase100To120VUpTo32A => ac1(110, 32, 4),
        Ac1Phase200To240VUpTo10A => ac1(230, 10, 2),
        Ac1Phase200To240VUpTo16A => ac1(230, 16, 4),
        Ac1Phase200To240VUpTo32A => ac1(230, 32, 7),
        Ac1Phase200To240VOver32A => ac1(230, 63, 14),
        Ac3Phase380To480VUpTo16A => ac3(16, 11),
        Ac3Phase380To480VUpTo32A => ac3(32, 22),
        Ac3Phase380To480VUpTo63A => ac3(63, 43),
        DcUpTo20kW => dc(20),
        DcUpTo50kW => dc(50),
        DcOver50kW => dc(100),
        BatteryExchange | Unspecified => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucketing_thresholds() {
        use ChargingFacilityClass::*;
        assert_eq!(bucket(PowerType::Ac3Phase, Some(400), Some(32), None), Ac3Phase380To480VUpTo32A);
        assert_eq!(bucket(PowerType::Ac3Phase, Some(400), Some(33), None), Ac3Phase380To480VUpTo63A);
        assert_eq!(bucket(PowerType::Ac1Phase, Some(110), Some(10), None), Ac1Phase100To120VUpTo10A);
        assert_eq!(bucket(PowerType::Ac1Phase, Some(110), Some(40), None), Unspecified);
        assert_eq!(bucket(PowerType::Ac1Phase, Some(230), Some(40), None), Ac1Phase200To240VOver32A);
        assert_eq!(bucket(PowerType::Ac1Phase, Some(160), Some(16), None), Unspecified);
        assert_eq!(bucket(PowerType::Dc, None, None, Some(20)), DcUpTo20kW);
        assert_eq!(bucket(PowerType::Dc, None, None, Some(21)), DcUpTo50kW);
        assert_eq!(bucket(PowerType::Dc, None, None, Some(150)), DcOver50kW);
    }

    #[test]
    fn representatives_fall_back_into_their_class() {
        for class in ChargingFacilityClass::ALL {
            if let Some(facility) = ChargingFacility::from_class(*class) {
                assert_eq!(facility.class(), *class, "{:?}", class);
            }
        }
    }

    #[test]
    fn legacy_token_decodes_to_facility() {
        let facility = ChargingFacility::from_wire(&Value::String("380 - 480V, 3-Phase ≤32A".into()))
            .unwrap()
            .unwrap();
        assert_eq!(facility.power_type, PowerType::Ac3Phase);
        assert_eq!(facility.amperage, Some(32));
    }
}
