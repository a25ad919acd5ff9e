//! Opening hours and product availability windows

use chrono::NaiveTime;
use serde_json::Value;

use crate::codec::accessors::{Fields, Obj};
use crate::domain::types::enums::WeekDay;
use crate::support::errors::CodecError;

/// `HH:MM` to `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub begin: NaiveTime,
    pub end: NaiveTime,
}

impl Period {
    fn to_value(self) -> Value {
        Obj::new()
            .text("begin", self.begin.format("%H:%M"))
            .text("end", self.end.format("%H:%M"))
            .build()
    }

    fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        let time = |key: &'static str| -> Result<NaiveTime, CodecError> {
            let raw = f.required_str(key)?;
            NaiveTime::parse_from_str(&raw, "%H:%M")
                .map_err(|e| CodecError::invalid("Period", key, e))
        };
        Ok(Self {
            begin: time("begin")?,
            end: time("end")?,
        })
    }
}

/// Days plus the periods that apply on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub periods: Vec<Period>,
    pub on: WeekDay,
}

impl Schedule {
    pub fn new(on: WeekDay) -> Self {
        Self {
            periods: Vec::new(),
            on,
        }
    }

    pub fn with_period(mut self, begin: NaiveTime, end: NaiveTime) -> Self {
        self.periods.push(Period { begin, end });
        self
    }

    /// `periods_key` is `Period` for opening times and `Periods` for
    /// product availability.
    pub(crate) fn to_value(&self, periods_key: &str) -> Value {
        Obj::new()
            .list(periods_key, self.periods.iter().map(|p| p.to_value()))
            .text("on", self.on)
            .build()
    }

    pub(crate) fn from_fields(f: Fields<'_>, periods_key: &'static str) -> Result<Self, CodecError> {
        Ok(Self {
            periods: f.objects(periods_key, Period::from_fields)?,
            on: f.required("on")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schedule_round_trip() {
        let body = json!({"Periods": [{"begin": "08:00", "end": "18:30"}], "on": "Workdays"});
        let schedule = Schedule::from_fields(Fields::new("t", &body).unwrap(), "Periods").unwrap();
        assert_eq!(schedule.on, WeekDay::Workdays);
        assert_eq!(schedule.to_value("Periods"), body);
    }

    #[test]
    fn rejects_bad_time() {
        let body = json!({"Period": {"begin": "8 Uhr", "end": "18:30"}, "on": "Everyday"});
        assert!(Schedule::from_fields(Fields::new("t", &body).unwrap(), "Period").is_err());
    }
}
