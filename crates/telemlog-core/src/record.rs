//! Telemetry record and schema
//!
//! A [`Record`] is one decoded sample from the logger. The channel set is
//! fixed: every record carries all [`SCHEMA_LEN`] channels, in the order
//! they appear on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of channels in the schema (including `log_index`)
pub const SCHEMA_LEN: usize = 17;

/// Field delimiter used on the wire
pub const FIELD_DELIMITER: char = ';';

/// One channel of the schema, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    /// Sample counter maintained by the logger
    LogIndex,
    /// Engine speed in rpm
    EngineRpm,
    /// Vehicle speed
    VehicleSpeed,
    /// Selected gear
    Gear,
    /// Engine torque
    Torque,
    /// Oil/coolant temperature
    OilCoolantTemperature,
    /// Exhaust gas temperature, bank 1
    EgtBank1,
    /// Exhaust gas temperature, bank 2
    EgtBank2,
    /// Intake air temperature
    IntakeAirTemperature,
    /// Oil pressure
    OilPressure,
    /// Fuel pressure
    FuelPressure,
    /// Manifold absolute pressure
    ManifoldPressure,
    /// Exhaust back pressure, bank 1
    ExhaustPressureBank1,
    /// Exhaust back pressure, bank 2
    ExhaustPressureBank2,
    /// 12 V supply voltage
    Supply12V,
    /// 5 V sensor supply voltage
    Supply5V,
    /// Fault bitmask
    FaultWord,
}

impl Channel {
    /// All channels in wire order
    pub const ALL: [Channel; SCHEMA_LEN] = [
        Channel::LogIndex,
        Channel::EngineRpm,
        Channel::VehicleSpeed,
        Channel::Gear,
        Channel::Torque,
        Channel::OilCoolantTemperature,
        Channel::EgtBank1,
        Channel::EgtBank2,
        Channel::IntakeAirTemperature,
        Channel::OilPressure,
        Channel::FuelPressure,
        Channel::ManifoldPressure,
        Channel::ExhaustPressureBank1,
        Channel::ExhaustPressureBank2,
        Channel::Supply12V,
        Channel::Supply5V,
        Channel::FaultWord,
    ];

    /// Column name as emitted by the logger firmware and written to CSV headers
    pub fn name(self) -> &'static str {
        match self {
            Channel::LogIndex => "log_index",
            Channel::EngineRpm => "engine_rpm",
            Channel::VehicleSpeed => "vehicle_speed",
            Channel::Gear => "gear",
            Channel::Torque => "torque",
            Channel::OilCoolantTemperature => "oil_coolant_temperature",
            Channel::EgtBank1 => "EGT_bank1",
            Channel::EgtBank2 => "EGT_bank2",
            Channel::IntakeAirTemperature => "intake_air_temperature",
            Channel::OilPressure => "oil_press",
            Channel::FuelPressure => "fuel_press",
            Channel::ManifoldPressure => "MAP_value",
            Channel::ExhaustPressureBank1 => "exhaust_press_bank1",
            Channel::ExhaustPressureBank2 => "exhaust_press_bank2",
            Channel::Supply12V => "U12V",
            Channel::Supply5V => "U5V",
            Channel::FaultWord => "faultword1",
        }
    }

    /// Position of the channel on the wire
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a channel by its column name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded telemetry sample
///
/// Records are built whole, either by [`crate::protocol::parse_line`] or by
/// the synthetic source, and are never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    /// Sample counter maintained by the logger
    pub log_index: i64,
    /// Engine speed in rpm
    pub engine_rpm: i64,
    /// Vehicle speed
    pub vehicle_speed: i64,
    /// Selected gear
    pub gear: i64,
    /// Engine torque
    pub torque: i64,
    /// Oil/coolant temperature
    pub oil_coolant_temperature: i64,
    /// Exhaust gas temperature, bank 1
    pub egt_bank1: i64,
    /// Exhaust gas temperature, bank 2
    pub egt_bank2: i64,
    /// Intake air temperature
    pub intake_air_temperature: i64,
    /// Oil pressure
    pub oil_press: i64,
    /// Fuel pressure
    pub fuel_press: i64,
    /// Manifold absolute pressure
    pub map_value: i64,
    /// Exhaust back pressure, bank 1
    pub exhaust_press_bank1: i64,
    /// Exhaust back pressure, bank 2
    pub exhaust_press_bank2: i64,
    /// 12 V supply voltage
    pub u12v: i64,
    /// 5 V sensor supply voltage
    pub u5v: i64,
    /// Fault bitmask
    pub faultword1: i64,
}

impl Record {
    /// Bind values to channels by schema position
    pub fn from_values(v: [i64; SCHEMA_LEN]) -> Self {
        Self {
            log_index: v[0],
            engine_rpm: v[1],
            vehicle_speed: v[2],
            gear: v[3],
            torque: v[4],
            oil_coolant_temperature: v[5],
            egt_bank1: v[6],
            egt_bank2: v[7],
            intake_air_temperature: v[8],
            oil_press: v[9],
            fuel_press: v[10],
            map_value: v[11],
            exhaust_press_bank1: v[12],
            exhaust_press_bank2: v[13],
            u12v: v[14],
            u5v: v[15],
            faultword1: v[16],
        }
    }

    /// Channel values in schema order
    pub fn values(&self) -> [i64; SCHEMA_LEN] {
        [
            self.log_index,
            self.engine_rpm,
            self.vehicle_speed,
            self.gear,
            self.torque,
            self.oil_coolant_temperature,
            self.egt_bank1,
            self.egt_bank2,
            self.intake_air_temperature,
            self.oil_press,
            self.fuel_press,
            self.map_value,
            self.exhaust_press_bank1,
            self.exhaust_press_bank2,
            self.u12v,
            self.u5v,
            self.faultword1,
        ]
    }

    /// Value of a single channel
    pub fn get(&self, channel: Channel) -> i64 {
        self.values()[channel.index()]
    }

    /// Serialize in wire format, without the line terminator
    pub fn to_line(&self) -> String {
        self.values()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(&FIELD_DELIMITER.to_string())
    }
}
