//! Synthetic source - simulated engine data for running without hardware
//!
//! Simulates a simple driving cycle: RPM climbs until the car passes 80 km/h,
//! speed follows RPM, and the gearbox shifts up every few seconds once
//! moving. Time is simulated from the record count, so the same seed always
//! yields the same sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use super::{DataSource, SourceError, SourceEvent};
use crate::record::Record;

/// Default spacing between generated records
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

const MIN_RPM: f64 = 700.0;
const MAX_RPM: f64 = 6500.0;
const MAX_SPEED: f64 = 220.0;
const MAX_TORQUE: f64 = 450.0;
const MAX_GEAR: i64 = 8;
const SHIFT_AFTER_MS: u64 = 5000;
const SHIFT_MIN_SPEED: f64 = 20.0;

/// Deterministic telemetry generator
pub struct SyntheticSource {
    /// Records emitted so far; doubles as `log_index`
    index: i64,
    /// Simulated time (ms)
    sim_time_ms: u64,
    /// Simulated time of the last gear change (ms)
    last_shift_ms: u64,
    rpm: f64,
    speed: f64,
    gear: i64,
    torque: f64,
    coolant: f64,
    /// Spacing between records, in simulated and (when paced) wall time
    interval: Duration,
    /// Sleep `interval` before each record
    paced: bool,
    closed: bool,
    /// Supply voltage noise
    rng: StdRng,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL, 0)
    }
}

impl SyntheticSource {
    /// Create a generator that emits one record per `interval` of wall time
    pub fn new(interval: Duration, seed: u64) -> Self {
        Self {
            index: 0,
            sim_time_ms: 0,
            last_shift_ms: 0,
            rpm: 800.0,
            speed: 0.0,
            gear: 1,
            torque: 50.0,
            coolant: 70.0,
            interval,
            paced: true,
            closed: false,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Emit records as fast as they are requested
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    /// Advance the simulation by one step and build the record
    pub fn next_record(&mut self) -> Record {
        self.index += 1;
        self.sim_time_ms += self.interval.as_millis() as u64;

        let rpm_step = if self.speed < 80.0 { 50.0 } else { -30.0 };
        self.rpm = (self.rpm + rpm_step).clamp(MIN_RPM, MAX_RPM);

        let speed_step = if self.rpm > 1200.0 { 0.5 } else { -0.2 };
        self.speed = (self.speed + speed_step).clamp(0.0, MAX_SPEED);

        if self.sim_time_ms - self.last_shift_ms > SHIFT_AFTER_MS && self.speed > SHIFT_MIN_SPEED {
            self.gear = (self.gear + 1).min(MAX_GEAR);
            self.last_shift_ms = self.sim_time_ms;
        }

        let torque_step = if self.rpm < 3000.0 { 5.0 } else { -7.0 };
        self.torque = (self.torque + torque_step).clamp(0.0, MAX_TORQUE);
        self.coolant = (self.coolant + 0.02).min(110.0);

        let load = self.rpm / MAX_RPM;
        let egt1 = 300.0 + load * 700.0;
        let exhaust1 = 80.0 + load * 120.0;

        // Sawtooth ripple over each simulated second, plus a little noise
        let phase = 0.5 - (self.sim_time_ms % 1000) as f64 / 1000.0;
        let u12 = 13_800.0 + 100.0 * phase + self.rng.gen_range(-5.0..=5.0);
        let u5 = 5_020.0 + 10.0 * phase + self.rng.gen_range(-1.0..=1.0);

        Record {
            log_index: self.index,
            engine_rpm: self.rpm as i64,
            vehicle_speed: self.speed as i64,
            gear: self.gear,
            torque: self.torque as i64,
            oil_coolant_temperature: self.coolant as i64,
            egt_bank1: egt1 as i64,
            egt_bank2: (egt1 - 10.0) as i64,
            intake_air_temperature: (20.0 + self.rpm / 10_000.0 * 30.0) as i64,
            oil_press: ((1.5 + load * 4.0) * 100.0) as i64,
            fuel_press: (2500.0 + load * 1500.0) as i64,
            map_value: (1000.0 + load * 1500.0) as i64,
            exhaust_press_bank1: exhaust1 as i64,
            exhaust_press_bank2: (exhaust1 - 5.0) as i64,
            u12v: u12 as i64,
            u5v: u5 as i64,
            faultword1: 0,
        }
    }
}

impl DataSource for SyntheticSource {
    fn next_event(&mut self) -> Result<SourceEvent, SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }
        if self.paced {
            std::thread::sleep(self.interval);
        }
        Ok(SourceEvent::Record(self.next_record()))
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn describe(&self) -> String {
        format!("synthetic generator ({} ms)", self.interval.as_millis())
    }
}
