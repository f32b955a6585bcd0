//! Status line rendering for the headless consumer

use telemlog_core::prelude::*;

/// One-line summary of the newest record, with decoded faults if any
pub fn status_line(record: &Record, faults: &FaultTable) -> String {
    let mut line = format!(
        "#{} rpm={} speed={}km/h gear={} clt={}C egt={}/{}C map={} u12={}mV",
        record.log_index,
        record.engine_rpm,
        record.vehicle_speed,
        record.gear,
        record.oil_coolant_temperature,
        record.egt_bank1,
        record.egt_bank2,
        record.map_value,
        record.u12v,
    );
    if let Some(summary) = faults.summary(record.faultword1) {
        line.push_str(" | ");
        line.push_str(&summary);
    }
    line
}

/// Min and max of a series, for axis scaling by a front end
pub fn series_range(values: &[i64]) -> Option<(i64, i64)> {
    let min = *values.iter().min()?;
    let max = *values.iter().max()?;
    Some((min, max))
}
