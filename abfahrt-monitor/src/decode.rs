//! Payload decoding and flattening

use abfahrt_core::departures::{DepartureTime, RawBatch, RawDeparture};
use abfahrt_core::error::DataError;
use log::debug;

use crate::payload::{DeparturePayload, LinePayload, MonitorResponse};
use crate::time::{parse_stamp, Stamp};

/// Decode a response body into raw departures
///
/// A body that is not JSON, or whose `data` is not a list, is `Malformed`.
/// Single stops, lines or departures that cannot be read are skipped and
/// counted on the batch. A well-formed body without a `data` collection
/// decodes to a batch whose departures are missing; the aggregator
/// reports that case.
pub fn decode(body: &[u8]) -> Result<RawBatch, DataError> {
    let response: MonitorResponse = serde_json::from_slice(body).map_err(|err| {
        debug!("decode: {}", err);
        DataError::Malformed
    })?;
    Ok(flatten(&response))
}

/// Flatten stops → lines → departures into one batch
pub fn flatten(response: &MonitorResponse) -> RawBatch {
    let Some(stops) = response.data.as_ref() else {
        return RawBatch::missing();
    };

    let mut batch = RawBatch::new();
    let mut newest: Option<Stamp> = None;
    batch.record_skipped(stops.skipped());
    for stop in stops.iter() {
        let diva = stop.diva.as_deref().unwrap_or("");
        batch.record_skipped(stop.lines.skipped());
        for line in stop.lines.iter() {
            batch.record_skipped(line.departures.skipped());
            for departure in line.departures.iter() {
                let (raw, stamp) = to_raw(diva, line, departure);
                if let Some(stamp) = stamp {
                    if newest.map_or(true, |n| stamp.unix_s > n.unix_s) {
                        newest = Some(stamp);
                    }
                }
                batch.push(raw);
            }
        }
    }
    if let Some(stamp) = newest {
        batch.set_utc_offset(stamp.utc_offset_min);
    }
    if batch.skipped() > 0 {
        debug!("decode: {} unreadable entries skipped", batch.skipped());
    }
    batch
}

fn to_raw(
    diva: &str,
    line: &LinePayload,
    departure: &DeparturePayload,
) -> (RawDeparture, Option<Stamp>) {
    let real = departure.time_real.as_deref().and_then(parse_stamp);
    let planned = departure.time_planned.as_deref().and_then(parse_stamp);
    let stamp = real.or(planned);
    let time = match stamp {
        Some(stamp) => DepartureTime::Known(stamp.unix_s),
        None => DepartureTime::Unknown,
    };

    let destination = departure
        .towards
        .as_deref()
        .or(line.towards.as_deref())
        .unwrap_or("");

    let raw = RawDeparture::new(
        diva,
        &line.name,
        line.direction.as_deref().unwrap_or(""),
        destination.trim(),
        time,
        real.is_some(),
    );
    (raw, stamp)
}
