use serde_json::Value;

use crate::error::Error;
use crate::telemetry::SensorState;

/// Parse one sensor line and fold its readings into `state`.
///
/// Two encodings are accepted, sniffed by the leading character: a structured
/// JSON record (`{"temp":28.5,"gas":300,...}`) or a free-form `key:value` /
/// `key=value` list with arbitrary separators (`temp:28.5 gas=300; mic:120`).
/// Keys are case-insensitive and aliased (`temp`/`temperature`,
/// `sound`/`mic`/`microphone`). Fields absent from the line keep their prior
/// value; in the free-form path every pair that parses is applied even when
/// the rest of the line is garbage.
pub fn apply_line(state: &mut SensorState, line: &str) -> Result<(), Error> {
    let line = line.trim();

    if line.starts_with('{') {
        apply_record(state, line)
    } else {
        apply_pairs(state, line)
    }
}

fn apply_record(state: &mut SensorState, line: &str) -> Result<(), Error> {
    let value: Value =
        serde_json::from_str(line).map_err(|e| Error::InvalidRecord(e.to_string()))?;
    let map = value
        .as_object()
        .ok_or_else(|| Error::InvalidRecord("not a key/value record".into()))?;

    for (key, value) in map {
        if let Some(number) = value.as_f64() {
            apply_field(state, key, number);
        }
    }

    Ok(())
}

fn apply_pairs(state: &mut SensorState, line: &str) -> Result<(), Error> {
    let bytes = line.as_bytes();
    let mut applied = false;
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_alphabetic() {
            i += 1;
            continue;
        }

        let key_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        let key = &line[key_start..i];

        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        if i >= bytes.len() || (bytes[i] != b':' && bytes[i] != b'=') {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }

        let number_start = i;
        if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
            i += 1;
        }
        while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
            i += 1;
        }

        if let Ok(value) = line[number_start..i].parse::<f64>() {
            applied |= apply_field(state, key, value);
        }
    }

    if applied {
        Ok(())
    } else {
        Err(Error::UnrecognizedLine(line.to_string()))
    }
}

fn apply_field(state: &mut SensorState, key: &str, value: f64) -> bool {
    match key.to_ascii_lowercase().as_str() {
        "temp" | "temperature" => state.temperature = value,
        "humidity" => state.humidity = value,
        "gas" => state.gas = value,
        "flame" => state.flame = (value != 0.0) as u8,
        "sound" | "mic" | "microphone" => state.sound = value,
        "vibration" => state.vibration = value,
        _ => return false,
    }
    true
}
