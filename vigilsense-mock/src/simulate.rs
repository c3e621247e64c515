use rand::Rng;

use vigilsense_core::frame::{FRAME_END, FRAME_START};
use vigilsense_core::telemetry::SensorState;

/// One randomized reading per channel, in the ranges the field board
/// actually produces. Temperatures and gas levels reach past the hazard
/// thresholds so a monitoring run sees occasional events.
pub fn sampled_state<R: Rng>(rng: &mut R) -> SensorState {
    SensorState {
        temperature: round1(rng.random_range(25.0..55.0)),
        humidity: round1(rng.random_range(40.0..60.0)),
        gas: round1(rng.random_range(200.0..800.0)),
        flame: u8::from(rng.random_bool(0.2)),
        sound: round1(rng.random_range(100.0..400.0)),
        vibration: round1(rng.random_range(0.0..150.0)),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn json_line(state: &SensorState) -> String {
    serde_json::json!({
        "temp": state.temperature,
        "humidity": state.humidity,
        "gas": state.gas,
        "flame": state.flame,
        "sound": state.sound,
        "vibration": state.vibration,
    })
    .to_string()
}

pub fn plain_line(state: &SensorState) -> String {
    format!(
        "temp:{} humidity:{} gas:{} flame:{} sound:{} vibration:{}",
        state.temperature, state.humidity, state.gas, state.flame, state.sound, state.vibration
    )
}

/// A synthetic frame with valid start and end markers. The filler byte
/// pattern stays below 0x80 so no accidental marker appears mid-payload.
pub fn synthetic_frame(index: u64, payload_bytes: usize) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload_bytes + 4);
    frame.extend_from_slice(&FRAME_START);
    for offset in 0..payload_bytes {
        frame.push((index as u8).wrapping_add(offset as u8) & 0x7F);
    }
    frame.extend_from_slice(&FRAME_END);
    frame
}

#[cfg(test)]
mod tests {
    use vigilsense_core::frame::FrameDemuxer;
    use vigilsense_core::sensor::apply_line;

    use super::*;

    #[test]
    fn sampled_readings_stay_in_board_ranges() {
        let mut rng = rand::rng();

        for _ in 0..100 {
            // Rounding to one decimal can land exactly on the upper bound.
            let state = sampled_state(&mut rng);
            assert!((25.0..=55.0).contains(&state.temperature));
            assert!((40.0..=60.0).contains(&state.humidity));
            assert!((200.0..=800.0).contains(&state.gas));
            assert!(state.flame <= 1);
            assert!((100.0..=400.0).contains(&state.sound));
            assert!((0.0..=150.0).contains(&state.vibration));
        }
    }

    #[test]
    fn both_encodings_parse_back_to_the_sampled_state() {
        let mut rng = rand::rng();
        let state = sampled_state(&mut rng);

        let mut from_json = SensorState::default();
        apply_line(&mut from_json, &json_line(&state)).unwrap();
        assert_eq!(from_json, state);

        let mut from_plain = SensorState::default();
        apply_line(&mut from_plain, &plain_line(&state)).unwrap();
        assert_eq!(from_plain, state);
    }

    #[test]
    fn synthetic_frames_demultiplex_cleanly_back_to_back() {
        let mut stream = Vec::new();
        for index in 0..5u64 {
            stream.extend_from_slice(&synthetic_frame(index, 256));
        }

        // Feed in small chunks so markers straddle chunk boundaries.
        let mut demuxer = FrameDemuxer::new();
        let mut frames = Vec::new();
        for chunk in stream.chunks(7) {
            frames.extend(demuxer.push(chunk));
        }

        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0].len(), 256 + 4);
        assert_eq!(demuxer.buffered(), 0);
    }

    #[test]
    fn filler_payload_contains_no_markers() {
        let frame = synthetic_frame(0xFF, 4096);
        let payload = &frame[2..frame.len() - 2];

        assert!(!payload.windows(2).any(|w| w == FRAME_START || w == FRAME_END));
    }
}
