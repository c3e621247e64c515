use bytes::Bytes;

/// JPEG start-of-image marker.
pub const FRAME_START: [u8; 2] = [0xFF, 0xD8];
/// JPEG end-of-image marker.
pub const FRAME_END: [u8; 2] = [0xFF, 0xD9];

/// Bytes retained while no start marker is in sight. Bounds the accumulator
/// when the stream is desynchronized.
pub const MAX_UNSYNCED_BYTES: usize = 1000;

/// Reassembles discrete JPEG frames out of an unbounded MJPEG byte stream.
///
/// The capture process emits frames back to back with no length header, so
/// boundaries are discovered by scanning for the start/end markers. Frame
/// interiors are never inspected; a frame with a corrupt interior but valid
/// markers is passed through as-is and left to the consumer to reject.
#[derive(Debug, Default)]
pub struct FrameDemuxer {
    buffer: Vec<u8>,
}

impl FrameDemuxer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one chunk and drain every complete frame it finished.
    ///
    /// A single chunk may complete several frames; a frame may span any
    /// number of chunks. Bytes preceding a frame and the frame itself are
    /// dropped from the accumulator once the frame is emitted.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        loop {
            let Some(start) = find_marker(&self.buffer, FRAME_START) else {
                // Desynchronized: keep only the tail so a marker split across
                // chunks can still be matched, and stop the buffer growing.
                if self.buffer.len() > MAX_UNSYNCED_BYTES {
                    let excess = self.buffer.len() - MAX_UNSYNCED_BYTES;
                    self.buffer.drain(..excess);
                }
                break;
            };

            let Some(end) = find_marker(&self.buffer[start + 2..], FRAME_END) else {
                // Frame still incomplete, wait for more bytes.
                break;
            };
            let end = start + 2 + end + FRAME_END.len();

            frames.push(Bytes::copy_from_slice(&self.buffer[start..end]));
            self.buffer.drain(..end);
        }

        frames
    }

    /// Bytes currently held back waiting for a frame boundary.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

fn find_marker(haystack: &[u8], marker: [u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|window| window == marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut bytes = FRAME_START.to_vec();
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&FRAME_END);
        bytes
    }

    #[test]
    fn single_frame_in_one_chunk() {
        let mut demuxer = FrameDemuxer::new();
        let input = frame(b"payload");

        let frames = demuxer.push(&input);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), input.as_slice());
        assert_eq!(demuxer.buffered(), 0);
    }

    #[test]
    fn two_frames_split_across_arbitrary_chunks() {
        let first = frame(b"first payload");
        let second = frame(b"second");
        let mut stream = first.clone();
        stream.extend_from_slice(&second);

        // Feed in 3-byte chunks so both markers straddle chunk boundaries.
        let mut demuxer = FrameDemuxer::new();
        let mut frames = Vec::new();
        for chunk in stream.chunks(3) {
            frames.extend(demuxer.push(chunk));
        }

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_ref(), first.as_slice());
        assert_eq!(frames[1].as_ref(), second.as_slice());
        assert_eq!(demuxer.buffered(), 0);
    }

    #[test]
    fn one_chunk_may_yield_multiple_frames() {
        let mut stream = frame(b"a");
        stream.extend_from_slice(&frame(b"b"));
        stream.extend_from_slice(&frame(b"c"));

        let frames = FrameDemuxer::new().push(&stream);

        assert_eq!(frames.len(), 3);
    }

    #[test]
    fn garbage_before_start_marker_is_discarded() {
        let mut stream = vec![0x00, 0x11, 0x22, 0xFF, 0x00];
        let expected = frame(b"payload");
        stream.extend_from_slice(&expected);

        let mut demuxer = FrameDemuxer::new();
        let frames = demuxer.push(&stream);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), expected.as_slice());
        assert_eq!(demuxer.buffered(), 0);
    }

    #[test]
    fn unsynced_stream_never_retains_more_than_the_bound() {
        let mut demuxer = FrameDemuxer::new();
        // 1500 bytes without a single start marker.
        let noise = vec![0xAAu8; 1500];

        let frames = demuxer.push(&noise);

        assert!(frames.is_empty());
        assert!(demuxer.buffered() <= MAX_UNSYNCED_BYTES);
    }

    #[test]
    fn start_marker_split_across_truncation_boundary_survives() {
        let mut demuxer = FrameDemuxer::new();
        let mut noise = vec![0xAAu8; 1200];
        noise.push(0xFF); // First half of the start marker ends the chunk.
        assert!(demuxer.push(&noise).is_empty());

        let mut rest = vec![0xD8];
        rest.extend_from_slice(b"payload");
        rest.extend_from_slice(&FRAME_END);
        let frames = demuxer.push(&rest);

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..2], &FRAME_START);
    }

    #[test]
    fn incomplete_frame_waits_for_more_bytes() {
        let mut demuxer = FrameDemuxer::new();
        let mut partial = FRAME_START.to_vec();
        partial.extend_from_slice(b"no end marker yet");

        assert!(demuxer.push(&partial).is_empty());
        assert_eq!(demuxer.buffered(), partial.len());

        let frames = demuxer.push(&FRAME_END);
        assert_eq!(frames.len(), 1);
        assert_eq!(demuxer.buffered(), 0);
    }

    #[test]
    fn end_marker_must_follow_the_start() {
        // An end marker before any start marker is skipped, not matched.
        let mut stream = FRAME_END.to_vec();
        let expected = frame(b"x");
        stream.extend_from_slice(&expected);

        let frames = FrameDemuxer::new().push(&stream);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), expected.as_slice());
    }

    #[test]
    fn back_to_back_markers_form_an_empty_frame() {
        let mut demuxer = FrameDemuxer::new();
        let mut stream = FRAME_START.to_vec();
        stream.extend_from_slice(&FRAME_END);

        let frames = demuxer.push(&stream);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), 4);
    }
}
