//! Marker-delimited framing.

/// Start-of-message control byte.
pub const STX: u8 = 0x02;

/// End-of-message control byte.
pub const ETX: u8 = 0x03;

/// One complete protocol message, inclusive of both markers.
///
/// A frame belongs to exactly one connection and is consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Vec<u8>,
}

impl RawFrame {
    /// Wrap a body in start/end markers.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(body.len() + 2);
        bytes.push(STX);
        bytes.extend_from_slice(body);
        bytes.push(ETX);
        Self { bytes }
    }

    /// The full frame, markers included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The frame body between the markers.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.bytes[1..self.bytes.len() - 1]
    }
}

/// Incremental scanner that assembles [`RawFrame`]s from arbitrary chunks
/// of a connection's byte stream.
///
/// Bytes received before a start marker are discarded. Once a frame is open,
/// every byte up to the next end marker is part of it; there is no escaping,
/// so an end-marker byte inside a payload terminates the frame early and
/// desynchronises everything after it. That limitation is part of the
/// protocol and is preserved here.
///
/// The assembler itself is pure; cancellation and blocking reads belong to
/// the connection loop that feeds it.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    // Accumulates the currently open frame, markers included.
    // `None` while between frames.
    open: Option<Vec<u8>>,
}

impl FrameAssembler {
    /// Create an assembler with no open frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every frame completed by it.
    ///
    /// A frame may span any number of chunks; partial state is carried
    /// between calls.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<RawFrame> {
        let mut complete = Vec::new();
        for &byte in chunk {
            match self.open.as_mut() {
                None => {
                    if byte == STX {
                        self.open = Some(vec![STX]);
                    }
                    // Bytes outside a frame are dropped.
                }
                Some(buffer) => {
                    buffer.push(byte);
                    if byte == ETX {
                        let bytes = self.open.take().unwrap_or_default();
                        complete.push(RawFrame { bytes });
                    }
                }
            }
        }
        complete
    }

    /// True if a frame is currently open (started but not yet terminated).
    #[must_use]
    pub const fn mid_frame(&self) -> bool {
        self.open.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(body: &[u8]) -> Vec<u8> {
        RawFrame::from_body(body).as_bytes().to_vec()
    }

    #[test]
    fn test_single_frame_in_one_chunk() {
        let mut assembler = FrameAssembler::new();
        let frames = assembler.push(&framed(b"3022hello"));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body(), b"3022hello");
        assert!(!assembler.mid_frame());
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut assembler = FrameAssembler::new();
        assert!(assembler.push(&[STX, b'a', b'b']).is_empty());
        assert!(assembler.mid_frame());
        let frames = assembler.push(&[b'c', ETX]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body(), b"abc");
    }

    #[test]
    fn test_bytes_before_start_marker_discarded() {
        let mut assembler = FrameAssembler::new();
        let mut input = vec![b'x', b'y', 0x00];
        input.extend_from_slice(&framed(b"ok"));
        let frames = assembler.push(&input);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body(), b"ok");
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut assembler = FrameAssembler::new();
        let mut input = framed(b"one");
        input.extend_from_slice(&framed(b"two"));
        let frames = assembler.push(&input);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].body(), b"one");
        assert_eq!(frames[1].body(), b"two");
    }

    #[test]
    fn test_end_marker_in_payload_terminates_early() {
        // Accepted protocol limitation: no escaping exists.
        let mut assembler = FrameAssembler::new();
        let frames = assembler.push(&[STX, b'a', ETX, b'b', ETX]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body(), b"a");
        // The trailing "b" + ETX arrived outside a frame and was lost.
        assert!(!assembler.mid_frame());
    }

    #[test]
    fn test_nested_start_marker_is_payload() {
        let mut assembler = FrameAssembler::new();
        let frames = assembler.push(&[STX, b'a', STX, b'b', ETX]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body(), &[b'a', STX, b'b']);
    }
}
