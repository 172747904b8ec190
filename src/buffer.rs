use arrayvec::ArrayVec;

use crate::BUFFER_SIZE;

/// Accumulates the bytes of the command line being typed.
///
/// Never holds a terminator. Bytes pushed while full are dropped.
#[derive(Debug, Default)]
pub struct LineBuffer {
    data: ArrayVec<u8, BUFFER_SIZE>,
}

impl LineBuffer {
    pub fn new() -> LineBuffer {
        LineBuffer {
            data: ArrayVec::new(),
        }
    }

    /// The write cursor.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Append as many of `bytes` as fit, returning how many were stored.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.data.remaining_capacity());
        // can't fail, n is bounded by the remaining capacity
        let _ = self.data.try_extend_from_slice(&bytes[..n]);
        n
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl AsRef<[u8]> for LineBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
