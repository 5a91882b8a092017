//! Run-Length Encoding (RLE) for material id arrays.
//!
//! Terrain batches are dominated by long vertical runs of rock, air and
//! water, so `(count, id)` pairs shrink a batch record considerably.

/// A single RLE run: `count` consecutive occurrences of material id `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RleRun {
    /// Number of consecutive identical values (1..=65535).
    pub count: u16,
    /// The material id.
    pub value: u8,
}

/// Encoded size of one run in bytes.
pub const RUN_BYTES: usize = 3;

/// Errors that can occur during RLE decoding.
#[derive(Debug, thiserror::Error)]
pub enum RleError {
    /// Decoded length does not match expected length.
    #[error("RLE length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected number of elements.
        expected: usize,
        /// Actual number of decoded elements.
        actual: usize,
    },
    /// Byte buffer is shorter than the declared run count.
    #[error("RLE data truncated: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required by the run count.
        needed: usize,
        /// Bytes actually present.
        available: usize,
    },
}

/// Encodes a slice of material ids into RLE runs.
///
/// Runs are capped at `u16::MAX` length. An empty input produces an empty output.
pub fn rle_encode(ids: &[u8]) -> Vec<RleRun> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < ids.len() {
        let value = ids[i];
        let mut count: u16 = 1;
        loop {
            let idx = i + (count as usize);
            if idx >= ids.len() || ids[idx] != value || count == u16::MAX {
                break;
            }
            count += 1;
        }
        runs.push(RleRun { count, value });
        i += count as usize;
    }
    runs
}

/// Decodes RLE runs back into a flat id array.
///
/// Returns an error if the total decoded length does not match `expected_len`.
pub fn rle_decode(runs: &[RleRun], expected_len: usize) -> Result<Vec<u8>, RleError> {
    let mut result = Vec::with_capacity(expected_len);
    for run in runs {
        result.extend(std::iter::repeat_n(run.value, run.count as usize));
    }
    if result.len() != expected_len {
        return Err(RleError::LengthMismatch {
            expected: expected_len,
            actual: result.len(),
        });
    }
    Ok(result)
}

/// Encodes RLE runs to bytes: each run is `count: u16 LE` + `value: u8`.
pub fn rle_to_bytes(runs: &[RleRun]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(runs.len() * RUN_BYTES);
    for run in runs {
        buf.extend_from_slice(&run.count.to_le_bytes());
        buf.push(run.value);
    }
    buf
}

/// Decodes `run_count` runs from the front of `data`.
pub fn rle_from_bytes(data: &[u8], run_count: usize) -> Result<Vec<RleRun>, RleError> {
    let needed = run_count * RUN_BYTES;
    if data.len() < needed {
        return Err(RleError::Truncated {
            needed,
            available: data.len(),
        });
    }
    Ok(data[..needed]
        .chunks_exact(RUN_BYTES)
        .map(|chunk| RleRun {
            count: u16::from_le_bytes([chunk[0], chunk[1]]),
            value: chunk[2],
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
