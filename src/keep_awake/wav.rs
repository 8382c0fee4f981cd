//! Minimal PCM WAV encoding for the silent keepalive clip.

use std::time::Duration;

pub const HEADER_LEN: usize = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl Default for WavFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 1,
            bits_per_sample: 16,
        }
    }
}

impl WavFormat {
    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }

    /// Bytes of sample data needed for `duration`, rounded down to whole frames.
    pub fn data_len(&self, duration: Duration) -> u32 {
        let frames = (u128::from(self.sample_rate) * duration.as_millis() / 1000) as u64;
        let bytes = frames * u64::from(self.block_align());
        bytes.min(u64::from(max_data_len(self))) as u32
    }
}

fn max_data_len(format: &WavFormat) -> u32 {
    let max = u32::MAX - 36;
    let align = u32::from(format.block_align().max(1));
    max - max % align
}

/// RIFF/WAVE header describing `data_len` bytes of PCM samples.
pub fn header(format: &WavFormat, data_len: u32) -> [u8; HEADER_LEN] {
    let data_len = data_len.min(max_data_len(format));
    let mut out = [0u8; HEADER_LEN];
    out[0..4].copy_from_slice(b"RIFF");
    out[4..8].copy_from_slice(&(36 + data_len).to_le_bytes());
    out[8..12].copy_from_slice(b"WAVE");
    out[12..16].copy_from_slice(b"fmt ");
    out[16..20].copy_from_slice(&16u32.to_le_bytes());
    out[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    out[22..24].copy_from_slice(&format.channels.to_le_bytes());
    out[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    out[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    out[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    out[34..36].copy_from_slice(&format.bits_per_sample.to_le_bytes());
    out[36..40].copy_from_slice(b"data");
    out[40..44].copy_from_slice(&data_len.to_le_bytes());
    out
}

/// Header for an open-ended stream; players read until the pipe closes.
pub fn streaming_header(format: &WavFormat) -> [u8; HEADER_LEN] {
    header(format, max_data_len(format))
}

/// A complete clip of pure silence.
pub fn silent_wav(format: &WavFormat, duration: Duration) -> Vec<u8> {
    let data_len = format.data_len(duration);
    let mut out = Vec::with_capacity(HEADER_LEN + data_len as usize);
    out.extend_from_slice(&header(format, data_len));
    out.resize(HEADER_LEN + data_len as usize, 0);
    out
}
