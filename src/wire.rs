//! Binary layout of the target datagram.
//!
//! One datagram carries one target: two fixed-width IEEE754 floats,
//! x then y, in a byte order chosen by the configuration. The format
//! is written as a struct-style string, e.g. `">dd"` (big-endian, two
//! f64) or `"<ff"` (little-endian, two f32). `"2d"` is accepted as a
//! synonym for `"dd"` to match configs written for the original tool.

use anyhow::{anyhow, Result};
use std::str::FromStr;

use crate::types::MmPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFormat {
    pub order: ByteOrder,
    pub width: FloatWidth,
}

impl Default for WireFormat {
    fn default() -> Self {
        Self {
            order: ByteOrder::Big,
            width: FloatWidth::F64,
        }
    }
}

impl FromStr for WireFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (order, rest) = match s.as_bytes().first() {
            Some(b'>') | Some(b'!') => (ByteOrder::Big, &s[1..]),
            Some(b'<') => (ByteOrder::Little, &s[1..]),
            // Native order: interpret per the host. Configs shared with
            // the robot controller should prefer an explicit prefix.
            Some(b'=') => (native_order(), &s[1..]),
            _ => (native_order(), s),
        };
        let width = match rest {
            "dd" | "2d" => FloatWidth::F64,
            "ff" | "2f" => FloatWidth::F32,
            _ => {
                return Err(anyhow!(
                    "unsupported wire format '{}': expected two floats, e.g. '>dd', '<ff' or '2d'",
                    s
                ))
            }
        };
        Ok(Self { order, width })
    }
}

fn native_order() -> ByteOrder {
    if cfg!(target_endian = "big") {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    }
}

impl WireFormat {
    /// Fixed payload size in bytes for one target.
    pub fn payload_size(&self) -> usize {
        match self.width {
            FloatWidth::F32 => 8,
            FloatWidth::F64 => 16,
        }
    }

    /// Serialize one target into a datagram payload.
    pub fn encode(&self, point: MmPoint) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.payload_size());
        match self.width {
            FloatWidth::F64 => {
                for v in [point.x, point.y] {
                    buf.extend_from_slice(&match self.order {
                        ByteOrder::Big => v.to_be_bytes(),
                        ByteOrder::Little => v.to_le_bytes(),
                    });
                }
            }
            FloatWidth::F32 => {
                for v in [point.x as f32, point.y as f32] {
                    buf.extend_from_slice(&match self.order {
                        ByteOrder::Big => v.to_be_bytes(),
                        ByteOrder::Little => v.to_le_bytes(),
                    });
                }
            }
        }
        buf
    }

    /// Parse a datagram payload back into a target. Used by tests and
    /// by receiver-side checks; the capture side never decodes.
    pub fn decode(&self, payload: &[u8]) -> Result<MmPoint> {
        if payload.len() != self.payload_size() {
            return Err(anyhow!(
                "datagram has {} bytes, expected {}",
                payload.len(),
                self.payload_size()
            ));
        }
        let read = |chunk: &[u8]| -> f64 {
            match self.width {
                FloatWidth::F64 => {
                    let arr: [u8; 8] = chunk.try_into().unwrap();
                    match self.order {
                        ByteOrder::Big => f64::from_be_bytes(arr),
                        ByteOrder::Little => f64::from_le_bytes(arr),
                    }
                }
                FloatWidth::F32 => {
                    let arr: [u8; 4] = chunk.try_into().unwrap();
                    (match self.order {
                        ByteOrder::Big => f32::from_be_bytes(arr),
                        ByteOrder::Little => f32::from_le_bytes(arr),
                    }) as f64
                }
            }
        };
        let half = self.payload_size() / 2;
        Ok(MmPoint {
            x: read(&payload[..half]),
            y: read(&payload[half..]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_formats() {
        let f: WireFormat = ">dd".parse().unwrap();
        assert_eq!(f.order, ByteOrder::Big);
        assert_eq!(f.width, FloatWidth::F64);
        assert_eq!(f.payload_size(), 16);

        let f: WireFormat = "!dd".parse().unwrap();
        assert_eq!(f.order, ByteOrder::Big);

        let f: WireFormat = "<ff".parse().unwrap();
        assert_eq!(f.order, ByteOrder::Little);
        assert_eq!(f.width, FloatWidth::F32);
        assert_eq!(f.payload_size(), 8);
    }

    #[test]
    fn accepts_count_style_formats() {
        let f: WireFormat = "2d".parse().unwrap();
        assert_eq!(f.width, FloatWidth::F64);
        let f: WireFormat = ">2f".parse().unwrap();
        assert_eq!(f.order, ByteOrder::Big);
        assert_eq!(f.width, FloatWidth::F32);
    }

    #[test]
    fn rejects_garbage_formats() {
        assert!("".parse::<WireFormat>().is_err());
        assert!(">d".parse::<WireFormat>().is_err());
        assert!("iii".parse::<WireFormat>().is_err());
        assert!(">ddd".parse::<WireFormat>().is_err());
    }

    #[test]
    fn big_endian_f64_layout() {
        let f = WireFormat::default();
        let payload = f.encode(MmPoint { x: 10.0, y: 10.0 });
        assert_eq!(payload.len(), 16);
        assert_eq!(&payload[..8], &10.0f64.to_be_bytes());
        assert_eq!(&payload[8..], &10.0f64.to_be_bytes());
        let back = f.decode(&payload).unwrap();
        assert_eq!(back, MmPoint { x: 10.0, y: 10.0 });
    }

    #[test]
    fn f32_roundtrip_and_length_check() {
        let f: WireFormat = "<ff".parse().unwrap();
        let payload = f.encode(MmPoint { x: -3.5, y: 12.25 });
        assert_eq!(payload.len(), 8);
        let back = f.decode(&payload).unwrap();
        assert_eq!(back, MmPoint { x: -3.5, y: 12.25 });
        assert!(f.decode(&payload[..6]).is_err());
    }
}
