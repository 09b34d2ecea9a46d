//! CRC family.
//!
//! CRC-8 runs bit-at-a-time; CRC-16 and CRC-32 use 256-entry tables built on
//! first use and shared read-only for the life of the process.

use std::sync::OnceLock;

/// CRC-8 generator polynomial (MSB-first, unreflected).
pub const CRC8_POLY: u8 = 0x07;
/// CRC-16/MODBUS reflected polynomial.
pub const CRC16_POLY: u16 = 0xA001;
/// CRC-32/IEEE 802.3 reflected polynomial.
pub const CRC32_POLY: u32 = 0xEDB8_8320;

static CRC16_TABLE: OnceLock<[u16; 256]> = OnceLock::new();
static CRC32_TABLE: OnceLock<[u32; 256]> = OnceLock::new();

fn crc16_table() -> &'static [u16; 256] {
    CRC16_TABLE.get_or_init(|| {
        let mut table = [0u16; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut crc = i as u16;
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ CRC16_POLY
                } else {
                    crc >> 1
                };
            }
            *entry = crc;
        }
        table
    })
}

fn crc32_table() -> &'static [u32; 256] {
    CRC32_TABLE.get_or_init(|| {
        let mut table = [0u32; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut crc = i as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ CRC32_POLY
                } else {
                    crc >> 1
                };
            }
            *entry = crc;
        }
        table
    })
}

/// CRC-8 starting from `seed`.
pub fn crc8(data: &[u8], seed: u8) -> u8 {
    let mut crc = seed;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC8_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// CRC-16 starting from `seed` (0xFFFF for MODBUS). No final XOR.
pub fn crc16(data: &[u8], seed: u16) -> u16 {
    let table = crc16_table();
    data.iter().fold(seed, |crc, &byte| {
        (crc >> 8) ^ table[usize::from((crc ^ u16::from(byte)) & 0xFF)]
    })
}

/// CRC-32 starting from `seed` (0xFFFF_FFFF for IEEE), final XOR 0xFFFF_FFFF.
pub fn crc32(data: &[u8], seed: u32) -> u32 {
    let table = crc32_table();
    let crc = data.iter().fold(seed, |crc, &byte| {
        (crc >> 8) ^ table[((crc ^ u32::from(byte)) & 0xFF) as usize]
    });
    crc ^ 0xFFFF_FFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK: &[u8] = b"123456789";

    #[test]
    fn crc8_check_value() {
        assert_eq!(crc8(CHECK, 0), 0xF4);
    }

    #[test]
    fn crc16_modbus_check_value() {
        assert_eq!(crc16(CHECK, 0xFFFF), 0x4B37);
    }

    #[test]
    fn crc32_ieee_check_value() {
        assert_eq!(crc32(CHECK, 0xFFFF_FFFF), 0xCBF4_3926);
    }

    #[test]
    fn empty_input_returns_seed_state() {
        assert_eq!(crc8(&[], 0x5A), 0x5A);
        assert_eq!(crc16(&[], 0xFFFF), 0xFFFF);
        assert_eq!(crc32(&[], 0xFFFF_FFFF), 0);
    }

    #[test]
    fn tables_are_shared() {
        assert!(std::ptr::eq(crc16_table(), crc16_table()));
        assert!(std::ptr::eq(crc32_table(), crc32_table()));
        assert_eq!(crc16_table()[1], 0xC0C1);
        assert_eq!(crc32_table()[1], 0x7707_3096);
    }
}
