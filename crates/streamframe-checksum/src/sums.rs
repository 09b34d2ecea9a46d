//! Additive and XOR checksums.

/// 8-bit truncated sum of all bytes, starting from `seed`.
pub fn sum8(data: &[u8], seed: u8) -> u8 {
    data.iter().fold(seed, |acc, &b| acc.wrapping_add(b))
}

/// 8-bit XOR of all bytes, starting from `seed`.
pub fn xor8(data: &[u8], seed: u8) -> u8 {
    data.iter().fold(seed, |acc, &b| acc ^ b)
}

/// Fletcher-16 as `[sum2, sum1]`.
pub fn fletcher16(data: &[u8]) -> [u8; 2] {
    let (mut sum1, mut sum2) = (0u16, 0u16);
    for &byte in data {
        sum1 = (sum1 + u16::from(byte)) % 255;
        sum2 = (sum2 + sum1) % 255;
    }
    [sum2 as u8, sum1 as u8]
}

/// Fletcher-32 over big-endian 16-bit words; an odd trailing byte is padded
/// with zero. Output is `sum2` then `sum1`, both big-endian.
pub fn fletcher32(data: &[u8]) -> [u8; 4] {
    let (mut sum1, mut sum2) = (0u32, 0u32);
    for chunk in data.chunks(2) {
        let word = match chunk {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [hi] => u16::from_be_bytes([*hi, 0]),
            _ => 0,
        };
        sum1 = (sum1 + u32::from(word)) % 65535;
        sum2 = (sum2 + sum1) % 65535;
    }
    let hi = (sum2 as u16).to_be_bytes();
    let lo = (sum1 as u16).to_be_bytes();
    [hi[0], hi[1], lo[0], lo[1]]
}
