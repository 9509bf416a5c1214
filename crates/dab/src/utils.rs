/// バイト列用拡張トレイト。
pub trait BytesExt {
    /// 先頭2バイトをビッグエンディアンで16ビット符号無し整数として読み込む。
    fn read_be_16(&self) -> u16;

    /// 先頭4バイトをビッグエンディアンで32ビット符号無し整数として読み込む。
    fn read_be_32(&self) -> u32;
}

impl BytesExt for [u8] {
    /// # Panics
    ///
    /// 長さが2未満の場合。
    #[inline]
    fn read_be_16(&self) -> u16 {
        u16::from_be_bytes([self[0], self[1]])
    }

    /// # Panics
    ///
    /// 長さが4未満の場合。
    #[inline]
    fn read_be_32(&self) -> u32 {
        u32::from_be_bytes([self[0], self[1], self[2], self[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_be() {
        assert_eq!([0x12u8, 0x34, 0x56][..].read_be_16(), 0x1234);
        assert_eq!([0xE0u8, 0x12, 0x34, 0x56][..].read_be_32(), 0xE012_3456);
    }
}
