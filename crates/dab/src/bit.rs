//! ビット列を読み取る。
//!
//! FIGのフィールドはバイト境界に揃っていないため、
//! 任意のビット位置からビッグエンディアンで符号無し整数を読み取る手段を提供する。

/// `data`の先頭から`offset`ビット目より`count`ビットを符号無し整数として読み取る。
///
/// `count`が32を超える場合や`data`の範囲を超える場合は`None`を返す。
///
/// # サンプル
///
/// ```
/// use dab::bit::read_bits;
///
/// let data = [0b1010_0101, 0b1100_0011];
/// assert_eq!(read_bits(&data, 0, 3), Some(0b101));
/// assert_eq!(read_bits(&data, 5, 6), Some(0b101110));
/// assert_eq!(read_bits(&data, 12, 4), Some(0b0011));
/// assert_eq!(read_bits(&data, 12, 5), None);
/// ```
pub fn read_bits(data: &[u8], offset: usize, count: u32) -> Option<u32> {
    if count > 32 {
        return None;
    }
    let end = offset.checked_add(count as usize)?;
    if end > data.len() * 8 {
        return None;
    }
    if count == 0 {
        return Some(0);
    }

    let first = offset / 8;
    let last = (end + 7) / 8;
    let acc = data[first..last]
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64);
    let shift = last * 8 - end;
    let mask = (1u64 << count) - 1;
    Some(((acc >> shift) & mask) as u32)
}

/// ビット列をビッグエンディアンで先頭から順に読み取るためのオブジェクト。
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    index: usize,
}

impl<'a> BitReader<'a> {
    /// `buffer`をビット単位で読み取るための`BitReader`を生成する。
    #[inline]
    pub fn new(buffer: &'a [u8]) -> BitReader<'a> {
        BitReader { buffer, index: 0 }
    }

    /// `bits`で指定されたビット数の分だけ読み取りを飛ばす。
    ///
    /// 終端を超えた分は切り捨てられ、以降の読み取りは`None`を返す。
    #[inline]
    pub fn skip(&mut self, bits: usize) {
        self.index = self.index.saturating_add(bits).min(self.buffer.len() * 8);
    }

    /// `count`ビットを読み取る。
    ///
    /// 残りのビット数が足りない場合は位置を進めずに`None`を返す。
    ///
    /// # サンプル
    ///
    /// ```
    /// use dab::bit::BitReader;
    ///
    /// // Rfu(1) MJD(17)
    /// let mut br = BitReader::new(&[0x39, 0x78, 0x40]);
    /// br.skip(1);
    /// assert_eq!(br.read(17), Some(58849));
    /// assert_eq!(br.read(7), None);
    /// assert_eq!(br.read(6), Some(0));
    /// ```
    #[inline]
    pub fn read(&mut self, count: u32) -> Option<u32> {
        let value = read_bits(self.buffer, self.index, count)?;
        self.index += count as usize;
        Some(value)
    }

    /// 1ビットのフラグを読み取る。
    #[inline]
    pub fn read1(&mut self) -> Option<bool> {
        self.read(1).map(|b| b != 0)
    }
}
