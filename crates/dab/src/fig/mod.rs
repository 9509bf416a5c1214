//! FIB（Fast Information Block）とFIG（Fast Information Group）。

pub mod fig0;
pub mod fig1;
pub mod fig2;

use thiserror::Error;

use crate::types::ServiceId;
use crate::utils::BytesExt;

pub use fig0::Fig0;
pub use fig1::Fig1;
pub use fig2::Fig2;

/// CRCを除いたFIBのデータ部の大きさ。
pub const FIB_DATA_SIZE: usize = 30;

/// FIBの大きさ（CRCを含む）。
pub const FIB_SIZE: usize = 32;

/// FIGの解析で発生するエラー。
///
/// エラーはそのFIGに閉じており、FIB内の後続のFIGは引き続き処理できる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FigError {
    /// FIGの長さが足りない。
    #[error("insufficient length of a FIG")]
    InsufficientLength,

    /// FIGの長さがFIBの終端を超えている。
    ///
    /// 内包する`usize`にはFIGヘッダで示された長さが入る。
    #[error("FIG length {0} overflows the FIB")]
    Overflow(usize),

    /// サブチャンネル識別が範囲外である。
    #[error("invalid sub-channel id {0}")]
    InvalidSubchannelId(u8),
}

/// FIBから切り出された、解析前のFIG。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFig<'a> {
    /// FIG種別（0～7）。
    pub fig_type: u8,
    /// FIGヘッダを除いたデータフィールド。
    pub data: &'a [u8],
}

/// 種別ごとに解析されたFIG。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fig<'a> {
    /// FIG 0（MCIとSI）。
    Fig0(Fig0<'a>),
    /// FIG 1（ラベル）。
    Fig1(Fig1),
    /// FIG 2（拡張ラベル）。
    Fig2(Fig2<'a>),
    /// FIG 6（限定受信）。未対応。
    ConditionalAccess,
    /// 予約されたFIG種別。
    Reserved(u8),
}

impl<'a> RawFig<'a> {
    /// FIG種別に従ってデータフィールドを解析する。
    pub fn parse(&self) -> Result<Fig<'a>, FigError> {
        match self.fig_type {
            0 => Fig0::read(self.data).map(Fig::Fig0),
            1 => Fig1::read(self.data).map(Fig::Fig1),
            2 => Fig2::read(self.data).map(Fig::Fig2),
            6 => Ok(Fig::ConditionalAccess),
            t => Ok(Fig::Reserved(t)),
        }
    }
}

/// FIBに含まれるFIGを順に返すイテレーター。
///
/// FIG種別7（終端マーカーや`0xFF`による詰め物）で終了する。
/// FIGの長さがFIBを超えている場合は[`FigError::Overflow`]を返して終了する。
#[derive(Debug, Clone)]
pub struct FigIter<'a> {
    data: &'a [u8],
}

impl<'a> FigIter<'a> {
    /// `fib`に含まれるFIGを列挙する`FigIter`を生成する。
    ///
    /// `fib`のうち先頭30バイトのみを対象とし、CRCは検査しない。
    #[inline]
    pub fn new(fib: &'a [u8]) -> FigIter<'a> {
        let len = fib.len().min(FIB_DATA_SIZE);
        FigIter { data: &fib[..len] }
    }
}

impl<'a> Iterator for FigIter<'a> {
    type Item = Result<RawFig<'a>, FigError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&header, rem) = self.data.split_first()?;
        let fig_type = header >> 5;
        let length = (header & 0x1F) as usize;
        if fig_type == 7 {
            self.data = &[];
            return None;
        }

        let Ok((data, rem)) = split(rem, length) else {
            self.data = &[];
            return Some(Err(FigError::Overflow(length)));
        };
        self.data = rem;

        Some(Ok(RawFig { fig_type, data }))
    }
}

/// `data`の先頭から、`long`であれば32ビット、そうでなければ16ビットのサービス識別を読み取る。
pub(crate) fn read_service_id(data: &[u8], long: bool) -> Result<(ServiceId, &[u8]), FigError> {
    if long {
        let (sid, rem) = split(data, 4)?;
        Ok((ServiceId(sid.read_be_32()), rem))
    } else {
        let (sid, rem) = split(data, 2)?;
        Ok((ServiceId(sid.read_be_16() as u32), rem))
    }
}

/// `data`を`mid`の位置で分割する。長さが足りなければエラーを返す。
#[inline]
pub(crate) fn split(data: &[u8], mid: usize) -> Result<(&[u8], &[u8]), FigError> {
    if mid > data.len() {
        Err(FigError::InsufficientLength)
    } else {
        Ok(data.split_at(mid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use hex_literal::hex;

    #[test]
    fn test_fig_iter() {
        // FIG 0/0、FIG 1/0（途中まで）、終端マーカー
        let fib = hex!(
            "05 00 10 01 00 00"
            "e1 00"
            "ff ff ff ff ff ff ff ff ff ff ff ff ff ff ff ff ff ff ff ff ff ff"
            "12 34"
        );
        let mut iter = FigIter::new(&fib);
        assert_matches!(iter.next(), Some(Ok(RawFig { fig_type: 0, data })) => {
            assert_eq!(data, &hex!("00 10 01 00 00"));
        });
        assert_matches!(iter.next(), None);
        assert_matches!(iter.next(), None);
    }

    #[test]
    fn test_fig_iter_padding() {
        let fib = hex!("41 01" "21 10" "ff");
        let figs = FigIter::new(&fib).collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(
            figs,
            [
                RawFig {
                    fig_type: 2,
                    data: &[0x01],
                },
                RawFig {
                    fig_type: 1,
                    data: &[0x10],
                },
            ]
        );
    }

    #[test]
    fn test_fig_iter_overflow() {
        // 長さ31のFIG 0はFIBに収まらない
        let fib = hex!("1f 00 00 00");
        let mut iter = FigIter::new(&fib);
        assert_matches!(iter.next(), Some(Err(FigError::Overflow(31))));
        assert_matches!(iter.next(), None);
    }

    #[test]
    fn test_parse_reserved() {
        let raw = RawFig {
            fig_type: 4,
            data: &[],
        };
        assert_matches!(raw.parse(), Ok(Fig::Reserved(4)));
        let raw = RawFig {
            fig_type: 6,
            data: &[0x00],
        };
        assert_matches!(raw.parse(), Ok(Fig::ConditionalAccess));
        let raw = RawFig {
            fig_type: 0,
            data: &[],
        };
        assert_matches!(raw.parse(), Err(FigError::InsufficientLength));
    }

    #[test]
    fn test_read_service_id() {
        let data = hex!("e0 d2 10 04 ff");
        assert_matches!(read_service_id(&data, false), Ok((ServiceId(0xE0D2), rem)) => {
            assert_eq!(rem, &hex!("10 04 ff"));
        });
        assert_matches!(read_service_id(&data, true), Ok((ServiceId(0xE0D2_1004), _)));
        assert_matches!(read_service_id(&data[..3], true), Err(FigError::InsufficientLength));
    }
}
