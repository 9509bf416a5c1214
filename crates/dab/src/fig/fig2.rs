//! FIG 2（拡張ラベル）。

use crate::label::Encoding;
use crate::types::EnsembleId;
use crate::utils::BytesExt;

use super::fig1::LabelTarget;
use super::{read_service_id, split, FigError};

/// セグメント0にのみ含まれる、拡張ラベル全体に関する情報。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    /// 符号化方式。
    pub encoding: Encoding,
    /// セグメント数（1～8）。
    pub segment_count: u8,
    /// テキスト制御フィールド。Rfuフラグが立っている場合のみ。
    pub text_control: Option<u8>,
    /// 文字フラグ。Rfuフラグが立っていない場合のみ。
    pub character_flag: Option<u16>,
}

/// 拡張ラベルの1セグメント。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelSegment<'a> {
    /// トグルフラグ。ラベルが変わるたびに反転する。
    pub toggle: bool,
    /// セグメント番号（0～7）。
    pub index: u8,
    /// セグメント0のヘッダ。
    pub header: Option<SegmentHeader>,
    /// 文字フィールド。
    pub chars: &'a [u8],
}

/// FIG 2。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fig2<'a> {
    /// 拡張ラベルのセグメント。
    Label {
        /// ラベルの対象。
        target: LabelTarget,
        /// セグメント。
        segment: LabelSegment<'a>,
    },
    /// 未対応の拡張番号。
    Unsupported(u8),
}

impl<'a> Fig2<'a> {
    /// FIG 2のデータフィールド`data`から`Fig2`を読み取る。
    pub fn read(data: &'a [u8]) -> Result<Fig2<'a>, FigError> {
        let (h, data) = split(data, 1)?;
        let toggle = h[0] & 0b1000_0000 != 0;
        let index = (h[0] & 0b0111_0000) >> 4;
        let rfu = h[0] & 0b0000_1000 != 0;
        let extension = h[0] & 0b0000_0111;

        let (target, data) = match extension {
            0 => {
                let (eid, rem) = split(data, 2)?;
                (LabelTarget::Ensemble(EnsembleId(eid.read_be_16())), rem)
            }
            1 => {
                let (service_id, rem) = read_service_id(data, false)?;
                (LabelTarget::Service(service_id), rem)
            }
            4 => {
                let (service_id, scids, rem) = LabelTarget::read_component(data)?;
                (LabelTarget::Component { service_id, scids }, rem)
            }
            5 => {
                let (service_id, rem) = read_service_id(data, true)?;
                (LabelTarget::DataService(service_id), rem)
            }
            ext => return Ok(Fig2::Unsupported(ext)),
        };

        let (header, chars) = if index == 0 {
            let Some(&b) = data.first() else {
                return Err(FigError::InsufficientLength);
            };
            let encoding = if b & 0b1000_0000 != 0 {
                Encoding::Ucs2
            } else {
                Encoding::Utf8
            };
            let segment_count = ((b & 0b0111_0000) >> 4) + 1;

            if rfu {
                let header = SegmentHeader {
                    encoding,
                    segment_count,
                    text_control: Some(b & 0b0000_1111),
                    character_flag: None,
                };
                (Some(header), &data[1..])
            } else {
                let (h, chars) = split(data, 3)?;
                let header = SegmentHeader {
                    encoding,
                    segment_count,
                    text_control: None,
                    character_flag: Some(h[1..=2].read_be_16()),
                };
                (Some(header), chars)
            }
        } else {
            (None, data)
        };
        if chars.is_empty() {
            return Err(FigError::InsufficientLength);
        }

        Ok(Fig2::Label {
            target,
            segment: LabelSegment {
                toggle,
                index,
                header,
                chars,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServiceId;
    use assert_matches::assert_matches;
    use hex_literal::hex;

    #[test]
    fn test_first_segment() {
        // トグル1、セグメント0、サービス0xD210、UTF-8で2セグメント、文字フラグ0xFF00
        let fig = Fig2::read(&hex!("81 d2 10 10 ff 00 48 65 6c 6c 6f")).unwrap();
        assert_matches!(fig, Fig2::Label { target, segment } => {
            assert_eq!(target, LabelTarget::Service(ServiceId(0xD210)));
            assert!(segment.toggle);
            assert_eq!(segment.index, 0);
            assert_eq!(segment.header, Some(SegmentHeader {
                encoding: Encoding::Utf8,
                segment_count: 2,
                text_control: None,
                character_flag: Some(0xFF00),
            }));
            assert_eq!(segment.chars, b"Hello");
        });

        // Rfuが立っている場合はテキスト制御フィールドのみ
        let fig = Fig2::read(&hex!("08 10 01 85 00 41")).unwrap();
        assert_matches!(fig, Fig2::Label { target, segment } => {
            assert_eq!(target, LabelTarget::Ensemble(EnsembleId(0x1001)));
            assert_eq!(segment.header, Some(SegmentHeader {
                encoding: Encoding::Ucs2,
                segment_count: 1,
                text_control: Some(5),
                character_flag: None,
            }));
            assert_eq!(segment.chars, &hex!("00 41"));
        });
    }

    #[test]
    fn test_following_segment() {
        let fig = Fig2::read(&hex!("94 02 d2 10 57 6f 72 6c 64")).unwrap();
        assert_matches!(fig, Fig2::Label { target, segment } => {
            assert_eq!(target, LabelTarget::Component { service_id: ServiceId(0xD210), scids: 2 });
            assert!(segment.toggle);
            assert_eq!(segment.index, 1);
            assert_eq!(segment.header, None);
            assert_eq!(segment.chars, b"World");
        });
    }

    #[test]
    fn test_invalid() {
        // セグメント0のヘッダの後に文字がない
        assert_matches!(Fig2::read(&hex!("01 d2 10 10 ff 00")), Err(FigError::InsufficientLength));
        // 識別子の後に何もない
        assert_matches!(Fig2::read(&hex!("11 d2 10")), Err(FigError::InsufficientLength));
        assert_matches!(Fig2::read(&hex!("03 00")), Ok(Fig2::Unsupported(3)));
        assert_matches!(Fig2::read(&[]), Err(FigError::InsufficientLength));
    }
}
