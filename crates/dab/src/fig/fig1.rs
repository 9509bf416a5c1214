//! FIG 1（ラベル）。

use crate::label::Charset;
use crate::types::{EnsembleId, ServiceId};
use crate::utils::BytesExt;

use super::{read_service_id, split, FigError};

/// ラベルの対象。FIG 1とFIG 2で共通。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTarget {
    /// アンサンブル（拡張番号0）。
    Ensemble(EnsembleId),
    /// 番組サービス（拡張番号1）。
    Service(ServiceId),
    /// 地域（拡張番号3）。
    Region(u8),
    /// サービスコンポーネント（拡張番号4）。
    Component {
        /// サービス識別。
        service_id: ServiceId,
        /// サービス内のサービスコンポーネント識別（SCIdS）。
        scids: u8,
    },
    /// データサービス（拡張番号5）。
    DataService(ServiceId),
    /// X-PADのユーザーアプリケーション（拡張番号6）。
    XPadApplication {
        /// サービス識別。
        service_id: ServiceId,
        /// サービス内のサービスコンポーネント識別（SCIdS）。
        scids: u8,
        /// X-PADアプリケーション種別。
        app_type: u8,
    },
}

impl LabelTarget {
    /// サービスコンポーネントの識別フィールドを読み取る。
    ///
    /// `data`の先頭1バイトのP/Dフラグによりサービス識別の長さが決まる。
    pub(crate) fn read_component(data: &[u8]) -> Result<(ServiceId, u8, &[u8]), FigError> {
        let (h, data) = split(data, 1)?;
        let long = h[0] & 0b1000_0000 != 0;
        let scids = h[0] & 0b0000_1111;
        let (service_id, rem) = read_service_id(data, long)?;
        Ok((service_id, scids, rem))
    }
}

/// FIG 1。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fig1 {
    /// 文字集合。
    pub charset: Charset,
    /// OEフラグ。`true`の場合は他のアンサンブルに関する情報である。
    pub other_ensemble: bool,
    /// 内容。
    pub body: Fig1Body,
}

/// FIG 1の内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fig1Body {
    /// ラベル。
    Label {
        /// ラベルの対象。
        target: LabelTarget,
        /// 文字フィールド。
        chars: [u8; 16],
        /// 文字フラグ。
        character_flag: u16,
    },
    /// 未対応の拡張番号。
    Unsupported(u8),
}

impl Fig1 {
    /// FIG 1のデータフィールド`data`から`Fig1`を読み取る。
    pub fn read(data: &[u8]) -> Result<Fig1, FigError> {
        let (h, data) = split(data, 1)?;
        let charset = Charset::from(h[0] >> 4);
        let other_ensemble = h[0] & 0b0000_1000 != 0;
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
            3 => {
                let (r, rem) = split(data, 1)?;
                (LabelTarget::Region(r[0] & 0b0011_1111), rem)
            }
            4 => {
                let (service_id, scids, rem) = LabelTarget::read_component(data)?;
                (LabelTarget::Component { service_id, scids }, rem)
            }
            5 => {
                let (service_id, rem) = read_service_id(data, true)?;
                (LabelTarget::DataService(service_id), rem)
            }
            6 => {
                let (service_id, scids, data) = LabelTarget::read_component(data)?;
                let (a, rem) = split(data, 1)?;
                let target = LabelTarget::XPadApplication {
                    service_id,
                    scids,
                    app_type: a[0] & 0b0001_1111,
                };
                (target, rem)
            }
            ext => {
                return Ok(Fig1 {
                    charset,
                    other_ensemble,
                    body: Fig1Body::Unsupported(ext),
                })
            }
        };

        let (label, _) = split(data, 18)?;
        let mut chars = [0; 16];
        chars.copy_from_slice(&label[..16]);
        let character_flag = label[16..=17].read_be_16();

        Ok(Fig1 {
            charset,
            other_ensemble,
            body: Fig1Body::Label {
                target,
                chars,
                character_flag,
            },
        })
    }
}
