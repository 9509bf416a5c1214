//! FIGで使われる識別子や種別。

use std::fmt;

/// アンサンブル識別（EId）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnsembleId(pub u16);

impl EnsembleId {
    /// 国識別（上位4ビット）。
    #[inline]
    pub fn country_id(self) -> u8 {
        (self.0 >> 12) as u8
    }

    /// アンサンブル参照番号（下位12ビット）。
    #[inline]
    pub fn reference(self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl fmt::Display for EnsembleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// サービス識別（SId）。
///
/// 音声サービスでは16ビット、データサービスではECCを含む32ビットとなる。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceId(pub u32);

impl ServiceId {
    /// 存在しないサービスを表す識別子。
    pub const INVALID: ServiceId = ServiceId(0);

    /// 32ビット形式の識別子であれば`true`を返す。
    #[inline]
    pub fn is_long(self) -> bool {
        self.0 > 0xFFFF
    }

    /// 国識別。
    #[inline]
    pub fn country_id(self) -> u8 {
        if self.is_long() {
            ((self.0 >> 20) & 0x0F) as u8
        } else {
            ((self.0 >> 12) & 0x0F) as u8
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_long() {
            write!(f, "0x{:08X}", self.0)
        } else {
            write!(f, "0x{:04X}", self.0)
        }
    }
}

/// サブチャンネル識別（SubChId）。
///
/// 値は常に0～63の範囲に収まる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubchannelId(u8);

impl SubchannelId {
    /// サブチャンネル識別の取り得る値の数。
    pub const COUNT: usize = 64;

    /// `n`が64未満であれば`SubchannelId`を生成する。
    #[inline]
    pub fn new(n: u8) -> Option<SubchannelId> {
        ((n as usize) < Self::COUNT).then_some(SubchannelId(n))
    }

    /// プリミティブ型として値を返す。
    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for SubchannelId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// パケットモードにおけるサービスコンポーネント識別（SCId、12ビット）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub u16);

/// トランスポート機構識別（TMId）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportMechanismId {
    /// MSCストリームモード・音声。
    StreamAudio,
    /// MSCストリームモード・データ。
    StreamData,
    /// 予約。
    Reserved,
    /// MSCパケットモード・データ。
    PacketData,
}

impl From<u8> for TransportMechanismId {
    fn from(value: u8) -> TransportMechanismId {
        match value & 0b11 {
            0b00 => TransportMechanismId::StreamAudio,
            0b01 => TransportMechanismId::StreamData,
            0b10 => TransportMechanismId::Reserved,
            _ => TransportMechanismId::PacketData,
        }
    }
}

/// 音声サービスコンポーネント種別（ASCTy）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioServiceType(pub u8);

impl AudioServiceType {
    /// MPEG-1 Audio Layer II（DAB）。
    pub const DAB: AudioServiceType = AudioServiceType(0);
    /// HE-AAC v2（DAB+）。
    pub const DAB_PLUS: AudioServiceType = AudioServiceType(63);

    /// 既知の種別であれば`true`を返す。
    #[inline]
    pub fn is_known(&self) -> bool {
        matches!(*self, Self::DAB | Self::DAB_PLUS)
    }
}

/// データサービスコンポーネント種別（DSCTy）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataServiceType(pub u8);

impl DataServiceType {
    /// 未指定。
    pub const UNSPECIFIED: DataServiceType = DataServiceType(0);
    /// 交通情報（TMC）。
    pub const TMC: DataServiceType = DataServiceType(1);
    /// 緊急警報（EWS）。
    pub const EWS: DataServiceType = DataServiceType(2);
    /// 交互テキスト伝送（ITTS）。
    pub const ITTS: DataServiceType = DataServiceType(3);
    /// ページング。
    pub const PAGING: DataServiceType = DataServiceType(4);
    /// 透過データチャンネル（TDC）。
    pub const TRANSPARENT_DATA_CHANNEL: DataServiceType = DataServiceType(5);
    /// MPEG-2トランスポートストリーム。
    pub const MPEG2_TRANSPORT_STREAM: DataServiceType = DataServiceType(24);
    /// IPパケット。
    pub const EMBEDDED_IP: DataServiceType = DataServiceType(59);
    /// MOT（Multimedia Object Transfer）。
    pub const MOT: DataServiceType = DataServiceType(60);
    /// 独自サービス。
    pub const PROPRIETARY: DataServiceType = DataServiceType(63);
}

/// ユーザーアプリケーション種別（11ビット）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserApplicationType(pub u16);

impl UserApplicationType {
    /// ダイナミックラベル（廃止）。
    pub const DYNAMIC_LABELS: UserApplicationType = UserApplicationType(0x001);
    /// スライドショー。
    pub const SLIDESHOW: UserApplicationType = UserApplicationType(0x002);
    /// MOT放送ウェブサイト（廃止）。
    pub const BROADCAST_WEBSITE: UserApplicationType = UserApplicationType(0x003);
    /// TPEG。
    pub const TPEG: UserApplicationType = UserApplicationType(0x004);
    /// DGPS（廃止）。
    pub const DGPS: UserApplicationType = UserApplicationType(0x005);
    /// TMC（廃止）。
    pub const TMC: UserApplicationType = UserApplicationType(0x006);
    /// SPI（旧EPG）。
    pub const SPI: UserApplicationType = UserApplicationType(0x007);
    /// DAB Java（廃止）。
    pub const DAB_JAVA: UserApplicationType = UserApplicationType(0x008);
    /// DMB。
    pub const DMB: UserApplicationType = UserApplicationType(0x009);
    /// IPDC（廃止）。
    pub const IPDC_SERVICES: UserApplicationType = UserApplicationType(0x00A);
    /// 音声アプリケーション（廃止）。
    pub const VOICE_APPLICATIONS: UserApplicationType = UserApplicationType(0x00B);
    /// ミドルウェア（廃止）。
    pub const MIDDLEWARE: UserApplicationType = UserApplicationType(0x00C);
    /// ファイルキャスティング。
    pub const FILECASTING: UserApplicationType = UserApplicationType(0x00D);
    /// FIS。
    pub const FIS: UserApplicationType = UserApplicationType(0x00E);
    /// Journaline。
    pub const JOURNALINE: UserApplicationType = UserApplicationType(0x44A);

    /// 既知の種別であれば`true`を返す。
    #[inline]
    pub fn is_known(&self) -> bool {
        matches!(self.0, 0x001..=0x00E | 0x44A)
    }
}

/// サブチャンネルに適用される誤り訂正方式。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FecScheme {
    /// 誤り訂正なし。
    #[default]
    None,
    /// リードソロモン符号RS(204, 188)。
    ReedSolomon,
    /// 将来のための予約。
    Reserved(u8),
}

impl From<u8> for FecScheme {
    fn from(value: u8) -> FecScheme {
        match value & 0b11 {
            0 => FecScheme::None,
            1 => FecScheme::ReedSolomon,
            v => FecScheme::Reserved(v),
        }
    }
}

/// 言語（TS 101 756 表9・表10）。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language(pub u8);

impl Language {
    /// 不明・該当なし。
    pub const UNKNOWN: Language = Language(0x00);
    /// ドイツ語。
    pub const GERMAN: Language = Language(0x08);
    /// 英語。
    pub const ENGLISH: Language = Language(0x09);
    /// フランス語。
    pub const FRENCH: Language = Language(0x0F);
    /// オランダ語。
    pub const DUTCH: Language = Language(0x1D);
}

/// 番組種別（国際コード、5ビット）。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgrammeType(pub u8);

const PROGRAMME_TYPE_NAMES: [&str; 32] = [
    "None",
    "News",
    "Current Affairs",
    "Information",
    "Sport",
    "Education",
    "Drama",
    "Arts",
    "Science",
    "Talk",
    "Pop Music",
    "Rock Music",
    "Easy Listening",
    "Light Classical",
    "Classical Music",
    "Other Music",
    "Weather",
    "Finance",
    "Children's",
    "Factual",
    "Religion",
    "Phone In",
    "Travel",
    "Leisure",
    "Jazz and Blues",
    "Country Music",
    "National Music",
    "Oldies Music",
    "Folk Music",
    "Documentary",
    "Not used",
    "Not used",
];

impl ProgrammeType {
    /// 番組種別なし。
    pub const NONE: ProgrammeType = ProgrammeType(0);
    /// ニュース。
    pub const NEWS: ProgrammeType = ProgrammeType(1);
    /// スポーツ。
    pub const SPORT: ProgrammeType = ProgrammeType(4);
    /// ポップス。
    pub const POP_MUSIC: ProgrammeType = ProgrammeType(10);
    /// クラシック。
    pub const CLASSICAL_MUSIC: ProgrammeType = ProgrammeType(14);

    /// 国際表（表12）における英語名を返す。
    #[inline]
    pub fn name(self) -> &'static str {
        PROGRAMME_TYPE_NAMES[(self.0 & 0x1F) as usize]
    }
}

impl fmt::Display for ProgrammeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subchannel_id() {
        assert_eq!(SubchannelId::new(0).map(SubchannelId::get), Some(0));
        assert_eq!(SubchannelId::new(63).map(SubchannelId::get), Some(63));
        assert_eq!(SubchannelId::new(64), None);
        assert_eq!(SubchannelId::new(0xFF), None);
    }

    #[test]
    fn test_service_id() {
        let sid = ServiceId(0xD210);
        assert!(!sid.is_long());
        assert_eq!(sid.country_id(), 0xD);
        assert_eq!(sid.to_string(), "0xD210");

        let sid = ServiceId(0xE0D2_1004);
        assert!(sid.is_long());
        assert_eq!(sid.country_id(), 0xD);
        assert_eq!(sid.to_string(), "0xE0D21004");
    }

    #[test]
    fn test_code_points() {
        assert_eq!(TransportMechanismId::from(0), TransportMechanismId::StreamAudio);
        assert_eq!(TransportMechanismId::from(3), TransportMechanismId::PacketData);
        assert_eq!(FecScheme::from(1), FecScheme::ReedSolomon);
        assert_eq!(FecScheme::from(2), FecScheme::Reserved(2));
        assert_eq!(ProgrammeType(1).name(), "News");
        assert_eq!(ProgrammeType(29).to_string(), "Documentary");
        assert!(AudioServiceType::DAB_PLUS.is_known());
        assert!(!AudioServiceType(5).is_known());
        assert!(UserApplicationType::JOURNALINE.is_known());
        assert!(!UserApplicationType(0x100).is_known());
    }
}
