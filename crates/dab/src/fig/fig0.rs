//! FIG 0（MCIおよびSI）。

use smallvec::SmallVec;

use crate::bit::BitReader;
use crate::protection::{EepProfile, Protection, UEP_TABLE};
use crate::time::LocalTimeOffset;
use crate::types::{
    AudioServiceType, ComponentId, DataServiceType, EnsembleId, FecScheme, Language,
    ProgrammeType, ServiceId, SubchannelId, TransportMechanismId, UserApplicationType,
};
use crate::utils::BytesExt;

use super::{read_service_id, split, FigError};

#[inline]
fn subchannel_id(n: u8) -> Result<SubchannelId, FigError> {
    SubchannelId::new(n).ok_or(FigError::InvalidSubchannelId(n))
}

#[inline]
fn split_first(data: &[u8]) -> Result<(u8, &[u8]), FigError> {
    match data.split_first() {
        Some((&b, rem)) => Ok((b, rem)),
        None => Err(FigError::InsufficientLength),
    }
}

#[inline]
fn read(br: &mut BitReader, count: u32) -> Result<u32, FigError> {
    br.read(count).ok_or(FigError::InsufficientLength)
}

/// `data`が尽きるまで`f`で要素を読み取る。
fn read_list<'a, T, F>(mut data: &'a [u8], mut f: F) -> Result<Vec<T>, FigError>
where
    F: FnMut(&'a [u8]) -> Result<(T, &'a [u8]), FigError>,
{
    let mut list = Vec::new();
    while !data.is_empty() {
        let (item, rem) = f(data)?;
        list.push(item);
        data = rem;
    }
    Ok(list)
}

/// FIG 0のデータフィールド先頭1バイト。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fig0Header {
    /// C/Nフラグ。`true`の場合は次の多重構成に関する情報である。
    pub next: bool,
    /// OEフラグ。`true`の場合は他のアンサンブルに関する情報である。
    pub other_ensemble: bool,
    /// P/Dフラグ。`true`の場合はサービス識別が32ビットである。
    pub long_service_id: bool,
    /// 拡張番号（0～31）。
    pub extension: u8,
}

impl Fig0Header {
    /// `b`から`Fig0Header`を読み取る。
    #[inline]
    pub fn read(b: u8) -> Fig0Header {
        Fig0Header {
            next: b & 0b1000_0000 != 0,
            other_ensemble: b & 0b0100_0000 != 0,
            long_service_id: b & 0b0010_0000 != 0,
            extension: b & 0b0001_1111,
        }
    }
}

/// FIG 0。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fig0<'a> {
    /// ヘッダ。
    pub header: Fig0Header,
    /// 拡張番号ごとの内容。
    pub body: Fig0Body<'a>,
}

/// 拡張番号ごとに解析されたFIG 0の内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fig0Body<'a> {
    /// FIG 0/0。
    EnsembleInformation(EnsembleInformation),
    /// FIG 0/1。
    SubchannelOrganization(Vec<SubchannelOrganization>),
    /// FIG 0/2。
    ServiceOrganization(Vec<ServiceOrganization>),
    /// FIG 0/3。
    PacketMode(Vec<PacketModeComponent>),
    /// FIG 0/4。
    StreamConditionalAccess(Vec<StreamConditionalAccess>),
    /// FIG 0/5。
    Language(Vec<ComponentLanguage>),
    /// FIG 0/7。
    ConfigurationInformation(ConfigurationInformation),
    /// FIG 0/8。
    GlobalDefinition(Vec<GlobalDefinition>),
    /// FIG 0/9。
    CountryLto(CountryLto<'a>),
    /// FIG 0/10。
    DateAndTime(DateAndTime),
    /// FIG 0/13。
    UserApplications(Vec<UserApplicationInformation<'a>>),
    /// FIG 0/14。
    SubchannelFec(Vec<SubchannelFec>),
    /// FIG 0/17。
    ProgrammeType(Vec<ProgrammeTypeInformation>),
    /// FIG 0/18。
    AnnouncementSupport(Vec<AnnouncementSupport>),
    /// FIG 0/19。
    AnnouncementSwitching(Vec<AnnouncementSwitching>),
    /// FIG 0/21。
    FrequencyInformation(Vec<FrequencyInformation>),
    /// FIG 0/22。
    TransmitterPosition(Vec<TransmitterPosition>),
    /// FIG 0/24。
    OtherEnsembleServices(Vec<OtherEnsembleService>),
    /// 未対応の拡張番号。
    Unsupported(u8),
}

impl<'a> Fig0<'a> {
    /// FIG 0のデータフィールド`data`から`Fig0`を読み取る。
    ///
    /// 途中で不正な値を検出した場合はFIG全体をエラーとする。
    pub fn read(data: &'a [u8]) -> Result<Fig0<'a>, FigError> {
        let (header, data) = split_first(data)?;
        let header = Fig0Header::read(header);
        let long = header.long_service_id;

        let body = match header.extension {
            0 => Fig0Body::EnsembleInformation(EnsembleInformation::read(data)?),
            1 => Fig0Body::SubchannelOrganization(SubchannelOrganization::read_list(data)?),
            2 => Fig0Body::ServiceOrganization(read_list(data, |d| {
                ServiceOrganization::read(d, long)
            })?),
            3 => Fig0Body::PacketMode(read_list(data, PacketModeComponent::read)?),
            4 => Fig0Body::StreamConditionalAccess(read_list(data, StreamConditionalAccess::read)?),
            5 => Fig0Body::Language(read_list(data, ComponentLanguage::read)?),
            7 => Fig0Body::ConfigurationInformation(ConfigurationInformation::read(data)?),
            8 => Fig0Body::GlobalDefinition(read_list(data, |d| GlobalDefinition::read(d, long))?),
            9 => Fig0Body::CountryLto(CountryLto::read(data)?),
            10 => Fig0Body::DateAndTime(DateAndTime::read(data)?),
            13 => Fig0Body::UserApplications(read_list(data, |d| {
                UserApplicationInformation::read(d, long)
            })?),
            14 => Fig0Body::SubchannelFec(read_list(data, SubchannelFec::read)?),
            17 => Fig0Body::ProgrammeType(read_list(data, ProgrammeTypeInformation::read)?),
            18 => Fig0Body::AnnouncementSupport(read_list(data, AnnouncementSupport::read)?),
            19 => Fig0Body::AnnouncementSwitching(read_list(data, AnnouncementSwitching::read)?),
            21 => Fig0Body::FrequencyInformation(FrequencyInformation::read_blocks(data)?),
            22 => Fig0Body::TransmitterPosition(read_list(data, TransmitterPosition::read)?),
            24 => Fig0Body::OtherEnsembleServices(read_list(data, |d| {
                OtherEnsembleService::read(d, long)
            })?),
            ext => Fig0Body::Unsupported(ext),
        };

        Ok(Fig0 { header, body })
    }
}

/// FIG 0/0のアンサンブル情報。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsembleInformation {
    /// アンサンブル識別。
    pub ensemble_id: EnsembleId,
    /// 変更フラグ（2ビット）。
    pub change_flags: u8,
    /// 警報フラグ。
    pub alarm: bool,
    /// CIFカウンタの上位（0～19）。
    pub cif_count_high: u8,
    /// CIFカウンタの下位（0～249）。
    pub cif_count_low: u8,
    /// 変更が発生するCIFカウンタの下位。
    pub occurrence_change: Option<u8>,
}

impl EnsembleInformation {
    /// `data`から`EnsembleInformation`を読み取る。
    pub fn read(data: &[u8]) -> Result<EnsembleInformation, FigError> {
        if data.len() < 4 {
            return Err(FigError::InsufficientLength);
        }

        let change_flags = data[2] >> 6;
        let occurrence_change = if change_flags != 0 {
            data.get(4).copied()
        } else {
            None
        };

        Ok(EnsembleInformation {
            ensemble_id: EnsembleId(data[0..=1].read_be_16()),
            change_flags,
            alarm: data[2] & 0b0010_0000 != 0,
            cif_count_high: data[2] & 0b0001_1111,
            cif_count_low: data[3],
            occurrence_change,
        })
    }

    /// CIFカウンタ（0～4999）。
    #[inline]
    pub fn cif_count(&self) -> u16 {
        (self.cif_count_high % 20) as u16 * 250 + (self.cif_count_low % 250) as u16
    }
}

/// FIG 0/1のサブチャンネル構成。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubchannelOrganization {
    /// サブチャンネル識別。
    pub subchannel_id: SubchannelId,
    /// CIF内の開始位置（CU単位）。
    pub start_address: u16,
    /// サブチャンネルの大きさ（CU単位）。
    pub size: u16,
    /// 保護方式。
    pub protection: Protection,
}

impl SubchannelOrganization {
    /// `data`から`SubchannelOrganization`を1つ読み取る。
    ///
    /// 予約された表や保護方式が指定されたものは読み飛ばして`None`を返す。
    pub fn read(data: &[u8]) -> Result<(Option<SubchannelOrganization>, &[u8]), FigError> {
        if data.len() < 3 {
            return Err(FigError::InsufficientLength);
        }

        let subchannel_id = subchannel_id(data[0] >> 2)?;
        let start_address = data[0..=1].read_be_16() & 0x03FF;

        if data[2] & 0b1000_0000 == 0 {
            // 短形式
            let rem = &data[3..];
            if data[2] & 0b0100_0000 != 0 {
                log::debug!("fig 0/1: reserved table switch for sub-channel {}", subchannel_id);
                return Ok((None, rem));
            }
            let table_index = data[2] & 0b0011_1111;
            let size = UEP_TABLE[table_index as usize].size;

            Ok((
                Some(SubchannelOrganization {
                    subchannel_id,
                    start_address,
                    size,
                    protection: Protection::Uep { table_index },
                }),
                rem,
            ))
        } else {
            // 長形式
            if data.len() < 4 {
                return Err(FigError::InsufficientLength);
            }
            let rem = &data[4..];
            let option = (data[2] & 0b0111_0000) >> 4;
            let level = (data[2] & 0b0000_1100) >> 2;
            let size = data[2..=3].read_be_16() & 0x03FF;
            let profile = match option {
                0 => EepProfile::A,
                1 => EepProfile::B,
                _ => {
                    log::debug!(
                        "fig 0/1: unknown protection option {} for sub-channel {}",
                        option,
                        subchannel_id
                    );
                    return Ok((None, rem));
                }
            };

            Ok((
                Some(SubchannelOrganization {
                    subchannel_id,
                    start_address,
                    size,
                    protection: Protection::Eep { profile, level },
                }),
                rem,
            ))
        }
    }

    fn read_list(mut data: &[u8]) -> Result<Vec<SubchannelOrganization>, FigError> {
        let mut list = Vec::new();
        while !data.is_empty() {
            let (subchannel, rem) = SubchannelOrganization::read(data)?;
            list.extend(subchannel);
            data = rem;
        }
        Ok(list)
    }
}

/// FIG 0/2で示されるサービスコンポーネントの種類。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// ストリームモードの音声。
    StreamAudio {
        /// 音声サービスコンポーネント種別。
        audio_type: AudioServiceType,
        /// サブチャンネル識別。
        subchannel_id: SubchannelId,
    },
    /// ストリームモードのデータ。
    StreamData {
        /// データサービスコンポーネント種別。
        data_type: DataServiceType,
        /// サブチャンネル識別。
        subchannel_id: SubchannelId,
    },
    /// パケットモードのデータ。サブチャンネルはFIG 0/3で示される。
    PacketData {
        /// サービスコンポーネント識別。
        component_id: ComponentId,
    },
    /// 予約されたトランスポート機構。
    Reserved,
}

impl ComponentKind {
    /// トランスポート機構識別。
    #[inline]
    pub fn transport(&self) -> TransportMechanismId {
        match self {
            ComponentKind::StreamAudio { .. } => TransportMechanismId::StreamAudio,
            ComponentKind::StreamData { .. } => TransportMechanismId::StreamData,
            ComponentKind::PacketData { .. } => TransportMechanismId::PacketData,
            ComponentKind::Reserved => TransportMechanismId::Reserved,
        }
    }
}

/// FIG 0/2のサービスコンポーネント記述。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentDescription {
    /// 種類。
    pub kind: ComponentKind,
    /// 主コンポーネントであれば`true`。
    pub primary: bool,
    /// 限定受信が適用されていれば`true`。
    pub ca: bool,
}

impl ComponentDescription {
    /// 2バイトの`data`から`ComponentDescription`を読み取る。
    pub fn read(data: [u8; 2]) -> Result<ComponentDescription, FigError> {
        let kind = match TransportMechanismId::from(data[0] >> 6) {
            TransportMechanismId::StreamAudio => ComponentKind::StreamAudio {
                audio_type: AudioServiceType(data[0] & 0b0011_1111),
                subchannel_id: subchannel_id(data[1] >> 2)?,
            },
            TransportMechanismId::StreamData => ComponentKind::StreamData {
                data_type: DataServiceType(data[0] & 0b0011_1111),
                subchannel_id: subchannel_id(data[1] >> 2)?,
            },
            TransportMechanismId::PacketData => ComponentKind::PacketData {
                component_id: ComponentId(data.read_be_16() >> 2 & 0x0FFF),
            },
            TransportMechanismId::Reserved => ComponentKind::Reserved,
        };

        Ok(ComponentDescription {
            kind,
            primary: data[1] & 0b0000_0010 != 0,
            ca: data[1] & 0b0000_0001 != 0,
        })
    }
}

/// FIG 0/2のサービス構成。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOrganization {
    /// サービス識別。
    pub service_id: ServiceId,
    /// 限定受信識別。
    pub ca_id: u8,
    /// サービスコンポーネント。並び順がコンポーネント番号となる。
    pub components: SmallVec<[ComponentDescription; 4]>,
}

impl ServiceOrganization {
    /// `data`から`ServiceOrganization`を1つ読み取る。
    pub fn read(data: &[u8], long: bool) -> Result<(ServiceOrganization, &[u8]), FigError> {
        let (service_id, data) = read_service_id(data, long)?;
        let (b, mut data) = split_first(data)?;
        let ca_id = (b & 0b0111_0000) >> 4;
        let count = b & 0b0000_1111;

        let mut components = SmallVec::new();
        for _ in 0..count {
            let (c, rem) = split(data, 2)?;
            components.push(ComponentDescription::read([c[0], c[1]])?);
            data = rem;
        }

        Ok((
            ServiceOrganization {
                service_id,
                ca_id,
                components,
            },
            data,
        ))
    }
}

/// FIG 0/3のパケットモードのサービスコンポーネント。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketModeComponent {
    /// サービスコンポーネント識別。
    pub component_id: ComponentId,
    /// DGフラグ。`false`の場合はデータグループで伝送される。
    pub data_group_flag: bool,
    /// データサービスコンポーネント種別。
    pub data_type: DataServiceType,
    /// サブチャンネル識別。
    pub subchannel_id: SubchannelId,
    /// パケットアドレス。
    pub packet_address: u16,
    /// 限定受信機構。
    pub ca_org: Option<u16>,
}

impl PacketModeComponent {
    /// `data`から`PacketModeComponent`を1つ読み取る。
    pub fn read(data: &[u8]) -> Result<(PacketModeComponent, &[u8]), FigError> {
        let (d, rem) = split(data, 5)?;
        let ca_org_flag = d[1] & 0b0000_0001 != 0;
        let (ca_org, rem) = if ca_org_flag {
            let (o, rem) = split(rem, 2)?;
            (Some(o.read_be_16()), rem)
        } else {
            (None, rem)
        };

        Ok((
            PacketModeComponent {
                component_id: ComponentId(d[0..=1].read_be_16() >> 4),
                data_group_flag: d[2] & 0b1000_0000 != 0,
                data_type: DataServiceType(d[2] & 0b0011_1111),
                subchannel_id: subchannel_id(d[3] >> 2)?,
                packet_address: d[3..=4].read_be_16() & 0x03FF,
                ca_org,
            },
            rem,
        ))
    }
}

/// FIG 0/4のストリームモードにおける限定受信。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConditionalAccess {
    /// サブチャンネル識別。
    pub subchannel_id: SubchannelId,
    /// 限定受信機構。
    pub ca_org: u16,
}

impl StreamConditionalAccess {
    /// `data`から`StreamConditionalAccess`を1つ読み取る。
    pub fn read(data: &[u8]) -> Result<(StreamConditionalAccess, &[u8]), FigError> {
        let (d, rem) = split(data, 3)?;
        Ok((
            StreamConditionalAccess {
                subchannel_id: subchannel_id(d[0] & 0b0011_1111)?,
                ca_org: d[1..=2].read_be_16(),
            },
            rem,
        ))
    }
}

/// FIG 0/5のサービスコンポーネントの言語。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentLanguage {
    /// 短形式。サブチャンネルの言語を示す。
    Subchannel {
        /// サブチャンネル識別。
        subchannel_id: SubchannelId,
        /// 言語。
        language: Language,
    },
    /// 長形式。パケットモードのサービスコンポーネントの言語を示す。
    Component {
        /// サービスコンポーネント識別。
        component_id: ComponentId,
        /// 言語。
        language: Language,
    },
}

impl ComponentLanguage {
    /// `data`から`ComponentLanguage`を1つ読み取る。
    pub fn read(data: &[u8]) -> Result<(ComponentLanguage, &[u8]), FigError> {
        let (b, _) = split_first(data)?;
        if b & 0b1000_0000 == 0 {
            let (d, rem) = split(data, 2)?;
            Ok((
                ComponentLanguage::Subchannel {
                    subchannel_id: subchannel_id(d[0] & 0b0011_1111)?,
                    language: Language(d[1]),
                },
                rem,
            ))
        } else {
            let (d, rem) = split(data, 3)?;
            Ok((
                ComponentLanguage::Component {
                    component_id: ComponentId(d[0..=1].read_be_16() & 0x0FFF),
                    language: Language(d[2]),
                },
                rem,
            ))
        }
    }
}

/// FIG 0/7の構成情報。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationInformation {
    /// アンサンブル内のサービス数。
    pub service_count: u8,
    /// 再構成の回数。
    pub reconfiguration_count: u16,
}

impl ConfigurationInformation {
    /// `data`から`ConfigurationInformation`を読み取る。
    pub fn read(data: &[u8]) -> Result<ConfigurationInformation, FigError> {
        let (d, _) = split(data, 2)?;
        Ok(ConfigurationInformation {
            service_count: d[0] >> 2,
            reconfiguration_count: d.read_be_16() & 0x03FF,
        })
    }
}

/// FIG 0/8でサービスコンポーネントを指し示す方法。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalDefinitionTarget {
    /// 短形式。ストリームモードのサブチャンネル。
    Subchannel(SubchannelId),
    /// 長形式。パケットモードのサービスコンポーネント識別。
    Component(ComponentId),
}

/// FIG 0/8のサービスコンポーネント全体定義。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalDefinition {
    /// サービス識別。
    pub service_id: ServiceId,
    /// サービス内のサービスコンポーネント識別（SCIdS）。
    pub scids: u8,
    /// 対象のサービスコンポーネント。
    pub target: GlobalDefinitionTarget,
}

impl GlobalDefinition {
    /// `data`から`GlobalDefinition`を1つ読み取る。
    pub fn read(data: &[u8], long: bool) -> Result<(GlobalDefinition, &[u8]), FigError> {
        let (service_id, data) = read_service_id(data, long)?;
        let (b, data) = split_first(data)?;
        let extension = b & 0b1000_0000 != 0;
        let scids = b & 0b0000_1111;

        let (first, _) = split_first(data)?;
        let (target, rem) = if first & 0b1000_0000 == 0 {
            let (d, rem) = split(data, 1)?;
            let target = GlobalDefinitionTarget::Subchannel(subchannel_id(d[0] & 0b0011_1111)?);
            (target, rem)
        } else {
            let (d, rem) = split(data, 2)?;
            let target = GlobalDefinitionTarget::Component(ComponentId(d.read_be_16() & 0x0FFF));
            (target, rem)
        };
        let rem = if extension { split(rem, 1)?.1 } else { rem };

        Ok((
            GlobalDefinition {
                service_id,
                scids,
                target,
            },
            rem,
        ))
    }
}

/// FIG 0/9の国・時差・国際表。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryLto<'a> {
    /// アンサンブルの時差。
    pub local_time_offset: LocalTimeOffset,
    /// アンサンブルの拡張国コード。
    pub ecc: u8,
    /// 国際表識別。
    pub international_table_id: u8,
    /// 拡張フィールド（サービスごとのECC）。
    pub extended: &'a [u8],
}

impl<'a> CountryLto<'a> {
    /// `data`から`CountryLto`を読み取る。
    pub fn read(data: &'a [u8]) -> Result<CountryLto<'a>, FigError> {
        let (d, rem) = split(data, 3)?;
        let extended = if d[0] & 0b1000_0000 != 0 { rem } else { &[] };
        Ok(CountryLto {
            local_time_offset: LocalTimeOffset::from_bits(d[0] & 0b0011_1111),
            ecc: d[1],
            international_table_id: d[2],
            extended,
        })
    }
}

/// FIG 0/10の日付と時刻（UTC）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateAndTime {
    /// 修正ユリウス日。
    pub mjd: u32,
    /// うるう秒の予告。
    pub leap_second: bool,
    /// 時。
    pub hour: u8,
    /// 分。
    pub minute: u8,
    /// 秒。長形式の場合のみ。
    pub second: Option<u8>,
    /// ミリ秒。長形式の場合のみ。
    pub millisecond: Option<u16>,
}

impl DateAndTime {
    /// `data`から`DateAndTime`を読み取る。
    pub fn read(data: &[u8]) -> Result<DateAndTime, FigError> {
        let mut br = BitReader::new(data);
        br.skip(1);
        let mjd = read(&mut br, 17)?;
        let leap_second = br.read1().ok_or(FigError::InsufficientLength)?;
        br.skip(1);
        let long_form = br.read1().ok_or(FigError::InsufficientLength)?;
        let hour = read(&mut br, 5)? as u8;
        let minute = read(&mut br, 6)? as u8;
        let (second, millisecond) = if long_form {
            let second = read(&mut br, 6)? as u8;
            let millisecond = read(&mut br, 10)? as u16;
            (Some(second), Some(millisecond))
        } else {
            (None, None)
        };

        Ok(DateAndTime {
            mjd,
            leap_second,
            hour,
            minute,
            second,
            millisecond,
        })
    }
}

/// FIG 0/13のユーザーアプリケーション。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserApplication<'a> {
    /// ユーザーアプリケーション種別。
    pub app_type: UserApplicationType,
    /// ユーザーアプリケーションデータ。
    pub data: &'a [u8],
}

impl<'a> UserApplication<'a> {
    /// X-PADのヘッダ（CAOrgを含む）を除いたアプリケーションデータを返す。
    pub fn payload(&self) -> &'a [u8] {
        let Some(&first) = self.data.first() else {
            return &[];
        };
        let header = if first & 0b0100_0000 != 0 { 4 } else { 2 };
        self.data.get(header..).unwrap_or(&[])
    }
}

/// FIG 0/13のユーザーアプリケーション情報。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserApplicationInformation<'a> {
    /// サービス識別。
    pub service_id: ServiceId,
    /// サービス内のサービスコンポーネント識別（SCIdS）。
    pub scids: u8,
    /// ユーザーアプリケーション。
    pub applications: SmallVec<[UserApplication<'a>; 2]>,
}

impl<'a> UserApplicationInformation<'a> {
    /// `data`から`UserApplicationInformation`を1つ読み取る。
    pub fn read(
        data: &'a [u8],
        long: bool,
    ) -> Result<(UserApplicationInformation<'a>, &'a [u8]), FigError> {
        let (service_id, data) = read_service_id(data, long)?;
        let (b, mut data) = split_first(data)?;
        let scids = b >> 4;
        let count = b & 0b0000_1111;

        let mut applications = SmallVec::new();
        for _ in 0..count {
            let (h, rem) = split(data, 2)?;
            let app_type = UserApplicationType(h.read_be_16() >> 5);
            let length = (h[1] & 0b0001_1111) as usize;
            let (app_data, rem) = split(rem, length)?;
            applications.push(UserApplication {
                app_type,
                data: app_data,
            });
            data = rem;
        }

        Ok((
            UserApplicationInformation {
                service_id,
                scids,
                applications,
            },
            data,
        ))
    }
}

/// FIG 0/14のサブチャンネルの誤り訂正方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubchannelFec {
    /// サブチャンネル識別。
    pub subchannel_id: SubchannelId,
    /// 誤り訂正方式。
    pub fec: FecScheme,
}

impl SubchannelFec {
    /// `data`から`SubchannelFec`を1つ読み取る。
    pub fn read(data: &[u8]) -> Result<(SubchannelFec, &[u8]), FigError> {
        let (b, rem) = split_first(data)?;
        Ok((
            SubchannelFec {
                subchannel_id: subchannel_id(b >> 2)?,
                fec: FecScheme::from(b & 0b0000_0011),
            },
            rem,
        ))
    }
}

/// FIG 0/17の番組種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgrammeTypeInformation {
    /// サービス識別。
    pub service_id: ServiceId,
    /// 番組種別が静的であれば`true`。
    pub static_type: bool,
    /// 言語。
    pub language: Option<Language>,
    /// 番組種別。
    pub programme_type: ProgrammeType,
    /// 補完コード。
    pub complementary_code: Option<u8>,
}

impl ProgrammeTypeInformation {
    /// `data`から`ProgrammeTypeInformation`を1つ読み取る。
    pub fn read(data: &[u8]) -> Result<(ProgrammeTypeInformation, &[u8]), FigError> {
        let (service_id, data) = read_service_id(data, false)?;
        let (flags, mut data) = split_first(data)?;

        let language = if flags & 0b0010_0000 != 0 {
            let (l, rem) = split_first(data)?;
            data = rem;
            Some(Language(l))
        } else {
            None
        };
        let (b, mut data) = split_first(data)?;
        let programme_type = ProgrammeType(b & 0b0001_1111);
        let complementary_code = if flags & 0b0001_0000 != 0 {
            let (cc, rem) = split_first(data)?;
            data = rem;
            Some(cc)
        } else {
            None
        };

        Ok((
            ProgrammeTypeInformation {
                service_id,
                static_type: flags & 0b1000_0000 != 0,
                language,
                programme_type,
                complementary_code,
            },
            data,
        ))
    }
}

/// FIG 0/18のアナウンス対応。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementSupport {
    /// サービス識別。
    pub service_id: ServiceId,
    /// 対応するアナウンス種別のフラグ。
    pub support_flags: u16,
    /// クラスタ識別。
    pub cluster_ids: SmallVec<[u8; 4]>,
}

impl AnnouncementSupport {
    /// `data`から`AnnouncementSupport`を1つ読み取る。
    pub fn read(data: &[u8]) -> Result<(AnnouncementSupport, &[u8]), FigError> {
        let (d, rem) = split(data, 5)?;
        // Rfa(3) Number of clusters(5)
        let count = (d[4] & 0b0001_1111) as usize;
        let (clusters, rem) = split(rem, count)?;
        Ok((
            AnnouncementSupport {
                service_id: ServiceId(d[0..=1].read_be_16() as u32),
                support_flags: d[2..=3].read_be_16(),
                cluster_ids: SmallVec::from_slice(clusters),
            },
            rem,
        ))
    }
}

/// FIG 0/19のアナウンス切り替え。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnouncementSwitching {
    /// クラスタ識別。
    pub cluster_id: u8,
    /// 進行中のアナウンス種別のフラグ。
    pub switching_flags: u16,
    /// 新規のアナウンスであれば`true`。
    pub new: bool,
    /// サブチャンネル識別。
    pub subchannel_id: SubchannelId,
    /// 地域識別の下位6ビット。
    pub region_id_lower: Option<u8>,
}

impl AnnouncementSwitching {
    /// `data`から`AnnouncementSwitching`を1つ読み取る。
    pub fn read(data: &[u8]) -> Result<(AnnouncementSwitching, &[u8]), FigError> {
        let (d, rem) = split(data, 4)?;
        let (region_id_lower, rem) = if d[3] & 0b0100_0000 != 0 {
            let (r, rem) = split_first(rem)?;
            (Some(r & 0b0011_1111), rem)
        } else {
            (None, rem)
        };

        Ok((
            AnnouncementSwitching {
                cluster_id: d[0],
                switching_flags: d[1..=2].read_be_16(),
                new: d[3] & 0b1000_0000 != 0,
                subchannel_id: subchannel_id(d[3] & 0b0011_1111)?,
                region_id_lower,
            },
            rem,
        ))
    }
}

/// FIG 0/21の周波数情報。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyInformation {
    /// アンサンブル識別やRDS PIコードなどの識別子。
    pub id: u16,
    /// 範囲と変調方式（4ビット）。
    pub range_modulation: u8,
    /// 連続出力フラグ。
    pub continuity: bool,
    /// 周波数（kHz）。DABとFMの場合のみ。
    pub frequencies: SmallVec<[u32; 4]>,
}

impl FrequencyInformation {
    /// `data`から`FrequencyInformation`を1つ読み取る。
    pub fn read(data: &[u8]) -> Result<(FrequencyInformation, &[u8]), FigError> {
        let (d, rem) = split(data, 3)?;
        let range_modulation = d[2] >> 4;
        let length = (d[2] & 0b0000_0111) as usize;
        let (list, rem) = split(rem, length)?;

        let frequencies = match range_modulation {
            // DABアンサンブル：制御5ビット＋16kHz単位の周波数19ビット
            0b0000 => list
                .chunks_exact(3)
                .map(|c| (u32::from_be_bytes([0, c[0], c[1], c[2]]) & 0x07_FFFF) * 16)
                .collect(),
            // FM：87.5MHzからの100kHz単位
            0b1000 | 0b1001 => list.iter().map(|&b| 87_500 + b as u32 * 100).collect(),
            _ => SmallVec::new(),
        };

        Ok((
            FrequencyInformation {
                id: d[0..=1].read_be_16(),
                range_modulation,
                continuity: d[2] & 0b0000_1000 != 0,
                frequencies,
            },
            rem,
        ))
    }

    fn read_blocks(mut data: &[u8]) -> Result<Vec<FrequencyInformation>, FigError> {
        let mut list = Vec::new();
        while !data.is_empty() {
            let (h, rem) = split(data, 2)?;
            let length = (h[1] & 0b0001_1111) as usize;
            let (block, rem) = split(rem, length)?;
            list.extend(read_list(block, FrequencyInformation::read)?);
            data = rem;
        }
        Ok(list)
    }
}

/// FIG 0/22のTII副識別子の位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubIdentifier {
    /// 副識別子。
    pub sub_id: u8,
    /// 送信遅延（μs）。
    pub time_delay: u16,
    /// 緯度のオフセット。
    pub latitude_offset: i16,
    /// 経度のオフセット。
    pub longitude_offset: i16,
}

/// FIG 0/22の送信所の位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransmitterPosition {
    /// 主識別子の位置。
    Main {
        /// 主識別子。
        main_id: u8,
        /// 緯度の粗い値。
        latitude_coarse: i16,
        /// 経度の粗い値。
        longitude_coarse: i16,
        /// 緯度の細かい値。
        latitude_fine: u8,
        /// 経度の細かい値。
        longitude_fine: u8,
    },
    /// 副識別子の位置。
    Sub {
        /// 主識別子。
        main_id: u8,
        /// 副識別子。
        subs: SmallVec<[SubIdentifier; 2]>,
    },
}

impl TransmitterPosition {
    /// `data`から`TransmitterPosition`を1つ読み取る。
    pub fn read(data: &[u8]) -> Result<(TransmitterPosition, &[u8]), FigError> {
        let (b, rem) = split_first(data)?;
        let main_id = b & 0b0111_1111;
        if b & 0b1000_0000 == 0 {
            let (d, rem) = split(rem, 5)?;
            Ok((
                TransmitterPosition::Main {
                    main_id,
                    latitude_coarse: d[0..=1].read_be_16() as i16,
                    longitude_coarse: d[2..=3].read_be_16() as i16,
                    latitude_fine: d[4] >> 4,
                    longitude_fine: d[4] & 0x0F,
                },
                rem,
            ))
        } else {
            let (h, mut rem) = split_first(rem)?;
            let count = h & 0b0000_0111;
            let mut subs = SmallVec::new();
            for _ in 0..count {
                let (d, r) = split(rem, 6)?;
                subs.push(SubIdentifier {
                    sub_id: d[0] >> 3,
                    time_delay: d[0..=1].read_be_16() & 0x07FF,
                    latitude_offset: d[2..=3].read_be_16() as i16,
                    longitude_offset: d[4..=5].read_be_16() as i16,
                });
                rem = r;
            }
            Ok((TransmitterPosition::Sub { main_id, subs }, rem))
        }
    }
}

/// FIG 0/24の他のアンサンブルのサービス。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherEnsembleService {
    /// サービス識別。
    pub service_id: ServiceId,
    /// 限定受信識別。
    pub ca_id: u8,
    /// サービスを含むアンサンブル。
    pub ensemble_ids: SmallVec<[EnsembleId; 4]>,
}

impl OtherEnsembleService {
    /// `data`から`OtherEnsembleService`を1つ読み取る。
    pub fn read(data: &[u8], long: bool) -> Result<(OtherEnsembleService, &[u8]), FigError> {
        let (service_id, data) = read_service_id(data, long)?;
        let (b, data) = split_first(data)?;
        let count = (b & 0b0000_1111) as usize;
        let (ids, rem) = split(data, count * 2)?;
        Ok((
            OtherEnsembleService {
                service_id,
                ca_id: (b & 0b0111_0000) >> 4,
                ensemble_ids: ids
                    .chunks_exact(2)
                    .map(|c| EnsembleId(c.read_be_16()))
                    .collect(),
            },
            rem,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use hex_literal::hex;

    fn sub(n: u8) -> SubchannelId {
        SubchannelId::new(n).unwrap()
    }

    #[test]
    fn test_header() {
        let header = Fig0Header::read(0b1110_1101);
        assert!(header.next);
        assert!(header.other_ensemble);
        assert!(header.long_service_id);
        assert_eq!(header.extension, 13);
    }

    #[test]
    fn test_ensemble_information() {
        let fig = Fig0::read(&hex!("00 10 01 00 00")).unwrap();
        assert_matches!(fig.body, Fig0Body::EnsembleInformation(info) => {
            assert_eq!(info.ensemble_id, EnsembleId(0x1001));
            assert_eq!(info.change_flags, 0);
            assert!(!info.alarm);
            assert_eq!(info.cif_count(), 0);
            assert_eq!(info.occurrence_change, None);
        });

        // 変更フラグ・警報・CIFカウンタ 3*250+17
        let fig = Fig0::read(&hex!("00 10 01 e3 11 05")).unwrap();
        assert_matches!(fig.body, Fig0Body::EnsembleInformation(info) => {
            assert_eq!(info.change_flags, 3);
            assert!(info.alarm);
            assert_eq!(info.cif_count(), 767);
            assert_eq!(info.occurrence_change, Some(5));
        });

        assert_matches!(Fig0::read(&hex!("00 10 01 00")), Err(FigError::InsufficientLength));
    }

    #[test]
    fn test_subchannel_organization() {
        // 短形式（UEP表33）、長形式（EEP 3-A、72CU）、予約された保護方式
        let fig = Fig0::read(&hex!("01" "14 64 21" "18 c8 88 48" "1c 00 a0 10")).unwrap();
        assert_matches!(fig.body, Fig0Body::SubchannelOrganization(list) => {
            assert_eq!(list, [
                SubchannelOrganization {
                    subchannel_id: sub(5),
                    start_address: 100,
                    size: 64,
                    protection: Protection::Uep { table_index: 33 },
                },
                SubchannelOrganization {
                    subchannel_id: sub(6),
                    start_address: 200,
                    size: 72,
                    protection: Protection::Eep { profile: EepProfile::A, level: 2 },
                },
            ]);
        });

        assert_matches!(Fig0::read(&hex!("01 18 c8 88")), Err(FigError::InsufficientLength));
    }

    #[test]
    fn test_service_organization() {
        let fig = Fig0::read(&hex!("02" "d2 10 02 3f 16 c4 8c")).unwrap();
        assert!(!fig.header.long_service_id);
        assert_matches!(fig.body, Fig0Body::ServiceOrganization(list) => {
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].service_id, ServiceId(0xD210));
            assert_eq!(list[0].ca_id, 0);
            assert_eq!(&*list[0].components, [
                ComponentDescription {
                    kind: ComponentKind::StreamAudio {
                        audio_type: AudioServiceType::DAB_PLUS,
                        subchannel_id: sub(5),
                    },
                    primary: true,
                    ca: false,
                },
                ComponentDescription {
                    kind: ComponentKind::PacketData { component_id: ComponentId(0x123) },
                    primary: false,
                    ca: false,
                },
            ]);
        });

        let fig = Fig0::read(&hex!("22" "e0 d2 10 04 01 3f 16")).unwrap();
        assert_matches!(fig.body, Fig0Body::ServiceOrganization(list) => {
            assert_eq!(list[0].service_id, ServiceId(0xE0D2_1004));
            assert_eq!(list[0].components.len(), 1);
        });

        // 2つ目のコンポーネントが途中で切れている
        assert_matches!(
            Fig0::read(&hex!("02" "d2 10 02 3f 16 c4")),
            Err(FigError::InsufficientLength)
        );
    }

    #[test]
    fn test_packet_mode() {
        let fig = Fig0::read(&hex!("03" "12 30 3c 1f e8")).unwrap();
        assert_matches!(fig.body, Fig0Body::PacketMode(list) => {
            assert_eq!(list, [PacketModeComponent {
                component_id: ComponentId(0x123),
                data_group_flag: false,
                data_type: DataServiceType::MOT,
                subchannel_id: sub(7),
                packet_address: 1000,
                ca_org: None,
            }]);
        });

        // CAOrgフラグありでCAOrgが欠けている
        assert_matches!(
            Fig0::read(&hex!("03" "12 31 3c 1f e8 00")),
            Err(FigError::InsufficientLength)
        );
    }

    #[test]
    fn test_language_and_global_definition() {
        let fig = Fig0::read(&hex!("05" "05 09" "81 23 08")).unwrap();
        assert_matches!(fig.body, Fig0Body::Language(list) => {
            assert_eq!(list, [
                ComponentLanguage::Subchannel { subchannel_id: sub(5), language: Language::ENGLISH },
                ComponentLanguage::Component {
                    component_id: ComponentId(0x123),
                    language: Language::GERMAN,
                },
            ]);
        });

        // 短形式、長形式＋拡張フラグ
        let fig = Fig0::read(&hex!("08" "d2 10 01 05" "d2 10 82 81 23 00")).unwrap();
        assert_matches!(fig.body, Fig0Body::GlobalDefinition(list) => {
            assert_eq!(list, [
                GlobalDefinition {
                    service_id: ServiceId(0xD210),
                    scids: 1,
                    target: GlobalDefinitionTarget::Subchannel(sub(5)),
                },
                GlobalDefinition {
                    service_id: ServiceId(0xD210),
                    scids: 2,
                    target: GlobalDefinitionTarget::Component(ComponentId(0x123)),
                },
            ]);
        });
    }

    #[test]
    fn test_country_lto() {
        let fig = Fig0::read(&hex!("09 02 e0 00")).unwrap();
        assert_matches!(fig.body, Fig0Body::CountryLto(lto) => {
            assert_eq!(lto.local_time_offset.minutes(), 60);
            assert_eq!(lto.ecc, 0xE0);
            assert_eq!(lto.international_table_id, 0);
            assert!(lto.extended.is_empty());
        });
    }

    #[test]
    fn test_date_and_time() {
        // 2020-01-01 12:34:56.789（長形式）
        let fig = Fig0::read(&hex!("0a 39 78 4b 22 e3 15")).unwrap();
        assert_matches!(fig.body, Fig0Body::DateAndTime(dt) => {
            assert_eq!(dt, DateAndTime {
                mjd: 58849,
                leap_second: false,
                hour: 12,
                minute: 34,
                second: Some(56),
                millisecond: Some(789),
            });
        });

        // 短形式
        let fig = Fig0::read(&hex!("0a 39 78 43 22")).unwrap();
        assert_matches!(fig.body, Fig0Body::DateAndTime(dt) => {
            assert_eq!((dt.hour, dt.minute, dt.second), (12, 34, None));
        });

        // 長形式フラグが立っているのに秒がない
        assert_matches!(Fig0::read(&hex!("0a 39 78 4b 22")), Err(FigError::InsufficientLength));
    }

    #[test]
    fn test_user_applications() {
        let fig = Fig0::read(&hex!("0d" "d2 10 01" "00 46 0c 3c de ad be ef")).unwrap();
        assert_matches!(fig.body, Fig0Body::UserApplications(list) => {
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].service_id, ServiceId(0xD210));
            assert_eq!(list[0].scids, 0);
            let app = &list[0].applications[0];
            assert_eq!(app.app_type, UserApplicationType::SLIDESHOW);
            assert_eq!(app.data.len(), 6);
            assert_eq!(app.payload(), &hex!("de ad be ef"));
        });

        // 宣言された長さのデータがない
        assert_matches!(
            Fig0::read(&hex!("0d" "d2 10 01" "00 46 0c 3c")),
            Err(FigError::InsufficientLength)
        );
    }

    #[test]
    fn test_fec_and_programme_type() {
        let fig = Fig0::read(&hex!("0e 15 18")).unwrap();
        assert_matches!(fig.body, Fig0Body::SubchannelFec(list) => {
            assert_eq!(list, [
                SubchannelFec { subchannel_id: sub(5), fec: FecScheme::ReedSolomon },
                SubchannelFec { subchannel_id: sub(6), fec: FecScheme::None },
            ]);
        });

        // 言語あり、補完コードなし／言語なし、補完コードあり
        let fig = Fig0::read(&hex!("11" "d2 10 20 09 0a" "d2 11 10 01 07")).unwrap();
        assert_matches!(fig.body, Fig0Body::ProgrammeType(list) => {
            assert_eq!(list, [
                ProgrammeTypeInformation {
                    service_id: ServiceId(0xD210),
                    static_type: false,
                    language: Some(Language::ENGLISH),
                    programme_type: ProgrammeType::POP_MUSIC,
                    complementary_code: None,
                },
                ProgrammeTypeInformation {
                    service_id: ServiceId(0xD211),
                    static_type: false,
                    language: None,
                    programme_type: ProgrammeType::NEWS,
                    complementary_code: Some(7),
                },
            ]);
        });
    }

    #[test]
    fn test_announcements() {
        let fig = Fig0::read(&hex!("12" "d2 10 00 03 02 01 02")).unwrap();
        assert_matches!(fig.body, Fig0Body::AnnouncementSupport(list) => {
            assert_eq!(list[0].support_flags, 0x0003);
            assert_eq!(&*list[0].cluster_ids, [1, 2]);
        });

        // クラスタ数は5ビット
        let fig = Fig0::read(&hex!(
            "12"
            "d2 10 00 01 08 01 02 03 04 05 06 07 08"
            "d2 11 00 02 e1 09"
        ))
        .unwrap();
        assert_matches!(fig.body, Fig0Body::AnnouncementSupport(list) => {
            assert_eq!(list.len(), 2);
            assert_eq!(list[0].service_id, ServiceId(0xD210));
            assert_eq!(&*list[0].cluster_ids, [1, 2, 3, 4, 5, 6, 7, 8]);
            assert_eq!(list[1].service_id, ServiceId(0xD211));
            assert_eq!(list[1].support_flags, 0x0002);
            assert_eq!(&*list[1].cluster_ids, [9]);
        });

        assert_matches!(
            Fig0::read(&hex!("12" "d2 10 00 01 08 01 02 03")),
            Err(FigError::InsufficientLength)
        );

        let fig = Fig0::read(&hex!("13" "01 00 02 c5 21")).unwrap();
        assert_matches!(fig.body, Fig0Body::AnnouncementSwitching(list) => {
            assert_eq!(list, [AnnouncementSwitching {
                cluster_id: 1,
                switching_flags: 0x0002,
                new: true,
                subchannel_id: sub(5),
                region_id_lower: Some(0x21),
            }]);
        });
    }

    #[test]
    fn test_frequency_information() {
        // DABアンサンブル 0x1001 を 225.648MHz（14103×16kHz）で
        let fig = Fig0::read(&hex!("15" "00 06" "10 01 03 00 37 17")).unwrap();
        assert_matches!(fig.body, Fig0Body::FrequencyInformation(list) => {
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].id, 0x1001);
            assert_eq!(&*list[0].frequencies, [225_648]);
        });
    }

    #[test]
    fn test_transmitter_position_and_other_ensembles() {
        let fig = Fig0::read(&hex!("16" "05 12 34 56 78 9a" "85 01 08 10 00 01 00 02")).unwrap();
        assert_matches!(fig.body, Fig0Body::TransmitterPosition(list) => {
            assert_eq!(list[0], TransmitterPosition::Main {
                main_id: 5,
                latitude_coarse: 0x1234,
                longitude_coarse: 0x5678,
                latitude_fine: 9,
                longitude_fine: 0xA,
            });
            assert_matches!(&list[1], TransmitterPosition::Sub { main_id: 5, subs } => {
                assert_eq!(subs[0].sub_id, 1);
                assert_eq!(subs[0].time_delay, 16);
                assert_eq!(subs[0].latitude_offset, 1);
                assert_eq!(subs[0].longitude_offset, 2);
            });
        });

        let fig = Fig0::read(&hex!("18" "d2 10 02 10 01 10 02")).unwrap();
        assert_matches!(fig.body, Fig0Body::OtherEnsembleServices(list) => {
            assert_eq!(&*list[0].ensemble_ids, [EnsembleId(0x1001), EnsembleId(0x1002)]);
        });
    }

    #[test]
    fn test_unsupported() {
        let fig = Fig0::read(&hex!("1f 00 00")).unwrap();
        assert_matches!(fig.body, Fig0Body::Unsupported(31));
    }
}
