//! FICから得られたアンサンブルの構成。

use std::ops::{Index, IndexMut};
use std::time::{Duration, Instant};

use fxhash::FxHashMap;
use smallvec::SmallVec;

use crate::label::Label;
use crate::protection::Protection;
use crate::time::{DateTime, LocalTimeOffset};
use crate::types::{
    AudioServiceType, ComponentId, DataServiceType, EnsembleId, FecScheme, Language,
    ProgrammeType, ServiceId, SubchannelId, TransportMechanismId, UserApplicationType,
};

/// サービスの一覧。
///
/// キーはサービス識別で、登録された順に並ぶ。
pub type ServiceMap = indexmap::IndexMap<ServiceId, Service, fxhash::FxBuildHasher>;

/// 受信中のアンサンブルの情報。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Ensemble {
    pub(crate) id: Option<EnsembleId>,
    pub(crate) ecc: Option<u8>,
    pub(crate) label: Label,
    pub(crate) local_time_offset: Option<LocalTimeOffset>,
    pub(crate) international_table_id: Option<u8>,
    pub(crate) date_time: Option<DateTime>,
    pub(crate) alarm: bool,
    pub(crate) service_count: Option<u8>,
    pub(crate) reconfiguration_count: Option<u16>,
}

impl Ensemble {
    /// アンサンブル識別。
    #[inline]
    pub fn id(&self) -> Option<EnsembleId> {
        self.id
    }

    /// 拡張国コード。
    #[inline]
    pub fn ecc(&self) -> Option<u8> {
        self.ecc
    }

    /// アンサンブルのラベル。
    #[inline]
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// 地方時の時差。
    #[inline]
    pub fn local_time_offset(&self) -> Option<LocalTimeOffset> {
        self.local_time_offset
    }

    /// 国際表識別。
    #[inline]
    pub fn international_table_id(&self) -> Option<u8> {
        self.international_table_id
    }

    /// 最後に受信した日付時刻。
    #[inline]
    pub fn date_time(&self) -> Option<DateTime> {
        self.date_time
    }

    /// 警報フラグ。
    #[inline]
    pub fn alarm(&self) -> bool {
        self.alarm
    }

    /// FIG 0/7で示されたサービス数。
    #[inline]
    pub fn service_count(&self) -> Option<u8> {
        self.service_count
    }

    /// FIG 0/7で示された再構成の回数。
    #[inline]
    pub fn reconfiguration_count(&self) -> Option<u16> {
        self.reconfiguration_count
    }
}

/// FIG 0/2などで示されるサービスコンポーネント。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceComponent {
    pub(crate) service_id: ServiceId,
    pub(crate) number: u8,
    pub(crate) transport: TransportMechanismId,
    pub(crate) audio_type: Option<AudioServiceType>,
    pub(crate) data_type: Option<DataServiceType>,
    pub(crate) subchannel_id: Option<SubchannelId>,
    pub(crate) component_id: Option<ComponentId>,
    pub(crate) packet_address: Option<u16>,
    pub(crate) data_group_flag: bool,
    pub(crate) ca_org: Option<u16>,
    pub(crate) scids: Option<u8>,
    pub(crate) primary: bool,
    pub(crate) ca: bool,
    pub(crate) label: Label,
    pub(crate) language: Option<Language>,
    pub(crate) user_applications: SmallVec<[UserApplicationType; 2]>,
}

impl ServiceComponent {
    pub(crate) fn new(
        service_id: ServiceId,
        number: u8,
        transport: TransportMechanismId,
    ) -> ServiceComponent {
        ServiceComponent {
            service_id,
            number,
            transport,
            audio_type: None,
            data_type: None,
            subchannel_id: None,
            component_id: None,
            packet_address: None,
            data_group_flag: false,
            ca_org: None,
            scids: None,
            primary: false,
            ca: false,
            label: Label::default(),
            language: None,
            user_applications: SmallVec::new(),
        }
    }

    /// 所属するサービスの識別。
    #[inline]
    pub fn service_id(&self) -> ServiceId {
        self.service_id
    }

    /// サービス内でのコンポーネント番号。FIG 0/2での並び順に等しい。
    #[inline]
    pub fn number(&self) -> u8 {
        self.number
    }

    /// トランスポート機構識別。
    #[inline]
    pub fn transport(&self) -> TransportMechanismId {
        self.transport
    }

    /// 音声サービスコンポーネント種別。
    #[inline]
    pub fn audio_type(&self) -> Option<AudioServiceType> {
        self.audio_type
    }

    /// データサービスコンポーネント種別。
    #[inline]
    pub fn data_type(&self) -> Option<DataServiceType> {
        self.data_type
    }

    /// サブチャンネル識別。パケットモードではFIG 0/3の受信後に設定される。
    #[inline]
    pub fn subchannel_id(&self) -> Option<SubchannelId> {
        self.subchannel_id
    }

    /// パケットモードのサービスコンポーネント識別。
    #[inline]
    pub fn component_id(&self) -> Option<ComponentId> {
        self.component_id
    }

    /// パケットアドレス。
    #[inline]
    pub fn packet_address(&self) -> Option<u16> {
        self.packet_address
    }

    /// DGフラグ。
    #[inline]
    pub fn data_group_flag(&self) -> bool {
        self.data_group_flag
    }

    /// 限定受信機構。
    #[inline]
    pub fn ca_org(&self) -> Option<u16> {
        self.ca_org
    }

    /// FIG 0/8で示されたサービス内のサービスコンポーネント識別（SCIdS）。
    #[inline]
    pub fn scids(&self) -> Option<u8> {
        self.scids
    }

    /// 主コンポーネントであれば`true`。
    #[inline]
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// 限定受信が適用されていれば`true`。
    #[inline]
    pub fn is_ca(&self) -> bool {
        self.ca
    }

    /// コンポーネントのラベル。
    #[inline]
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// 言語。
    #[inline]
    pub fn language(&self) -> Option<Language> {
        self.language
    }

    /// FIG 0/13で示されたユーザーアプリケーション種別。
    #[inline]
    pub fn user_applications(&self) -> &[UserApplicationType] {
        &self.user_applications
    }

    /// 音声コンポーネントであれば`true`を返す。
    #[inline]
    pub fn is_audio(&self) -> bool {
        self.transport == TransportMechanismId::StreamAudio
    }

    /// `scids`で識別されるコンポーネントであれば`true`を返す。
    ///
    /// FIG 0/8による対応付けがなければコンポーネント番号と比較する。
    #[inline]
    pub(crate) fn matches_scids(&self, scids: u8) -> bool {
        self.scids.unwrap_or(self.number) == scids
    }
}

/// アンサンブル内のサービス。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Service {
    pub(crate) id: ServiceId,
    pub(crate) label: Label,
    pub(crate) ca_id: u8,
    pub(crate) language: Option<Language>,
    pub(crate) programme_type: Option<ProgrammeType>,
    pub(crate) static_programme_type: bool,
    pub(crate) complementary_code: Option<u8>,
    pub(crate) components: Vec<ServiceComponent>,
}

impl Service {
    pub(crate) fn new(id: ServiceId) -> Service {
        Service {
            id,
            ..Default::default()
        }
    }

    /// サービス識別。存在しないサービスの場合は[`ServiceId::INVALID`]となる。
    #[inline]
    pub fn id(&self) -> ServiceId {
        self.id
    }

    /// 有効なサービスであれば`true`を返す。
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.id != ServiceId::INVALID
    }

    /// サービスのラベル。
    #[inline]
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// 限定受信識別。
    #[inline]
    pub fn ca_id(&self) -> u8 {
        self.ca_id
    }

    /// 言語。
    #[inline]
    pub fn language(&self) -> Option<Language> {
        self.language
    }

    /// 番組種別。
    #[inline]
    pub fn programme_type(&self) -> Option<ProgrammeType> {
        self.programme_type
    }

    /// 番組種別が静的であれば`true`。
    #[inline]
    pub fn is_static_programme_type(&self) -> bool {
        self.static_programme_type
    }

    /// FIG 0/17の補完コード。
    #[inline]
    pub fn complementary_code(&self) -> Option<u8> {
        self.complementary_code
    }

    /// サービスコンポーネント。
    #[inline]
    pub fn components(&self) -> &[ServiceComponent] {
        &self.components
    }

    /// 主コンポーネントを返す。
    #[inline]
    pub fn primary_component(&self) -> Option<&ServiceComponent> {
        self.components.iter().find(|c| c.primary)
    }
}

/// サブチャンネル。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subchannel {
    pub(crate) used: bool,
    pub(crate) start_address: u16,
    pub(crate) size: u16,
    pub(crate) protection: Protection,
    pub(crate) fec: FecScheme,
    pub(crate) language: Option<Language>,
}

impl Subchannel {
    /// 未使用のサブチャンネル。
    pub const UNUSED: Subchannel = Subchannel {
        used: false,
        start_address: 0,
        size: 0,
        protection: Protection::Uep { table_index: 0 },
        fec: FecScheme::None,
        language: None,
    };

    /// FIG 0/1で構成が示されていれば`true`を返す。
    #[inline]
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// CIF内の開始位置（CU単位）。
    #[inline]
    pub fn start_address(&self) -> u16 {
        self.start_address
    }

    /// 大きさ（CU単位）。
    #[inline]
    pub fn size(&self) -> u16 {
        self.size
    }

    /// 保護方式。
    #[inline]
    pub fn protection(&self) -> Protection {
        self.protection
    }

    /// 誤り訂正方式。
    #[inline]
    pub fn fec(&self) -> FecScheme {
        self.fec
    }

    /// 言語。
    #[inline]
    pub fn language(&self) -> Option<Language> {
        self.language
    }

    /// ビットレート（kbps）。
    #[inline]
    pub fn bitrate(&self) -> Option<u16> {
        if !self.used {
            return None;
        }
        self.protection.bitrate(self.size)
    }
}

impl Default for Subchannel {
    #[inline]
    fn default() -> Subchannel {
        Subchannel::UNUSED
    }
}

/// サブチャンネル識別で引く64個のサブチャンネル。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubchannelTable([Subchannel; SubchannelId::COUNT]);

impl SubchannelTable {
    /// 全て未使用の`SubchannelTable`を生成する。
    #[inline]
    pub fn new() -> SubchannelTable {
        const UNUSED: Subchannel = Subchannel::UNUSED;
        SubchannelTable([UNUSED; SubchannelId::COUNT])
    }

    /// `id`のサブチャンネルが使用されていれば返す。
    #[inline]
    pub fn get(&self, id: SubchannelId) -> Option<&Subchannel> {
        Some(&self[id]).filter(|s| s.used)
    }

    /// 使用されているサブチャンネルを識別の順に列挙する。
    pub fn iter(&self) -> impl Iterator<Item = (SubchannelId, &Subchannel)> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, s)| s.used)
            .filter_map(|(i, s)| Some((SubchannelId::new(i as u8)?, s)))
    }

    /// 全てのサブチャンネルを未使用にする。
    #[inline]
    pub fn clear(&mut self) {
        self.0.fill(Subchannel::UNUSED);
    }
}

impl Default for SubchannelTable {
    #[inline]
    fn default() -> SubchannelTable {
        SubchannelTable::new()
    }
}

impl Index<SubchannelId> for SubchannelTable {
    type Output = Subchannel;

    #[inline]
    fn index(&self, id: SubchannelId) -> &Subchannel {
        &self.0[id.get() as usize]
    }
}

impl IndexMut<SubchannelId> for SubchannelTable {
    #[inline]
    fn index_mut(&mut self, id: SubchannelId) -> &mut Subchannel {
        &mut self.0[id.get() as usize]
    }
}

/// サービスの受信回数に基づく登録・削除の閾値。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    /// サービスを登録する受信回数。
    pub admit_threshold: u8,
    /// 受信回数の上限。
    pub max_repeat_count: u8,
    /// 受信回数を1つ減らす間隔。
    pub decay_interval: Duration,
}

impl Default for GateConfig {
    fn default() -> GateConfig {
        GateConfig {
            admit_threshold: 2,
            max_repeat_count: 4,
            decay_interval: Duration::from_secs(1),
        }
    }
}

/// [`Registry::signal_service`]の結果。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceSignal {
    /// サービスが新たに登録された場合は`true`。
    pub admitted: bool,
    /// 受信回数が0になり削除されたサービス。
    pub dropped: SmallVec<[ServiceId; 4]>,
}

/// FICから得られた情報の集合。
#[derive(Debug, Default, Clone)]
pub struct Registry {
    ensemble: Ensemble,
    services: ServiceMap,
    subchannels: SubchannelTable,
    repeat_counts: FxHashMap<ServiceId, u8>,
    last_decay: Option<Instant>,
    last_sync: Option<Instant>,
}

impl Registry {
    /// 空の`Registry`を生成する。
    #[inline]
    pub fn new() -> Registry {
        Registry::default()
    }

    /// アンサンブルの情報。
    #[inline]
    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    #[inline]
    pub(crate) fn ensemble_mut(&mut self) -> &mut Ensemble {
        &mut self.ensemble
    }

    /// 登録済みのサービス。
    #[inline]
    pub fn services(&self) -> &ServiceMap {
        &self.services
    }

    /// `id`のサービスを返す。
    #[inline]
    pub fn service(&self, id: ServiceId) -> Option<&Service> {
        self.services.get(&id)
    }

    #[inline]
    pub(crate) fn service_mut(&mut self, id: ServiceId) -> Option<&mut Service> {
        self.services.get_mut(&id)
    }

    /// サブチャンネル。
    #[inline]
    pub fn subchannels(&self) -> &SubchannelTable {
        &self.subchannels
    }

    #[inline]
    pub(crate) fn subchannels_mut(&mut self) -> &mut SubchannelTable {
        &mut self.subchannels
    }

    /// `service_id`のサービスにおける、`scids`で識別されるコンポーネントを返す。
    pub fn component_by_scids(&self, service_id: ServiceId, scids: u8) -> Option<&ServiceComponent> {
        self.service(service_id)?
            .components
            .iter()
            .find(|c| c.matches_scids(scids))
    }

    pub(crate) fn component_by_scids_mut(
        &mut self,
        service_id: ServiceId,
        scids: u8,
    ) -> Option<&mut ServiceComponent> {
        self.service_mut(service_id)?
            .components
            .iter_mut()
            .find(|c| c.matches_scids(scids))
    }

    /// パケットモードのサービスコンポーネント識別`id`でコンポーネントを探す。
    pub fn component_by_id(&self, id: ComponentId) -> Option<&ServiceComponent> {
        self.services
            .values()
            .flat_map(|s| s.components.iter())
            .find(|c| c.component_id == Some(id))
    }

    pub(crate) fn component_by_id_mut(&mut self, id: ComponentId) -> Option<&mut ServiceComponent> {
        self.services
            .values_mut()
            .flat_map(|s| s.components.iter_mut())
            .find(|c| c.component_id == Some(id))
    }

    /// `component`の属するサブチャンネルを返す。
    #[inline]
    pub fn subchannel_of(&self, component: &ServiceComponent) -> Option<&Subchannel> {
        self.subchannels.get(component.subchannel_id?)
    }

    /// 最後にCIFカウンタの下位が0となった時刻。
    #[inline]
    pub fn last_sync(&self) -> Option<Instant> {
        self.last_sync
    }

    #[inline]
    pub(crate) fn set_last_sync(&mut self, now: Instant) {
        self.last_sync = Some(now);
    }

    /// 現在の受信回数。
    #[inline]
    pub fn repeat_count(&self, id: ServiceId) -> u8 {
        self.repeat_counts.get(&id).copied().unwrap_or(0)
    }

    /// FIG 0/2でサービス`id`を受信したことを記録する。
    ///
    /// 前回の減算から`decay_interval`以上経過していれば全サービスの受信回数を1つ減らし、
    /// 0になったサービスを削除する。
    /// その後`id`の受信回数を増やし、閾値に達したサービスを登録する。
    pub(crate) fn signal_service(
        &mut self,
        id: ServiceId,
        now: Instant,
        config: &GateConfig,
    ) -> ServiceSignal {
        let mut signal = ServiceSignal::default();

        match self.last_decay {
            None => self.last_decay = Some(now),
            Some(last) if now.saturating_duration_since(last) >= config.decay_interval => {
                let dropped = &mut signal.dropped;
                self.repeat_counts.retain(|&sid, count| {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        dropped.push(sid);
                        false
                    } else {
                        true
                    }
                });
                for &sid in &signal.dropped {
                    self.drop_service(sid);
                }
                self.last_decay = Some(now);
            }
            Some(_) => {}
        }

        let count = self.repeat_counts.entry(id).or_insert(0);
        if *count < config.max_repeat_count {
            *count += 1;
        }

        if *count >= config.admit_threshold && !self.services.contains_key(&id) {
            log::info!("service {} detected", id);
            self.services.insert(id, Service::new(id));
            signal.admitted = true;
        }

        signal
    }

    /// サービス`id`とそのコンポーネントを削除し、参照されなくなったサブチャンネルを未使用にする。
    pub(crate) fn drop_service(&mut self, id: ServiceId) {
        if self.services.shift_remove(&id).is_none() {
            return;
        }
        log::info!("service {} dropped", id);

        let services = &self.services;
        for (i, sub) in self.subchannels.0.iter_mut().enumerate() {
            if !sub.used {
                continue;
            }
            let referenced = services
                .values()
                .flat_map(|s| s.components.iter())
                .any(|c| c.subchannel_id.map(SubchannelId::get) == Some(i as u8));
            if !referenced {
                log::debug!("sub-channel {} released", i);
                *sub = Subchannel::UNUSED;
            }
        }
    }

    /// アンサンブルに関する全ての情報を消去する。
    pub fn clear(&mut self) {
        *self = Registry::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(n: u8) -> SubchannelId {
        SubchannelId::new(n).unwrap()
    }

    fn use_subchannel(registry: &mut Registry, id: SubchannelId, start_address: u16) {
        registry.subchannels_mut()[id] = Subchannel {
            used: true,
            start_address,
            size: 72,
            ..Subchannel::UNUSED
        };
    }

    fn add_component(registry: &mut Registry, sid: ServiceId, subchannel: SubchannelId) {
        let service = registry.service_mut(sid).unwrap();
        let number = service.components.len() as u8;
        let mut component = ServiceComponent::new(sid, number, TransportMechanismId::StreamAudio);
        component.subchannel_id = Some(subchannel);
        service.components.push(component);
    }

    #[test]
    fn test_subchannel_table() {
        let mut table = SubchannelTable::new();
        assert_eq!(table.iter().count(), 0);
        assert_eq!(table.get(sub(3)), None);

        table[sub(3)].used = true;
        table[sub(3)].size = 84;
        table[sub(63)].used = true;
        let ids = table.iter().map(|(id, _)| id.get()).collect::<Vec<_>>();
        assert_eq!(ids, [3, 63]);
        assert_eq!(table.get(sub(3)).map(Subchannel::size), Some(84));

        table.clear();
        assert_eq!(table.get(sub(3)), None);
        assert_eq!(table, SubchannelTable::default());
    }

    #[test]
    fn test_gate_admission() {
        let config = GateConfig::default();
        let mut registry = Registry::new();
        let t0 = Instant::now();
        let sid = ServiceId(0xD210);

        let signal = registry.signal_service(sid, t0, &config);
        assert!(!signal.admitted);
        assert!(registry.service(sid).is_none());
        assert_eq!(registry.repeat_count(sid), 1);

        let signal = registry.signal_service(sid, t0 + Duration::from_millis(500), &config);
        assert!(signal.admitted);
        assert!(registry.service(sid).is_some());

        // 上限で飽和する
        for i in 0..10 {
            let signal = registry.signal_service(sid, t0 + Duration::from_millis(600 + i), &config);
            assert!(!signal.admitted);
        }
        assert_eq!(registry.repeat_count(sid), 4);
        assert_eq!(registry.services().len(), 1);
    }

    #[test]
    fn test_gate_decay_and_drop() {
        let config = GateConfig::default();
        let mut registry = Registry::new();
        let t0 = Instant::now();
        let a = ServiceId(0xD210);
        let b = ServiceId(0xD220);

        registry.signal_service(a, t0, &config);
        registry.signal_service(a, t0, &config);
        assert!(registry.service(a).is_some());

        use_subchannel(&mut registry, sub(1), 0);
        use_subchannel(&mut registry, sub(2), 72);
        use_subchannel(&mut registry, sub(3), 144);
        add_component(&mut registry, a, sub(1));

        registry.signal_service(b, t0, &config);
        registry.signal_service(b, t0, &config);
        add_component(&mut registry, b, sub(2));

        // 1秒経過ごとに全サービスの受信回数が1つ減る
        let signal = registry.signal_service(b, t0 + Duration::from_millis(1100), &config);
        assert!(signal.dropped.is_empty());
        assert_eq!(registry.repeat_count(a), 1);
        assert_eq!(registry.repeat_count(b), 2);

        let signal = registry.signal_service(b, t0 + Duration::from_millis(2200), &config);
        assert_eq!(&*signal.dropped, [a]);
        assert!(registry.service(a).is_none());
        assert_eq!(registry.repeat_count(a), 0);
        assert!(registry.service(b).is_some());

        // aのみが参照していたサブチャンネルと、どこからも参照されていないサブチャンネルは未使用となる
        assert_eq!(registry.subchannels().get(sub(1)), None);
        assert!(registry.subchannels().get(sub(2)).is_some());
        assert_eq!(registry.subchannels().get(sub(3)), None);
    }

    #[test]
    fn test_gate_single_shot() {
        let config = GateConfig::default();
        let mut registry = Registry::new();
        let t0 = Instant::now();
        let phantom = ServiceId(0x1234);
        let real = ServiceId(0xD210);

        registry.signal_service(phantom, t0, &config);
        for i in 1..5u64 {
            registry.signal_service(real, t0 + Duration::from_millis(i * 600), &config);
        }
        assert!(registry.service(phantom).is_none());
        assert!(registry.service(real).is_some());
        assert_eq!(registry.repeat_count(phantom), 0);
    }

    #[test]
    fn test_component_lookup() {
        let config = GateConfig::default();
        let mut registry = Registry::new();
        let t0 = Instant::now();
        let sid = ServiceId(0xD210);
        registry.signal_service(sid, t0, &config);
        registry.signal_service(sid, t0, &config);
        add_component(&mut registry, sid, sub(1));
        add_component(&mut registry, sid, sub(2));
        use_subchannel(&mut registry, sub(2), 72);

        let second = registry.component_by_scids(sid, 1).unwrap();
        assert_eq!(second.number(), 1);
        assert_eq!(registry.subchannel_of(second).map(Subchannel::start_address), Some(72));
        let first = registry.component_by_scids(sid, 0).unwrap();
        assert_eq!(registry.subchannel_of(first), None);

        // FIG 0/8で対応付けられたSCIdSを優先する
        registry.component_by_scids_mut(sid, 1).unwrap().scids = Some(5);
        assert_eq!(registry.component_by_scids(sid, 5).map(|c| c.number()), Some(1));
        assert!(registry.component_by_scids(sid, 1).is_none());

        registry.component_by_scids_mut(sid, 0).unwrap().component_id = Some(ComponentId(0x123));
        assert_eq!(registry.component_by_id(ComponentId(0x123)).map(|c| c.number()), Some(0));
    }

    #[test]
    fn test_clear() {
        let config = GateConfig::default();
        let mut registry = Registry::new();
        let t0 = Instant::now();
        registry.signal_service(ServiceId(0xD210), t0, &config);
        registry.signal_service(ServiceId(0xD210), t0, &config);
        use_subchannel(&mut registry, sub(1), 0);
        registry.ensemble_mut().id = Some(EnsembleId(0x1001));
        registry.set_last_sync(t0);

        registry.clear();
        assert!(registry.services().is_empty());
        assert_eq!(registry.subchannels().iter().count(), 0);
        assert_eq!(registry.repeat_count(ServiceId(0xD210)), 0);
        assert_eq!(registry.ensemble().id(), None);
        assert_eq!(registry.last_sync(), None);
    }

    #[test]
    fn test_sentinel_service() {
        let service = Service::default();
        assert!(!service.is_valid());
        assert_eq!(service.id(), ServiceId::INVALID);
        assert!(service.components().is_empty());
        assert!(service.primary_component().is_none());
    }
}
