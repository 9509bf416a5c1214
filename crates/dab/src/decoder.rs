//! FIBを解析して[`Registry`]を更新するデコーダー。

use std::time::Instant;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::fig::fig0::{
    ComponentKind, ComponentLanguage, EnsembleInformation, Fig0Body, GlobalDefinitionTarget,
    ServiceOrganization,
};
use crate::fig::fig1::{Fig1Body, LabelTarget};
use crate::fig::{Fig, Fig0, Fig1, Fig2, FigIter};
use crate::label::Label;
use crate::registry::{Ensemble, GateConfig, Registry, Service, ServiceComponent, Subchannel};
use crate::time::DateTime;
use crate::types::{
    EnsembleId, ServiceId, SubchannelId, TransportMechanismId, UserApplicationType,
};

/// [`FicDecoder`]から状態の変化を受け取るためのトレイト。
///
/// 各メソッドは[`FicDecoder`]のロックを解放した後に呼ばれるため、
/// メソッド内で[`FicDecoder`]の状態を問い合わせることができる。
pub trait Notifier {
    /// アンサンブル識別を受信、または変化した際に呼ばれる。
    fn on_new_ensemble(&self, id: EnsembleId) {
        let _ = id;
    }

    /// サービスが登録された際に呼ばれる。
    fn on_service_detected(&self, id: ServiceId) {
        let _ = id;
    }

    /// アンサンブルのラベルが更新された際に呼ばれる。
    fn on_set_ensemble_label(&self, label: &Label) {
        let _ = label;
    }

    /// サービスのラベルが更新された際に呼ばれる。
    fn on_set_service_label(&self, id: ServiceId, label: &Label) {
        let _ = (id, label);
    }

    /// 日付時刻を受信した際に呼ばれる。
    ///
    /// 地方時の時差を受信するまでは呼ばれない。
    fn on_date_time_update(&self, date_time: &DateTime) {
        let _ = date_time;
    }
}

impl Notifier for () {}

/// FIG 0/13で送出されたスライドショーのデータを受け取るためのトレイト。
pub trait MotHandler {
    /// スライドショーのアプリケーションデータを受信した際に呼ばれる。
    fn handle_mot_data_group(&self, data: Vec<u8>);
}

impl MotHandler for () {
    #[inline]
    fn handle_mot_data_group(&self, _: Vec<u8>) {}
}

/// ロックの解放後に通知する事象。
#[derive(Debug)]
enum Event {
    NewEnsemble(EnsembleId),
    ServiceDetected(ServiceId),
    EnsembleLabel(Label),
    ServiceLabel(ServiceId, Label),
    DateTime(DateTime),
    MotDataGroup(Vec<u8>),
}

type Events = SmallVec<[Event; 4]>;

/// FICのデコーダー。
///
/// 全ての状態は1つの[`Mutex`]で保護され、FIBの処理と問い合わせは直列化される。
pub struct FicDecoder<N = (), M = ()> {
    notifier: N,
    mot_handler: M,
    config: GateConfig,
    registry: Mutex<Registry>,
}

impl<N: Notifier, M: MotHandler> FicDecoder<N, M> {
    /// 既定の設定で`FicDecoder`を生成する。
    #[inline]
    pub fn new(notifier: N, mot_handler: M) -> FicDecoder<N, M> {
        FicDecoder::with_config(notifier, mot_handler, GateConfig::default())
    }

    /// サービス登録の閾値を指定して`FicDecoder`を生成する。
    pub fn with_config(notifier: N, mot_handler: M, config: GateConfig) -> FicDecoder<N, M> {
        FicDecoder {
            notifier,
            mot_handler,
            config,
            registry: Mutex::new(Registry::new()),
        }
    }

    /// 通知先。
    #[inline]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// スライドショーのデータの送り先。
    #[inline]
    pub fn mot_handler(&self) -> &M {
        &self.mot_handler
    }

    /// サービス登録の閾値。
    #[inline]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// CRC検査済みのFIBを処理する。
    ///
    /// `fib`は先頭30バイトのみが使われる。
    #[inline]
    pub fn process_fib(&self, fib: &[u8]) {
        self.process_fib_at(fib, Instant::now())
    }

    /// 現在時刻を`now`としてFIBを処理する。
    pub fn process_fib_at(&self, fib: &[u8], now: Instant) {
        let mut events = Events::new();

        {
            let mut registry = self.registry.lock();
            let mut ctx = Context {
                registry: &mut registry,
                config: &self.config,
                now,
                events: &mut events,
            };

            for raw in FigIter::new(fib) {
                let raw = match raw {
                    Ok(raw) => raw,
                    Err(e) => {
                        log::warn!("fib: {}", e);
                        break;
                    }
                };

                match raw.parse() {
                    Ok(Fig::Fig0(fig)) => ctx.apply_fig0(fig),
                    Ok(Fig::Fig1(fig)) => ctx.apply_fig1(fig),
                    Ok(Fig::Fig2(fig)) => ctx.apply_fig2(fig),
                    Ok(Fig::ConditionalAccess) => {
                        log::trace!("fig 6: conditional access is not supported");
                        break;
                    }
                    Ok(Fig::Reserved(fig_type)) => {
                        log::debug!("fig {}: reserved type", fig_type);
                    }
                    Err(e) => log::debug!("fig {}: {}", raw.fig_type, e),
                }
            }
        }

        for event in events {
            match event {
                Event::NewEnsemble(id) => self.notifier.on_new_ensemble(id),
                Event::ServiceDetected(id) => self.notifier.on_service_detected(id),
                Event::EnsembleLabel(label) => self.notifier.on_set_ensemble_label(&label),
                Event::ServiceLabel(id, label) => self.notifier.on_set_service_label(id, &label),
                Event::DateTime(dt) => self.notifier.on_date_time_update(&dt),
                Event::MotDataGroup(data) => self.mot_handler.handle_mot_data_group(data),
            }
        }
    }

    /// 登録済みのサービスを登録順に複製して返す。
    pub fn services(&self) -> Vec<Service> {
        self.registry.lock().services().values().cloned().collect()
    }

    /// `id`のサービスを複製して返す。
    ///
    /// サービスが存在しない場合は[`Service::default`]を返す。
    pub fn service(&self, id: ServiceId) -> Service {
        self.registry
            .lock()
            .service(id)
            .cloned()
            .unwrap_or_default()
    }

    /// `id`のサービスのコンポーネントを複製して返す。
    pub fn components(&self, id: ServiceId) -> Vec<ServiceComponent> {
        self.registry
            .lock()
            .service(id)
            .map(|s| s.components().to_vec())
            .unwrap_or_default()
    }

    /// `component`の属するサブチャンネルを複製して返す。
    ///
    /// サブチャンネルが不明な場合は[`Subchannel::UNUSED`]を返す。
    pub fn subchannel(&self, component: &ServiceComponent) -> Subchannel {
        self.registry
            .lock()
            .subchannel_of(component)
            .cloned()
            .unwrap_or(Subchannel::UNUSED)
    }

    /// 使用されているサブチャンネルを識別の順に複製して返す。
    pub fn subchannels(&self) -> Vec<(SubchannelId, Subchannel)> {
        self.registry
            .lock()
            .subchannels()
            .iter()
            .map(|(id, sub)| (id, sub.clone()))
            .collect()
    }

    /// アンサンブルの情報を複製して返す。
    pub fn ensemble(&self) -> Ensemble {
        self.registry.lock().ensemble().clone()
    }

    /// アンサンブル識別。
    pub fn ensemble_id(&self) -> Option<EnsembleId> {
        self.registry.lock().ensemble().id()
    }

    /// アンサンブルの拡張国コード。
    pub fn ecc(&self) -> Option<u8> {
        self.registry.lock().ensemble().ecc()
    }

    /// アンサンブルのラベル。
    pub fn ensemble_label(&self) -> Label {
        self.registry.lock().ensemble().label().clone()
    }

    /// 最後に受信した日付時刻。
    pub fn date_time(&self) -> Option<DateTime> {
        self.registry.lock().ensemble().date_time()
    }

    /// 最後にCIFカウンタの下位が0となった時刻。
    pub fn last_sync(&self) -> Option<Instant> {
        self.registry.lock().last_sync()
    }

    /// 選局の変更などに伴い、受信した全ての情報を一度に消去する。
    pub fn clear_ensemble(&self) {
        self.registry.lock().clear();
        log::debug!("ensemble cleared");
    }
}

impl Default for FicDecoder {
    #[inline]
    fn default() -> FicDecoder {
        FicDecoder::new((), ())
    }
}

/// ロック中の1つのFIBの処理。
struct Context<'a> {
    registry: &'a mut Registry,
    config: &'a GateConfig,
    now: Instant,
    events: &'a mut Events,
}

impl<'a> Context<'a> {
    fn apply_fig0(&mut self, fig: Fig0) {
        let ext = fig.header.extension;
        if fig.header.other_ensemble && matches!(ext, 0 | 1 | 2 | 3 | 8 | 13 | 14) {
            log::trace!("fig 0/{}: other ensemble", ext);
            return;
        }

        match fig.body {
            Fig0Body::EnsembleInformation(info) => self.ensemble_information(&info),
            Fig0Body::SubchannelOrganization(list) => {
                let subchannels = self.registry.subchannels_mut();
                for org in list {
                    log::debug!(
                        "fig 0/1: sub-channel {} start={} size={} {}",
                        org.subchannel_id,
                        org.start_address,
                        org.size,
                        org.protection
                    );
                    let sub = &mut subchannels[org.subchannel_id];
                    sub.used = true;
                    sub.start_address = org.start_address;
                    sub.size = org.size;
                    sub.protection = org.protection;
                }
            }
            Fig0Body::ServiceOrganization(list) => {
                for org in list {
                    self.service_organization(&org);
                }
            }
            Fig0Body::PacketMode(list) => {
                for packet in list {
                    let Some(component) = self.registry.component_by_id_mut(packet.component_id)
                    else {
                        log::trace!("fig 0/3: unknown component {:?}", packet.component_id);
                        continue;
                    };
                    component.subchannel_id = Some(packet.subchannel_id);
                    component.data_type = Some(packet.data_type);
                    component.data_group_flag = packet.data_group_flag;
                    component.packet_address = Some(packet.packet_address);
                    component.ca_org = packet.ca_org;
                }
            }
            Fig0Body::StreamConditionalAccess(list) => {
                for ca in list {
                    log::debug!(
                        "fig 0/4: sub-channel {} CAOrg={:04X}",
                        ca.subchannel_id,
                        ca.ca_org
                    );
                }
            }
            Fig0Body::Language(list) => {
                for language in list {
                    match language {
                        ComponentLanguage::Subchannel {
                            subchannel_id,
                            language,
                        } => {
                            self.registry.subchannels_mut()[subchannel_id].language =
                                Some(language);
                        }
                        ComponentLanguage::Component {
                            component_id,
                            language,
                        } => {
                            if let Some(component) = self.registry.component_by_id_mut(component_id)
                            {
                                component.language = Some(language);
                            }
                        }
                    }
                }
            }
            Fig0Body::ConfigurationInformation(info) => {
                let ensemble = self.registry.ensemble_mut();
                ensemble.service_count = Some(info.service_count);
                ensemble.reconfiguration_count = Some(info.reconfiguration_count);
            }
            Fig0Body::GlobalDefinition(list) => {
                for def in list {
                    let Some(service) = self.registry.service_mut(def.service_id) else {
                        continue;
                    };
                    let component = match def.target {
                        GlobalDefinitionTarget::Subchannel(id) => {
                            service.components.iter_mut().find(|c| {
                                c.transport != TransportMechanismId::PacketData
                                    && c.subchannel_id == Some(id)
                            })
                        }
                        GlobalDefinitionTarget::Component(id) => service
                            .components
                            .iter_mut()
                            .find(|c| c.component_id == Some(id)),
                    };
                    if let Some(component) = component {
                        component.scids = Some(def.scids);
                    }
                }
            }
            Fig0Body::CountryLto(lto) => {
                log::debug!(
                    "fig 0/9: LTO={} ECC={:02X} table={}",
                    lto.local_time_offset,
                    lto.ecc,
                    lto.international_table_id
                );
                if !lto.extended.is_empty() {
                    log::trace!("fig 0/9: extended field {:02X?}", lto.extended);
                }
                let ensemble = self.registry.ensemble_mut();
                ensemble.local_time_offset = Some(lto.local_time_offset);
                ensemble.ecc = Some(lto.ecc);
                ensemble.international_table_id = Some(lto.international_table_id);
            }
            Fig0Body::DateAndTime(dt) => {
                let ensemble = self.registry.ensemble_mut();
                if ensemble.id.is_none() {
                    log::trace!("fig 0/10: ensemble is unknown");
                    return;
                }

                let date_time = DateTime {
                    mjd: dt.mjd,
                    hour: dt.hour,
                    minute: dt.minute,
                    second: dt.second.unwrap_or(0),
                    millisecond: dt.millisecond.unwrap_or(0),
                    offset: ensemble.local_time_offset.unwrap_or_default(),
                };
                ensemble.date_time = Some(date_time);

                if ensemble.local_time_offset.is_some() {
                    self.events.push(Event::DateTime(date_time));
                } else {
                    log::trace!("fig 0/10: local time offset is unknown");
                }
            }
            Fig0Body::UserApplications(list) => {
                for info in list {
                    for app in &info.applications {
                        if app.app_type == UserApplicationType::SLIDESHOW {
                            let payload = app.payload();
                            if !payload.is_empty() {
                                self.events.push(Event::MotDataGroup(payload.to_vec()));
                            }
                        }
                    }

                    let Some(component) =
                        self.registry.component_by_scids_mut(info.service_id, info.scids)
                    else {
                        continue;
                    };
                    component.user_applications.clear();
                    component
                        .user_applications
                        .extend(info.applications.iter().map(|app| app.app_type));
                }
            }
            Fig0Body::SubchannelFec(list) => {
                let subchannels = self.registry.subchannels_mut();
                for fec in list {
                    let sub = &mut subchannels[fec.subchannel_id];
                    if sub.is_used() {
                        sub.fec = fec.fec;
                    }
                }
            }
            Fig0Body::ProgrammeType(list) => {
                for pty in list {
                    let Some(service) = self.registry.service_mut(pty.service_id) else {
                        continue;
                    };
                    service.programme_type = Some(pty.programme_type);
                    service.static_programme_type = pty.static_type;
                    service.complementary_code = pty.complementary_code;
                    if let Some(language) = pty.language {
                        service.language = Some(language);
                    }
                }
            }
            Fig0Body::AnnouncementSupport(list) => {
                for asu in list {
                    log::debug!(
                        "fig 0/18: service {} ASu={:04X} clusters={:?}",
                        asu.service_id,
                        asu.support_flags,
                        asu.cluster_ids
                    );
                }
            }
            Fig0Body::AnnouncementSwitching(list) => {
                for asw in list {
                    log::debug!(
                        "fig 0/19: cluster {} ASw={:04X} new={} sub-channel {}",
                        asw.cluster_id,
                        asw.switching_flags,
                        asw.new,
                        asw.subchannel_id
                    );
                }
            }
            Fig0Body::FrequencyInformation(list) => {
                for fi in list {
                    log::debug!(
                        "fig 0/21: id={:04X} R&M={} frequencies={:?}",
                        fi.id,
                        fi.range_modulation,
                        fi.frequencies
                    );
                }
            }
            Fig0Body::TransmitterPosition(list) => {
                for pos in list {
                    log::debug!("fig 0/22: {:?}", pos);
                }
            }
            Fig0Body::OtherEnsembleServices(list) => {
                for oe in list {
                    log::debug!(
                        "fig 0/24: service {} ensembles={:?}",
                        oe.service_id,
                        oe.ensemble_ids
                    );
                }
            }
            Fig0Body::Unsupported(ext) => log::trace!("fig 0/{}: unsupported", ext),
        }
    }

    fn ensemble_information(&mut self, info: &EnsembleInformation) {
        let ensemble = self.registry.ensemble_mut();
        if ensemble.id != Some(info.ensemble_id) {
            log::info!("new ensemble {}", info.ensemble_id);
            ensemble.id = Some(info.ensemble_id);
            self.events.push(Event::NewEnsemble(info.ensemble_id));
        }
        ensemble.alarm = info.alarm;

        if info.cif_count_low == 0 {
            self.registry.set_last_sync(self.now);
        }
    }

    fn service_organization(&mut self, org: &ServiceOrganization) {
        let signal = self
            .registry
            .signal_service(org.service_id, self.now, self.config);
        if signal.admitted {
            self.events.push(Event::ServiceDetected(org.service_id));
        }

        let Some(service) = self.registry.service_mut(org.service_id) else {
            return;
        };
        service.ca_id = org.ca_id;

        for (number, desc) in org.components.iter().enumerate() {
            let number = number as u8;
            if desc.kind == ComponentKind::Reserved {
                log::debug!(
                    "fig 0/2: service {} component {} uses reserved TMId",
                    org.service_id,
                    number
                );
                continue;
            }

            let index = match service.components.iter().position(|c| c.number == number) {
                Some(index) => index,
                None => {
                    log::debug!(
                        "fig 0/2: service {} component {} {:?}",
                        org.service_id,
                        number,
                        desc.kind
                    );
                    service.components.push(ServiceComponent::new(
                        org.service_id,
                        number,
                        desc.kind.transport(),
                    ));
                    service.components.len() - 1
                }
            };

            let component = &mut service.components[index];
            component.transport = desc.kind.transport();
            component.primary = desc.primary;
            component.ca = desc.ca;
            match desc.kind {
                ComponentKind::StreamAudio {
                    audio_type,
                    subchannel_id,
                } => {
                    component.audio_type = Some(audio_type);
                    component.subchannel_id = Some(subchannel_id);
                }
                ComponentKind::StreamData {
                    data_type,
                    subchannel_id,
                } => {
                    component.data_type = Some(data_type);
                    component.subchannel_id = Some(subchannel_id);
                }
                ComponentKind::PacketData { component_id } => {
                    component.component_id = Some(component_id);
                }
                ComponentKind::Reserved => {}
            }
        }
    }

    fn apply_fig1(&mut self, fig: Fig1) {
        if fig.other_ensemble {
            log::trace!("fig 1: other ensemble");
            return;
        }
        let Fig1Body::Label {
            target,
            chars,
            character_flag,
        } = fig.body
        else {
            log::trace!("fig 1: unsupported {:?}", fig.body);
            return;
        };

        match target {
            LabelTarget::Ensemble(id) => {
                let ensemble = self.registry.ensemble_mut();
                if ensemble.id != Some(id) {
                    log::trace!("fig 1/0: label for other ensemble {}", id);
                    return;
                }
                if ensemble.label.set_short(&chars, fig.charset, character_flag) {
                    log::debug!("fig 1/0: ensemble label {:?}", ensemble.label.short_text());
                    self.events.push(Event::EnsembleLabel(ensemble.label.clone()));
                }
            }
            LabelTarget::Service(id) | LabelTarget::DataService(id) => {
                let Some(service) = self.registry.service_mut(id) else {
                    return;
                };
                if service.label.set_short(&chars, fig.charset, character_flag) {
                    log::debug!("fig 1: service {} label {:?}", id, service.label.short_text());
                    self.events.push(Event::ServiceLabel(id, service.label.clone()));
                }
            }
            LabelTarget::Component { service_id, scids } => {
                if let Some(component) = self.registry.component_by_scids_mut(service_id, scids) {
                    component.label.set_short(&chars, fig.charset, character_flag);
                }
            }
            LabelTarget::Region(id) => {
                log::debug!("fig 1/3: region {} label {:02X?}", id, chars);
            }
            LabelTarget::XPadApplication {
                service_id,
                scids,
                app_type,
            } => {
                log::debug!(
                    "fig 1/6: service {} SCIdS={} X-PAD application {} label {:02X?}",
                    service_id,
                    scids,
                    app_type,
                    chars
                );
            }
        }
    }

    fn apply_fig2(&mut self, fig: Fig2) {
        let Fig2::Label { target, segment } = fig else {
            log::trace!("fig 2: unsupported {:?}", fig);
            return;
        };

        match target {
            LabelTarget::Ensemble(id) => {
                let ensemble = self.registry.ensemble_mut();
                if ensemble.id != Some(id) {
                    return;
                }
                if ensemble.label.extended_mut().push(&segment) {
                    self.events.push(Event::EnsembleLabel(ensemble.label.clone()));
                }
            }
            LabelTarget::Service(id) | LabelTarget::DataService(id) => {
                let Some(service) = self.registry.service_mut(id) else {
                    return;
                };
                if service.label.extended_mut().push(&segment) {
                    self.events.push(Event::ServiceLabel(id, service.label.clone()));
                }
            }
            LabelTarget::Component { service_id, scids } => {
                if let Some(component) = self.registry.component_by_scids_mut(service_id, scids) {
                    component.label.extended_mut().push(&segment);
                }
            }
            LabelTarget::Region(_) | LabelTarget::XPadApplication { .. } => {}
        }
    }
}
