//! DAB（ETSI EN 300 401）のFIC（Fast Information Channel）を読み込むためのクレート。
//!
//! CRC検査済みのFIBを[`FicDecoder`]に与えると、含まれるFIGを解析して
//! アンサンブル・サービス・サービスコンポーネント・サブチャンネルの情報を蓄積する。

#![deny(missing_docs)]

pub mod bit;
pub mod decoder;
pub mod fig;
pub mod label;
pub mod protection;
pub mod registry;
pub mod time;
pub mod types;
mod utils;

pub use decoder::{FicDecoder, MotHandler, Notifier};
pub use label::Label;
pub use registry::{GateConfig, Registry, Service, ServiceComponent, Subchannel};
pub use types::{EnsembleId, ServiceId, SubchannelId};
