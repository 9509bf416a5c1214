//! サブチャンネルの誤り保護。

use std::fmt;

/// UEP（不均一誤り保護）表の1項目。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UepEntry {
    /// サブチャンネルの大きさ（CU単位）。
    pub size: u16,
    /// ビットレート（kbit/s）。
    pub bitrate: u16,
    /// 保護レベル（1～5）。
    pub level: u8,
}

const fn uep(size: u16, bitrate: u16, level: u8) -> UepEntry {
    UepEntry {
        size,
        bitrate,
        level,
    }
}

/// EN 300 401 表8に基づくUEP表。
pub static UEP_TABLE: [UepEntry; 64] = [
    uep(16, 32, 5),
    uep(21, 32, 4),
    uep(24, 32, 3),
    uep(29, 32, 2),
    uep(35, 32, 1),
    uep(24, 48, 5),
    uep(29, 48, 4),
    uep(35, 48, 3),
    uep(42, 48, 2),
    uep(52, 48, 1),
    uep(29, 56, 5),
    uep(35, 56, 4),
    uep(42, 56, 3),
    uep(52, 56, 2),
    uep(32, 64, 5),
    uep(42, 64, 4),
    uep(48, 64, 3),
    uep(58, 64, 2),
    uep(70, 64, 1),
    uep(40, 80, 5),
    uep(52, 80, 4),
    uep(58, 80, 3),
    uep(70, 80, 2),
    uep(84, 80, 1),
    uep(48, 96, 5),
    uep(58, 96, 4),
    uep(70, 96, 3),
    uep(84, 96, 2),
    uep(104, 96, 1),
    uep(58, 112, 5),
    uep(70, 112, 4),
    uep(84, 112, 3),
    uep(104, 112, 2),
    uep(64, 128, 5),
    uep(84, 128, 4),
    uep(96, 128, 3),
    uep(116, 128, 2),
    uep(140, 128, 1),
    uep(80, 160, 5),
    uep(104, 160, 4),
    uep(116, 160, 3),
    uep(140, 160, 2),
    uep(168, 160, 1),
    uep(96, 192, 5),
    uep(116, 192, 4),
    uep(140, 192, 3),
    uep(168, 192, 2),
    uep(208, 192, 1),
    uep(116, 224, 5),
    uep(140, 224, 4),
    uep(168, 224, 3),
    uep(208, 224, 2),
    uep(232, 224, 1),
    uep(128, 256, 5),
    uep(168, 256, 4),
    uep(192, 256, 3),
    uep(232, 256, 2),
    uep(280, 256, 1),
    uep(160, 320, 5),
    uep(208, 320, 4),
    uep(280, 320, 2),
    uep(192, 384, 5),
    uep(280, 384, 3),
    uep(416, 384, 1),
];

/// EEP（均一誤り保護）のプロファイル。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EepProfile {
    /// 8n kbit/sのビットレートに対応するEEP-A。
    A,
    /// 32n kbit/sのビットレートに対応するEEP-B。
    B,
}

impl EepProfile {
    /// 保護レベルごとの1n kbit/sあたりのCU数。
    fn capacity_units_per_n(self) -> [u16; 4] {
        match self {
            EepProfile::A => [12, 8, 6, 4],
            EepProfile::B => [27, 21, 18, 15],
        }
    }

    fn bitrate_per_n(self) -> u16 {
        match self {
            EepProfile::A => 8,
            EepProfile::B => 32,
        }
    }
}

/// サブチャンネルの保護方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protection {
    /// UEP（FIG 0/1の短形式）。
    Uep {
        /// [`UEP_TABLE`]におけるインデックス（0～63）。
        table_index: u8,
    },
    /// EEP（FIG 0/1の長形式）。
    Eep {
        /// プロファイル。
        profile: EepProfile,
        /// 保護レベル（0～3で、それぞれ1～4を表す）。
        level: u8,
    },
}

impl Protection {
    /// UEP表の項目を返す。EEPの場合は`None`を返す。
    #[inline]
    pub fn uep_entry(&self) -> Option<&'static UepEntry> {
        match *self {
            Protection::Uep { table_index } => UEP_TABLE.get(table_index as usize),
            Protection::Eep { .. } => None,
        }
    }

    /// 大きさ`size`（CU単位）のサブチャンネルにおけるビットレート（kbit/s）を返す。
    pub fn bitrate(&self, size: u16) -> Option<u16> {
        match *self {
            Protection::Uep { .. } => self.uep_entry().map(|e| e.bitrate),
            Protection::Eep { profile, level } => {
                let k = *profile.capacity_units_per_n().get(level as usize)?;
                Some(size / k * profile.bitrate_per_n())
            }
        }
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Protection::Uep { table_index } => match UEP_TABLE.get(table_index as usize) {
                Some(entry) => write!(f, "UEP {}", entry.level),
                None => f.write_str("UEP ?"),
            },
            Protection::Eep { profile, level } => {
                let profile = match profile {
                    EepProfile::A => 'A',
                    EepProfile::B => 'B',
                };
                write!(f, "EEP {}-{}", level + 1, profile)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uep_table() {
        assert_eq!(UEP_TABLE[0], uep(16, 32, 5));
        assert_eq!(UEP_TABLE[33], uep(64, 128, 5));
        assert_eq!(UEP_TABLE[63], uep(416, 384, 1));
        assert!(UEP_TABLE.iter().all(|e| (1..=5).contains(&e.level)));
    }

    #[test]
    fn test_bitrate() {
        let uep = Protection::Uep { table_index: 33 };
        assert_eq!(uep.bitrate(64), Some(128));
        assert_eq!(uep.to_string(), "UEP 5");

        // EEP 3-A、72CUは96kbit/s
        let eep = Protection::Eep {
            profile: EepProfile::A,
            level: 2,
        };
        assert_eq!(eep.bitrate(72), Some(96));
        assert_eq!(eep.to_string(), "EEP 3-A");

        // EEP 1-B、54CUは64kbit/s
        let eep = Protection::Eep {
            profile: EepProfile::B,
            level: 0,
        };
        assert_eq!(eep.bitrate(54), Some(64));

        let eep = Protection::Eep {
            profile: EepProfile::B,
            level: 4,
        };
        assert_eq!(eep.bitrate(54), None);
    }
}
