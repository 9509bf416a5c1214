//! DABにおける日付時刻。

use std::fmt::{self, Write};

fn write_hundreds<W: Write>(w: &mut W, n: u8) -> fmt::Result {
    let h = b'0' + n / 10;
    let l = b'0' + n % 10;
    w.write_char(h as char)?;
    w.write_char(l as char)
}

/// 修正ユリウス日から求めたグレゴリオ暦の日付。
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    /// 年（西暦）。
    pub year: u16,
    /// 月（1月＝1、12月＝12）。
    pub month: u8,
    /// 日（1～31）。
    pub day: u8,
}

impl Date {
    /// 修正ユリウス日`mjd`を整数演算のみでグレゴリオ暦に変換する。
    pub fn from_mjd(mjd: u32) -> Date {
        // Fliegel & Van Flandernの算法
        let mut j = mjd as i64 + 2_400_001 + 68_569;
        let c = 4 * j / 146_097;
        j -= (146_097 * c + 3) / 4;
        let y = 4000 * (j + 1) / 1_461_001;
        j = j - 1461 * y / 4 + 31;
        let m = 80 * j / 2447;
        let day = j - 2447 * m / 80;
        j = m / 11;
        let month = m + 2 - 12 * j;
        let year = 100 * (c - 49) + y + j;

        Date {
            year: year as u16,
            month: month as u8,
            day: day as u8,
        }
    }

    /// 曜日（月曜日＝1、日曜日＝7）を`mjd`から求める。
    #[inline]
    pub fn day_of_week(mjd: u32) -> u8 {
        ((mjd + 2) % 7 + 1) as u8
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.year.fmt(f)?;

        f.write_char('-')?;
        write_hundreds(f, self.month)?;

        f.write_char('-')?;
        write_hundreds(f, self.day)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// FIG 0/9で送出される地方時の時差（LTO）。
///
/// 30分単位の符号付きの値を保持する。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalTimeOffset(i8);

impl LocalTimeOffset {
    /// 6ビットのLTOフィールド（符号1ビット＋30分単位の値5ビット）から生成する。
    #[inline]
    pub fn from_bits(bits: u8) -> LocalTimeOffset {
        let half_hours = (bits & 0x1F) as i8;
        if bits & 0x20 != 0 {
            LocalTimeOffset(-half_hours)
        } else {
            LocalTimeOffset(half_hours)
        }
    }

    /// 30分単位の時差を返す。
    #[inline]
    pub fn half_hours(self) -> i8 {
        self.0
    }

    /// 分単位の時差を返す。
    #[inline]
    pub fn minutes(self) -> i32 {
        self.0 as i32 * 30
    }

    /// 時差の時の部分を符号付きで返す。
    #[inline]
    pub fn hours(self) -> i8 {
        self.0 / 2
    }
}

impl fmt::Display for LocalTimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        let abs = self.0.unsigned_abs();
        f.write_char(sign)?;
        write_hundreds(f, abs / 2)?;
        f.write_char(':')?;
        write_hundreds(f, (abs % 2) * 30)
    }
}

/// FIG 0/10で送出される協定世界時と、FIG 0/9の時差からなる日付時刻。
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTime {
    /// 修正ユリウス日。
    pub mjd: u32,
    /// 時（0～23）。
    pub hour: u8,
    /// 分（0～59）。
    pub minute: u8,
    /// 秒（0～59）。短形式の場合は0。
    pub second: u8,
    /// ミリ秒（0～999）。短形式の場合は0。
    pub millisecond: u16,
    /// 地方時の時差。
    pub offset: LocalTimeOffset,
}

impl DateTime {
    /// UTCにおける日付を返す。
    #[inline]
    pub fn date(&self) -> Date {
        Date::from_mjd(self.mjd)
    }

    /// 時差を適用した地方時の日付時刻を返す。
    ///
    /// 戻り値の`hour`・`minute`等は地方時を表す。
    pub fn local(&self) -> DateTime {
        let minutes = self.hour as i32 * 60 + self.minute as i32 + self.offset.minutes();
        let (mjd, minutes) = if minutes < 0 {
            (self.mjd.saturating_sub(1), minutes + 24 * 60)
        } else if minutes >= 24 * 60 {
            (self.mjd + 1, minutes - 24 * 60)
        } else {
            (self.mjd, minutes)
        };

        DateTime {
            mjd,
            hour: (minutes / 60) as u8,
            minute: (minutes % 60) as u8,
            ..*self
        }
    }
}

impl fmt::Debug for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.date().fmt(f)?;
        f.write_char(' ')?;

        write_hundreds(f, self.hour)?;
        f.write_char(':')?;
        write_hundreds(f, self.minute)?;
        f.write_char(':')?;
        write_hundreds(f, self.second)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_mjd() {
        let date = Date::from_mjd(58849);
        assert_eq!(date.year, 2020);
        assert_eq!(date.month, 1);
        assert_eq!(date.day, 1);
        assert_eq!(date.to_string(), "2020-01-01");
        // 2020-01-01は水曜日
        assert_eq!(Date::day_of_week(58849), 3);

        // MJD 45218は1982-09-06
        assert_eq!(Date::from_mjd(45218).to_string(), "1982-09-06");
        // うるう日
        assert_eq!(Date::from_mjd(58908).to_string(), "2020-02-29");
    }

    #[test]
    fn test_date_against_chrono() {
        let epoch = chrono::NaiveDate::from_ymd_opt(1858, 11, 17).unwrap();
        for mjd in (40000..80000).step_by(97) {
            let expected = epoch + chrono::Duration::days(mjd as i64);
            let date = Date::from_mjd(mjd);
            assert_eq!(
                date.to_string(),
                expected.format("%Y-%m-%d").to_string(),
                "MJD {}",
                mjd
            );
        }
    }

    #[test]
    fn test_local_time_offset() {
        let lto = LocalTimeOffset::from_bits(0b00_0010);
        assert_eq!(lto.minutes(), 60);
        assert_eq!(lto.to_string(), "+01:00");

        let lto = LocalTimeOffset::from_bits(0b10_0111);
        assert_eq!(lto.half_hours(), -7);
        assert_eq!(lto.hours(), -3);
        assert_eq!(lto.to_string(), "-03:30");
    }

    #[test]
    fn test_local_date_time() {
        let dt = DateTime {
            mjd: 58849,
            hour: 23,
            minute: 30,
            second: 15,
            millisecond: 0,
            offset: LocalTimeOffset::from_bits(0b00_0010),
        };
        assert_eq!(dt.to_string(), "2020-01-01 23:30:15");
        assert_eq!(dt.local().to_string(), "2020-01-02 00:30:15");

        let dt = DateTime {
            hour: 0,
            minute: 10,
            offset: LocalTimeOffset::from_bits(0b10_0001),
            ..dt
        };
        assert_eq!(dt.local().to_string(), "2019-12-31 23:40:15");
    }
}
