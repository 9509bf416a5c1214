//! FIG 1の短いラベルとFIG 2の拡張ラベル。

use arrayvec::ArrayVec;
use smallvec::SmallVec;

use crate::fig::fig2::LabelSegment;

/// FIG 1で示される文字集合。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    /// EBU Latinに基づく文字集合。
    #[default]
    EbuLatin,
    /// UCS-2（ビッグエンディアン）。
    Ucs2,
    /// UTF-8。
    Utf8,
    /// その他の文字集合。
    Other(u8),
}

impl From<u8> for Charset {
    fn from(value: u8) -> Charset {
        match value & 0x0F {
            0b0000 => Charset::EbuLatin,
            0b0110 => Charset::Ucs2,
            0b1111 => Charset::Utf8,
            v => Charset::Other(v),
        }
    }
}

/// FIG 2の拡張ラベルで使われる符号化方式。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// UTF-8。
    #[default]
    Utf8,
    /// UCS-2（ビッグエンディアン）。
    Ucs2,
}

impl Encoding {
    /// `bytes`をこの符号化方式で文字列に変換する。
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => decode_with(Charset::Utf8, bytes),
            Encoding::Ucs2 => decode_with(Charset::Ucs2, bytes),
        }
    }
}

/// EBU Latin文字集合の0x80～0xFF。
#[rustfmt::skip]
const EBU_LATIN_HIGH: [char; 128] = [
    'á', 'à', 'é', 'è', 'í', 'ì', 'ó', 'ò', 'ú', 'ù', 'Ñ', 'Ç', 'Ş', 'ß', '¡', 'Ĳ',
    'â', 'ä', 'ê', 'ë', 'î', 'ï', 'ô', 'ö', 'û', 'ü', 'ñ', 'ç', 'ş', 'ğ', 'ı', 'ĳ',
    'ª', 'α', '©', '‰', 'Ğ', 'ě', 'ň', 'ő', 'π', '€', '£', '$', '←', '↑', '→', '↓',
    'º', '¹', '²', '³', '±', 'İ', 'ń', 'ű', 'µ', '¿', '÷', '°', '¼', '½', '¾', '§',
    'Á', 'À', 'É', 'È', 'Í', 'Ì', 'Ó', 'Ò', 'Ú', 'Ù', 'Ř', 'Č', 'Š', 'Ž', 'Ð', 'Ŀ',
    'Â', 'Ä', 'Ê', 'Ë', 'Î', 'Ï', 'Ô', 'Ö', 'Û', 'Ü', 'ř', 'č', 'š', 'ž', 'đ', 'ŀ',
    'Ã', 'Å', 'Æ', 'Œ', 'ŷ', 'Ý', 'Õ', 'Ø', 'Þ', 'Ŋ', 'Ŕ', 'Ć', 'Ś', 'Ź', 'Ŧ', 'ð',
    'ã', 'å', 'æ', 'œ', 'ŵ', 'ý', 'õ', 'ø', 'þ', 'ŋ', 'ŕ', 'ć', 'ś', 'ź', 'ŧ', ' ',
];

fn ebu_latin_char(b: u8) -> char {
    match b {
        0x20..=0x7E => b as char,
        0x80..=0xFF => EBU_LATIN_HIGH[(b - 0x80) as usize],
        _ => ' ',
    }
}

/// `bytes`を`charset`に従って文字列に変換する。
///
/// NUL以降は無視し、末尾の空白は取り除く。
fn decode_with(charset: Charset, bytes: &[u8]) -> String {
    let s = match charset {
        Charset::Ucs2 => {
            let units = bytes
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .take_while(|&u| u != 0);
            char::decode_utf16(units)
                .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect::<String>()
        }
        Charset::Utf8 => {
            let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
            String::from_utf8_lossy(&bytes[..end]).into_owned()
        }
        Charset::EbuLatin | Charset::Other(_) => {
            let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
            bytes[..end].iter().copied().map(ebu_latin_char).collect()
        }
    };

    let trimmed = s.trim_end().len();
    let mut s = s;
    s.truncate(trimmed);
    s
}

/// FIG 2により分割して送出される拡張ラベル。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtendedLabel {
    toggle: Option<bool>,
    segment_count: Option<u8>,
    encoding: Encoding,
    character_flag: Option<u16>,
    segments: [Option<SmallVec<[u8; 16]>>; 8],
}

impl ExtendedLabel {
    /// 最後に受信したトグルフラグ。
    #[inline]
    pub fn toggle(&self) -> Option<bool> {
        self.toggle
    }

    /// セグメント0で示されたセグメント数。
    #[inline]
    pub fn segment_count(&self) -> Option<u8> {
        self.segment_count
    }

    /// 符号化方式。
    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// セグメント0で示された文字フラグ。
    #[inline]
    pub fn character_flag(&self) -> Option<u16> {
        self.character_flag
    }

    /// `index`番目のセグメントを返す。
    #[inline]
    pub fn segment(&self, index: u8) -> Option<&[u8]> {
        self.segments.get(index as usize)?.as_deref()
    }

    /// 全てのセグメントを受信済みであれば`true`を返す。
    pub fn is_complete(&self) -> bool {
        match self.segment_count {
            Some(count) => self.segments[..count as usize].iter().all(Option::is_some),
            None => false,
        }
    }

    /// 全セグメントを連結したバイト列を返す。
    ///
    /// 未受信のセグメントがある場合は`None`を返す。
    pub fn assemble(&self) -> Option<Vec<u8>> {
        if !self.is_complete() {
            return None;
        }

        let count = self.segment_count? as usize;
        let mut bytes = Vec::with_capacity(count * 16);
        for segment in self.segments[..count].iter().flatten() {
            bytes.extend_from_slice(segment);
        }
        Some(bytes)
    }

    /// 全セグメントを連結して文字列に変換する。
    pub fn text(&self) -> Option<String> {
        self.assemble().map(|bytes| self.encoding.decode(&bytes))
    }

    /// セグメントを取り込む。
    ///
    /// トグルフラグが変化した場合は受信済みのセグメントを破棄する。
    /// このセグメントによってラベルが揃った場合に`true`を返す。
    pub fn push(&mut self, segment: &LabelSegment) -> bool {
        if self.toggle != Some(segment.toggle) {
            *self = ExtendedLabel {
                toggle: Some(segment.toggle),
                ..Default::default()
            };
        }
        let was_complete = self.is_complete();

        if let Some(header) = &segment.header {
            self.segment_count = Some(header.segment_count);
            self.encoding = header.encoding;
            self.character_flag = header.character_flag;
        }
        let Some(slot) = self.segments.get_mut(segment.index as usize) else {
            return false;
        };
        *slot = Some(SmallVec::from_slice(segment.chars));

        !was_complete && self.is_complete()
    }
}

/// アンサンブル・サービス・サービスコンポーネントのラベル。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Label {
    chars: ArrayVec<u8, 16>,
    charset: Charset,
    character_flag: u16,
    extended: ExtendedLabel,
}

impl Label {
    /// FIG 1の16バイトの文字フィールドと文字フラグを設定する。
    ///
    /// 内容が変化した場合に`true`を返す。
    pub fn set_short(&mut self, chars: &[u8; 16], charset: Charset, character_flag: u16) -> bool {
        let changed = self.chars.as_slice() != chars
            || self.charset != charset
            || self.character_flag != character_flag;

        self.chars = ArrayVec::from(*chars);
        self.charset = charset;
        self.character_flag = character_flag;
        changed
    }

    /// 短いラベルを受信していなければ`true`を返す。
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// 短いラベルの生のバイト列。
    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.chars
    }

    /// 短いラベルの文字集合。
    #[inline]
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// 文字フラグ。最上位ビットが先頭の文字に対応する。
    #[inline]
    pub fn character_flag(&self) -> u16 {
        self.character_flag
    }

    /// 拡張ラベル。
    #[inline]
    pub fn extended(&self) -> &ExtendedLabel {
        &self.extended
    }

    #[inline]
    pub(crate) fn extended_mut(&mut self) -> &mut ExtendedLabel {
        &mut self.extended
    }

    /// 短いラベルを文字列に変換する。
    pub fn short_text(&self) -> String {
        decode_with(self.charset, &self.chars)
    }

    /// 文字フラグで選ばれた文字からなる省略ラベルを返す。
    pub fn abbreviation(&self) -> String {
        let chars = self
            .chars
            .iter()
            .enumerate()
            .filter(|&(i, _)| self.character_flag & (0x8000 >> i) != 0)
            .map(|(_, &c)| c)
            .collect::<ArrayVec<u8, 16>>();
        decode_with(self.charset, &chars)
    }

    /// 拡張ラベルが揃っていればそれを、そうでなければ短いラベルを文字列として返す。
    pub fn text(&self) -> String {
        self.extended.text().unwrap_or_else(|| self.short_text())
    }
}
