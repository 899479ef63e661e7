// File: src/charset.rs
// Purpose: Character sets for the character-class rules

pub const DIGITS: &str = "0123456789";
pub const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const HIRAGANA: &str = concat!(
    "あいうえお",
    "かきくけこがぎぐげご",
    "さしすせそざじずぜぞ",
    "たちつてとだぢづでど",
    "なにぬねの",
    "はひふへほばびぶべぼぱぴぷぺぽ",
    "まみむめも",
    "やゆよ",
    "らりるれろ",
    "わをん",
);

pub const KATAKANA: &str = concat!(
    "アイウエオ",
    "カキクケコガギグゲゴ",
    "サシスセソザジズゼゾ",
    "タチツテトダヂヅデド",
    "ナニヌネノ",
    "ハヒフヘホバビブベボパピプペポ",
    "マミムメモ",
    "ヤユヨ",
    "ラリルレロ",
    "ワヲン",
);

/// Membership test used by [`character_exists`].
pub trait CharacterSet {
    fn contains_char(&self, c: char) -> bool;
}

impl CharacterSet for str {
    fn contains_char(&self, c: char) -> bool {
        self.contains(c)
    }
}

impl CharacterSet for String {
    fn contains_char(&self, c: char) -> bool {
        self.contains(c)
    }
}

/// A fixed base set, optionally extended with caller-supplied characters.
#[derive(Debug, Clone, Copy)]
pub struct CharClass<'a> {
    base: &'static [&'static str],
    extra: Option<&'a str>,
}

impl<'a> CharClass<'a> {
    pub const fn new(base: &'static [&'static str]) -> Self {
        Self { base, extra: None }
    }

    pub fn with_extra(mut self, extra: Option<&'a str>) -> Self {
        self.extra = extra;
        self
    }
}

impl CharacterSet for CharClass<'_> {
    fn contains_char(&self, c: char) -> bool {
        self.base.iter().any(|part| part.contains(c))
            || self.extra.is_some_and(|extra| extra.contains(c))
    }
}

/// True when every character of `value` is in `set`. Stops at the first
/// character that is not.
pub fn character_exists<S: CharacterSet + ?Sized>(value: &str, set: &S) -> bool {
    value.chars().all(|c| set.contains_char(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSet<'a> {
        allowed: &'a str,
        probes: Cell<usize>,
    }

    impl CharacterSet for CountingSet<'_> {
        fn contains_char(&self, c: char) -> bool {
            self.probes.set(self.probes.get() + 1);
            self.allowed.contains(c)
        }
    }

    #[test]
    fn test_character_exists() {
        assert!(character_exists("abc", "abcdef"));
        assert!(!character_exists("abz", "abcdef"));
        assert!(character_exists("", "abc"));
    }

    #[test]
    fn test_stops_at_first_missing_character() {
        let set = CountingSet {
            allowed: "abc",
            probes: Cell::new(0),
        };
        assert!(!character_exists("abXcab", &set));
        assert_eq!(set.probes.get(), 3);
    }

    #[test]
    fn test_char_class_with_extra() {
        let class = CharClass::new(&[DIGITS]);
        assert!(character_exists("0123", &class));
        assert!(!character_exists("12-34", &class));
        assert!(character_exists("12-34", &class.with_extra(Some("-"))));
    }

    #[test]
    fn test_kana_sets() {
        assert!(character_exists("さくら", HIRAGANA));
        assert!(character_exists("ぞうさん", HIRAGANA));
        assert!(!character_exists("サクラ", HIRAGANA));
        assert!(character_exists("サクラ", KATAKANA));
        assert!(character_exists("ドア", KATAKANA));
    }
}
