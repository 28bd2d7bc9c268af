//! Fixed transcript literals, per locale.

use std::{fmt, str::FromStr};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    #[serde(alias = "th")]
    Thai,
    #[serde(alias = "en")]
    English,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "th" | "thai" => Ok(Self::Thai),
            "en" | "english" => Ok(Self::English),
            other => Err(format!("unsupported locale '{other}' (expected th or en)")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Thai => "th",
            Self::English => "en",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Phrasebook {
    locale: Locale,
}

impl Phrasebook {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Seeds a fresh transcript. Tells the user to type `start`.
    pub fn greeting(&self) -> &'static str {
        match self.locale {
            Locale::Thai => "สวัสดี! พิมพ์ start เพื่อเริ่มหาหนังที่ใช่สำหรับคุณ 🎬",
            Locale::English => "Hi! Type start to begin finding the right movie for you 🎬",
        }
    }

    pub fn chat_failed(&self) -> &'static str {
        match self.locale {
            Locale::Thai => "เกิดข้อผิดพลาด กรุณาลองใหม่อีกครั้ง",
            Locale::English => "Something went wrong, please try again",
        }
    }

    pub fn searching(&self) -> &'static str {
        match self.locale {
            Locale::Thai => "กำลังหาหนังให้... 🍿",
            Locale::English => "Finding movies for you... 🍿",
        }
    }

    pub fn found(&self, count: usize) -> String {
        match self.locale {
            Locale::Thai => format!("เจอแล้ว! นี่คือ {count} เรื่องที่น่าสนใจสำหรับคุณ 🎥"),
            Locale::English => format!("Found it! Here are {count} movies you might like 🎥"),
        }
    }

    pub fn recommend_fallback(&self) -> &'static str {
        match self.locale {
            Locale::Thai => "เกิดข้อผิดพลาด กรุณาตอบคำถามก่อน (พิมพ์ start)",
            Locale::English => "Something went wrong, please answer the questions first (type start)",
        }
    }

    pub fn resetting(&self) -> &'static str {
        match self.locale {
            Locale::Thai => "กำลังรีเซ็ต...",
            Locale::English => "Resetting...",
        }
    }

    pub fn reset_failed(&self) -> &'static str {
        match self.locale {
            Locale::Thai => "เกิดข้อผิดพลาด",
            Locale::English => "Something went wrong",
        }
    }

    pub fn timed_out(&self) -> &'static str {
        match self.locale {
            Locale::Thai => "ล้มเหลว: หมดเวลารอการตอบกลับ",
            Locale::English => "failed: timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_locale_codes_and_names() {
        assert_eq!("th".parse::<Locale>(), Ok(Locale::Thai));
        assert_eq!(" English ".parse::<Locale>(), Ok(Locale::English));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn found_message_interpolates_count() {
        assert!(Phrasebook::new(Locale::Thai).found(3).contains(" 3 "));
        assert!(Phrasebook::new(Locale::English).found(12).contains("12"));
    }

    #[test]
    fn fallback_hints_at_start_keyword() {
        for locale in [Locale::Thai, Locale::English] {
            let phrases = Phrasebook::new(locale);
            assert!(phrases.recommend_fallback().contains("start"));
            assert!(phrases.greeting().contains("start"));
        }
    }
}
