//! Language registry: single source of truth for supported language codes.
//!
//! The registry backs `/language` argument validation and the
//! "Translated from X" headers on relayed messages. It covers the
//! ISO 639-1 codes the translation provider accepts. Uses a singleton
//! with `OnceLock` for thread-safe initialization.

use std::sync::OnceLock;

/// Metadata for a single supported language.
#[derive(Debug, Clone)]
pub struct LanguageInfo {
    /// ISO 639-1 language code (e.g., "en", "es", "fr")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Spanish")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "Español")
    pub native_name: &'static str,
}

/// Global language registry.
pub struct LanguageRegistry {
    languages: &'static [LanguageInfo],
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global registry instance (initialized on first call).
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: LANGUAGES,
        })
    }

    /// Look up a language by its ISO 639-1 code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageInfo> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Check whether a code names a supported language.
    pub fn is_valid(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// English display name for a code. Unknown codes echo back unchanged,
    /// so callers always have something printable.
    pub fn display_name<'a>(&self, code: &'a str) -> &'a str {
        match self.get_by_code(code) {
            Some(lang) => lang.name,
            None => code,
        }
    }

    /// All supported languages.
    pub fn list_all(&self) -> &'static [LanguageInfo] {
        self.languages
    }
}

macro_rules! lang {
    ($code:literal, $name:literal, $native:literal) => {
        LanguageInfo {
            code: $code,
            name: $name,
            native_name: $native,
        }
    };
}

/// The ISO 639-1 codes accepted by the translation provider.
static LANGUAGES: &[LanguageInfo] = &[
    lang!("af", "Afrikaans", "Afrikaans"),
    lang!("am", "Amharic", "አማርኛ"),
    lang!("ar", "Arabic", "العربية"),
    lang!("az", "Azerbaijani", "Azərbaycanca"),
    lang!("be", "Belarusian", "Беларуская"),
    lang!("bg", "Bulgarian", "Български"),
    lang!("bn", "Bengali", "বাংলা"),
    lang!("bs", "Bosnian", "Bosanski"),
    lang!("ca", "Catalan", "Català"),
    lang!("co", "Corsican", "Corsu"),
    lang!("cs", "Czech", "Čeština"),
    lang!("cy", "Welsh", "Cymraeg"),
    lang!("da", "Danish", "Dansk"),
    lang!("de", "German", "Deutsch"),
    lang!("el", "Greek", "Ελληνικά"),
    lang!("en", "English", "English"),
    lang!("eo", "Esperanto", "Esperanto"),
    lang!("es", "Spanish", "Español"),
    lang!("et", "Estonian", "Eesti"),
    lang!("eu", "Basque", "Euskara"),
    lang!("fa", "Persian", "فارسی"),
    lang!("fi", "Finnish", "Suomi"),
    lang!("fr", "French", "Français"),
    lang!("fy", "Frisian", "Frysk"),
    lang!("ga", "Irish", "Gaeilge"),
    lang!("gd", "Scots Gaelic", "Gàidhlig"),
    lang!("gl", "Galician", "Galego"),
    lang!("gu", "Gujarati", "ગુજરાતી"),
    lang!("ha", "Hausa", "Hausa"),
    lang!("he", "Hebrew", "עברית"),
    lang!("hi", "Hindi", "हिन्दी"),
    lang!("hr", "Croatian", "Hrvatski"),
    lang!("ht", "Haitian Creole", "Kreyòl Ayisyen"),
    lang!("hu", "Hungarian", "Magyar"),
    lang!("hy", "Armenian", "Հայերեն"),
    lang!("id", "Indonesian", "Bahasa Indonesia"),
    lang!("ig", "Igbo", "Igbo"),
    lang!("is", "Icelandic", "Íslenska"),
    lang!("it", "Italian", "Italiano"),
    lang!("ja", "Japanese", "日本語"),
    lang!("jv", "Javanese", "Basa Jawa"),
    lang!("ka", "Georgian", "ქართული"),
    lang!("kk", "Kazakh", "Қазақша"),
    lang!("km", "Khmer", "ខ្មែរ"),
    lang!("kn", "Kannada", "ಕನ್ನಡ"),
    lang!("ko", "Korean", "한국어"),
    lang!("ku", "Kurdish", "Kurdî"),
    lang!("ky", "Kyrgyz", "Кыргызча"),
    lang!("la", "Latin", "Latina"),
    lang!("lb", "Luxembourgish", "Lëtzebuergesch"),
    lang!("lo", "Lao", "ລາວ"),
    lang!("lt", "Lithuanian", "Lietuvių"),
    lang!("lv", "Latvian", "Latviešu"),
    lang!("mg", "Malagasy", "Malagasy"),
    lang!("mi", "Maori", "Māori"),
    lang!("mk", "Macedonian", "Македонски"),
    lang!("ml", "Malayalam", "മലയാളം"),
    lang!("mn", "Mongolian", "Монгол"),
    lang!("mr", "Marathi", "मराठी"),
    lang!("ms", "Malay", "Bahasa Melayu"),
    lang!("mt", "Maltese", "Malti"),
    lang!("my", "Myanmar (Burmese)", "မြန်မာစာ"),
    lang!("ne", "Nepali", "नेपाली"),
    lang!("nl", "Dutch", "Nederlands"),
    lang!("no", "Norwegian", "Norsk"),
    lang!("ny", "Chichewa", "Chichewa"),
    lang!("pa", "Punjabi", "ਪੰਜਾਬੀ"),
    lang!("pl", "Polish", "Polski"),
    lang!("ps", "Pashto", "پښتو"),
    lang!("pt", "Portuguese", "Português"),
    lang!("ro", "Romanian", "Română"),
    lang!("ru", "Russian", "Русский"),
    lang!("sd", "Sindhi", "سنڌي"),
    lang!("si", "Sinhala", "සිංහල"),
    lang!("sk", "Slovak", "Slovenčina"),
    lang!("sl", "Slovenian", "Slovenščina"),
    lang!("sm", "Samoan", "Gagana Samoa"),
    lang!("sn", "Shona", "ChiShona"),
    lang!("so", "Somali", "Soomaali"),
    lang!("sq", "Albanian", "Shqip"),
    lang!("sr", "Serbian", "Српски"),
    lang!("st", "Sesotho", "Sesotho"),
    lang!("su", "Sundanese", "Basa Sunda"),
    lang!("sv", "Swedish", "Svenska"),
    lang!("sw", "Swahili", "Kiswahili"),
    lang!("ta", "Tamil", "தமிழ்"),
    lang!("te", "Telugu", "తెలుగు"),
    lang!("tg", "Tajik", "Тоҷикӣ"),
    lang!("th", "Thai", "ไทย"),
    lang!("tl", "Filipino", "Filipino"),
    lang!("tr", "Turkish", "Türkçe"),
    lang!("uk", "Ukrainian", "Українська"),
    lang!("ur", "Urdu", "اردو"),
    lang!("uz", "Uzbek", "Oʻzbekcha"),
    lang!("vi", "Vietnamese", "Tiếng Việt"),
    lang!("xh", "Xhosa", "isiXhosa"),
    lang!("yi", "Yiddish", "ייִדיש"),
    lang!("yo", "Yoruba", "Yorùbá"),
    lang!("zh", "Chinese", "中文"),
    lang!("zu", "Zulu", "isiZulu"),
];
