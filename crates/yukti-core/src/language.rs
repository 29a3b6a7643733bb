/// A translation target offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub name: &'static str,
    pub code: &'static str,
}

impl Language {
    #[must_use]
    pub fn is_english(self) -> bool {
        self.code == "en"
    }

    /// Finds a language by display name or code, case-insensitive.
    #[must_use]
    pub fn lookup(query: &str) -> Option<Language> {
        let query = query.trim();
        LANGUAGES
            .iter()
            .copied()
            .find(|l| l.code.eq_ignore_ascii_case(query) || l.name.eq_ignore_ascii_case(query))
    }
}

pub const LANGUAGES: &[Language] = &[
    Language { name: "English", code: "en" },
    Language { name: "Telugu", code: "te" },
    Language { name: "Kannada", code: "kn" },
    Language { name: "Tamil", code: "ta" },
    Language { name: "Malayalam", code: "ml" },
    Language { name: "Marathi", code: "mr" },
    Language { name: "Spanish", code: "es" },
    Language { name: "Russian", code: "ru" },
    Language { name: "Japanese", code: "ja" },
    Language { name: "Korean", code: "ko" },
    Language { name: "Chinese (Simplified)", code: "zh" },
    Language { name: "Hindi", code: "hi" },
    Language { name: "Arabic", code: "ar" },
];
