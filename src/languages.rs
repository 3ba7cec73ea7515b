//! Language lookup for the story site
//!
//! Story listings label their language links with a mix of English names,
//! native names and a few misspellings. Labels are lowercased, passed through
//! a small rewrite table and then matched against the known languages by name
//! or native name. Anything unrecognised falls back to English.

use tracing::warn;

/// A language the chef knows how to label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO 639 code
    pub code: &'static str,

    /// Name used for topics and snapshot keys
    pub name: &'static str,

    /// Name of the language in the language itself
    pub native_name: &'static str,
}

/// Fallback language for unrecognised labels
pub const ENGLISH: Language = Language {
    code: "en",
    name: "English",
    native_name: "English",
};

/// Every language published on the site
pub const LANGUAGES: &[Language] = &[
    ENGLISH,
    Language { code: "af", name: "Afrikaans", native_name: "Afrikaans" },
    Language { code: "nd", name: "North Ndebele", native_name: "isiNdebele" },
    Language { code: "nr", name: "South Ndebele", native_name: "isiNdebele seSewula" },
    Language { code: "nso", name: "Sepedi", native_name: "Sesotho sa Leboa" },
    Language { code: "st", name: "Sesotho", native_name: "Sesotho" },
    Language { code: "ss", name: "siSwati", native_name: "siSwati" },
    Language { code: "tn", name: "Setswana", native_name: "Setswana" },
    Language { code: "ts", name: "Xitsonga", native_name: "Xitsonga" },
    Language { code: "ve", name: "Tshivenda", native_name: "Tshivenḓa" },
    Language { code: "xh", name: "isiXhosa", native_name: "isiXhosa" },
    Language { code: "zu", name: "isiZulu", native_name: "isiZulu" },
];

/// Known label spellings that do not match a language name directly
const LABEL_REWRITES: &[(&str, &str)] = &[
    ("sotho", "Sesotho"),
    ("ndebele", "North Ndebele"),
    ("tsivenda", "Tshivenda"),
    ("venda", "Tshivenda"),
    ("tsonga", "Xitsonga"),
    ("tswana", "Setswana"),
    ("swati", "siSwati"),
    ("xhosa", "isiXhosa"),
    ("zulu", "isiZulu"),
    ("northern sotho", "Sepedi"),
];

/// Find a language by its name or native name, ignoring case
pub fn find(name: &str) -> Option<&'static Language> {
    let name = name.trim();
    LANGUAGES.iter().find(|language| {
        language.name.eq_ignore_ascii_case(name) || language.native_name.eq_ignore_ascii_case(name)
    })
}

fn rewrite(label: &str) -> String {
    let lowered = label.trim().to_lowercase();
    LABEL_REWRITES
        .iter()
        .find(|(from, _)| *from == lowered)
        .map(|(_, to)| to.to_string())
        .unwrap_or(lowered)
}

/// Resolve a raw link label to a language name, if it names a known language
pub fn resolve_label(label: &str) -> Option<&'static str> {
    find(&rewrite(label)).map(|language| language.name)
}

/// Normalise a raw link label to a language name.
///
/// Unrecognised labels resolve to English.
pub fn normalize_label(label: &str) -> &'static str {
    match resolve_label(label) {
        Some(name) => name,
        None => {
            warn!("Unrecognised language label {:?}, using English", label);
            ENGLISH.name
        }
    }
}

/// Resolve a language name (display or native form) to its code.
///
/// Unresolved names are logged and default to English's code.
pub fn code_for(name: &str) -> &'static str {
    match find(name).or_else(|| find(&rewrite(name))) {
        Some(language) => language.code,
        None => {
            warn!("No language code for {:?}, using {}", name, ENGLISH.code);
            ENGLISH.code
        }
    }
}
