use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// The transcription engine accepts ISO 639-1 (2-letter) codes; config
/// validation goes through here so a typo fails before any audio work runs.
/// Validate an ISO 639-1 or ISO 639-3 language code
pub fn validate_language_code(code: &str) -> Result<Language> {
    let normalized_code = code.trim().to_lowercase();

    let language = match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => Language::from_639_3(&normalized_code),
        _ => None,
    };

    language.ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 when one exists
///
/// Whisper expects 2-letter codes; 3-letter input is converted where the
/// language has a 639-1 assignment.
pub fn normalize_to_part1(code: &str) -> Result<String> {
    let language = validate_language_code(code)?;
    language
        .to_639_1()
        .map(|c| c.to_string())
        .ok_or_else(|| anyhow!("Language {} has no ISO 639-1 code", language.to_name()))
}

/// Get the English name for a language code
pub fn get_language_name(code: &str) -> Result<String> {
    let language = validate_language_code(code)?;
    Ok(language.to_name().to_string())
}

/// Check if two language codes refer to the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (validate_language_code(code1), validate_language_code(code2)) {
        (Ok(lang1), Ok(lang2)) => lang1 == lang2,
        _ => false,
    }
}
