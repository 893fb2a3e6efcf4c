//! Math markup as delivered by the worksheet, plus its fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ts_rs::TS;
use unicode_normalization::UnicodeNormalization;

/// LaTeX and/or MathML for one equation, with an optional pre-rendered
/// spoken string. Blank fields are stored as `None`; text is NFC-normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MathContent {
    #[serde(default)]
    latex: Option<String>,
    #[serde(default)]
    mathml: Option<String>,
    #[serde(default)]
    display_type: Option<String>,
    #[serde(default)]
    spoken_fallback: Option<String>,
}

impl MathContent {
    pub fn new(
        latex: Option<&str>,
        mathml: Option<&str>,
        display_type: Option<&str>,
        spoken_fallback: Option<&str>,
    ) -> Self {
        Self {
            latex: clean_field(latex),
            mathml: clean_field(mathml),
            display_type: clean_field(display_type),
            spoken_fallback: clean_field(spoken_fallback),
        }
    }

    pub fn with_latex(mut self, latex: &str) -> Self {
        self.latex = clean_field(Some(latex));
        self
    }

    pub fn with_mathml(mut self, mathml: &str) -> Self {
        self.mathml = clean_field(Some(mathml));
        self
    }

    pub fn with_display_type(mut self, display_type: &str) -> Self {
        self.display_type = clean_field(Some(display_type));
        self
    }

    pub fn with_spoken_fallback(mut self, spoken: &str) -> Self {
        self.spoken_fallback = clean_field(Some(spoken));
        self
    }

    pub fn latex(&self) -> Option<&str> {
        self.latex.as_deref()
    }

    pub fn mathml(&self) -> Option<&str> {
        self.mathml.as_deref()
    }

    pub fn display_type(&self) -> Option<&str> {
        self.display_type.as_deref()
    }

    pub fn spoken_fallback(&self) -> Option<&str> {
        self.spoken_fallback.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.latex.is_none() && self.mathml.is_none() && self.spoken_fallback.is_none()
    }

    /// SHA-256 over every field; equal fingerprints mean derived state can be reused.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for field in [
            &self.latex,
            &self.mathml,
            &self.display_type,
            &self.spoken_fallback,
        ] {
            match field {
                Some(value) => {
                    hasher.update([1u8]);
                    hasher.update(value.as_bytes());
                }
                None => hasher.update([0u8]),
            }
            hasher.update([0xffu8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

fn clean_field(value: Option<&str>) -> Option<String> {
    let value = value?;
    if value.trim().is_empty() {
        return None;
    }
    Some(value.nfc().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_become_none() {
        let content = MathContent::new(Some("  "), Some(""), None, Some("x"));
        assert_eq!(content.latex(), None);
        assert_eq!(content.mathml(), None);
        assert_eq!(content.spoken_fallback(), Some("x"));
    }

    #[test]
    fn text_is_nfc_normalized() {
        let decomposed = "e\u{0301}";
        let content = MathContent::default().with_spoken_fallback(decomposed);
        assert_eq!(content.spoken_fallback(), Some("\u{00e9}"));
    }

    #[test]
    fn fingerprint_distinguishes_fields() {
        let latex = MathContent::default().with_latex("x");
        let spoken = MathContent::default().with_spoken_fallback("x");
        assert_ne!(latex.fingerprint(), spoken.fingerprint());
        assert_eq!(latex.fingerprint(), MathContent::default().with_latex("x").fingerprint());
    }
}
