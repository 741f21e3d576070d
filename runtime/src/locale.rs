//! Localized fixed messages.
//!
//! Only two locales ship with the service; any other code falls back to English.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Hi,
}

impl Locale {
    /// Resolve a language code such as `hi`, `HI` or `hi-IN`.
    pub fn from_code(code: &str) -> Self {
        let primary = code.trim().split(['-', '_']).next().unwrap_or_default();
        if primary.eq_ignore_ascii_case("hi") {
            Locale::Hi
        } else {
            Locale::En
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Hi => "hi",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    ScopeViolation,
    ProcessingError,
    MissingFields,
}

impl Message {
    pub fn render(self, locale: Locale, subject: &str) -> String {
        match (self, locale) {
            (Message::ScopeViolation, Locale::En) => format!(
                "I'm sorry, but your question is outside the current subject scope. Please change the subject or ask a question related to {subject}."
            ),
            (Message::ScopeViolation, Locale::Hi) => {
                "क्षमा करें, आपका प्रश्न वर्तमान विषय से संबंधित नहीं है। कृपया विषय या प्रश्न बदलें।"
                    .to_string()
            }
            (Message::ProcessingError, Locale::En) => {
                "An error occurred while processing your request. Please try again.".to_string()
            }
            (Message::ProcessingError, Locale::Hi) => {
                "आपके अनुरोध को संसाधित करते समय एक त्रुटि हुई। कृपया पुनः प्रयास करें।".to_string()
            }
            (Message::MissingFields, Locale::En) => {
                "Please fill in all required fields.".to_string()
            }
            (Message::MissingFields, Locale::Hi) => "कृपया सभी आवश्यक फ़ील्ड भरें।".to_string(),
        }
    }
}
