//! Generation prompt built from a song order

use serde::Serialize;
use std::fmt;

use crate::types::SongRequest;

/// Language used when the order does not name one
const DEFAULT_LANGUAGE: &str = "Hungarian";

/// Prompt handed to a song composer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongPrompt {
    pub title: String,
    pub style: String,
    pub vocal: String,
    pub language: String,
    pub text: String,
}

impl SongPrompt {
    pub fn from_request(req: &SongRequest) -> Self {
        let language = if req.language.trim().is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            req.language.trim().to_string()
        };

        let text = format!(
            "Write a {style} style song in {language} about the following topic: {brief}\n\
             Structure: 3 verses and 2 choruses. Do not use foreign or meaningless words. \
             The title of the song should be: {title}",
            style = req.styles,
            language = language,
            brief = req.brief,
            title = req.title,
        );

        Self {
            title: req.title.clone(),
            style: req.styles.clone(),
            vocal: req.vocal.clone(),
            language,
            text,
        }
    }
}

impl fmt::Display for SongPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_order_fields() {
        let req = SongRequest {
            title: "Summer Nights".into(),
            styles: "synthwave".into(),
            language: "English".into(),
            brief: "driving along the coast".into(),
            ..Default::default()
        };
        let prompt = SongPrompt::from_request(&req);

        assert!(prompt.text.contains("synthwave style"));
        assert!(prompt.text.contains("in English"));
        assert!(prompt.text.contains("driving along the coast"));
        assert!(prompt.text.ends_with("Summer Nights"));
        assert!(prompt.text.contains("3 verses and 2 choruses"));
    }

    #[test]
    fn test_prompt_default_language() {
        let prompt = SongPrompt::from_request(&SongRequest::default());
        assert_eq!(prompt.language, "Hungarian");
        assert!(prompt.to_string().contains("in Hungarian"));
    }
}
