use std::{collections::HashMap, fmt, str::FromStr};

use log::{info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

pub const SOURCE_LANGUAGE: &str = "zh-CN";
pub const TARGET_LANGUAGE: &str = "en";

pub trait Translator {
    fn name(&self) -> &str;
    fn translate(&self, text: &str, from: &str, to: &str) -> Result<String>;
}

/// What happened to one token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Translation {
    Translated(String),
    /// Starts with a Latin letter, treated as already English.
    Skipped,
    Failed(String),
}

impl Translation {
    /// The text shown next to the token; empty unless the service answered.
    pub fn text(&self) -> &str {
        match self {
            Translation::Translated(text) => text,
            Translation::Skipped | Translation::Failed(_) => "",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Google,
    MyMemory,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Backend::Google),
            "mymemory" => Ok(Backend::MyMemory),
            _ => Err(Error::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Google => write!(f, "google"),
            Backend::MyMemory => write!(f, "mymemory"),
        }
    }
}

#[derive(Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: MyMemoryData,
    #[serde(rename = "responseStatus", default)]
    response_status: Value,
    #[serde(rename = "responseDetails", default)]
    response_details: Value,
}

#[derive(Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// One blocking HTTPS request per call, no retries.
pub struct HttpTranslator {
    client: Client,
    backend: Backend,
    name: String,
}

impl HttpTranslator {
    pub fn new(backend: Backend) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpTranslator {
            client,
            backend,
            name: backend.to_string(),
        })
    }

    fn translate_google(&self, text: &str, from: &str, to: &str) -> Result<String> {
        let body: Value = self
            .client
            .get("https://translate.googleapis.com/translate_a/single")
            .query(&[
                ("client", "gtx"),
                ("sl", from),
                ("tl", to),
                ("dt", "t"),
                ("q", text),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        parse_google_response(&body)
    }

    fn translate_mymemory(&self, text: &str, from: &str, to: &str) -> Result<String> {
        let langpair = format!("{from}|{to}");
        let body: MyMemoryResponse = self
            .client
            .get("https://api.mymemory.translated.net/get")
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()?
            .error_for_status()?
            .json()?;

        parse_mymemory_response(body)
    }
}

impl Translator for HttpTranslator {
    fn name(&self) -> &str {
        &self.name
    }

    fn translate(&self, text: &str, from: &str, to: &str) -> Result<String> {
        match self.backend {
            Backend::Google => self.translate_google(text, from, to),
            Backend::MyMemory => self.translate_mymemory(text, from, to),
        }
    }
}

/// `[[["translated", "source", ...], ...], ...]`
fn parse_google_response(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Generic(format!("unexpected google response: {body}")))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(Error::Generic("google returned an empty translation".into()));
    }

    Ok(translated)
}

/// MyMemory answers HTTP 200 even for rejected requests and puts the real
/// status, as a number or a numeric string, in `responseStatus`. On rejection
/// `translatedText` holds the error message, so anything but 200 is an error.
fn parse_mymemory_response(body: MyMemoryResponse) -> Result<String> {
    let status = match &body.response_status {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    if status != Some(200) {
        return Err(Error::Generic(format!(
            "mymemory status {}: {}",
            body.response_status, body.response_details
        )));
    }

    Ok(body.response_data.translated_text)
}

/// Applies the per-token translation policy on top of a [`Translator`].
pub struct TranslationAdapter<T> {
    translator: T,
    from: String,
    to: String,
}

impl<T: Translator> TranslationAdapter<T> {
    pub fn new(translator: T) -> Self {
        TranslationAdapter {
            translator,
            from: SOURCE_LANGUAGE.to_string(),
            to: TARGET_LANGUAGE.to_string(),
        }
    }

    pub fn with_languages(mut self, from: &str, to: &str) -> Self {
        self.from = from.to_string();
        self.to = to.to_string();
        self
    }

    pub fn translate_token(&self, token: &str) -> Translation {
        if token.chars().next().map_or(false, |c| c.is_ascii_alphabetic()) {
            return Translation::Skipped;
        }

        match self.translator.translate(token, &self.from, &self.to) {
            Ok(text) => {
                let text = text.trim().to_string();
                info!("  {token} -> {text}");
                Translation::Translated(text)
            }
            Err(e) => {
                warn!("  translating '{token}' via {} failed: {e}", self.translator.name());
                Translation::Failed(e.to_string())
            }
        }
    }

    /// Every token costs exactly one request; nothing is cached.
    pub fn translate_all(&self, top: &[(String, usize)]) -> Vec<(String, Translation)> {
        info!("Translating the top {} tokens via {}", top.len(), self.translator.name());

        top.iter()
            .map(|(token, _)| (token.clone(), self.translate_token(token)))
            .collect()
    }
}

impl<T: Translator + ?Sized> Translator for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn translate(&self, text: &str, from: &str, to: &str) -> Result<String> {
        (**self).translate(text, from, to)
    }
}

pub fn into_mapping(outcomes: &[(String, Translation)]) -> HashMap<String, String> {
    outcomes
        .iter()
        .map(|(token, outcome)| (token.clone(), outcome.text().to_string()))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::RefCell, collections::HashMap};

    use serde_json::json;

    use super::*;

    /// Answers from a fixed table and records every request.
    #[derive(Default)]
    pub(crate) struct RecordingTranslator {
        pub answers: HashMap<String, String>,
        pub calls: RefCell<Vec<String>>,
    }

    impl RecordingTranslator {
        pub fn with_answers(answers: &[(&str, &str)]) -> Self {
            RecordingTranslator {
                answers: answers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Translator for RecordingTranslator {
        fn name(&self) -> &str {
            "recording"
        }

        fn translate(&self, text: &str, _from: &str, _to: &str) -> Result<String> {
            self.calls.borrow_mut().push(text.to_string());
            self.answers
                .get(text)
                .cloned()
                .ok_or_else(|| Error::Generic(format!("service down for {text}")))
        }
    }

    #[test]
    fn latin_tokens_skip_the_network() {
        let translator = RecordingTranslator::with_answers(&[("猫咪", "kitty")]);
        let adapter = TranslationAdapter::new(&translator);
        let top = vec![
            ("Saber".to_string(), 4),
            ("猫咪".to_string(), 2),
            ("iPhone".to_string(), 1),
        ];

        let outcomes = adapter.translate_all(&top);

        assert_eq!(outcomes[0].1, Translation::Skipped);
        assert_eq!(outcomes[1].1, Translation::Translated("kitty".into()));
        assert_eq!(outcomes[2].1, Translation::Skipped);
        assert_eq!(*translator.calls.borrow(), vec!["猫咪".to_string()]);
    }

    #[test]
    fn digits_are_not_latin() {
        let translator = RecordingTranslator::with_answers(&[("2023年", "2023")]);
        let adapter = TranslationAdapter::new(&translator);

        assert_eq!(
            adapter.translate_token("2023年"),
            Translation::Translated("2023".into())
        );
        assert_eq!(translator.calls.borrow().len(), 1);
    }

    #[test]
    fn failures_become_empty_translations() {
        let translator = RecordingTranslator::default();
        let adapter = TranslationAdapter::new(&translator);
        let top = vec![("圣杯".to_string(), 3), ("神乐".to_string(), 1)];

        let outcomes = adapter.translate_all(&top);
        let mapping = into_mapping(&outcomes);

        assert!(matches!(outcomes[0].1, Translation::Failed(_)));
        assert_eq!(mapping["圣杯"], "");
        assert_eq!(mapping["神乐"], "");
        // one request per token, no retry
        assert_eq!(translator.calls.borrow().len(), 2);
    }

    #[test]
    fn parses_google_segments() {
        let body = json!([
            [["Holy ", "圣", null, null, 10], ["Grail", "杯", null, null, 10]],
            null,
            "zh-CN"
        ]);

        assert_eq!(parse_google_response(&body).unwrap(), "Holy Grail");
        assert!(parse_google_response(&json!({"error": 1})).is_err());
    }

    fn mymemory(body: Value) -> Result<String> {
        parse_mymemory_response(serde_json::from_value(body).unwrap())
    }

    #[test]
    fn mymemory_success_yields_translated_text() {
        let body = json!({
            "responseData": {"translatedText": "Holy Grail", "match": 1},
            "responseStatus": 200,
            "responseDetails": ""
        });

        assert_eq!(mymemory(body).unwrap(), "Holy Grail");
        assert_eq!(
            mymemory(json!({
                "responseData": {"translatedText": "Saber"},
                "responseStatus": "200"
            }))
            .unwrap(),
            "Saber"
        );
    }

    #[test]
    fn mymemory_rejections_are_errors() {
        let numeric = json!({
            "responseData": {"translatedText": "QUERY LENGTH LIMIT EXCEEDED"},
            "responseStatus": 403,
            "responseDetails": "QUERY LENGTH LIMIT EXCEEDED"
        });
        let textual = json!({
            "responseData": {"translatedText": "'ZH-CN' IS AN INVALID TARGET LANGUAGE"},
            "responseStatus": "403",
            "responseDetails": "'ZH-CN' IS AN INVALID TARGET LANGUAGE"
        });
        let missing = json!({"responseData": {"translatedText": "圣杯"}});

        for body in [numeric, textual, missing] {
            match mymemory(body) {
                Err(Error::Generic(message)) => assert!(message.contains("mymemory status")),
                other => panic!("expected a rejection, got {other:?}"),
            }
        }
    }

    #[test]
    fn backend_names() {
        assert_eq!("Google".parse::<Backend>().unwrap(), Backend::Google);
        assert_eq!("mymemory".parse::<Backend>().unwrap(), Backend::MyMemory);
        assert!(matches!("bing".parse::<Backend>(), Err(Error::UnknownBackend(_))));
    }
}
