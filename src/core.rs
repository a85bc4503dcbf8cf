use chrono::{SecondsFormat, Utc};
use encoding_rs::Encoding;
use markup5ever_rcdom::RcDom;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use crate::parsers::html::{
    find_nodes, get_charset, get_node_attr, html_to_dom, serialize_document, set_node_attr,
    text_content,
};
use crate::translation::{
    ApplyReport, BrowserState, I18nConfig, Locale, LocaleStore, TranslationError,
    TranslationResult, TranslationSession,
};

/// Options controlling how a single document is translated
#[derive(Default, Clone, Debug)]
pub struct IsukuOptions {
    /// Language to switch to once the page is ready; the stored preference is used otherwise
    pub language: Option<String>,
    /// Encoding used to decode the input when the document declares none
    pub input_encoding: Option<String>,
    /// Encoding of the serialized output; defaults to the document's own encoding
    pub encoding: Option<String>,
    pub silent: bool,
}

/// Result of translating a document
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedDocument {
    pub data: Vec<u8>,
    pub language: Locale,
    pub title: Option<String>,
    pub report: ApplyReport,
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Translates a document from raw data
///
/// The browser state is updated in place with the resolved (or switched) language,
/// so the caller can persist it for the next page.
///
/// # Examples
///
/// ```
/// use isuku_i18n::core::{translate_document_from_data, IsukuOptions};
/// use isuku_i18n::translation::{BrowserState, I18nConfig, LocaleStore};
///
/// let options = IsukuOptions {
///     language: Some("fr".to_string()),
///     ..IsukuOptions::default()
/// };
/// let mut state = BrowserState::default();
/// let html = br#"<html><body><a data-translate="HOME">HOME</a></body></html>"#;
///
/// let result = translate_document_from_data(
///     html,
///     &options,
///     &mut state,
///     LocaleStore::builtin(),
///     &I18nConfig::default(),
/// )
/// .unwrap();
/// assert!(String::from_utf8(result.data).unwrap().contains("ACCUEIL"));
/// ```
pub fn translate_document_from_data(
    input_data: &[u8],
    options: &IsukuOptions,
    state: &mut BrowserState,
    store: Arc<LocaleStore>,
    config: &I18nConfig,
) -> TranslationResult<TranslatedDocument> {
    let processor = DocumentProcessor::new(options, config);
    processor.process_document(input_data, state, store)
}

/// Translates a document read from a file path, or from stdin when `target` is `-`
pub fn translate_document(
    target: &str,
    options: &IsukuOptions,
    state: &mut BrowserState,
    store: Arc<LocaleStore>,
    config: &I18nConfig,
) -> TranslationResult<TranslatedDocument> {
    let input_data = read_input(target)?;
    translate_document_from_data(&input_data, options, state, store, config)
}

/// Reads the whole input from a file, or from stdin when `target` is `-`
pub fn read_input(target: &str) -> TranslationResult<Vec<u8>> {
    if target == "-" {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        return Ok(data);
    }

    let path = Path::new(target);
    if !path.exists() {
        return Err(TranslationError::IoError(format!("File not found: {target}")));
    }

    fs::read(path).map_err(|e| TranslationError::from(e).with_context(target))
}

/// Formats output path with language and title substitution
pub fn format_output_path(path: &str, document_title: Option<&str>, language: Locale) -> String {
    let datetime: &str = &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let title = document_title.unwrap_or("");

    path.replace("%timestamp%", &datetime.replace(':', "_"))
        .replace(
            "%title%",
            title
                .replace(['/', '\\'], "_")
                .replace('<', "[")
                .replace('>', "]")
                .replace(':', " - ")
                .replace('\"', "")
                .replace('|', "-")
                .replace('?', "")
                .trim_start_matches('.'),
        )
        .replace("%lang%", language.code())
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str, color: bool) {
    if color {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}

/// Coordinates decoding, translation and serialization of one document
pub struct DocumentProcessor<'a> {
    options: &'a IsukuOptions,
    config: &'a I18nConfig,
}

impl<'a> DocumentProcessor<'a> {
    pub fn new(options: &'a IsukuOptions, config: &'a I18nConfig) -> Self {
        Self { options, config }
    }

    pub fn process_document(
        &self,
        input_data: &[u8],
        state: &mut BrowserState,
        store: Arc<LocaleStore>,
    ) -> TranslationResult<TranslatedDocument> {
        // 1. Validate options
        EncodingValidator::new().validate_options(self.options)?;

        // 2. Decode and parse
        let (dom, document_encoding) =
            EncodingProcessor::new().process_encoding(input_data, self.options.input_encoding.clone())?;

        // 3. Resolve the language and apply it
        let mut session =
            TranslationSession::start(dom, store, std::mem::take(state), self.config);
        let mut report = session.ready();

        if let Some(language) = &self.options.language {
            match session.set_language(language) {
                Ok(switched) => report = switched,
                Err(e) => {
                    let (_, session_state) = session.into_parts();
                    *state = session_state;
                    return Err(e);
                }
            }
        }

        let language = session.current_language();
        let (dom, session_state) = session.into_parts();
        *state = session_state;

        // 4. Serialize
        let final_encoding = self
            .options
            .encoding
            .clone()
            .unwrap_or(document_encoding);
        set_charset(&dom, &final_encoding);

        let title = get_title(&dom);
        let data = OutputFormatter::new().format_output(&dom, &final_encoding)?;

        Ok(TranslatedDocument {
            data,
            language,
            title,
            report,
        })
    }
}

/// Rejects unknown output encodings before any work is done
pub struct EncodingValidator;

impl EncodingValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_options(&self, options: &IsukuOptions) -> TranslationResult<()> {
        for label in [&options.encoding, &options.input_encoding].into_iter().flatten() {
            if Encoding::for_label_no_replacement(label.as_bytes()).is_none() {
                return Err(TranslationError::InvalidInput(format!(
                    "unknown encoding \"{}\"",
                    label
                )));
            }
        }
        Ok(())
    }
}

/// Decodes the input, re-parsing when the document declares its own charset
pub struct EncodingProcessor;

impl EncodingProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn process_encoding(
        &self,
        input_data: &[u8],
        input_encoding: Option<String>,
    ) -> TranslationResult<(RcDom, String)> {
        let mut document_encoding = input_encoding.unwrap_or_else(|| "utf-8".to_string());

        let mut dom = html_to_dom(input_data, &document_encoding)?;

        if let Some(html_charset) = get_charset(&dom.document) {
            if !html_charset.is_empty() {
                if let Some(document_charset) =
                    Encoding::for_label_no_replacement(html_charset.as_bytes())
                {
                    tracing::debug!("Document declares charset {}", document_charset.name());
                    document_encoding = html_charset;
                    dom = html_to_dom(input_data, document_charset.name())?;
                }
            }
        }

        Ok((dom, document_encoding))
    }
}

/// Serializes the document and normalizes its trailing newline
pub struct OutputFormatter;

impl OutputFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_output(&self, dom: &RcDom, document_encoding: &str) -> TranslationResult<Vec<u8>> {
        let mut result = serialize_document(dom, document_encoding)?;
        self.ensure_trailing_newline(&mut result);
        Ok(result)
    }

    fn ensure_trailing_newline(&self, result: &mut Vec<u8>) {
        if result.last() != Some(&b'\n') {
            result.extend_from_slice(b"\n");
        }
    }
}

/// Rewrites an existing `<meta charset>` to the output encoding
fn set_charset(dom: &RcDom, encoding: &str) {
    for meta in find_nodes(&dom.document, &["html", "head", "meta"]) {
        if get_node_attr(&meta, "charset").is_some() {
            set_node_attr(&meta, "charset", Some(encoding.to_string()));
        }
    }
}

fn get_title(dom: &RcDom) -> Option<String> {
    find_nodes(&dom.document, &["html", "head", "title"])
        .first()
        .map(|title| text_content(title).trim().to_string())
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::{CookieJar, Dictionary};

    fn store() -> Arc<LocaleStore> {
        Arc::new(LocaleStore::from_tables(
            Locale::En,
            [
                (Locale::En, Dictionary::from([("HOME", "HOME"), ("Title", "Title")])),
                (Locale::Fr, Dictionary::from([("HOME", "ACCUEIL"), ("Title", "Titre")])),
            ],
        ))
    }

    fn run(html: &str, options: &IsukuOptions, state: &mut BrowserState) -> TranslationResult<TranslatedDocument> {
        translate_document_from_data(html.as_bytes(), options, state, store(), &I18nConfig::default())
    }

    #[test]
    fn uses_stored_preference() {
        let mut state = BrowserState::new(CookieJar::parse("django_language=fr"), Default::default());
        let result = run(
            r#"<html><head><title>Home</title></head><body><a data-translate="HOME">HOME</a></body></html>"#,
            &IsukuOptions::default(),
            &mut state,
        )
        .unwrap();

        assert_eq!(result.language, Locale::Fr);
        assert_eq!(result.title.as_deref(), Some("Home"));
        assert_eq!(result.report.translated, 1);
        assert_eq!(
            String::from_utf8(result.data).unwrap(),
            "<html lang=\"fr\"><head><title>Home</title></head><body><a data-translate=\"HOME\">ACCUEIL</a></body></html>\n"
        );
    }

    #[test]
    fn switch_updates_state() {
        let mut state = BrowserState::default();
        let options = IsukuOptions {
            language: Some("fr".to_string()),
            ..IsukuOptions::default()
        };
        run(r#"<p data-translate="Title">Title</p>"#, &options, &mut state).unwrap();

        assert_eq!(state.cookies.get("django_language"), Some("fr"));
    }

    #[test]
    fn rejected_switch_is_an_error() {
        let mut state = BrowserState::default();
        let options = IsukuOptions {
            language: Some("de".to_string()),
            ..IsukuOptions::default()
        };
        let error = run(r#"<p data-translate="Title">Title</p>"#, &options, &mut state).unwrap_err();

        assert_eq!(error, TranslationError::UnsupportedLanguage("de".to_string()));
        assert_eq!(state.cookies.get("django_language"), Some("en"));
    }

    #[test]
    fn unknown_output_encoding() {
        let options = IsukuOptions {
            encoding: Some("utf-99".to_string()),
            ..IsukuOptions::default()
        };
        assert!(matches!(
            run("<p></p>", &options, &mut BrowserState::default()),
            Err(TranslationError::InvalidInput(_))
        ));
    }

    #[test]
    fn declared_charset_is_honoured() {
        let html = b"<html><head><meta charset=\"windows-1252\"></head><body>caf\xe9</body></html>";
        let (dom, encoding) = EncodingProcessor::new().process_encoding(html, None).unwrap();

        assert_eq!(encoding, "windows-1252");
        let body = find_nodes(&dom.document, &["html", "body"]).remove(0);
        assert_eq!(text_content(&body), "café");
    }

    #[test]
    fn output_encoding_rewrites_meta() {
        let options = IsukuOptions {
            encoding: Some("windows-1252".to_string()),
            ..IsukuOptions::default()
        };
        let result = run(
            "<html><head><meta charset=\"utf-8\"></head><body>café</body></html>",
            &options,
            &mut BrowserState::default(),
        )
        .unwrap();

        assert!(result.data.contains(&0xE9));
        assert!(String::from_utf8_lossy(&result.data).contains("charset=\"windows-1252\""));
    }

    #[test]
    fn output_path_substitutions() {
        assert_eq!(
            format_output_path("out/%lang%/%title%.html", Some("a/b: c"), Locale::Rw),
            "out/rw/a_b -  c.html"
        );
    }
}
