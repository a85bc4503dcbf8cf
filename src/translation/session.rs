//! 翻译会话
//!
//! 一个会话对应一次页面生命周期：持有文档、当前语言、绑定列表和浏览器状态。
//! 当前语言不是全局单例，测试中可以并行创建多个会话。

use std::sync::Arc;

use markup5ever_rcdom::RcDom;

use crate::parsers::html::{get_child_node_by_name, set_node_attr};
use crate::translation::config::I18nConfig;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::locale::Locale;
use crate::translation::pipeline::{ApplyReport, Binding, BindingCollector, DomApplier};
use crate::translation::preference::PreferenceResolver;
use crate::translation::storage::BrowserState;
use crate::translation::store::LocaleStore;

/// 翻译会话
pub struct TranslationSession {
    document: RcDom,
    store: Arc<LocaleStore>,
    state: BrowserState,
    resolver: PreferenceResolver,
    collector: BindingCollector,
    applier: DomApplier,
    active: Locale,
    bindings: Option<Vec<Binding>>,
}

impl TranslationSession {
    /// 开始会话：解析语言偏好，写回存储，并同步 `<html lang>`
    ///
    /// 此时还不会修改页面文本，需等待 `ready()`。
    pub fn start(
        document: RcDom,
        store: Arc<LocaleStore>,
        mut state: BrowserState,
        config: &I18nConfig,
    ) -> Self {
        let resolver = PreferenceResolver::from_config(config);
        let active = resolver.resolve_active_locale(
            &store,
            &mut state.cookies,
            &mut state.local_storage,
        );
        set_document_lang(&document, active);

        tracing::debug!("会话语言: {}", active);

        Self {
            document,
            store,
            state,
            resolver,
            collector: BindingCollector::from_config(config),
            applier: DomApplier::from_config(config),
            active,
            bindings: None,
        }
    }

    /// 使用调用方提供的绑定，代替从文档中收集
    pub fn with_bindings(mut self, bindings: Vec<Binding>) -> Self {
        self.bindings = Some(bindings);
        self
    }

    /// 文档已稳定：收集绑定（仅首次）并应用当前语言
    pub fn ready(&mut self) -> ApplyReport {
        self.apply()
    }

    pub fn is_ready(&self) -> bool {
        self.bindings.is_some()
    }

    /// 重新收集绑定，用于 `ready()` 之后才插入的内容
    pub fn rescan(&mut self) -> usize {
        let bindings = self.collector.collect(&self.document.document);
        let count = bindings.len();
        self.bindings = Some(bindings);
        count
    }

    /// 在已收集的绑定上应用当前语言
    pub fn apply(&mut self) -> ApplyReport {
        if self.bindings.is_none() {
            self.rescan();
        }

        let bindings = self.bindings.as_deref().unwrap_or_default();
        self.applier.apply_all(&self.store, self.active, bindings)
    }

    /// 切换语言
    ///
    /// 未知代码或没有词典的语言会被拒绝，会话、存储和文档都保持原样。
    pub fn set_language(&mut self, code: &str) -> TranslationResult<ApplyReport> {
        let locale = match code.parse::<Locale>() {
            Ok(locale) if self.store.has_dictionary(locale) => locale,
            _ => {
                tracing::warn!("无效的语言: {}", code);
                return Err(TranslationError::UnsupportedLanguage(code.to_string()));
            }
        };

        tracing::info!("切换语言: {} -> {}", self.active, locale);

        self.active = locale;
        self.resolver.persist(
            locale,
            &mut self.state.cookies,
            &mut self.state.local_storage,
        );
        set_document_lang(&self.document, locale);

        Ok(self.apply())
    }

    /// 按当前语言翻译单个键
    pub fn translate(&self, key: &str) -> String {
        self.store.lookup(self.active, key)
    }

    pub fn current_language(&self) -> Locale {
        self.active
    }

    pub fn document(&self) -> &RcDom {
        &self.document
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    pub fn store(&self) -> &LocaleStore {
        &self.store
    }

    pub fn bindings(&self) -> &[Binding] {
        self.bindings.as_deref().unwrap_or_default()
    }

    /// 结束会话，交还文档和浏览器状态
    pub fn into_parts(self) -> (RcDom, BrowserState) {
        (self.document, self.state)
    }
}

fn set_document_lang(document: &RcDom, locale: Locale) {
    if let Some(html) = get_child_node_by_name(&document.document, "html") {
        set_node_attr(&html, "lang", Some(locale.code().to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{find_nodes, get_node_attr, html_to_dom, text_content};
    use crate::translation::storage::{CookieJar, LocalStorage};
    use crate::translation::store::Dictionary;

    fn store() -> Arc<LocaleStore> {
        Arc::new(LocaleStore::from_tables(
            Locale::En,
            [
                (Locale::En, Dictionary::from([("HOME", "HOME")])),
                (Locale::Fr, Dictionary::from([("HOME", "ACCUEIL")])),
            ],
        ))
    }

    fn session(cookie: &str) -> TranslationSession {
        let dom = html_to_dom(
            br#"<html><body><a data-translate="HOME">HOME</a></body></html>"#,
            "utf-8",
        )
        .unwrap();
        let state = BrowserState::new(CookieJar::parse(cookie), Default::default());
        TranslationSession::start(dom, store(), state, &I18nConfig::default())
    }

    fn link_text(session: &TranslationSession) -> String {
        text_content(&find_nodes(&session.document().document, &["a"])[0])
    }

    fn html_lang(session: &TranslationSession) -> Option<String> {
        get_child_node_by_name(&session.document().document, "html")
            .and_then(|html| get_node_attr(&html, "lang"))
    }

    #[test]
    fn start_resolves_without_touching_text() {
        let session = session("django_language=fr");
        assert_eq!(session.current_language(), Locale::Fr);
        assert_eq!(html_lang(&session).as_deref(), Some("fr"));
        assert_eq!(link_text(&session), "HOME");
        assert!(!session.is_ready());
    }

    #[test]
    fn ready_applies_active_language() {
        let mut session = session("django_language=fr");
        let report = session.ready();

        assert_eq!(report.translated, 1);
        assert_eq!(link_text(&session), "ACCUEIL");
        assert_eq!(session.bindings().len(), 1);
    }

    #[test]
    fn set_language_works_before_ready() {
        let mut session = session("");
        session.set_language("fr").unwrap();

        assert_eq!(link_text(&session), "ACCUEIL");
        assert_eq!(session.state().cookies.get("django_language"), Some("fr"));
        assert_eq!(
            session.state().local_storage.get_item("preferredLanguage").as_deref(),
            Some("fr")
        );
    }

    #[test]
    fn switching_back_restores_baseline_text() {
        let mut session = session("django_language=fr");
        session.ready();
        session.set_language("en").unwrap();

        assert_eq!(link_text(&session), "HOME");
        assert_eq!(html_lang(&session).as_deref(), Some("en"));
    }

    #[test]
    fn rejected_switch_leaves_everything_alone() {
        let mut session = session("django_language=fr");
        session.ready();

        for code in ["de", "rw", ""] {
            let error = session.set_language(code).unwrap_err();
            assert!(error.is_rejected_switch());
        }

        assert_eq!(session.current_language(), Locale::Fr);
        assert_eq!(link_text(&session), "ACCUEIL");
        assert_eq!(html_lang(&session).as_deref(), Some("fr"));
        assert_eq!(session.state().cookies.get("django_language"), Some("fr"));
    }

    #[test]
    fn translate_uses_active_language() {
        let session = session("django_language=fr");
        assert_eq!(session.translate("HOME"), "ACCUEIL");
        assert_eq!(session.translate("Unknown"), "Unknown");
    }

    #[test]
    fn caller_supplied_bindings_are_used() {
        let dom = html_to_dom(
            br#"<html><body><a data-translate="HOME">HOME</a><b>HOME</b></body></html>"#,
            "utf-8",
        )
        .unwrap();
        let bold = find_nodes(&dom.document, &["b"]).remove(0);

        let mut session = TranslationSession::start(
            dom,
            store(),
            BrowserState::new(CookieJar::parse("django_language=fr"), Default::default()),
            &I18nConfig::default(),
        )
        .with_bindings(vec![Binding::new(bold.clone(), "HOME")]);
        session.ready();

        assert_eq!(text_content(&bold), "ACCUEIL");
        assert_eq!(link_text(&session), "HOME");
    }

    #[test]
    fn rescan_picks_up_late_content() {
        let mut session = session("django_language=fr");
        session.ready();

        let body = find_nodes(&session.document().document, &["body"]).remove(0);
        let late = crate::parsers::html::create_element("span");
        set_node_attr(&late, "data-translate", Some("HOME".to_string()));
        crate::parsers::html::append_child(&body, late.clone());

        assert_eq!(session.rescan(), 2);
        session.apply();
        assert_eq!(text_content(&late), "ACCUEIL");
    }
}
