// 集成测试公共模块
//
// 提供测试辅助工具和共享功能

use std::sync::Arc;

use isuku_i18n::parsers::html::{find_nodes, html_to_dom, inner_html, text_content};
use isuku_i18n::translation::{
    BrowserState, CookieJar, Dictionary, I18nConfig, Locale, LocaleStore, MemoryStorage,
    TranslationSession,
};

use markup5ever_rcdom::{Handle, RcDom};

/// 测试环境：词典 + 配置
pub struct TestEnvironment {
    pub store: Arc<LocaleStore>,
    pub config: I18nConfig,
}

impl TestEnvironment {
    pub fn new(store: Arc<LocaleStore>, config: I18nConfig) -> Self {
        Self { store, config }
    }

    /// 只有 en / fr 两张小表，rw 未配置
    pub fn default() -> Self {
        let store = LocaleStore::from_tables(
            Locale::En,
            [
                (
                    Locale::En,
                    Dictionary::from([
                        ("HOME", "HOME"),
                        ("Text", "Text"),
                        ("Phone", "Phone"),
                        ("SIGN UP", "SIGN UP"),
                        ("Enter your email", "Enter your email"),
                    ]),
                ),
                (
                    Locale::Fr,
                    Dictionary::from([
                        ("HOME", "ACCUEIL"),
                        ("Text", "Texte"),
                        ("Phone", "Téléphone"),
                        ("SIGN UP", "S'INSCRIRE"),
                        ("Enter your email", "Entrez votre email"),
                    ]),
                ),
            ],
        );
        Self::new(Arc::new(store), I18nConfig::default())
    }

    /// 内置的三语词典
    pub fn builtin() -> Self {
        Self::new(LocaleStore::builtin(), I18nConfig::default())
    }

    /// 把 `<span>` 也当作图标
    pub fn with_span_icons(mut self) -> Self {
        self.config.icon_tags = vec!["i".to_string(), "span".to_string()];
        self
    }

    /// 以给定 cookie 串开始会话
    pub fn session(&self, html: &str, cookie: &str) -> TranslationSession {
        let state = BrowserState::new(CookieJar::parse(cookie), MemoryStorage::new());
        TranslationSession::start(
            HtmlTestHelper::create_test_dom(html),
            self.store.clone(),
            state,
            &self.config,
        )
    }
}

/// HTML测试工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 创建测试用的DOM结构
    pub fn create_test_dom(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8").unwrap()
    }

    /// 按路径取第一个节点
    pub fn first(dom: &RcDom, path: &[&str]) -> Handle {
        find_nodes(&dom.document, path)
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("no node at {:?}", path))
    }

    pub fn text_of(dom: &RcDom, path: &[&str]) -> String {
        text_content(&Self::first(dom, path))
    }

    pub fn inner_html_of(dom: &RcDom, path: &[&str]) -> String {
        inner_html(&Self::first(dom, path)).unwrap()
    }

    /// 整个文档的序列化结果，用于比较两次状态
    pub fn snapshot(dom: &RcDom) -> String {
        inner_html(&dom.document).unwrap()
    }

    /// 站点导航栏和注册表单的简化版本
    pub fn create_site_page() -> String {
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <title>Isuku</title>
    <meta charset="UTF-8">
</head>
<body>
    <nav>
        <a href="/" data-translate="HOME">HOME</a>
        <a href="/about" data-translate="ABOUT US">ABOUT US</a>
        <a href="/contact" data-translate="CONTACT US"><i class="fa fa-phone"></i> CONTACT US</a>
    </nav>
    <h1 data-translate="WASTE MANAGEMENT">WASTE MANAGEMENT <span data-translate="SYSTEM">SYSTEM</span></h1>
    <p data-translate="LEARN MORE">LEARN MORE <i class="fa fa-arrow-right"></i></p>
    <form>
        <input type="email" data-translate-placeholder="enter your email or phone number" placeholder="enter your email or phone number">
        <select>
            <option value="" data-translate="Select Province">Select Province</option>
            <option value="kigali" data-translate="Kigali">Kigali</option>
        </select>
        <input type="submit" data-translate="SIGN UP" value="SIGN UP">
    </form>
    <footer data-translate="Not a real key">Footer text</footer>
</body>
</html>"#
            .to_string()
    }
}

/// 断言辅助工具
pub struct AssertionHelper;

impl AssertionHelper {
    /// 断言 cookie 和 localStorage 都记录了同一个语言
    pub fn assert_persisted(session: &TranslationSession, code: &str) {
        use isuku_i18n::translation::LocalStorage;

        let state = session.state();
        assert_eq!(state.cookies.get("django_language"), Some(code), "cookie");
        assert_eq!(
            state.local_storage.get_item("preferredLanguage").as_deref(),
            Some(code),
            "localStorage"
        );
    }
}
