//! 语言偏好解析
//!
//! cookie 优先（跨页面持久），其次 localStorage，最后基准语言。
//! 解析结果总会写回两处存储，使两份冗余记录保持一致。

use crate::translation::config::I18nConfig;
use crate::translation::locale::Locale;
use crate::translation::storage::{CookieJar, LocalStorage};
use crate::translation::store::LocaleStore;

/// 偏好解析器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceResolver {
    cookie_name: String,
    storage_key: String,
    cookie_max_age_days: i64,
}

impl Default for PreferenceResolver {
    fn default() -> Self {
        Self::from_config(&I18nConfig::default())
    }
}

impl PreferenceResolver {
    pub fn from_config(config: &I18nConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            storage_key: config.storage_key.clone(),
            cookie_max_age_days: config.cookie_max_age_days,
        }
    }

    /// 读取已保存的偏好（不做校验）
    pub fn stored_preference(
        &self,
        cookies: &CookieJar,
        local_storage: &dyn LocalStorage,
    ) -> Option<String> {
        cookies
            .get(&self.cookie_name)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .or_else(|| {
                local_storage
                    .get_item(&self.storage_key)
                    .filter(|value| !value.is_empty())
            })
    }

    /// 确定当前语言并写回两处存储，永不失败
    pub fn resolve_active_locale(
        &self,
        store: &LocaleStore,
        cookies: &mut CookieJar,
        local_storage: &mut dyn LocalStorage,
    ) -> Locale {
        let stored = self.stored_preference(cookies, local_storage);

        let locale = match stored.as_deref().map(str::parse::<Locale>) {
            Some(Ok(locale)) if store.has_dictionary(locale) => locale,
            Some(_) => {
                tracing::debug!(
                    "保存的语言偏好 {:?} 不可用，使用基准语言 {}",
                    stored,
                    store.baseline()
                );
                store.baseline()
            }
            None => store.baseline(),
        };

        self.persist(locale, cookies, local_storage);
        locale
    }

    /// 把语言写入 cookie 和 localStorage
    pub fn persist(
        &self,
        locale: Locale,
        cookies: &mut CookieJar,
        local_storage: &mut dyn LocalStorage,
    ) {
        local_storage.set_item(&self.storage_key, locale.code());
        cookies.set(&self.cookie_name, locale.code(), self.cookie_max_age_days);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::storage::MemoryStorage;
    use crate::translation::store::Dictionary;

    fn store() -> LocaleStore {
        LocaleStore::from_tables(
            Locale::En,
            [
                (Locale::En, Dictionary::from([("HOME", "HOME")])),
                (Locale::Fr, Dictionary::from([("HOME", "ACCUEIL")])),
            ],
        )
    }

    fn storage_with(value: &str) -> MemoryStorage {
        [("preferredLanguage", value)].into_iter().collect()
    }

    #[test]
    fn cookie_takes_precedence() {
        let resolver = PreferenceResolver::default();
        let mut cookies = CookieJar::parse("django_language=fr");
        let mut storage = storage_with("en");

        let locale = resolver.resolve_active_locale(&store(), &mut cookies, &mut storage);
        assert_eq!(locale, Locale::Fr);
        assert_eq!(storage.get_item("preferredLanguage").as_deref(), Some("fr"));
    }

    #[test]
    fn local_storage_used_without_cookie() {
        let resolver = PreferenceResolver::default();
        let mut cookies = CookieJar::new();
        let mut storage = storage_with("fr");

        let locale = resolver.resolve_active_locale(&store(), &mut cookies, &mut storage);
        assert_eq!(locale, Locale::Fr);
        assert_eq!(cookies.get("django_language"), Some("fr"));
    }

    #[test]
    fn nothing_stored_gives_baseline() {
        let resolver = PreferenceResolver::default();
        let mut cookies = CookieJar::new();
        let mut storage = MemoryStorage::new();

        let locale = resolver.resolve_active_locale(&store(), &mut cookies, &mut storage);
        assert_eq!(locale, Locale::En);
        assert_eq!(cookies.get("django_language"), Some("en"));
        assert_eq!(storage.get_item("preferredLanguage").as_deref(), Some("en"));
    }

    #[test]
    fn invalid_preference_overwritten_with_baseline() {
        let resolver = PreferenceResolver::default();
        let mut cookies = CookieJar::parse("django_language=de");
        let mut storage = storage_with("de");

        let locale = resolver.resolve_active_locale(&store(), &mut cookies, &mut storage);
        assert_eq!(locale, Locale::En);
        assert_eq!(cookies.get("django_language"), Some("en"));
        assert_eq!(storage.get_item("preferredLanguage").as_deref(), Some("en"));
    }

    #[test]
    fn known_code_without_dictionary_gives_baseline() {
        let resolver = PreferenceResolver::default();
        let mut cookies = CookieJar::parse("django_language=rw");
        let mut storage = MemoryStorage::new();

        let locale = resolver.resolve_active_locale(&store(), &mut cookies, &mut storage);
        assert_eq!(locale, Locale::En);
    }
}
