//! In-process store: mutex-guarded maps, no persistence.

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Inner {
    user_languages: HashMap<i64, String>,
    memberships: HashSet<(i64, i64)>,
    active_topics: HashMap<(i64, i64), bool>,
}

/// Volatile store. Cloning is cheap and clones share state.
///
/// The mutex is only ever held for map operations; nothing async happens
/// under it.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user_language(&self, user_id: i64, lang: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.user_languages.insert(user_id, lang.to_string());
        Ok(())
    }

    pub fn user_language(&self, user_id: i64) -> Result<Option<String>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.user_languages.get(&user_id).cloned())
    }

    pub fn register_membership(&self, user_id: i64, chat_id: i64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.memberships.insert((user_id, chat_id));
        Ok(())
    }

    pub fn languages_in_chat(&self, chat_id: i64) -> Result<HashMap<i64, String>> {
        let inner = self.inner.lock().unwrap();
        let mut result = HashMap::new();
        for (user_id, member_chat) in &inner.memberships {
            if *member_chat == chat_id {
                if let Some(lang) = inner.user_languages.get(user_id) {
                    result.insert(*user_id, lang.clone());
                }
            }
        }
        Ok(result)
    }

    pub fn activate_topic(&self, chat_id: i64, topic_id: i64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.active_topics.insert((chat_id, topic_id), true);
        Ok(())
    }

    pub fn deactivate_topic(&self, chat_id: i64, topic_id: i64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        // Only flip existing records; never materialize one just to say "off"
        if let Some(flag) = inner.active_topics.get_mut(&(chat_id, topic_id)) {
            *flag = false;
        }
        Ok(())
    }

    pub fn is_topic_active(&self, chat_id: i64, topic_id: i64) -> Result<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .active_topics
            .get(&(chat_id, topic_id))
            .copied()
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Topic Activation Tests ====================

    #[test]
    fn test_topic_inactive_by_default() {
        let store = MemoryStore::new();
        assert!(!store.is_topic_active(1, 0).unwrap());
        assert!(!store.is_topic_active(1, 42).unwrap());
    }

    #[test]
    fn test_activate_then_check() {
        let store = MemoryStore::new();
        store.activate_topic(1, 0).unwrap();
        assert!(store.is_topic_active(1, 0).unwrap());
        // Other keys untouched
        assert!(!store.is_topic_active(1, 1).unwrap());
        assert!(!store.is_topic_active(2, 0).unwrap());
    }

    #[test]
    fn test_deactivate_after_activate() {
        let store = MemoryStore::new();
        store.activate_topic(5, 7).unwrap();
        store.deactivate_topic(5, 7).unwrap();
        assert!(!store.is_topic_active(5, 7).unwrap());
    }

    #[test]
    fn test_deactivate_never_activated_is_noop() {
        let store = MemoryStore::new();
        store.deactivate_topic(9, 9).unwrap();
        assert!(!store.is_topic_active(9, 9).unwrap());
        // Still activatable afterwards
        store.activate_topic(9, 9).unwrap();
        assert!(store.is_topic_active(9, 9).unwrap());
    }

    #[test]
    fn test_reactivate_after_deactivate() {
        let store = MemoryStore::new();
        store.activate_topic(1, 0).unwrap();
        store.deactivate_topic(1, 0).unwrap();
        store.activate_topic(1, 0).unwrap();
        assert!(store.is_topic_active(1, 0).unwrap());
    }

    // ==================== Language Preference Tests ====================

    #[test]
    fn test_user_language_absent_by_default() {
        let store = MemoryStore::new();
        assert_eq!(store.user_language(100).unwrap(), None);
    }

    #[test]
    fn test_set_and_get_user_language() {
        let store = MemoryStore::new();
        store.set_user_language(100, "es").unwrap();
        assert_eq!(store.user_language(100).unwrap(), Some("es".to_string()));
    }

    #[test]
    fn test_set_user_language_overwrites() {
        let store = MemoryStore::new();
        store.set_user_language(100, "es").unwrap();
        store.set_user_language(100, "fr").unwrap();
        assert_eq!(store.user_language(100).unwrap(), Some("fr".to_string()));
    }

    #[test]
    fn test_set_user_language_idempotent() {
        let store = MemoryStore::new();
        store.set_user_language(100, "es").unwrap();
        store.set_user_language(100, "es").unwrap();
        assert_eq!(store.user_language(100).unwrap(), Some("es".to_string()));
    }

    // ==================== Membership Tests ====================

    #[test]
    fn test_register_membership_idempotent() {
        let store = MemoryStore::new();
        store.register_membership(1, 10).unwrap();
        store.register_membership(1, 10).unwrap();
        store.set_user_language(1, "en").unwrap();
        assert_eq!(store.languages_in_chat(10).unwrap().len(), 1);
    }

    #[test]
    fn test_languages_in_chat_excludes_users_without_preference() {
        let store = MemoryStore::new();
        store.register_membership(1, 10).unwrap();
        store.register_membership(2, 10).unwrap();
        store.set_user_language(1, "en").unwrap();
        // User 2 is a member but has no language preference yet

        let langs = store.languages_in_chat(10).unwrap();
        assert_eq!(langs.len(), 1);
        assert_eq!(langs.get(&1), Some(&"en".to_string()));
    }

    #[test]
    fn test_languages_in_chat_scoped_to_chat() {
        let store = MemoryStore::new();
        store.register_membership(1, 10).unwrap();
        store.register_membership(2, 20).unwrap();
        store.set_user_language(1, "en").unwrap();
        store.set_user_language(2, "es").unwrap();

        let langs = store.languages_in_chat(10).unwrap();
        assert_eq!(langs.len(), 1);
        assert!(!langs.contains_key(&2));
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store.set_user_language(1, "de").unwrap();
        assert_eq!(clone.user_language(1).unwrap(), Some("de".to_string()));
    }
}
