//! User preferences kept next to the records in the key-value store.

use crate::config::THEME_KEY;
use crate::db::{KeyValueStore, StoreError};
use crate::models::Theme;

/// Stored theme, or light when nothing has been saved yet.
pub fn load_theme(store: &impl KeyValueStore) -> Result<Theme, StoreError> {
    Ok(store
        .get(THEME_KEY)?
        .map(|raw| Theme::parse(&raw))
        .unwrap_or_default())
}

pub fn save_theme(store: &impl KeyValueStore, theme: Theme) -> Result<(), StoreError> {
    store.set(THEME_KEY, theme.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn defaults_to_light_and_persists_choice() {
        let store = MemoryStore::new();
        assert_eq!(load_theme(&store).unwrap(), Theme::Light);

        save_theme(&store, Theme::Dark).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(load_theme(&store).unwrap(), Theme::Dark);
    }
}
