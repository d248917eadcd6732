use orime_model::Session;

use super::securestore::{SecureStore, StoreError};

const ACCESS_TOKEN_KEY: &str = "access_token";
const USER_DATA_KEY: &str = "user_data";

/// Typed session persistence on top of the secret store.
///
/// This is the session context handed to every screen: written once on
/// verification, cleared on logout or when the backend rejects the token.
pub struct SessionStore {
    store: SecureStore,
}

impl SessionStore {
    /// Open the store in its default location.
    pub fn open() -> Result<Self, StoreError> {
        Ok(Self {
            store: SecureStore::open()?,
        })
    }

    /// Wrap an already-opened secret store.
    pub fn with_store(store: SecureStore) -> Self {
        Self { store }
    }

    /// The persisted session, if a complete one exists.
    ///
    /// Both the token and the student list have to be present and readable,
    /// otherwise the session counts as absent.
    pub fn load(&self) -> Option<Session> {
        let access_token = self.store.get(ACCESS_TOKEN_KEY)?;
        let user_data = self.store.get(USER_DATA_KEY)?;

        match serde_json::from_str(&user_data) {
            Ok(students) => Some(Session {
                access_token,
                students,
            }),
            Err(e) => {
                log::warn!("stored student list is unreadable: {e}");
                None
            }
        }
    }

    /// Persist `session`, replacing any previous one.
    pub fn store(&self, session: &Session) -> Result<(), StoreError> {
        let students = serde_json::to_string(&session.students)?;

        self.store.set(ACCESS_TOKEN_KEY, &session.access_token)?;
        self.store.set(USER_DATA_KEY, &students)
    }

    /// Drop the persisted session. Safe to call when none exists.
    pub fn clear(&self) {
        if let Err(e) = self.store.delete(ACCESS_TOKEN_KEY) {
            log::warn!("failed to drop the stored token: {e}");
        }
        if let Err(e) = self.store.delete(USER_DATA_KEY) {
            log::warn!("failed to drop the stored student list: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use orime_model::Student;

    use super::*;

    fn session_store(name: &str) -> SessionStore {
        let root = std::env::temp_dir().join("orime-sessionstore-tests").join(name);
        let _ = std::fs::remove_dir_all(&root);

        SessionStore::with_store(SecureStore::with_root(root))
    }

    fn student(name: &str, bus_id: &str) -> Student {
        Student {
            name: name.to_string(),
            usn: format!("1OR23CS{:03}", name.len()),
            year: 2,
            bus_id: bus_id.to_string(),
            institution_name: "Orime Public School".to_string(),
            home_address: "Malleshwaram, Bengaluru".to_string(),
        }
    }

    #[test]
    fn store_then_load_preserves_token_and_student_order() {
        let store = session_store("round-trip");

        let session = Session {
            access_token: "tok-abc".to_string(),
            students: vec![student("Ananya", "BUS-07"), student("Rohan", "BUS-03")],
        };
        store.store(&session).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.students[0].name, "Ananya");
        assert_eq!(loaded.students[1].name, "Rohan");
    }

    #[test]
    fn load_requires_both_keys() {
        let store = session_store("partial");

        assert!(store.load().is_none());

        store.store.set(ACCESS_TOKEN_KEY, "tok-abc").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn load_rejects_garbled_student_data() {
        let store = session_store("garbled");

        store.store.set(ACCESS_TOKEN_KEY, "tok-abc").unwrap();
        store.store.set(USER_DATA_KEY, "not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn clear_empties_the_store() {
        let store = session_store("clear");

        let session = Session {
            access_token: "tok-abc".to_string(),
            students: vec![student("Ananya", "BUS-07")],
        };
        store.store(&session).unwrap();
        assert!(store.load().is_some());

        store.clear();
        assert!(store.load().is_none());

        // Clearing twice is fine.
        store.clear();
    }
}
