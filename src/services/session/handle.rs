//! Per-request view of the client's session.
//!
//! Wraps the `tower_sessions::Session` the session layer put in the request
//! extensions. A session counts as existing only when a live record was
//! loaded for the client's cookie; one created during this request and not
//! yet saved does not.
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tower_sessions::{session, session_store};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The session was invalidated (or expired) before this call.
    #[error("session already invalidated")]
    AlreadyInvalidated,

    #[error("session store error: {0}")]
    Store(#[from] session_store::Error),

    #[error("session document error: {0}")]
    Document(#[from] serde_json::Error),
}

impl From<session::Error> for SessionError {
    fn from(err: session::Error) -> Self {
        match err {
            session::Error::SerdeJson(err) => SessionError::Document(err),
            session::Error::Store(err) => SessionError::Store(err),
        }
    }
}

#[derive(Clone)]
pub struct RequestSessions {
    inner: tower_sessions::Session,
}

impl RequestSessions {
    pub fn new(inner: tower_sessions::Session) -> Self {
        Self { inner }
    }

    /// Returns the client's session.
    ///
    /// With `create == false` a missing, expired or invalidated session
    /// yields `Ok(None)` and nothing is allocated. With `create == true` the
    /// session is always returned; a new one is stored once it holds data.
    pub async fn get_session(&self, create: bool) -> SessionResult<Option<Session>> {
        if !create && !self.is_live().await? {
            return Ok(None);
        }

        Ok(Some(Session {
            inner: self.inner.clone(),
        }))
    }

    // Any read loads the record; a missing one drops the session id.
    async fn is_live(&self) -> SessionResult<bool> {
        self.inner.get_value("").await?;
        Ok(self.inner.id().is_some())
    }
}

/// Handle to the client's session.
pub struct Session {
    inner: tower_sessions::Session,
}

impl Session {
    /// Typed read. `null` and missing are both `None`; a value of the wrong
    /// shape is `SessionError::Document`.
    pub async fn get<T: serde::de::DeserializeOwned>(&self, name: &str) -> SessionResult<Option<T>> {
        match self.inner.get_value(name).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    pub async fn set_attribute(&self, name: &str, value: impl Serialize) -> SessionResult<()> {
        self.inner.insert(name, value).await?;
        Ok(())
    }

    /// Destroys the session and expires the cookie. Fails with
    /// `AlreadyInvalidated` when no stored session is left to destroy.
    pub async fn invalidate(&self) -> SessionResult<()> {
        if self.inner.id().is_none() {
            return Err(SessionError::AlreadyInvalidated);
        }

        self.inner.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use tower_sessions::{SessionStore, session::Id};

    use crate::services::session::{MemorySessionStore, testing::seed};

    fn sessions(store: &MemorySessionStore, id: Option<Id>) -> RequestSessions {
        RequestSessions::new(tower_sessions::Session::new(
            id,
            Arc::new(store.clone()),
            None,
        ))
    }

    #[tokio::test]
    async fn no_cookie_and_no_create_means_no_session() {
        let store = MemorySessionStore::new();

        assert!(sessions(&store, None).get_session(false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_ids_mean_no_session() {
        let store = MemorySessionStore::new();

        let found = sessions(&store, Some(Id::default())).get_session(false).await;
        assert!(found.unwrap().is_none());
    }

    #[tokio::test]
    async fn stored_sessions_are_found_with_their_attributes() {
        let store = MemorySessionStore::new();
        let id = seed(&store, json!({"auth.id": 42})).await;

        let session = sessions(&store, Some(id))
            .get_session(false)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(session.get::<i64>("auth.id").await.unwrap(), Some(42));
        assert_eq!(session.get::<i64>("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn null_reads_as_absent_and_mismatches_are_rejected() {
        let store = MemorySessionStore::new();
        let id = seed(&store, json!({"null": null, "text": "forty-two"})).await;
        let session = sessions(&store, Some(id))
            .get_session(false)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(session.get::<i64>("null").await.unwrap(), None);
        assert!(matches!(
            session.get::<i64>("text").await,
            Err(SessionError::Document(_))
        ));
    }

    #[tokio::test]
    async fn invalidate_removes_the_stored_session() {
        let store = MemorySessionStore::new();
        let id = seed(&store, json!({"auth.id": 42})).await;
        let session = sessions(&store, Some(id))
            .get_session(false)
            .await
            .unwrap()
            .unwrap();

        session.invalidate().await.unwrap();

        assert!(store.load(&id).await.unwrap().is_none());
        assert!(matches!(
            session.invalidate().await,
            Err(SessionError::AlreadyInvalidated)
        ));
    }

    #[tokio::test]
    async fn unsaved_sessions_cannot_be_invalidated() {
        let store = MemorySessionStore::new();
        let session = sessions(&store, None).get_session(true).await.unwrap().unwrap();
        session.set_attribute("auth.id", 7).await.unwrap();

        assert!(matches!(
            session.invalidate().await,
            Err(SessionError::AlreadyInvalidated)
        ));
    }
}
