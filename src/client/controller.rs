use std::path::Path;

use garde::Validate;

use crate::client::{
    api::{ApiClient, ClientError},
    session::{SessionStore, StoredSession},
};
use crate::models::{travel::TravelDto, user::UserDto};
use crate::validation::travel::TravelPayload;

/// Which collection is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    All,
    Mine,
}

/// Where the controller is in its session lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated { session: StoredSession, view: View },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Holds the session and the displayed travel list, and drives the API.
///
/// Mutations never patch the list locally; each one reloads the active
/// view. Every failed action queues exactly one error notice, except a
/// failed [`restore`](Self::restore), which degrades silently.
pub struct ClientController<S: SessionStore> {
    api: ApiClient,
    store: S,
    state: SessionState,
    travels: Vec<TravelDto>,
    notices: Vec<Notice>,
}

impl<S: SessionStore> ClientController<S> {
    pub fn new(api: ApiClient, store: S) -> Self {
        Self {
            api,
            store,
            state: SessionState::Unauthenticated,
            travels: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn travels(&self) -> &[TravelDto] {
        &self.travels
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&UserDto> {
        match &self.state {
            SessionState::Authenticated { session, .. } => Some(&session.user),
            SessionState::Unauthenticated => None,
        }
    }

    /// The active view, if signed in.
    pub fn view(&self) -> Option<View> {
        match &self.state {
            SessionState::Authenticated { view, .. } => Some(*view),
            SessionState::Unauthenticated => None,
        }
    }

    /// Takes every queued notice, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notices.push(Notice {
            kind,
            message: message.into(),
        });
    }

    fn fail<T>(&mut self, context: &str, error: ClientError) -> Result<T, ClientError> {
        tracing::debug!("{}: {}", context, error);
        self.notify(NoticeKind::Error, format!("{}: {}", context, error));
        Err(error)
    }

    /// Revalidates a persisted session against the profile endpoint.
    ///
    /// Returns whether the controller ended up signed in. Any failure clears
    /// the persisted session and leaves the controller signed out without
    /// queueing a notice.
    pub async fn restore(&mut self) -> bool {
        let stored = match self.store.load() {
            Ok(Some(session)) => session,
            Ok(None) => return false,
            Err(e) => {
                tracing::debug!("Could not read stored session: {}", e);
                return false;
            }
        };

        self.api.set_token(stored.token.clone());

        match self.api.profile().await {
            Ok(user) => {
                self.state = SessionState::Authenticated {
                    session: StoredSession {
                        user,
                        token: stored.token,
                    },
                    view: View::All,
                };
                let _ = self.reload().await;
                true
            }
            Err(e) => {
                tracing::debug!("Stored session rejected: {}", e);
                self.api.clear_token();
                if let Err(e) = self.store.clear() {
                    tracing::warn!("Could not clear stored session: {}", e);
                }
                self.state = SessionState::Unauthenticated;
                self.travels.clear();
                false
            }
        }
    }

    /// Signs in and loads the full collection.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        if email.trim().is_empty() || password.is_empty() {
            return self.fail(
                "Login failed",
                ClientError::Validation("Email and password are required".to_string()),
            );
        }

        let result = self.api.login(email.trim(), password).await;
        match result {
            Ok(auth) => self.begin_session(auth.user, auth.token, "Welcome back").await,
            Err(e) => self.fail("Login failed", e),
        }
    }

    /// Creates an account, signs in and loads the full collection.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(), ClientError> {
        if email.trim().is_empty() || password.is_empty() || name.trim().is_empty() {
            return self.fail(
                "Registration failed",
                ClientError::Validation("Name, email and password are required".to_string()),
            );
        }

        let result = self.api.register(email.trim(), password, name.trim()).await;
        match result {
            Ok(auth) => self.begin_session(auth.user, auth.token, "Welcome").await,
            Err(e) => self.fail("Registration failed", e),
        }
    }

    async fn begin_session(
        &mut self,
        user: UserDto,
        token: String,
        greeting: &str,
    ) -> Result<(), ClientError> {
        let session = StoredSession { user, token };
        if let Err(e) = self.store.save(&session) {
            return self.fail("Could not save session", e);
        }

        self.api.set_token(session.token.clone());
        let message = format!("{}, {}!", greeting, session.user.name);
        self.state = SessionState::Authenticated {
            session,
            view: View::All,
        };
        self.notify(NoticeKind::Success, message);

        let _ = self.reload().await;
        Ok(())
    }

    /// Clears the session and the list.
    pub fn sign_out(&mut self) {
        self.api.clear_token();
        if let Err(e) = self.store.clear() {
            tracing::warn!("Could not clear stored session: {}", e);
        }
        self.state = SessionState::Unauthenticated;
        self.travels.clear();
        self.notify(NoticeKind::Info, "Signed out");
    }

    /// Switches between all travels and the user's own, re-fetching the list.
    pub async fn switch_view(&mut self, target: View) -> Result<(), ClientError> {
        match &mut self.state {
            SessionState::Authenticated { view, .. } => *view = target,
            SessionState::Unauthenticated => {
                return self.fail("Cannot switch view", ClientError::NotSignedIn);
            }
        }
        self.reload().await
    }

    /// Replaces the list with a fresh fetch of the active view.
    ///
    /// Signed out, the public collection is fetched.
    pub async fn reload(&mut self) -> Result<(), ClientError> {
        let result = match self.view() {
            Some(View::Mine) => self.api.list_my_travels().await,
            Some(View::All) | None => self.api.list_travels().await,
        };

        match result {
            Ok(travels) => {
                self.travels = travels;
                Ok(())
            }
            Err(e) => self.fail("Failed to load travels", e),
        }
    }

    fn check_draft(&mut self, context: &str, draft: &TravelPayload) -> Result<(), ClientError> {
        match draft.validate() {
            Ok(()) => Ok(()),
            Err(report) => self.fail(context, ClientError::Validation(report.to_string())),
        }
    }

    pub async fn create_travel(&mut self, draft: &TravelPayload) -> Result<TravelDto, ClientError> {
        const CONTEXT: &str = "Failed to create travel";
        self.check_draft(CONTEXT, draft)?;

        let result = self.api.create_travel(draft).await;
        match result {
            Ok(travel) => {
                self.notify(NoticeKind::Success, "Travel created successfully!");
                let _ = self.reload().await;
                Ok(travel)
            }
            Err(e) => self.fail(CONTEXT, e),
        }
    }

    /// Replaces every field of the travel with `draft`.
    pub async fn update_travel(
        &mut self,
        id: &str,
        draft: &TravelPayload,
    ) -> Result<TravelDto, ClientError> {
        const CONTEXT: &str = "Failed to update travel";
        self.check_draft(CONTEXT, draft)?;

        let result = self.api.update_travel(id, draft).await;
        match result {
            Ok(travel) => {
                self.notify(NoticeKind::Success, "Travel updated successfully!");
                let _ = self.reload().await;
                Ok(travel)
            }
            Err(e) => self.fail(CONTEXT, e),
        }
    }

    pub async fn delete_travel(&mut self, id: &str) -> Result<(), ClientError> {
        let result = self.api.delete_travel(id).await;
        match result {
            Ok(()) => {
                self.notify(NoticeKind::Success, "Travel deleted successfully!");
                let _ = self.reload().await;
                Ok(())
            }
            Err(e) => self.fail("Failed to delete travel", e),
        }
    }

    /// Uploads an image file and returns its public URL path.
    ///
    /// Authorises with the bare token key of the session store.
    pub async fn upload_image(&mut self, path: &Path) -> Result<String, ClientError> {
        const CONTEXT: &str = "Failed to upload image";

        let token = match self.store.token() {
            Ok(Some(token)) => token,
            Ok(None) => return self.fail(CONTEXT, ClientError::NotSignedIn),
            Err(e) => return self.fail(CONTEXT, e),
        };

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => return self.fail(CONTEXT, e.into()),
        };
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let result = self.api.upload_image(Some(&token), &file_name, bytes).await;
        match result {
            Ok(url) => {
                self.notify(NoticeKind::Success, "Image uploaded successfully!");
                Ok(url)
            }
            Err(e) => self.fail(CONTEXT, e),
        }
    }

    /// Fetches one travel for the detail view.
    pub async fn open_travel(&mut self, id: &str) -> Result<TravelDto, ClientError> {
        let result = self.api.get_travel(id).await;
        match result {
            Ok(travel) => Ok(travel),
            Err(e) => self.fail("Failed to load travel", e),
        }
    }
}
