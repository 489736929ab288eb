use reqwest::{multipart, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::handlers::{
    auth::{AuthResponse, ProfileResponse},
    health::HealthResponse,
    travels::{DeleteResponse, TravelListResponse, TravelMutationResponse, TravelResponse},
    uploads::UploadResponse,
};
use crate::models::{travel::TravelDto, user::UserDto};
use crate::validation::travel::TravelPayload;

/// Errors seen by API consumers.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never got a response.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A local file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted session could not be encoded.
    #[error("Session error: {0}")]
    Session(String),

    /// Input was rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The action needs a signed-in user.
    #[error("Not signed in")]
    NotSignedIn,
}

impl ClientError {
    /// The HTTP status, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

/// A thin typed wrapper over the HTTP API.
///
/// Holds the base URL and, once signed in, the bearer token attached to
/// every request.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client for the server at `base_url`, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Sets the bearer token sent with each request.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Stops sending a bearer token.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}/api{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("HTTP error! status: {}", status.as_u16()));
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// `GET /api/health`.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        Self::parse(self.request(Method::GET, "/health").send().await?).await
    }

    /// `POST /api/auth/register`. Does not store the returned token.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = Credentials {
            email,
            password,
            name: Some(name),
        };
        Self::parse(
            self.request(Method::POST, "/auth/register")
                .json(&body)
                .send()
                .await?,
        )
        .await
    }

    /// `POST /api/auth/login`. Does not store the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = Credentials {
            email,
            password,
            name: None,
        };
        Self::parse(
            self.request(Method::POST, "/auth/login")
                .json(&body)
                .send()
                .await?,
        )
        .await
    }

    /// `GET /api/auth/profile`.
    pub async fn profile(&self) -> Result<UserDto, ClientError> {
        let response: ProfileResponse =
            Self::parse(self.request(Method::GET, "/auth/profile").send().await?).await?;
        Ok(response.user)
    }

    /// `GET /api/travels`.
    pub async fn list_travels(&self) -> Result<Vec<TravelDto>, ClientError> {
        let response: TravelListResponse =
            Self::parse(self.request(Method::GET, "/travels").send().await?).await?;
        Ok(response.travels)
    }

    /// `GET /api/travels/my`.
    pub async fn list_my_travels(&self) -> Result<Vec<TravelDto>, ClientError> {
        let response: TravelListResponse =
            Self::parse(self.request(Method::GET, "/travels/my").send().await?).await?;
        Ok(response.travels)
    }

    /// `GET /api/travels/{id}`.
    pub async fn get_travel(&self, id: &str) -> Result<TravelDto, ClientError> {
        let response: TravelResponse = Self::parse(
            self.request(Method::GET, &format!("/travels/{}", id))
                .send()
                .await?,
        )
        .await?;
        Ok(response.travel)
    }

    /// `POST /api/travels`.
    pub async fn create_travel(&self, payload: &TravelPayload) -> Result<TravelDto, ClientError> {
        let response: TravelMutationResponse = Self::parse(
            self.request(Method::POST, "/travels")
                .json(payload)
                .send()
                .await?,
        )
        .await?;
        Ok(response.travel)
    }

    /// `PUT /api/travels/{id}` with the complete field set.
    pub async fn update_travel(
        &self,
        id: &str,
        payload: &TravelPayload,
    ) -> Result<TravelDto, ClientError> {
        let response: TravelMutationResponse = Self::parse(
            self.request(Method::PUT, &format!("/travels/{}", id))
                .json(payload)
                .send()
                .await?,
        )
        .await?;
        Ok(response.travel)
    }

    /// `DELETE /api/travels/{id}`.
    pub async fn delete_travel(&self, id: &str) -> Result<(), ClientError> {
        let _: DeleteResponse = Self::parse(
            self.request(Method::DELETE, &format!("/travels/{}", id))
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    /// `POST /api/upload-image` as multipart with a single `file` part.
    ///
    /// The token is passed explicitly because uploads authorise with the
    /// separately persisted bare token.
    pub async fn upload_image(
        &self,
        token: Option<&str>,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ClientError> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let mut builder = self
            .http
            .post(format!("{}/api/upload-image", self.base_url))
            .multipart(form);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response: UploadResponse = Self::parse(builder.send().await?).await?;
        Ok(response.image_url)
    }
}
