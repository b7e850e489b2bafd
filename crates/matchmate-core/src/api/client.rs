//! API client for communicating with the matchmate REST API.
//!
//! Every call except `authenticate` goes through `ApiClient::send`, which
//! attaches the stored bearer token and turns a 401 into a cleared session
//! plus `ApiError::SessionExpired`.

use reqwest::header::{self, HeaderValue};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use super::ApiError;
use crate::auth::CredentialStore;
use crate::models::{CurrentUser, Member, MemberUpdate, NewProfile};

// ============================================================================
// Constants
// ============================================================================

/// Versioned prefix for all backend endpoints
const API_PREFIX: &str = "/api/v0";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Successful answer of the login endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: CurrentUser,
}

/// Authenticated request pipeline.
/// Clone is cheap - the transport and the credential store are shared handles.
#[derive(Clone)]
pub struct ApiClient<T = HttpTransport> {
    transport: T,
    credentials: CredentialStore,
}

impl ApiClient<HttpTransport> {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, credentials: CredentialStore) -> Result<Self, ApiError> {
        Ok(Self::with_transport(HttpTransport::new(base_url)?, credentials))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(transport: T, credentials: CredentialStore) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Set or strip the authorization header from the current store contents.
    fn authorize(&self, request: &mut ApiRequest) -> Result<(), ApiError> {
        match self.credentials.token() {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))?;
                request.headers.insert(header::AUTHORIZATION, value);
            }
            None => {
                request.headers.remove(header::AUTHORIZATION);
            }
        }
        Ok(())
    }

    /// Send a request through the pipeline.
    ///
    /// 2xx responses are returned unchanged. A 401 clears the credential store
    /// before returning `SessionExpired`. Other failures leave the session alone.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.authorize(&mut request)?;
        let method = request.method.clone();
        let path = request.path.clone();

        let response = self.transport.execute(request).await?;

        if response.is_success() {
            return Ok(response);
        }

        if response.status == StatusCode::UNAUTHORIZED {
            warn!(%method, path = %path, "Credential rejected, clearing session");
            self.credentials.clear();
            return Err(ApiError::SessionExpired);
        }

        warn!(%method, path = %path, status = response.status.as_u16(), "Request failed");
        Err(ApiError::from_status(response.status, &response.body))
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    async fn post<R: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<R, ApiError> {
        self.send(ApiRequest::post(path).json(body)?).await?.json()
    }

    async fn put<R: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<R, ApiError> {
        self.send(ApiRequest::put(path).json(body)?).await?.json()
    }

    fn member_path(id: &str) -> String {
        format!("{}/member/{}", API_PREFIX, id)
    }

    // ===== Authentication =====

    /// Exchange email and password for a session token.
    ///
    /// Sent without a bearer token and outside the 401 handling, so a wrong
    /// password never clears an existing session.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = ApiRequest::post(format!("{}/auth/login", API_PREFIX))
            .json(&LoginRequest { email, password })?;

        let response = self.transport.execute(request).await?;
        match response.status {
            s if s.is_success() => {
                let login: LoginResponse = response.json()?;
                debug!(user_id = %login.user.id, "Authenticated");
                Ok(login)
            }
            StatusCode::UNAUTHORIZED => Err(ApiError::InvalidCredentials),
            s => Err(ApiError::from_status(s, &response.body)),
        }
    }

    // ===== Member Administration =====

    /// Fetch all accounts for the admin table
    pub async fn list_users(&self) -> Result<Vec<Member>, ApiError> {
        self.get(&format!("{}/users", API_PREFIX)).await
    }

    pub async fn fetch_member(&self, id: &str) -> Result<Member, ApiError> {
        self.get(&Self::member_path(id)).await
    }

    /// Submit the profile creation form
    pub async fn create_profile(&self, profile: &NewProfile) -> Result<Member, ApiError> {
        self.post(&format!("{}/member", API_PREFIX), profile).await
    }

    pub async fn update_member(&self, id: &str, update: &MemberUpdate) -> Result<Member, ApiError> {
        self.put(&Self::member_path(id), update).await
    }

    pub async fn delete_member(&self, id: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(Self::member_path(id))).await?;
        Ok(())
    }
}
