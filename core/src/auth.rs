//! Auth sub-API: sign-up, password login and admin user updates.
//!
//! The login parser looks for an `error_code` marker in the body before it
//! looks at the status: the remote can attach an error payload to a status
//! that would otherwise read as success.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::client::{to_json, Client};
use crate::error::{AuthError, Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AuthErrorBody, AuthResponse, Credentials, User};

const ERROR_MARKER: &str = "error_code";

impl Client {
    // -- sign-up ------------------------------------------------------------

    pub fn build_sign_up(&self, email: &str, password: &str) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url("/auth/v1/signup"),
            headers: Vec::new(),
            body: Some(to_json(&Credentials { email, password })?),
        })
    }

    pub fn parse_sign_up(&self, response: HttpResponse) -> Result<User> {
        if response.status != 200 && response.status != 201 {
            return Err(Error::status_with_body(response.status, &response.body));
        }
        let user: User = parse_json(&response.body)?;
        if user.id.is_nil() {
            return Err(Error::MalformedResponse("user ID missing in response".to_string()));
        }
        Ok(user)
    }

    /// Registers a new user.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        let request = self.build_sign_up(email, password)?;
        let response = self.execute(request, "failed to send sign-up request")?;
        self.parse_sign_up(response)
    }

    // -- login --------------------------------------------------------------

    pub fn build_login(&self, email: &str, password: &str) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url("/auth/v1/token?grant_type=password"),
            headers: Vec::new(),
            body: Some(to_json(&Credentials { email, password })?),
        })
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<AuthResponse> {
        let text = response.text();
        if text.contains(ERROR_MARKER) {
            let remote: AuthErrorBody = parse_json(&response.body)?;
            return Err(AuthError::from_code(&remote.error_code, &remote.msg).into());
        }
        if response.status != 200 {
            return Err(AuthError::LoginFailed(text).into());
        }
        parse_json(&response.body)
    }

    /// Exchanges email and password for a session.
    pub fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let request = self.build_login(email, password)?;
        let response = self.execute(request, "failed to send login request")?;
        self.parse_login(response)
    }

    // -- admin --------------------------------------------------------------

    pub fn build_update_user(&self, id: Uuid, fields: &Map<String, Value>) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: self.url(&format!("/auth/v1/admin/users/{id}")),
            headers: Vec::new(),
            body: Some(to_json(fields)?),
        })
    }

    pub fn parse_update_user(&self, response: HttpResponse) -> Result<User> {
        if response.status != 200 {
            return Err(Error::status_with_body(response.status, &response.body));
        }
        parse_json(&response.body)
    }

    /// Replaces the given attributes of a user through the admin endpoint.
    /// The remote only honors this for a `Tier::Privileged` client.
    pub fn update_user(&self, id: Uuid, fields: &Map<String, Value>) -> Result<User> {
        let request = self.build_update_user(id, fields)?;
        let response = self.execute(request, "failed to send update-user request")?;
        self.parse_update_user(response)
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::MalformedResponse(e.to_string()))
}
