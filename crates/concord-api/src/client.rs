//! Typed wrappers over the platform endpoints.

use reqwest::Method;
use serde_json::Value;

use concord_core::{DesiredResource, RemoteResource};

use crate::error::ApiError;
use crate::transport::RateLimitedTransport;
use crate::types::{Principal, ScopeMembership};

/// Resources fetched per page when enumerating a scope.
const PAGE_SIZE: usize = 100;

pub struct PlatformClient {
    base_url: String,
    transport: RateLimitedTransport,
}

impl PlatformClient {
    pub fn new(base_url: impl Into<String>, transport: RateLimitedTransport) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /identity`: who the credential belongs to.
    pub fn identity(&self) -> Result<Principal, ApiError> {
        let url = format!("{}/identity", self.base_url);
        let value = self.transport.send(Method::GET, &url, None)?;
        decode(&url, value)
    }

    /// `GET /principal/scopes`: scope memberships for the principal.
    pub fn scopes(&self) -> Result<Vec<ScopeMembership>, ApiError> {
        let url = format!("{}/principal/scopes", self.base_url);
        let value = self.transport.send(Method::GET, &url, None)?;
        decode(&url, value)
    }

    /// `GET /scopes/{scope}/resources`: full current resource list,
    /// following the `after` cursor until a short page. Empty scopes
    /// return an empty list, not an error.
    pub fn list_resources(&self, scope_id: &str) -> Result<Vec<RemoteResource>, ApiError> {
        let mut all: Vec<RemoteResource> = Vec::new();
        loop {
            let after = all.last().map(|r| r.id.clone());
            let page = self.resource_page(scope_id, after.as_deref())?;
            let full_page = page.len() == PAGE_SIZE;
            all.extend(page);
            if !full_page {
                break;
            }
        }
        Ok(all)
    }

    /// `POST /scopes/{scope}/resources`: create one resource.
    pub fn create_resource(
        &self,
        scope_id: &str,
        spec: &DesiredResource,
    ) -> Result<RemoteResource, ApiError> {
        let url = format!("{}/scopes/{}/resources", self.base_url, scope_id);
        let body = encode(&url, spec)?;
        let value = self.transport.send(Method::POST, &url, Some(&body))?;
        decode(&url, value)
    }

    /// `PATCH /scopes/{scope}/resources/{id}`: targeted update of one
    /// resource, never a collection replace.
    pub fn update_resource(
        &self,
        scope_id: &str,
        id: &str,
        spec: &DesiredResource,
    ) -> Result<RemoteResource, ApiError> {
        let url = format!("{}/scopes/{}/resources/{}", self.base_url, scope_id, id);
        let body = encode(&url, spec)?;
        let value = self.transport.send(Method::PATCH, &url, Some(&body))?;
        decode(&url, value)
    }

    fn resource_page(
        &self,
        scope_id: &str,
        after: Option<&str>,
    ) -> Result<Vec<RemoteResource>, ApiError> {
        let mut url = format!(
            "{}/scopes/{}/resources?limit={}",
            self.base_url, scope_id, PAGE_SIZE
        );
        if let Some(cursor) = after {
            url.push_str("&after=");
            url.push_str(cursor);
        }
        let value = self.transport.send(Method::GET, &url, None)?;
        decode(&url, value)
    }
}

fn decode<T: serde::de::DeserializeOwned>(url: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn encode<T: serde::Serialize>(url: &str, value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}
