//! Reqwest-backed user directory adapter.
//!
//! This adapter owns transport details only: URL construction, cache
//! headers, timeout and HTTP error mapping, and JSON decoding into domain
//! records.

use std::time::Duration;

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::UsersResponseDto;
use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::{UserId, UserRecord, UserUpdate};

const USERS_SEGMENT: &str = "users";

/// User directory that talks to a DummyJSON-compatible REST service.
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    client: Client,
    base_url: Url,
}

impl HttpUserDirectory {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// `base_url` may carry a path prefix; `/users` is appended to it.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, id: Option<UserId>) -> Result<Url, UserDirectoryError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                UserDirectoryError::invalid_request(format!(
                    "base URL {} cannot carry a path",
                    self.base_url
                ))
            })?;
            segments.pop_if_empty().push(USERS_SEGMENT);
            if let Some(user_id) = id {
                segments.push(&user_id.to_string());
            }
        }
        url.set_query(None);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        request: RequestBuilder,
        missing: Option<UserId>,
    ) -> Result<T, UserDirectoryError> {
        let response = request
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(match missing {
                Some(id) if status == StatusCode::NOT_FOUND => UserDirectoryError::not_found(id),
                _ => map_status_error(status, body.as_ref()),
            });
        }
        decode(body.as_ref())
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn list_users(
        &self,
        request: PageRequest,
    ) -> Result<Paginated<UserRecord>, UserDirectoryError> {
        let mut url = self.endpoint(None)?;
        request.apply_to(&mut url);
        debug!(%url, "listing users");

        let decoded: UsersResponseDto = Self::send(self.client.get(url), None).await?;
        decoded.into_page(request)
    }

    async fn fetch_user(&self, id: UserId) -> Result<UserRecord, UserDirectoryError> {
        let url = self.endpoint(Some(id))?;
        debug!(%url, "fetching user");
        Self::send(self.client.get(url), Some(id)).await
    }

    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<UserRecord, UserDirectoryError> {
        let url = self.endpoint(Some(id))?;
        debug!(%url, "updating user");
        Self::send(self.client.put(url).json(update), Some(id)).await
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, UserDirectoryError> {
    serde_json::from_slice(body).map_err(|error| {
        UserDirectoryError::decode(format!("invalid user service JSON payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> UserDirectoryError {
    if error.is_timeout() {
        UserDirectoryError::timeout(error.to_string())
    } else {
        UserDirectoryError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> UserDirectoryError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        status.canonical_reason().unwrap_or("no body").to_owned()
    } else {
        preview
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            UserDirectoryError::timeout(format!("status {}: {message}", status.as_u16()))
        }
        _ => UserDirectoryError::status(status.as_u16(), message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    fn directory(base: &str) -> HttpUserDirectory {
        HttpUserDirectory::new(
            Url::parse(base).expect("valid base URL"),
            Duration::from_secs(1),
        )
        .expect("client builds")
    }

    #[rstest]
    #[case("https://dummyjson.com", None, "https://dummyjson.com/users")]
    #[case("https://dummyjson.com/", Some(7), "https://dummyjson.com/users/7")]
    #[case("http://127.0.0.1:9000/api/", Some(12), "http://127.0.0.1:9000/api/users/12")]
    #[case("http://localhost/v1?debug=1", None, "http://localhost/v1/users")]
    fn builds_endpoints_under_the_base_path(
        #[case] base: &str,
        #[case] id: Option<u64>,
        #[case] expected: &str,
    ) {
        let url = directory(base)
            .endpoint(id.map(UserId::new))
            .expect("endpoint builds");
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn rejects_bases_that_cannot_carry_a_path() {
        let error = directory("mailto:admin@example.com")
            .endpoint(None)
            .expect_err("mailto has no path");
        assert!(matches!(error, UserDirectoryError::InvalidRequest { .. }));
    }

    #[rstest]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "Status")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "Status")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, "Timeout")]
    fn maps_http_statuses_to_directory_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, b"{\"message\":\"backend unavailable\"}");
        match expected {
            "Status" => assert!(
                matches!(error, UserDirectoryError::Status { status: code, .. } if code == status.as_u16()),
                "{status} should map to Status",
            ),
            "Timeout" => assert!(
                matches!(error, UserDirectoryError::Timeout { .. }),
                "{status} should map to Timeout",
            ),
            _ => panic!("unsupported test expectation: {expected}"),
        }
    }

    #[test]
    fn empty_error_bodies_fall_back_to_the_reason_phrase() {
        let error = map_status_error(StatusCode::SERVICE_UNAVAILABLE, b"  ");
        assert_eq!(
            error,
            UserDirectoryError::status(503_u16, "Service Unavailable")
        );
    }

    #[test]
    fn previews_are_compacted_and_truncated() {
        let body = format!("line one\n\n  {}", "x".repeat(400));
        let preview = body_preview(body.as_bytes());

        assert!(preview.starts_with("line one x"));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);
    }

    #[test]
    fn decodes_service_users_ignoring_extra_fields() {
        let body = br#"{
            "id": 5,
            "firstName": "Emily",
            "lastName": "Johnson",
            "maidenName": "Smith",
            "age": 28,
            "gender": "female",
            "email": "emily.johnson@x.dummyjson.com",
            "username": "emilys",
            "password": "emilyspass",
            "birthDate": "1996-5-30",
            "address": { "city": "Phoenix" }
        }"#;

        let record: UserRecord = decode(body).expect("record decodes");
        assert_eq!(record.id, UserId::new(5));
        assert_eq!(record.username, "emilys");
        assert_eq!(
            record.birth_date,
            chrono::NaiveDate::from_ymd_opt(1996, 5, 30)
        );
    }

    #[test]
    fn malformed_bodies_map_to_decode_errors() {
        let error = decode::<UserRecord>(b"<html>oops</html>").expect_err("not JSON");
        assert!(matches!(error, UserDirectoryError::Decode { .. }));
    }
}
