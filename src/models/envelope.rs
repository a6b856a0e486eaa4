//! Response envelope and pagination wrappers shared by every endpoint

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ApiError, ApiResult};

/// Envelope code the server uses for success
pub const CODE_OK: i64 = 200;

/// The `{code, message, data}` wrapper around every API response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    /// Application status code (200 = success)
    pub code: i64,
    /// Human-readable message from the server
    #[serde(default)]
    pub message: String,
    /// Payload, absent on failure and on unit endpoints
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Whether the server reported success
    pub const fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }

    /// Unwrap the payload, treating a non-200 code or missing data as an error
    pub fn into_data(self) -> ApiResult<T> {
        if !self.is_ok() {
            return Err(ApiError::Server {
                code: self.code,
                message: self.message,
            });
        }
        self.data.ok_or(ApiError::MissingData)
    }

    /// Unwrap the payload when it is optional on success
    pub fn into_optional(self) -> ApiResult<Option<T>> {
        if self.is_ok() {
            Ok(self.data)
        } else {
            Err(ApiError::Server {
                code: self.code,
                message: self.message,
            })
        }
    }

    /// Check the code only, discarding any payload
    pub fn into_unit(self) -> ApiResult<()> {
        self.into_optional().map(|_| ())
    }
}

/// A page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Total number of items on the server
    #[serde(default)]
    pub total: i64,
    /// Page number (1-based)
    #[serde(default = "first_page")]
    pub page: u32,
    /// Requested page size
    #[serde(default)]
    pub page_size: u32,
    /// Items on this page; a null list decodes as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub list: Vec<T>,
}

const fn first_page() -> u32 {
    1
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_carries_server_message() {
        let env: Envelope<u32> =
            serde_json::from_str(r#"{"code":403,"message":"coins not enough","data":null}"#)
                .unwrap();
        match env.into_data() {
            Err(ApiError::Server { code, message }) => {
                assert_eq!(code, 403);
                assert_eq!(message, "coins not enough");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_success_without_data() {
        let env: Envelope<u32> = serde_json::from_str(r#"{"code":200,"message":"ok"}"#).unwrap();
        assert!(matches!(env.clone().into_data(), Err(ApiError::MissingData)));
        assert!(env.into_unit().is_ok());
    }

    #[test]
    fn test_null_list_is_empty() {
        let page: Page<u32> =
            serde_json::from_str(r#"{"total":0,"page":1,"page_size":20,"list":null}"#).unwrap();
        assert!(page.list.is_empty());
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Item {
        id: i64,
    }

    #[test]
    fn test_payload_type_needs_no_default() {
        let env: Envelope<Page<Item>> = serde_json::from_str(
            r#"{"code":200,"message":"ok","data":{"total":2,"list":[{"id":7},{"id":3}]}}"#,
        )
        .unwrap();
        let page = env.into_data().unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.list, vec![Item { id: 7 }, Item { id: 3 }]);

        let env: Envelope<Item> = serde_json::from_str(r#"{"code":200}"#).unwrap();
        assert!(matches!(env.into_data(), Err(ApiError::MissingData)));
    }
}
