//! Blocking HTTP contacts service.
//!
//! Speaks the GData-style JSON surface of the remote contacts account:
//! `…/contacts/default/full` for the entry feed, `…/groups/default/full`
//! for the group directory, and `…/contacts/default/full/batch` for batch
//! submits. Calls are blocking; the merge pass treats them as opaque
//! synchronous collaborator calls.

use std::collections::HashMap;

use chrono::Utc;
use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;

use crate::batch::PendingOp;
use crate::entry::{EntryEmail, EntryId, EntryPhone, Group, GroupMembership, RemoteEntry};
use crate::error::ServiceError;
use crate::feed::RemoteFeed;
use crate::service::ContactsService;

/// Configuration for the HTTP service.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Feed root, without a trailing slash.
    pub base_url: String,
    /// Bearer token sent with every request, when present. Requests
    /// without a token are answered with an authorization challenge.
    pub auth_token: Option<String>,
    /// Page size requested for the feed fetch; the merge wants the whole
    /// account in one snapshot.
    pub max_results: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/m8/feeds".to_string(),
            auth_token: None,
            max_results: 99_999,
        }
    }
}

/// [`ContactsService`] implementation over blocking HTTP.
pub struct HttpContactsService {
    config: HttpConfig,
    client: Client,
}

impl HttpContactsService {
    /// Creates a service over the given configuration.
    #[must_use]
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn check_status(status: StatusCode) -> Result<(), ServiceError> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ServiceError::AuthRequired {
                authorization_url: None,
            });
        }
        if !status.is_success() {
            return Err(ServiceError::ServerError {
                code: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }
        Ok(())
    }

    fn get_json(&self, url: &str) -> Result<Value, ServiceError> {
        debug!("GET {url}");
        let mut req = self.client.get(url);
        if let Some(token) = &self.config.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let resp = req.send().map_err(|e| ServiceError::ConnectionFailed {
            message: e.to_string(),
        })?;
        Self::check_status(resp.status())?;
        resp.json::<Value>()
            .map_err(|e| ServiceError::InvalidResponse {
                message: e.to_string(),
            })
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<Value, ServiceError> {
        debug!("POST {url}");
        let mut req = self.client.post(url).json(body);
        if let Some(token) = &self.config.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let resp = req.send().map_err(|e| ServiceError::ConnectionFailed {
            message: e.to_string(),
        })?;
        Self::check_status(resp.status())?;
        resp.json::<Value>()
            .map_err(|e| ServiceError::InvalidResponse {
                message: e.to_string(),
            })
    }
}

impl ContactsService for HttpContactsService {
    fn fetch_feed(&self) -> Result<RemoteFeed, ServiceError> {
        let url = format!(
            "{}/contacts/default/full?alt=json&max-results={}",
            self.base(),
            self.config.max_results
        );
        let body = self.get_json(&url)?;
        let feed = parse_feed(&body)?;
        debug!("fetched {} feed entries", feed.len());
        Ok(feed)
    }

    fn fetch_groups(&self) -> Result<HashMap<String, String>, ServiceError> {
        let url = format!("{}/groups/default/full?alt=json", self.base());
        let body = self.get_json(&url)?;
        parse_groups(&body)
    }

    fn create_group(&self, name: &str) -> Result<Group, ServiceError> {
        let url = format!("{}/groups/default/full?alt=json", self.base());
        let body = serde_json::json!({
            "entry": {
                "title": {"$t": name},
                "content": {"$t": name},
            }
        });
        let response = self.post_json(&url, &body)?;
        let href = response
            .get("entry")
            .and_then(|e| gd_text(e.get("id")))
            .ok_or_else(|| ServiceError::GroupCreationFailed {
                name: name.to_string(),
                message: "no group id in response".to_string(),
            })?;
        Ok(Group::new(href))
    }

    fn submit_batch(&self, ops: &[PendingOp]) -> Result<(), ServiceError> {
        let url = format!("{}/contacts/default/full/batch?alt=json", self.base());
        let body = serde_json::to_value(ops).map_err(|e| ServiceError::InvalidResponse {
            message: e.to_string(),
        })?;
        debug!("submitting batch of {} operations", ops.len());
        self.post_json(&url, &body)?;
        Ok(())
    }
}

fn gd_text(value: Option<&Value>) -> Option<&str> {
    value.and_then(|v| v.get("$t")).and_then(Value::as_str)
}

fn parse_entry(value: &Value) -> RemoteEntry {
    let id = gd_text(value.get("id")).map(EntryId::new);
    let title = gd_text(value.get("title")).map(str::to_string);

    let phone_numbers = value
        .get("gd$phoneNumber")
        .and_then(Value::as_array)
        .map(|numbers| {
            numbers
                .iter()
                .filter_map(|n| {
                    let text = gd_text(Some(n)).or_else(|| {
                        n.get("uri").and_then(Value::as_str)
                    })?;
                    Some(EntryPhone {
                        rel: n
                            .get("rel")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        text: text.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let emails = value
        .get("gd$email")
        .and_then(Value::as_array)
        .map(|emails| {
            emails
                .iter()
                .filter_map(|e| {
                    let address = e.get("address").and_then(Value::as_str)?;
                    Some(EntryEmail {
                        rel: e
                            .get("rel")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        address: address.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let group_memberships = value
        .get("gContact$groupMembershipInfo")
        .and_then(Value::as_array)
        .map(|groups| {
            groups
                .iter()
                .filter_map(|g| g.get("href").and_then(Value::as_str))
                .map(|href| GroupMembership {
                    href: href.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    RemoteEntry {
        id,
        title,
        phone_numbers,
        emails,
        group_memberships,
    }
}

fn parse_feed(body: &Value) -> Result<RemoteFeed, ServiceError> {
    let entries = body
        .get("feed")
        .and_then(|f| f.get("entry"))
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(parse_entry).collect())
        .unwrap_or_default();
    Ok(RemoteFeed::new(entries, Utc::now()))
}

fn parse_groups(body: &Value) -> Result<HashMap<String, String>, ServiceError> {
    let mut groups = HashMap::new();
    if let Some(entries) = body
        .get("feed")
        .and_then(|f| f.get("entry"))
        .and_then(Value::as_array)
    {
        for entry in entries {
            let name = gd_text(entry.get("content")).or_else(|| gd_text(entry.get("title")));
            let href = gd_text(entry.get("id"));
            if let (Some(name), Some(href)) = (name, href) {
                groups.insert(name.to_string(), href.to_string());
            }
        }
    }
    Ok(groups)
}
