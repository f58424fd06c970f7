//! Credential records produced by the token lifecycle

use serde::{Deserialize, Serialize};

/// Short-lived sandbox credential, stored in `publicTokens`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicToken {
    pub token: String,
}

impl PublicToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

/// Durable credential for a linked item, stored in `accessTokens`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

/// Shorten a credential for log output
///
/// Keeps the environment prefix (e.g. `access-sandbox-`) and the last four
/// characters so log lines can be correlated without leaking the secret.
pub fn redact(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    let mut parts = token.splitn(3, '-');
    let prefix = match (parts.next(), parts.next(), parts.next()) {
        (Some(kind), Some(env), Some(rest)) if rest.chars().count() > 4 => {
            format!("{}-{}-", kind, env)
        }
        _ => String::new(),
    };
    format!("{}****{}", prefix, suffix)
}
