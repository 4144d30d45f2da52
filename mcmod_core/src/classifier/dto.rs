use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a message was classified as an advertisement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdReason {
    /// An exempt video link next to an invite, phone number or server address.
    LinkWithAddress,
    TelegramLink,
    PhoneNumber,
    ServerAddress,
    Keyword(String),
    Link,
}

impl fmt::Display for AdReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdReason::LinkWithAddress => write!(f, "link/address"),
            AdReason::TelegramLink => write!(f, "telegram link"),
            AdReason::PhoneNumber => write!(f, "phone number"),
            AdReason::ServerAddress => write!(f, "server address/IP"),
            AdReason::Keyword(word) => write!(f, "keyword: {}", word),
            AdReason::Link => write!(f, "link"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Clean,
    /// Only exempt links (video sharing) were found.
    ExemptLink,
    Advertisement(AdReason),
}

impl Classification {
    pub fn is_ad(&self) -> bool {
        matches!(self, Classification::Advertisement(_))
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            Classification::Clean => None,
            Classification::ExemptLink => Some("exempt-link".to_string()),
            Classification::Advertisement(reason) => Some(reason.to_string()),
        }
    }
}
