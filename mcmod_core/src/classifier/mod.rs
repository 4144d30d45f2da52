pub mod dto;

use regex::{Regex, escape};

use crate::classifier::dto::{AdReason, Classification};

const URL_TLDS: &str =
    "com|net|org|ru|su|ua|by|kz|io|gg|me|info|xyz|pro|online|site|shop|store|club|top|fun|ly|link|рф";

/// Rule-based advertisement detector.
///
/// Rules run in a fixed order and the first match decides the reason:
/// exempt links, Telegram invites, phone numbers, server addresses, keywords,
/// then any other link. `@username` mentions are removed before any rule runs.
#[derive(Debug, Clone)]
pub struct AdClassifier {
    mention: Regex,
    exempt: Option<Regex>,
    invite: Regex,
    phone: Regex,
    ipv4: Regex,
    host_with_port: Regex,
    server_host: Regex,
    url: Regex,
    keywords: Vec<(String, Regex)>,
}

impl AdClassifier {
    pub fn new(keywords: &[String], exempt_domains: &[String]) -> Result<Self, regex::Error> {
        let exempt = if exempt_domains.is_empty() {
            None
        } else {
            let domains = exempt_domains
                .iter()
                .map(|d| escape(&d.to_lowercase()))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(
                r"(?i)\b(?:https?://)?(?:[a-z0-9-]+\.)*(?:{})(?:[/?#]\S*)?",
                domains
            ))?)
        };

        let keywords = keywords
            .iter()
            .map(|word| word.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .map(|word| {
                let re = Regex::new(&format!(r"(?i)\b{}\b", escape(&word)))?;
                Ok::<_, regex::Error>((word, re))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            mention: Regex::new(r"(?:^|[^\w@])@([A-Za-z0-9_]{5,32})")?,
            exempt,
            invite: Regex::new(r"(?i)\b(?:t|telegram)\.(?:me|dog)/|tg://join|\bjoinchat\b")?,
            phone: Regex::new(r"\+?\d[\d\-\s()]{8,}\d")?,
            ipv4: Regex::new(r"\b(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})\b")?,
            host_with_port: Regex::new(r"(?i)\b[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.[a-z]{2,}:\d{2,5}\b")?,
            server_host: Regex::new(
                r"(?i)\b(?:mc|play|server|srv|pvp|hub)\.[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}\b",
            )?,
            url: Regex::new(&format!(
                r"(?i)\b(?:https?://|www\.)\S+|\b[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.(?:{})\b",
                URL_TLDS
            ))?,
            keywords,
        })
    }

    pub fn classify(&self, text: &str) -> Classification {
        let text = self.strip_mentions(text);

        // invites, phones and servers count even when glued onto an exempt link
        let invite = self.invite.is_match(&text);
        let phone = self.has_phone(&text);
        let server = self.has_server_address(&text);

        let (text, had_exempt) = match &self.exempt {
            Some(exempt) if exempt.is_match(&text) => (exempt.replace_all(&text, " ").into_owned(), true),
            _ => (text, false),
        };

        if had_exempt && (invite || phone || server) {
            return Classification::Advertisement(AdReason::LinkWithAddress);
        }
        if invite {
            return Classification::Advertisement(AdReason::TelegramLink);
        }
        if phone {
            return Classification::Advertisement(AdReason::PhoneNumber);
        }
        if server {
            return Classification::Advertisement(AdReason::ServerAddress);
        }
        if let Some((word, _)) = self.keywords.iter().find(|(_, re)| re.is_match(&text)) {
            return Classification::Advertisement(AdReason::Keyword(word.clone()));
        }
        if self.url.is_match(&text) {
            return Classification::Advertisement(AdReason::Link);
        }

        if had_exempt {
            Classification::ExemptLink
        } else {
            Classification::Clean
        }
    }

    // `@name` followed by `.` or `/` is part of a link, not a mention
    fn strip_mentions(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.mention.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if matches!(text[whole.end()..].chars().next(), Some('.' | '/')) {
                continue;
            }
            out.push_str(&text[last..name.start() - 1]);
            out.push(' ');
            last = whole.end();
        }
        out.push_str(&text[last..]);
        out
    }

    // A run of 9+ digits with separators, counted only when it holds 10+ digits.
    fn has_phone(&self, text: &str) -> bool {
        self.phone
            .find_iter(text)
            .any(|m| m.as_str().chars().filter(|c| c.is_ascii_digit()).count() >= 10)
    }

    fn has_server_address(&self, text: &str) -> bool {
        let bare_ip = self.ipv4.captures_iter(text).any(|caps| {
            (1..=4).all(|i| caps[i].parse::<u16>().map(|octet| octet <= 255).unwrap_or(false))
        });
        bare_ip || self.host_with_port.is_match(text) || self.server_host.is_match(text)
    }
}
