//! Chat notices sent by the decision engine. All output is HTML.

use teloxide::utils::html;

use crate::helpers::duration::format_time_duration;

pub fn no_permit(who: &str, tag: &str, support_contact: &str, rules_link: &str) -> String {
    format!(
        "🚫 {who}, you don't have an advertising permit in this chat, so your message with <b>{tag}</b> was removed.\n\n\
         To get a permit, contact {support}.\n\
         📜 Rules: {rules}",
        who = who,
        tag = html::escape(tag),
        support = html::escape(support_contact),
        rules = html::escape(rules_link),
    )
}

pub fn missing_end_tag(who: &str, tag: &str) -> String {
    format!(
        "⚠️ {}, your ad was removed: the tag <b>{}</b> must be at the very end of the message.",
        who,
        html::escape(tag)
    )
}

pub fn cooldown(who: &str, remaining_secs: u64) -> String {
    format!(
        "⏳ {}, only one ad per 24 hours is allowed. You can post again in <b>{}</b>.",
        who,
        format_time_duration(remaining_secs)
    )
}

pub fn permit_revoked_for_abuse(who: &str, violations: u32) -> String {
    format!(
        "⛔ {}, your advertising permit was revoked after {} cooldown violations.",
        who, violations
    )
}

pub fn strike_warning(who: &str, reason: &str, tag: &str) -> String {
    format!(
        "⚠️ {}, advertising is not allowed here without a permit (<code>{}</code>).\n\
         This is a warning. Permitted ads must end with <b>{}</b>.",
        who,
        html::escape(reason),
        html::escape(tag)
    )
}

pub fn strike_mute(who: &str, reason: &str, mute_secs: u64, counter_reset: bool) -> String {
    let tail = if counter_reset {
        "\nYour violation counter has been reset."
    } else {
        "\nNext time the mute will be longer."
    };
    format!(
        "🔇 {}, repeated advertising without a permit (<code>{}</code>). Muted for <b>{}</b>.{}",
        who,
        html::escape(reason),
        format_time_duration(mute_secs),
        tail
    )
}

pub fn missing_rights() -> String {
    "⚠️ I need admin rights to delete messages and restrict members in this chat.".to_string()
}
