use teloxide::utils::html;

use crate::{
    helpers::{
        duration::format_time_duration,
        text::{format_until, preview, user_link},
    },
    sanction_log::SanctionView,
    storage::dto::{DeletedAdEntry, Page},
};

const SEPARATOR: &str = "━━━━━━━━━━━━━━";

fn reason_line(reason: &str) -> String {
    format!("Reason: <code>{}</code>", html::escape(reason))
}

pub fn warned(who: &str, warns: u32, limit: u32, reason: &str) -> String {
    format!(
        "⚠️ {} received a warning <b>{}/{}</b>.\n{}",
        who,
        warns,
        limit,
        reason_line(reason)
    )
}

pub fn auto_banned(who: &str, warns: u32, limit: u32, ban_secs: u64, reason: &str) -> String {
    format!(
        "⛔ {} is <b>banned for {}</b> (warnings: <b>{}/{}</b>).\n{}",
        who,
        format_time_duration(ban_secs),
        warns,
        limit,
        reason_line(reason)
    )
}

pub fn unwarned(who: &str, reason: &str) -> String {
    format!("✅ {} warnings were reset.\n{}", who, reason_line(reason))
}

pub fn muted(who: &str, until: Option<i64>, reason: &str) -> String {
    format!(
        "🔇 {} is muted.\nUntil: <b>{}</b>\n{}",
        who,
        format_until(until),
        reason_line(reason)
    )
}

pub fn unmuted(who: &str, reason: &str) -> String {
    format!("✅ {} is unmuted.\n{}", who, reason_line(reason))
}

pub fn banned(who: &str, until: Option<i64>, reason: &str) -> String {
    format!(
        "⛔ {} is banned.\nUntil: <b>{}</b>\n{}",
        who,
        format_until(until),
        reason_line(reason)
    )
}

pub fn unbanned(who: &str, reason: &str) -> String {
    format!("✅ {} is unbanned.\n{}", who, reason_line(reason))
}

pub fn kicked(who: &str, reason: &str) -> String {
    format!("👢 {} was kicked.\n{}", who, reason_line(reason))
}

pub fn permit_granted(who: &str, expires_at: Option<i64>, tag: &str) -> String {
    format!(
        "✅ {} may now post ads until <b>{}</b>.\nOne ad per 24 hours, ending with <b>{}</b>.",
        who,
        format_until(expires_at),
        html::escape(tag)
    )
}

pub fn permit_revoked(who: &str) -> String {
    format!("🚫 {} no longer has an advertising permit.", who)
}

pub fn missing_rights() -> &'static str {
    "\n\n⚠️ Telegram rejected the action. Make sure I am an admin with the right to restrict members."
}

pub fn sanction_page(page: &Page<SanctionView>) -> String {
    let mut out = vec![format!(
        "📄 <b>Sanctions</b>, page {}/{}\n",
        page.page, page.pages
    )];
    if page.items.is_empty() {
        out.push("Nothing here yet.".to_string());
        return out.join("\n");
    }
    for view in &page.items {
        let record = &view.record;
        let status = match view.active {
            Some(true) => " [active]",
            Some(false) => " [inactive]",
            None => "",
        };
        let action = if record.kind.is_restriction() {
            format!(
                "{} until: <b>{}</b>{}",
                record.kind.as_str(),
                format_until(record.until),
                status
            )
        } else {
            record.kind.as_str().to_string()
        };
        out.push(format!(
            "{}\n👤 <code>{}</code>\n⚙️ {}\n🕒 issued: {}\n📝 reason: <code>{}</code>",
            SEPARATOR,
            record.user_id,
            action,
            format_until(Some(record.created_at)),
            html::escape(&record.reason)
        ));
    }
    if page.page < page.pages {
        out.push(format!("\nNext page: <code>/mclist {}</code>", page.page + 1));
    }
    out.join("\n")
}

pub fn deleted_ads_page(page: &Page<DeletedAdEntry>) -> String {
    let mut out = vec![format!(
        "🗑 <b>Deleted ads</b>, page {}/{}\n",
        page.page, page.pages
    )];
    if page.items.is_empty() {
        out.push("Nothing here yet.".to_string());
        return out.join("\n");
    }
    for entry in &page.items {
        out.push(format!(
            "{}\n👤 {} (<code>{}</code>)\n🕒 {}\n📝 {}\n💬 <code>{}</code>",
            SEPARATOR,
            user_link(entry.user_id, &entry.display_name, entry.username.as_deref()),
            entry.user_id,
            format_until(Some(entry.created_at)),
            html::escape(&entry.reason),
            html::escape(&preview(&entry.text, 300))
        ));
    }
    if page.page < page.pages {
        out.push(format!("\nNext page: <code>/adlogs {}</code>", page.page + 1));
    }
    out.join("\n")
}
