use std::sync::Arc;

use teloxide::types::ChatId;

use crate::storage::{
    ModerationStore, StoreResult,
    dto::{DeletedAdEntry, Page, SanctionRecord},
};

/// A sanction row with its status at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanctionView {
    pub record: SanctionRecord,
    /// `None` for kinds that carry no status (warn, kick, reversals).
    pub active: Option<bool>,
}

/// Insert-only history of manual sanctions and automatic deletions.
#[derive(Clone)]
pub struct SanctionLog {
    store: Arc<dyn ModerationStore>,
}

impl SanctionLog {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    pub fn record_sanction(&self, record: &SanctionRecord) -> StoreResult<()> {
        self.store.append_sanction(record)
    }

    pub fn record_deleted_ad(&self, entry: &DeletedAdEntry) -> StoreResult<()> {
        self.store.append_deleted_ad(entry)
    }

    /// Newest-first page; a mute or ban is active while unexpired and not
    /// followed by a reversal or re-application for the same user.
    pub fn sanction_page(
        &self,
        chat_id: ChatId,
        page: usize,
        page_size: usize,
        now: i64,
    ) -> StoreResult<Page<SanctionView>> {
        let history = self.store.sanctions(chat_id)?;
        let views = history
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let active = record.kind.is_restriction().then(|| {
                    let unexpired = record.until.map_or(true, |until| until > now);
                    let superseded = history[..i].iter().any(|later| {
                        later.user_id == record.user_id && record.kind.superseded_by(later.kind)
                    });
                    unexpired && !superseded
                });
                SanctionView {
                    record: record.clone(),
                    active,
                }
            })
            .collect();
        Ok(Page::paginate(views, page, page_size))
    }

    pub fn deleted_ads_page(
        &self,
        chat_id: ChatId,
        page: usize,
        page_size: usize,
    ) -> StoreResult<Page<DeletedAdEntry>> {
        Ok(Page::paginate(self.store.deleted_ads(chat_id)?, page, page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::dto::SanctionKind, testing::temp_store};
    use teloxide::types::UserId;

    fn record(user: u64, kind: SanctionKind, until: Option<i64>) -> SanctionRecord {
        SanctionRecord {
            chat_id: ChatId(-1),
            user_id: UserId(user),
            kind,
            until,
            reason: "r".to_string(),
            admin_id: UserId(1),
            created_at: 0,
        }
    }

    #[test]
    fn test_active_status_is_computed_at_query_time() {
        let log = SanctionLog::new(temp_store());
        log.record_sanction(&record(5, SanctionKind::Mute, Some(1_000))).unwrap();
        log.record_sanction(&record(6, SanctionKind::Ban, None)).unwrap();
        log.record_sanction(&record(7, SanctionKind::Mute, Some(50))).unwrap();
        log.record_sanction(&record(5, SanctionKind::Warn, None)).unwrap();

        let page = log.sanction_page(ChatId(-1), 1, 10, 100).unwrap();
        let status: Vec<_> = page.items.iter().map(|v| v.active).collect();
        assert_eq!(status, vec![None, Some(false), Some(true), Some(true)]);
    }

    #[test]
    fn test_reversal_supersedes_restriction() {
        let log = SanctionLog::new(temp_store());
        log.record_sanction(&record(5, SanctionKind::Ban, None)).unwrap();
        log.record_sanction(&record(5, SanctionKind::Mute, None)).unwrap();
        log.record_sanction(&record(5, SanctionKind::Unban, None)).unwrap();

        let page = log.sanction_page(ChatId(-1), 1, 10, 0).unwrap();
        let status: Vec<_> = page.items.iter().map(|v| v.active).collect();
        assert_eq!(status, vec![None, Some(true), Some(false)]);
    }

    #[test]
    fn test_pages_are_clamped() {
        let log = SanctionLog::new(temp_store());
        for _ in 0..23 {
            log.record_sanction(&record(5, SanctionKind::Warn, None)).unwrap();
        }
        let last = log.sanction_page(ChatId(-1), 99, 10, 0).unwrap();
        assert_eq!((last.page, last.pages, last.items.len()), (3, 3, 3));
        let first = log.sanction_page(ChatId(-1), 0, 10, 0).unwrap();
        assert_eq!((first.page, first.items.len()), (1, 10));

        let empty = log.deleted_ads_page(ChatId(-1), 4, 5).unwrap();
        assert_eq!((empty.page, empty.pages, empty.total), (1, 1, 0));
    }
}
