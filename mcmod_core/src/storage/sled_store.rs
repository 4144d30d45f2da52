use serde::{Serialize, de::DeserializeOwned};
use sled::{Db, Tree};
use teloxide::types::{ChatId, UserId};

use crate::storage::{
    CounterKind, ModerationStore, StoreResult,
    dto::{DeletedAdEntry, KnownChat, Permit, SanctionRecord},
};

const PERMITS_TREE: &str = "ad_permits";
const STRIKES_TREE: &str = "bot_ad_strikes";
const WARNS_TREE: &str = "manual_warns";
const COOLDOWN_VIOLATIONS_TREE: &str = "cooldown_violations";
const SANCTIONS_TREE: &str = "sanctions";
const DELETED_ADS_TREE: &str = "ad_deleted_logs";
const KNOWN_CHATS_TREE: &str = "known_chats";
const KNOWN_USERS_TREE: &str = "known_users";

/// sled-backed store, one tree per entity.
#[derive(Clone)]
pub struct SledStore {
    db: Db,
    permits: Tree,
    strikes: Tree,
    warns: Tree,
    cooldown_violations: Tree,
    sanctions: Tree,
    deleted_ads: Tree,
    known_chats: Tree,
    known_users: Tree,
}

impl SledStore {
    pub fn new(db: &Db) -> sled::Result<Self> {
        Ok(Self {
            db: db.clone(),
            permits: db.open_tree(PERMITS_TREE)?,
            strikes: db.open_tree(STRIKES_TREE)?,
            warns: db.open_tree(WARNS_TREE)?,
            cooldown_violations: db.open_tree(COOLDOWN_VIOLATIONS_TREE)?,
            sanctions: db.open_tree(SANCTIONS_TREE)?,
            deleted_ads: db.open_tree(DELETED_ADS_TREE)?,
            known_chats: db.open_tree(KNOWN_CHATS_TREE)?,
            known_users: db.open_tree(KNOWN_USERS_TREE)?,
        })
    }

    fn member_key_bytes(chat_id: ChatId, user_id: UserId) -> Vec<u8> {
        let mut v = Vec::with_capacity(16);
        v.extend_from_slice(&chat_id.0.to_be_bytes());
        v.extend_from_slice(&user_id.0.to_be_bytes());
        v
    }

    // chat prefix followed by a monotonically increasing id, so a reversed
    // prefix scan walks a chat's log newest first
    fn log_key_bytes(&self, chat_id: ChatId) -> StoreResult<Vec<u8>> {
        let id = self.db.generate_id()?;
        let mut v = Vec::with_capacity(16);
        v.extend_from_slice(&chat_id.0.to_be_bytes());
        v.extend_from_slice(&id.to_be_bytes());
        Ok(v)
    }

    fn counter_tree(&self, kind: CounterKind) -> &Tree {
        match kind {
            CounterKind::Strikes => &self.strikes,
            CounterKind::AdminWarns => &self.warns,
            CounterKind::CooldownViolations => &self.cooldown_violations,
        }
    }

    fn read<T: DeserializeOwned>(tree: &Tree, key: &[u8]) -> StoreResult<Option<T>> {
        match tree.get(key)? {
            Some(ivec) => Ok(Some(serde_json::from_slice(&ivec)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(tree: &Tree, key: &[u8], value: &T) -> StoreResult<()> {
        let bytes = serde_json::to_vec(value)?;
        tree.insert(key, bytes)?;
        Ok(())
    }

    fn newest_first<T: DeserializeOwned>(tree: &Tree, chat_id: ChatId) -> StoreResult<Vec<T>> {
        let mut out = Vec::new();
        for kv in tree.scan_prefix(chat_id.0.to_be_bytes()).rev() {
            let (_k, ivec) = kv?;
            out.push(serde_json::from_slice(&ivec)?);
        }
        Ok(out)
    }
}

impl ModerationStore for SledStore {
    fn get_permit(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<Option<Permit>> {
        Self::read(&self.permits, &Self::member_key_bytes(chat_id, user_id))
    }

    fn put_permit(&self, chat_id: ChatId, user_id: UserId, permit: &Permit) -> StoreResult<()> {
        Self::write(&self.permits, &Self::member_key_bytes(chat_id, user_id), permit)
    }

    fn delete_permit(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<()> {
        self.permits.remove(Self::member_key_bytes(chat_id, user_id))?;
        Ok(())
    }

    fn get_counter(&self, kind: CounterKind, chat_id: ChatId, user_id: UserId) -> StoreResult<u32> {
        let value = Self::read(self.counter_tree(kind), &Self::member_key_bytes(chat_id, user_id))?;
        Ok(value.unwrap_or(0))
    }

    fn set_counter(
        &self,
        kind: CounterKind,
        chat_id: ChatId,
        user_id: UserId,
        value: u32,
    ) -> StoreResult<()> {
        Self::write(
            self.counter_tree(kind),
            &Self::member_key_bytes(chat_id, user_id),
            &value,
        )
    }

    fn reset_counter(&self, kind: CounterKind, chat_id: ChatId, user_id: UserId) -> StoreResult<()> {
        self.counter_tree(kind)
            .remove(Self::member_key_bytes(chat_id, user_id))?;
        Ok(())
    }

    fn append_sanction(&self, record: &SanctionRecord) -> StoreResult<()> {
        let key = self.log_key_bytes(record.chat_id)?;
        Self::write(&self.sanctions, &key, record)
    }

    fn sanctions(&self, chat_id: ChatId) -> StoreResult<Vec<SanctionRecord>> {
        Self::newest_first(&self.sanctions, chat_id)
    }

    fn append_deleted_ad(&self, entry: &DeletedAdEntry) -> StoreResult<()> {
        let key = self.log_key_bytes(entry.chat_id)?;
        Self::write(&self.deleted_ads, &key, entry)
    }

    fn deleted_ads(&self, chat_id: ChatId) -> StoreResult<Vec<DeletedAdEntry>> {
        Self::newest_first(&self.deleted_ads, chat_id)
    }

    fn upsert_chat(&self, chat: &KnownChat) -> StoreResult<()> {
        Self::write(&self.known_chats, &chat.chat_id.0.to_be_bytes(), chat)
    }

    fn known_chats(&self) -> StoreResult<Vec<KnownChat>> {
        let mut out = Vec::new();
        for kv in self.known_chats.iter() {
            let (_k, ivec) = kv?;
            out.push(serde_json::from_slice::<KnownChat>(&ivec)?);
        }
        out.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        Ok(out)
    }

    fn upsert_username(&self, username: &str, user_id: UserId) -> StoreResult<()> {
        let key = username.trim_start_matches('@').to_lowercase();
        Self::write(&self.known_users, key.as_bytes(), &user_id)
    }

    fn lookup_username(&self, username: &str) -> StoreResult<Option<UserId>> {
        let key = username.trim_start_matches('@').to_lowercase();
        Self::read(&self.known_users, key.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::dto::SanctionKind;

    fn store() -> SledStore {
        let db = sled::Config::new().temporary(true).open().unwrap();
        SledStore::new(&db).unwrap()
    }

    fn sanction(chat: i64, user: u64, kind: SanctionKind, created_at: i64) -> SanctionRecord {
        SanctionRecord {
            chat_id: ChatId(chat),
            user_id: UserId(user),
            kind,
            until: None,
            reason: "test".to_string(),
            admin_id: UserId(1),
            created_at,
        }
    }

    #[test]
    fn test_missing_records_default_to_nothing() {
        let store = store();
        let (chat, user) = (ChatId(-100), UserId(7));
        assert_eq!(store.get_permit(chat, user).unwrap(), None);
        assert_eq!(store.get_counter(CounterKind::Strikes, chat, user).unwrap(), 0);
        assert!(store.sanctions(chat).unwrap().is_empty());
        assert_eq!(store.lookup_username("nobody").unwrap(), None);
    }

    #[test]
    fn test_counters_are_independent() {
        let store = store();
        let (chat, user) = (ChatId(-100), UserId(7));
        store.set_counter(CounterKind::Strikes, chat, user, 2).unwrap();
        store.set_counter(CounterKind::AdminWarns, chat, user, 3).unwrap();

        store.reset_counter(CounterKind::Strikes, chat, user).unwrap();

        assert_eq!(store.get_counter(CounterKind::Strikes, chat, user).unwrap(), 0);
        assert_eq!(store.get_counter(CounterKind::AdminWarns, chat, user).unwrap(), 3);
        assert_eq!(
            store.get_counter(CounterKind::CooldownViolations, chat, user).unwrap(),
            0
        );
    }

    #[test]
    fn test_permit_roundtrip_and_delete() {
        let store = store();
        let (chat, user) = (ChatId(-100), UserId(7));
        let permit = Permit {
            expires_at: Some(500),
            last_ad_sent_at: None,
            granted_at: 100,
        };
        store.put_permit(chat, user, &permit).unwrap();
        assert_eq!(store.get_permit(chat, user).unwrap(), Some(permit));
        assert_eq!(store.get_permit(chat, UserId(8)).unwrap(), None);

        store.delete_permit(chat, user).unwrap();
        store.delete_permit(chat, user).unwrap();
        assert_eq!(store.get_permit(chat, user).unwrap(), None);
    }

    #[test]
    fn test_logs_are_newest_first_and_per_chat() {
        let store = store();
        store.append_sanction(&sanction(-100, 7, SanctionKind::Warn, 1)).unwrap();
        store.append_sanction(&sanction(-200, 7, SanctionKind::Ban, 2)).unwrap();
        store.append_sanction(&sanction(-100, 8, SanctionKind::Mute, 3)).unwrap();

        let history = store.sanctions(ChatId(-100)).unwrap();
        let kinds: Vec<_> = history.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![SanctionKind::Mute, SanctionKind::Warn]);
        assert_eq!(store.sanctions(ChatId(-200)).unwrap().len(), 1);
    }

    #[test]
    fn test_usernames_are_case_insensitive() {
        let store = store();
        store.upsert_username("Steve_MC", UserId(42)).unwrap();
        assert_eq!(store.lookup_username("@steve_mc").unwrap(), Some(UserId(42)));
        assert_eq!(store.lookup_username("STEVE_MC").unwrap(), Some(UserId(42)));
    }

    #[test]
    fn test_known_chats_upsert_keeps_latest_title() {
        let store = store();
        let chat = |title: &str, last_seen| KnownChat {
            chat_id: ChatId(-100),
            title: title.to_string(),
            last_seen,
        };
        store.upsert_chat(&chat("Old", 1)).unwrap();
        store.upsert_chat(&chat("New", 2)).unwrap();
        let chats = store.known_chats().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].title, "New");
    }
}
