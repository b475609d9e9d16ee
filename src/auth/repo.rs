use std::{
    collections::{hash_map::Entry, HashMap},
    sync::RwLock,
};

use async_trait::async_trait;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record owned by the repository.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,      // assigned on insert
    pub email: String, // normalized, unique key
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never plaintext
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields supplied by the caller; the repository assigns the rest.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    fn into_user(self) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            email: self.email,
            password_hash: self.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Keyed user storage. Keys are normalized emails.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user, silently replacing any existing entry with the same email.
    async fn create(&self, user: NewUser) -> anyhow::Result<User>;

    /// Inserts only if the email is free. Returns `None` when it is taken.
    async fn create_if_absent(&self, user: NewUser) -> anyhow::Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
}

/// Process-lifetime store behind a reader/writer lock.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let user = user.into_user();
        let mut users = self
            .users
            .write()
            .map_err(|_| anyhow::anyhow!("user store lock poisoned"))?;
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn create_if_absent(&self, user: NewUser) -> anyhow::Result<Option<User>> {
        let mut users = self
            .users
            .write()
            .map_err(|_| anyhow::anyhow!("user store lock poisoned"))?;
        match users.entry(user.email.clone()) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(slot) => Ok(Some(slot.insert(user.into_user()).clone())),
        }
    }

    async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|_| anyhow::anyhow!("user store lock poisoned"))?;
        Ok(users.get(email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use super::*;

    fn new_user(email: &str, hash: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: hash.into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("a@b.com", "hash")).await.unwrap();
        assert!(!user.id.is_nil());
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.created_at, user.updated_at);

        let found = repo.get_by_email("a@b.com").await.unwrap().expect("stored");
        assert_eq!(found, user);
    }

    #[tokio::test]
    async fn missing_email_is_none_not_error() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_overwrites_existing_entry() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(new_user("a@b.com", "first")).await.unwrap();
        let second = repo.create(new_user("a@b.com", "second")).await.unwrap();
        assert_ne!(first.id, second.id);

        let found = repo.get_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(found.id, second.id);
        assert_eq!(found.password_hash, "second");
    }

    #[tokio::test]
    async fn create_if_absent_keeps_first_entry() {
        let repo = InMemoryUserRepository::new();
        let first = repo
            .create_if_absent(new_user("a@b.com", "first"))
            .await
            .unwrap()
            .expect("inserted");
        assert!(repo
            .create_if_absent(new_user("a@b.com", "second"))
            .await
            .unwrap()
            .is_none());

        let found = repo.get_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.password_hash, "first");
    }

    #[tokio::test]
    async fn returned_user_is_a_copy() {
        let repo = InMemoryUserRepository::new();
        let mut user = repo.create(new_user("a@b.com", "hash")).await.unwrap();
        user.password_hash = "mutated".into();
        let found = repo.get_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(found.password_hash, "hash");
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.com".into(),
            password_hash: "secret-hash".into(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("a@b.com"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_distinct_creates_are_all_retrievable() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let mut handles = Vec::new();
        for i in 0..64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.create(new_user(&format!("user{i}@example.com"), "hash"))
                    .await
                    .unwrap()
            }));
        }
        let mut ids = HashSet::new();
        for h in handles {
            ids.insert(h.await.unwrap().id);
        }
        assert_eq!(ids.len(), 64);

        for i in 0..64 {
            let found = repo
                .get_by_email(&format!("user{i}@example.com"))
                .await
                .unwrap()
                .expect("retrievable");
            assert!(ids.contains(&found.id));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_same_email_creates_leave_one_winner() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.create(new_user("same@example.com", &format!("hash{i}")))
                    .await
                    .unwrap()
            }));
        }
        let mut created = Vec::new();
        for h in handles {
            created.push(h.await.unwrap());
        }

        let winner = repo.get_by_email("same@example.com").await.unwrap().unwrap();
        let matching: Vec<_> = created.iter().filter(|u| **u == winner).collect();
        assert_eq!(matching.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_create_if_absent_has_single_winner() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.create_if_absent(new_user("race@example.com", &format!("hash{i}")))
                    .await
                    .unwrap()
            }));
        }
        let mut winners = Vec::new();
        for h in handles {
            if let Some(u) = h.await.unwrap() {
                winners.push(u);
            }
        }
        assert_eq!(winners.len(), 1);
        let stored = repo.get_by_email("race@example.com").await.unwrap().unwrap();
        assert_eq!(stored, winners[0]);
    }
}
