//! Mutex-guarded account store.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{StoredAccount, UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserId};

/// [`UserRepository`] keeping accounts in memory.
#[derive(Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<Vec<StoredAccount>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredAccount>>, UserPersistenceError> {
        self.accounts
            .lock()
            .map_err(|_| UserPersistenceError::query("account store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, account: &StoredAccount) -> Result<(), UserPersistenceError> {
        let mut accounts = self.lock()?;
        if accounts
            .iter()
            .any(|existing| existing.user.email() == account.user.email())
        {
            return Err(UserPersistenceError::duplicate_email(
                account.user.email().as_ref(),
            ));
        }
        accounts.push(account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .iter()
            .find(|account| account.user.id() == id)
            .map(|account| account.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredAccount>, UserPersistenceError> {
        Ok(self
            .lock()?
            .iter()
            .find(|account| account.user.email() == email)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserName;
    use crate::domain::ports::PasswordDigest;
    use rstest::rstest;

    fn account(email: &str) -> StoredAccount {
        StoredAccount {
            user: User::new(
                UserId::random(),
                UserName::new("Ada Lovelace").expect("name"),
                Email::new(email).expect("email"),
            ),
            password: PasswordDigest::new("digest"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn stores_and_finds_accounts() {
        let repo = InMemoryUserRepository::new();
        let stored = account("ada@example.com");
        repo.insert(&stored).await.expect("insert");

        let by_id = repo.find_by_id(stored.user.id()).await.expect("lookup");
        assert_eq!(by_id.as_ref(), Some(&stored.user));
        let by_email = repo
            .find_by_email(stored.user.email())
            .await
            .expect("lookup");
        assert_eq!(by_email, Some(stored));
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_a_second_account_for_the_same_email() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&account("ada@example.com")).await.expect("insert");

        let err = repo
            .insert(&account("ADA@example.com"))
            .await
            .expect_err("duplicate");
        assert_eq!(err, UserPersistenceError::duplicate_email("ada@example.com"));
    }
}
