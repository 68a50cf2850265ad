//! Account registration, sign-in and session user lookup.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::OnceCell;
use tokio::task::{self, JoinError};
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, StoredAccount, UserPersistenceError,
    PasswordDigest, UserRepository, UsersQuery,
};
use crate::domain::{Error, SignInCredentials, SignUpRequest, User, UserId};

/// Message returned for any failed sign-in attempt.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid email or password";

/// Verified in place of a real digest when the email is unknown, so both
/// rejection paths pay for one Argon2 verification.
const DECOY_PASSWORD: &str = "decoy password for unknown accounts";

/// Account service implementing [`LoginService`] and [`UsersQuery`].
///
/// Hashing runs on Tokio's blocking pool so request workers stay free.
pub struct AccountService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
    decoy: Arc<OnceCell<PasswordDigest>>,
}

impl<R, H> Clone for AccountService<R, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: Arc::clone(&self.hasher),
            decoy: Arc::clone(&self.decoy),
        }
    }
}

impl<R, H> AccountService<R, H> {
    /// Create a service over a user repository and password hasher.
    pub fn new(users: Arc<R>, hasher: Arc<H>) -> Self {
        Self {
            users,
            hasher,
            decoy: Arc::new(OnceCell::new()),
        }
    }
}

impl<R, H> AccountService<R, H>
where
    H: PasswordHasher + 'static,
{
    async fn hash_password(&self, password: &str) -> Result<PasswordDigest, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(map_join_error)?
            .map_err(map_hash_error)
    }

    async fn verify_password(&self, password: &str, digest: PasswordDigest) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(map_join_error)?
            .map_err(map_hash_error)
    }

    async fn decoy_digest(&self) -> Result<PasswordDigest, Error> {
        self.decoy
            .get_or_try_init(|| self.hash_password(DECOY_PASSWORD))
            .await
            .cloned()
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => Error::conflict("email is already registered")
            .with_details(json!({ "field": "email", "code": "email_taken" })),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_join_error(error: JoinError) -> Error {
    Error::internal(format!("password hashing task failed: {error}"))
}

#[async_trait]
impl<R, H> LoginService for AccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn sign_up(&self, request: &SignUpRequest) -> Result<User, Error> {
        let password = self.hash_password(request.password()).await?;
        let user = User::new(UserId::random(), request.name().clone(), request.email().clone());
        let account = StoredAccount {
            user: user.clone(),
            password,
        };
        self.users.insert(&account).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), "account registered");
        Ok(user)
    }

    async fn sign_in(&self, credentials: &SignInCredentials) -> Result<User, Error> {
        let found = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?;
        let Some(account) = found else {
            let decoy = self.decoy_digest().await?;
            self.verify_password(credentials.password(), decoy).await?;
            return Err(Error::unauthorized(INVALID_CREDENTIALS_MESSAGE));
        };
        let matches = self
            .verify_password(credentials.password(), account.password)
            .await?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS_MESSAGE));
        }
        Ok(account.user)
    }
}

#[async_trait]
impl<R, H> UsersQuery for AccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users.find_by_id(id).await.map_err(map_user_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockPasswordHasher, MockUserRepository};
    use crate::domain::{Email, UserName};
    use rstest::{fixture, rstest};

    #[fixture]
    fn ada() -> User {
        User::new(
            UserId::random(),
            UserName::new("Ada Lovelace").expect("name"),
            Email::new("ada@example.com").expect("email"),
        )
    }

    fn service(
        users: MockUserRepository,
        hasher: MockPasswordHasher,
    ) -> AccountService<MockUserRepository, MockPasswordHasher> {
        AccountService::new(Arc::new(users), Arc::new(hasher))
    }

    fn credentials(password: &str) -> SignInCredentials {
        SignInCredentials::try_from_parts("ada@example.com", password).expect("credentials")
    }

    #[rstest]
    #[tokio::test]
    async fn sign_up_stores_hashed_password() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .return_once(|_| Ok(PasswordDigest::new("$argon2id$digest")));
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .withf(|account| account.password.as_ref() == "$argon2id$digest")
            .times(1)
            .return_once(|_| Ok(()));

        let request = SignUpRequest::try_from_parts("Ada Lovelace", "ada@example.com", "password1")
            .expect("request");
        let user = service(users, hasher)
            .sign_up(&request)
            .await
            .expect("sign up succeeds");
        assert_eq!(user.email().as_ref(), "ada@example.com");
    }

    #[rstest]
    #[tokio::test]
    async fn sign_up_reports_duplicate_email_as_conflict() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .return_once(|_| Ok(PasswordDigest::new("digest")));
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .return_once(|_| Err(UserPersistenceError::duplicate_email("ada@example.com")));

        let request = SignUpRequest::try_from_parts("Ada", "ada@example.com", "password1")
            .expect("request");
        let err = service(users, hasher)
            .sign_up(&request)
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case(true, None)]
    #[case(false, Some(ErrorCode::Unauthorized))]
    #[tokio::test]
    async fn sign_in_checks_the_password(
        ada: User,
        #[case] matches: bool,
        #[case] expected_error: Option<ErrorCode>,
    ) {
        let stored = StoredAccount {
            user: ada.clone(),
            password: PasswordDigest::new("digest"),
        };
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .return_once(move |_| Ok(Some(stored)));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().return_once(move |_, _| Ok(matches));

        let result = service(users, hasher).sign_in(&credentials("password1")).await;
        match expected_error {
            None => assert_eq!(result.expect("signed in"), ada),
            Some(code) => assert_eq!(result.expect_err("rejected").code(), code),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn sign_in_hides_unknown_accounts() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .withf(|password| password == DECOY_PASSWORD)
            .times(1)
            .returning(|_| Ok(PasswordDigest::new("$argon2id$decoy")));
        // Unknown emails still pay for a verification, even a matching one.
        hasher
            .expect_verify()
            .withf(|_, digest| digest.as_ref() == "$argon2id$decoy")
            .times(2)
            .returning(|_, _| Ok(true));

        let accounts = service(users, hasher);
        for _ in 0..2 {
            let err = accounts
                .sign_in(&credentials("password1"))
                .await
                .expect_err("unknown account");
            assert_eq!(err.code(), ErrorCode::Unauthorized);
            assert_eq!(err.message(), INVALID_CREDENTIALS_MESSAGE);
        }
    }

    #[rstest]
    #[tokio::test]
    async fn hashing_failures_surface_as_internal_errors() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .return_once(|_| Err(PasswordHashError::hash("out of memory")));
        let mut users = MockUserRepository::new();
        users.expect_insert().never();

        let request = SignUpRequest::try_from_parts("Ada", "ada@example.com", "password1")
            .expect("request");
        let err = service(users, hasher)
            .sign_up(&request)
            .await
            .expect_err("hash failure");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn find_user_maps_connection_errors() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|_| Err(UserPersistenceError::connection("down")));

        let err = service(users, MockPasswordHasher::new())
            .find_user(&UserId::random())
            .await
            .expect_err("unavailable");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
