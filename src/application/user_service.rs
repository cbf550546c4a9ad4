use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use log::info;
use rand::{distr::Alphanumeric, Rng};

use super::notifier::Notifier;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{AuthSession, NewUser, Registration, User, ValidRegistration};

pub const TOKEN_LENGTH: usize = 40;

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    notifier: Notifier,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, notifier: Notifier) -> Self {
        Self { repo, notifier }
    }

    pub fn register(&self, registration: Registration) -> Result<AuthSession, DomainError> {
        let valid = ValidRegistration::try_from(registration)?;

        if self.repo.email_taken(&valid.email)? {
            return Err(DomainError::validation(
                "email: user with this email already exists.",
            ));
        }
        if self.repo.phone_taken(&valid.phone)? {
            return Err(DomainError::validation(
                "phone: user with this phone already exists.",
            ));
        }

        let user = self.repo.create(NewUser {
            password_hash: hash_password(&valid.password)?,
            email: valid.email,
            name: valid.name,
            phone: valid.phone,
        })?;
        let token = self.repo.token_for(user.id, &generate_token())?;

        info!("Registered user {} <{}>", user.id, user.email);
        self.notifier.user_registered(&user);

        Ok(AuthSession { user, token })
    }

    /// Checks email and password and returns the user's token, creating it on
    /// first login.
    pub fn login(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<AuthSession, DomainError> {
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        let password = password.filter(|p| !p.is_empty());
        let (Some(email), Some(password)) = (email, password) else {
            return Err(DomainError::validation("Email and password are required"));
        };

        let credentials = self
            .repo
            .find_credentials(&email.to_lowercase())?
            .ok_or_else(invalid_credentials)?;
        verify_password(password, &credentials.password_hash)?;

        let token = self
            .repo
            .token_for(credentials.user.id, &generate_token())?;
        Ok(AuthSession {
            user: credentials.user,
            token,
        })
    }

    pub fn authenticate(&self, token: &str) -> Result<User, DomainError> {
        self.repo
            .find_by_token(token)?
            .ok_or_else(|| DomainError::Unauthorized("Invalid token.".to_string()))
    }

    pub fn require_staff(&self, token: &str) -> Result<User, DomainError> {
        let user = self.authenticate(token)?;
        if !user.is_staff {
            return Err(DomainError::Forbidden);
        }
        Ok(user)
    }
}

fn invalid_credentials() -> DomainError {
    DomainError::Unauthorized("Invalid email or password".to_string())
}

/// Opaque alphanumeric bearer token.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<(), DomainError> {
    let parsed = PasswordHash::new(hash).map_err(|_| invalid_credentials())?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| invalid_credentials())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::notification_queue::NotificationQueue;
    use crate::config::StoreProfile;
    use crate::testing::InMemoryUserRepository;

    fn service() -> (UserService, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::default());
        let (queue, _rx) = NotificationQueue::channel();
        (
            UserService::new(repo.clone(), Notifier::new(queue, StoreProfile::default())),
            repo,
        )
    }

    fn registration(email: &str, phone: &str) -> Registration {
        Registration {
            name: Some("Kavya".into()),
            email: Some(email.into()),
            phone: Some(phone.into()),
            password: Some("hunter22".into()),
        }
    }

    #[test]
    fn register_stores_hash_and_issues_token() {
        let (svc, repo) = service();

        let session = svc
            .register(registration("kavya@example.com", "9876543210"))
            .unwrap();

        assert_eq!(session.token.len(), TOKEN_LENGTH);
        assert_eq!(session.user.phone, "+919876543210");
        let stored = repo.credentials("kavya@example.com").unwrap();
        assert_ne!(stored.password_hash, "hunter22");
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn duplicate_email_is_a_validation_error() {
        let (svc, _repo) = service();
        svc.register(registration("kavya@example.com", "9876543210"))
            .unwrap();

        let err = svc
            .register(registration("Kavya@Example.com", "9123456780"))
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(msg) if msg.starts_with("email")));
    }

    #[test]
    fn duplicate_phone_is_a_validation_error() {
        let (svc, _repo) = service();
        svc.register(registration("one@example.com", "98765 43210"))
            .unwrap();

        let err = svc
            .register(registration("two@example.com", "+91-9876543210"))
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(msg) if msg.starts_with("phone")));
    }

    #[test]
    fn login_reuses_the_same_token() {
        let (svc, _repo) = service();
        let registered = svc
            .register(registration("kavya@example.com", "9876543210"))
            .unwrap();

        let first = svc
            .login(Some("kavya@example.com"), Some("hunter22"))
            .unwrap();
        let second = svc
            .login(Some(" KAVYA@example.com "), Some("hunter22"))
            .unwrap();

        assert_eq!(first.token, registered.token);
        assert_eq!(second.token, registered.token);
        assert_eq!(svc.authenticate(&first.token).unwrap().id, registered.user.id);
    }

    #[test]
    fn wrong_password_and_unknown_user_are_unauthorized() {
        let (svc, _repo) = service();
        svc.register(registration("kavya@example.com", "9876543210"))
            .unwrap();

        assert!(matches!(
            svc.login(Some("kavya@example.com"), Some("wrong-pass")),
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            svc.login(Some("nobody@example.com"), Some("hunter22")),
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[test]
    fn login_requires_both_fields() {
        let (svc, _repo) = service();
        let err = svc.login(Some("kavya@example.com"), None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg == "Email and password are required"));
    }

    #[test]
    fn staff_check() {
        let (svc, repo) = service();
        let session = svc
            .register(registration("kavya@example.com", "9876543210"))
            .unwrap();

        assert!(matches!(svc.require_staff(&session.token), Err(DomainError::Forbidden)));
        repo.promote_to_staff(session.user.id);
        assert!(svc.require_staff(&session.token).is_ok());
        assert!(matches!(svc.authenticate("bogus"), Err(DomainError::Unauthorized(_))));
    }

    #[test]
    fn tokens_are_random() {
        assert_ne!(generate_token(), generate_token());
        assert!(generate_token().chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
