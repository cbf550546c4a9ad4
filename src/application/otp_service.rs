//! Email one-time codes.
//!
//! Codes live in a process-local map keyed by the trimmed recipient. Each key
//! holds at most one code; issuing again replaces it. Without a TTL a code
//! stays valid until replaced. With one, expired entries are dropped on the
//! next verification attempt or by [`OtpStore::purge_expired`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{info, warn};
use rand::Rng;

use super::notifier::otp_email;
use crate::config::StoreProfile;
use crate::domain::errors::DomainError;
use crate::domain::ports::Mailer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    Verified,
    Mismatch,
    Expired,
    Missing,
}

#[derive(Debug)]
struct OtpEntry {
    code: String,
    issued_at: Instant,
}

#[derive(Debug)]
pub struct OtpStore {
    entries: DashMap<String, OtpEntry>,
    ttl: Option<Duration>,
}

impl OtpStore {
    /// `None` keeps codes until they are replaced.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Generates a fresh 6-digit code for `recipient`, replacing any previous one.
    pub fn issue(&self, recipient: &str) -> String {
        let code = rand::rng().random_range(100_000..1_000_000u32).to_string();
        self.entries.insert(
            recipient_key(recipient),
            OtpEntry {
                code: code.clone(),
                issued_at: Instant::now(),
            },
        );
        code
    }

    /// Compares `submitted` with the live code. The shard lock for the key is
    /// held for the whole check, so a concurrent `issue` cannot interleave.
    pub fn check(&self, recipient: &str, submitted: &str) -> OtpCheck {
        match self.entries.entry(recipient_key(recipient)) {
            Entry::Vacant(_) => OtpCheck::Missing,
            Entry::Occupied(entry) => {
                if self.is_expired(entry.get()) {
                    entry.remove();
                    OtpCheck::Expired
                } else if entry.get().code == submitted.trim() {
                    OtpCheck::Verified
                } else {
                    OtpCheck::Mismatch
                }
            }
        }
    }

    /// Drops the entry for `recipient` only if it still holds `code`.
    pub fn revoke(&self, recipient: &str, code: &str) {
        self.entries
            .remove_if(&recipient_key(recipient), |_, entry| entry.code == code);
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = !self.is_expired(entry);
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    fn is_expired(&self, entry: &OtpEntry) -> bool {
        self.ttl.is_some_and(|ttl| entry.issued_at.elapsed() >= ttl)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn code_for(&self, recipient: &str) -> Option<String> {
        self.entries
            .get(&recipient_key(recipient))
            .map(|entry| entry.code.clone())
    }
}

fn recipient_key(recipient: &str) -> String {
    recipient.trim().to_string()
}

pub struct OtpService {
    store: Arc<OtpStore>,
    mailer: Arc<dyn Mailer>,
    profile: StoreProfile,
}

impl OtpService {
    pub fn new(store: Arc<OtpStore>, mailer: Arc<dyn Mailer>, profile: StoreProfile) -> Self {
        Self {
            store,
            mailer,
            profile,
        }
    }

    pub fn store(&self) -> &Arc<OtpStore> {
        &self.store
    }

    /// Issues a code and emails it. The caller learns about delivery failures,
    /// since a code nobody received is useless.
    pub async fn send_code(&self, email: Option<&str>) -> Result<(), DomainError> {
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| DomainError::validation("Email is required"))?;

        let code = self.store.issue(email);
        let message = otp_email(&self.profile, email, &code, self.store.ttl());

        if let Err(e) = self.mailer.send(&message).await {
            warn!("OTP email to {} failed: {}", email, e);
            self.store.revoke(email, &code);
            return Err(DomainError::Upstream(format!("Failed to send OTP: {e}")));
        }
        info!("OTP sent to {}", email);
        Ok(())
    }

    pub fn verify(&self, email: Option<&str>, otp: Option<&str>) -> Result<(), DomainError> {
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        let otp = otp.map(str::trim).filter(|o| !o.is_empty());
        let (Some(email), Some(otp)) = (email, otp) else {
            return Err(DomainError::validation("Email and OTP are required"));
        };

        match self.store.check(email, otp) {
            OtpCheck::Verified => Ok(()),
            OtpCheck::Mismatch => Err(DomainError::validation("Invalid OTP")),
            OtpCheck::Missing => Err(DomainError::validation(
                "OTP not found. Please request again.",
            )),
            OtpCheck::Expired => Err(DomainError::validation(
                "OTP expired. Please request again.",
            )),
        }
    }
}
