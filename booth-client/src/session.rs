//! Session context
//!
//! A [`Session`] is created once per client from a [`BoothConfig`]. It owns
//! the database handle, the logged-in user and the submission lock, and
//! hands out the reservation components wired to that handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use booth_store::{MemoryDatabase, RealtimeDatabase, RedbDatabase};
use parking_lot::RwLock;
use shared::models::UserAccount;
use tracing::{info, warn};

use crate::accounts::{AccountService, MyPage, SignupForm};
use crate::config::{BoothConfig, StoreBackend};
use crate::error::{AccountError, ReservationError, ReservationResult};
use crate::flow::ReservationFlow;
use crate::guard::DuplicateGuard;
use crate::ledger::CapacityLedger;
use crate::slots::SlotBoard;
use crate::writer::ReservationWriter;

pub struct Session {
    config: BoothConfig,
    db: Arc<dyn RealtimeDatabase>,
    user: RwLock<Option<UserAccount>>,
    submitting: AtomicBool,
}

impl Session {
    /// Load the configuration and open a session.
    ///
    /// Any failure leaves the client inert with
    /// [`ReservationError::ConfigUnavailable`].
    pub fn load() -> ReservationResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with variables taken from `lookup`
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> ReservationResult<Self> {
        let config = BoothConfig::load_with(lookup)?;
        Self::open(config)
    }

    /// Open the configured backend
    pub fn open(config: BoothConfig) -> ReservationResult<Self> {
        let db: Arc<dyn RealtimeDatabase> = match config.database.backend {
            StoreBackend::Memory => Arc::new(MemoryDatabase::new()),
            StoreBackend::Redb => {
                let db = RedbDatabase::open(&config.database.path).map_err(|e| {
                    ReservationError::ConfigUnavailable(format!(
                        "cannot open {}: {e}",
                        config.database.path
                    ))
                })?;
                Arc::new(db)
            }
        };
        info!(
            booth_id = %config.booth_id,
            backend = ?config.database.backend,
            max_capacity = config.max_capacity,
            "Session opened"
        );
        Ok(Self::with_database(config, db))
    }

    /// Session over an existing database handle (shared between sessions)
    pub fn with_database(config: BoothConfig, db: Arc<dyn RealtimeDatabase>) -> Self {
        Self {
            config,
            db,
            user: RwLock::new(None),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &BoothConfig {
        &self.config
    }

    pub fn booth_id(&self) -> &str {
        &self.config.booth_id
    }

    pub fn database(&self) -> &Arc<dyn RealtimeDatabase> {
        &self.db
    }

    pub fn guard(&self) -> DuplicateGuard {
        DuplicateGuard::new(self.db.clone())
    }

    pub fn ledger(&self) -> CapacityLedger {
        CapacityLedger::new(
            self.db.clone(),
            self.config.max_capacity,
            self.config.retry_policy(),
        )
    }

    pub fn writer(&self) -> ReservationWriter {
        ReservationWriter::new(self.db.clone())
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.db.clone())
    }

    pub fn reservation_flow(&self) -> ReservationFlow<'_> {
        ReservationFlow::new(self)
    }

    /// Seed every configured slot that has no counter yet
    pub async fn open_configured_slots(&self) -> ReservationResult<()> {
        let ledger = self.ledger();
        for time_slot in &self.config.slots {
            ledger.open_slot(&self.config.booth_id, time_slot).await?;
        }
        Ok(())
    }

    /// Live slot board for this session's booth
    pub async fn slot_board(&self) -> ReservationResult<SlotBoard> {
        Ok(SlotBoard::open(self.ledger(), &self.config.booth_id, self.config.slots.clone()).await?)
    }

    // ========== Submission lock ==========

    /// Take the submission lock, refusing while another submission is in flight
    pub fn begin_submission(&self) -> ReservationResult<SubmissionGuard<'_>> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ReservationError::SubmissionInFlight)?;
        Ok(SubmissionGuard { session: self })
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    // ========== Accounts ==========

    pub async fn signup(&self, form: SignupForm) -> Result<UserAccount, AccountError> {
        self.accounts().signup(form).await
    }

    /// Check the credentials and remember the user
    pub async fn login(&self, reserve_id: &str, student_id: &str) -> Result<UserAccount, AccountError> {
        let account = self.accounts().authenticate(reserve_id, student_id).await?;
        *self.user.write() = Some(account.clone());
        info!(reserve_id = %account.reserve_id, "User logged in");
        Ok(account)
    }

    pub fn current_user(&self) -> Option<UserAccount> {
        self.user.read().clone()
    }

    pub fn my_page(&self) -> MyPage {
        MyPage::for_user(self.user.read().as_ref())
    }

    /// Forget the logged-in user
    pub fn logout(&self) {
        if let Some(account) = self.user.write().take() {
            info!(reserve_id = %account.reserve_id, "User logged out");
        }
    }

    /// Tear the session down
    pub fn close(self) {
        if self.is_submitting() {
            warn!("Session closed while a submission was in flight");
        }
        self.logout();
        info!(booth_id = %self.config.booth_id, "Session closed");
    }
}

/// Holds the submission lock until dropped
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct SubmissionGuard<'a> {
    session: &'a Session,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.session.submitting.store(false, Ordering::Release);
    }
}
