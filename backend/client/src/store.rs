//! Session store: the client's single owner of wallet, task and balance state.
//!
//! Every state change goes through [`SessionStore::dispatch`] and the pure
//! [`reduce`] function. Task completion is two-phase: the task is marked
//! completed tentatively, then confirmed or rolled back once the backend answers.
//!
//! Failures are reported as [`Notice`]s queued on the store; the caller drains
//! and displays them. No failure leaves the store unusable.

use std::collections::{BTreeSet, VecDeque};

use bork_core::referral::referral_link;
use bork_core::validation::ContributionInput;
use bork_core::wire::{BadgeSummary, CompletionStatus, ConnectResponse, UserProfile};
use bork_core::{Address, Contribution, Task, User};
use tracing::{error, info, warn};

use crate::backend::Backend;
use crate::errors::{ClientError, Result, WalletError};
use crate::storage::{LocalStore, TASKS_KEY, USER_KEY, WALLET_KEY};
use crate::wallet::{AccountEvent, WalletProvider};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub account: Option<Address>,
    pub user: Option<User>,
    pub balance: i64,
    pub tasks: Vec<Task>,
    pub completed: BTreeSet<String>,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn is_completed(&self, task_id: &str) -> bool {
        self.completed.contains(task_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Connected(ConnectResponse),
    Disconnected,
    TasksLoaded(Vec<Task>),
    ProfileLoaded(UserProfile),
    TaskTentative(String),
    TaskConfirmed {
        task_id: String,
        status: CompletionStatus,
    },
    TaskRolledBack(String),
}

/// Apply an action to the state.
pub fn reduce(state: &mut SessionState, action: Action) {
    match action {
        Action::Connected(resp) => {
            state.account = Some(resp.user.address.clone());
            state.balance = resp.user.balance;
            state.completed = resp.completed_task_ids.into_iter().collect();
            state.user = Some(resp.user);
        }
        Action::Disconnected => {
            state.account = None;
            state.user = None;
            state.balance = 0;
            state.completed.clear();
        }
        Action::TasksLoaded(tasks) => state.tasks = tasks,
        Action::ProfileLoaded(profile) => {
            if state.account.as_ref() != Some(&profile.user.address) {
                return;
            }
            state.balance = profile.user.balance;
            state.completed = profile.completed_task_ids.into_iter().collect();
            state.user = Some(profile.user);
        }
        Action::TaskTentative(task_id) => {
            state.completed.insert(task_id);
        }
        Action::TaskConfirmed { task_id, status } => {
            state.completed.insert(task_id);
            if let CompletionStatus::Credited { reward, balance } = status {
                state.balance = balance;
                if let Some(user) = state.user.as_mut() {
                    user.balance = balance;
                    user.total_earned += reward;
                }
            }
        }
        Action::TaskRolledBack(task_id) => {
            state.completed.remove(&task_id);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskResult {
    Credited { reward: i64, balance: i64 },
    /// Benign: the task was already completed, locally or on the backend.
    AlreadyCompleted,
    RolledBack(String),
}

/// What happened to a completion request. `destination_url` is reported
/// whatever the result so the caller can open it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub task_id: String,
    pub result: TaskResult,
    pub destination_url: Option<String>,
}

pub struct SessionStore<B, W> {
    backend: B,
    wallet: W,
    storage: LocalStore,
    state: SessionState,
    notices: VecDeque<Notice>,
    referral: Option<String>,
}

impl<B: Backend, W: WalletProvider> SessionStore<B, W> {
    pub fn new(backend: B, wallet: W, storage: LocalStore) -> Self {
        let tasks = match storage.get::<Vec<Task>>(TASKS_KEY) {
            Ok(tasks) => tasks.unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring unreadable cached tasks: {}", e);
                Vec::new()
            }
        };
        Self {
            backend,
            wallet,
            storage,
            state: SessionState {
                tasks,
                ..SessionState::default()
            },
            notices: VecDeque::new(),
            referral: None,
        }
    }

    /// The `ref` parameter the session was opened with.
    pub fn with_referral(mut self, referral: Option<String>) -> Self {
        self.referral = referral.filter(|r| !r.trim().is_empty());
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn dispatch(&mut self, action: Action) {
        reduce(&mut self.state, action);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push_back(Notice {
            level,
            message: message.into(),
        });
    }

    fn fail<T>(&mut self, err: ClientError) -> Result<T> {
        error!("{}", err);
        self.notify(NoticeLevel::Error, err.to_string());
        Err(err)
    }

    /// Write local state. A failed write becomes a warning notice; the caller carries on.
    fn persist(&mut self, write: impl FnOnce(&mut LocalStore) -> Result<()>) {
        if let Err(e) = write(&mut self.storage) {
            warn!("Could not save local state: {}", e);
            self.notify(
                NoticeLevel::Warning,
                format!("Could not save local state: {e}"),
            );
        }
    }

    fn forget_session(&mut self) {
        self.persist(|s| {
            s.remove(WALLET_KEY)?;
            s.remove(USER_KEY)
        });
    }

    fn require_account(&mut self) -> Result<Address> {
        match self.state.account.clone() {
            Some(account) => Ok(account),
            None => self.fail(ClientError::NotConnected),
        }
    }

    // ─────────────────────────────────────────────────────────
    // Wallet session
    // ─────────────────────────────────────────────────────────

    /// Ask the wallet for an account and resolve it against the backend.
    pub async fn connect(&mut self) -> Result<()> {
        let accounts = match self.wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => return self.fail(e.into()),
        };
        match accounts.into_iter().next() {
            Some(address) => self.connect_as(address).await,
            None => self.fail(WalletError::NoAccounts.into()),
        }
    }

    async fn connect_as(&mut self, address: Address) -> Result<()> {
        let response = match self
            .backend
            .connect(&address, self.referral.as_deref())
            .await
        {
            Ok(response) => response,
            Err(e) => return self.fail(e),
        };

        self.persist(|s| {
            s.set(WALLET_KEY, &address)?;
            s.set(USER_KEY, &response.user)
        });

        if response.created {
            self.notify(NoticeLevel::Success, "Welcome to BorkChain!");
        }
        if let Some(referrer) = &response.referrer {
            info!("{} joined through {}'s referral", address, referrer);
            self.notify(NoticeLevel::Info, format!("Referred by {referrer}"));
        }
        if response.streak.bonus > 0 {
            self.notify(
                NoticeLevel::Success,
                format!(
                    "Day {} login streak: +{} $BORK",
                    response.streak.streak, response.streak.bonus
                ),
            );
        }

        info!("Connected {} (balance {})", address, response.user.balance);
        self.dispatch(Action::Connected(response));

        // The account is usable even when the task list cannot be fetched.
        let _ = self.load_tasks().await;
        Ok(())
    }

    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(account) = &self.state.account {
            info!("Disconnected {}", account);
        }
        self.dispatch(Action::Disconnected);
        self.forget_session();
        self.notify(NoticeLevel::Info, "Wallet disconnected");
        Ok(())
    }

    /// Reconnect silently to a persisted account the wallet still reports.
    /// Returns whether a session was restored.
    pub async fn restore(&mut self) -> Result<bool> {
        let saved = match self.storage.get::<Address>(WALLET_KEY) {
            Ok(Some(saved)) => saved,
            Ok(None) => return Ok(false),
            Err(e) => {
                warn!("Ignoring unreadable saved session: {}", e);
                self.forget_session();
                return Ok(false);
            }
        };

        let accounts = match self.wallet.get_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("Cannot restore session for {}: {}", saved, e);
                return Ok(false);
            }
        };

        if !accounts.contains(&saved) {
            warn!("Wallet no longer reports {}, dropping saved session", saved);
            self.forget_session();
            return Ok(false);
        }

        self.connect_as(saved).await?;
        Ok(true)
    }

    pub async fn handle_wallet_event(&mut self, event: AccountEvent) -> Result<()> {
        match event {
            AccountEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                None => self.disconnect().await,
                Some(account) if self.state.account.as_ref() == Some(&account) => Ok(()),
                Some(account) => {
                    info!("Wallet switched to {}", account);
                    self.dispatch(Action::Disconnected);
                    let result = self.connect_as(account).await;
                    if result.is_err() {
                        self.forget_session();
                    }
                    result
                }
            },
            AccountEvent::ChainChanged(chain) => {
                info!("Wallet chain changed to {}, ignoring", chain);
                Ok(())
            }
        }
    }

    /// Authoritative refetch of the connected user's profile.
    pub async fn refresh(&mut self) -> Result<()> {
        let account = self.require_account()?;
        match self.backend.fetch_user(&account).await {
            Ok(profile) => {
                self.persist(|s| s.set(USER_KEY, &profile.user));
                self.dispatch(Action::ProfileLoaded(profile));
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    // ─────────────────────────────────────────────────────────
    // Tasks
    // ─────────────────────────────────────────────────────────

    /// Fetch the task list, falling back to the cached copy on failure.
    pub async fn load_tasks(&mut self) -> Result<()> {
        match self.backend.fetch_tasks().await {
            Ok(tasks) => {
                self.persist(|s| s.set(TASKS_KEY, &tasks));
                self.dispatch(Action::TasksLoaded(tasks));
                Ok(())
            }
            Err(e) => {
                match self.storage.get::<Vec<Task>>(TASKS_KEY) {
                    Ok(Some(cached)) => {
                        warn!("Using cached tasks: {}", e);
                        self.dispatch(Action::TasksLoaded(cached));
                    }
                    Ok(None) => {}
                    Err(cache_err) => warn!("Ignoring unreadable cached tasks: {}", cache_err),
                }
                self.fail(e)
            }
        }
    }

    /// Complete a task for the connected account.
    pub async fn complete_task(&mut self, task_id: &str) -> Result<CompletionOutcome> {
        let account = self.require_account()?;
        let destination_url = self
            .state
            .task(task_id)
            .and_then(|t| t.destination_url.clone());

        let outcome = |result| CompletionOutcome {
            task_id: task_id.to_string(),
            result,
            destination_url: destination_url.clone(),
        };

        if self.state.is_completed(task_id) {
            self.notify(NoticeLevel::Info, "Task already completed");
            return Ok(outcome(TaskResult::AlreadyCompleted));
        }

        self.dispatch(Action::TaskTentative(task_id.to_string()));

        match self.backend.complete_task(&account, task_id).await {
            Ok(response) => {
                self.dispatch(Action::TaskConfirmed {
                    task_id: task_id.to_string(),
                    status: response.status,
                });
                if let Some(user) = self.state.user.clone() {
                    self.persist(|s| s.set(USER_KEY, &user));
                }
                match response.status {
                    CompletionStatus::Credited { reward, balance } => {
                        info!("Task {} credited +{} (balance {})", task_id, reward, balance);
                        self.notify(
                            NoticeLevel::Success,
                            format!("Task completed! +{reward} $BORK"),
                        );
                        Ok(outcome(TaskResult::Credited { reward, balance }))
                    }
                    CompletionStatus::AlreadyCompleted { .. } => {
                        warn!("Task {} was already completed for {}", task_id, account);
                        self.notify(NoticeLevel::Info, "Task already completed");
                        Ok(outcome(TaskResult::AlreadyCompleted))
                    }
                }
            }
            Err(e) => {
                warn!("Rolling back task {}: {}", task_id, e);
                self.dispatch(Action::TaskRolledBack(task_id.to_string()));
                self.notify(
                    NoticeLevel::Error,
                    format!("Failed to complete task: {e}"),
                );
                Ok(outcome(TaskResult::RolledBack(e.to_string())))
            }
        }
    }

    // ─────────────────────────────────────────────────────────
    // Fundraiser & referrals
    // ─────────────────────────────────────────────────────────

    /// Submit a contribution. Input is validated before any request is made.
    pub async fn contribute(&mut self, input: ContributionInput) -> Result<Contribution> {
        let account = self.require_account()?;
        if let Err(e) = input.validate() {
            return self.fail(e.into());
        }
        match self.backend.submit_contribution(&account, &input).await {
            Ok(contribution) => {
                self.notify(
                    NoticeLevel::Success,
                    "Contribution submitted, pending review",
                );
                Ok(contribution)
            }
            Err(e) => self.fail(e),
        }
    }

    pub async fn badge(&mut self) -> Result<BadgeSummary> {
        let account = self.require_account()?;
        match self.backend.badge_for(&account).await {
            Ok(badge) => Ok(badge),
            Err(e) => self.fail(e),
        }
    }

    pub fn referral_link(&self, base_url: &str) -> Option<String> {
        self.state
            .user
            .as_ref()
            .map(|u| referral_link(base_url, &u.referral_code))
    }
}
