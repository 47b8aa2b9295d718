//! Actor-based concurrency for accounts
//!
//! This module implements the single-writer pattern using Tokio tasks: one
//! task per account owns that account's ledger, and a bounded mailbox with
//! oneshot reply channels is the only way to reach it. Processing one
//! message to completion before the next is the sole source of per-account
//! consistency; no locks are taken across accounts.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 Wallet (facade)                       │
//! │        Resolves identities via the Directory          │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ AccountHandle (Clone)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │             AccountActor (Single Task)                │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │ Ledger: HashMap<Currency, MinorUnits>          │  │
//! │  └────────────────────────────────────────────────┘  │
//! │        deposit / withdraw / balance / transfer        │
//! └─────────────────────┬────────────────────────────────┘
//!                       │ credit (admission-gated)
//!                       ▼
//!            another account's mailbox
//! ```
//!
//! # Transfer protocol
//!
//! A transfer is a two-phase handshake driven by the sending actor: debit
//! locally, then push an admission-gated credit to the receiver and await
//! its confirmation under a deadline. The admission permit travels inside
//! the credit message, so the receiver's slot is released when the message
//! is processed, or when it is dropped unprocessed.

use crate::admission::{AdmissionController, AdmissionPermit};
use crate::ledger::Ledger;
use crate::types::{Currency, MinorUnits, PendingTransfer, TransferReceipt, UserId};
use crate::{Config, Error, Result};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use uuid::Uuid;

/// Message sent to an account actor
#[derive(Debug)]
pub enum AccountMessage {
    /// Add funds to a currency
    Deposit {
        /// Target currency
        currency: Currency,
        /// Amount in minor units
        amount: MinorUnits,
        /// Reply channel carrying the new balance
        respond: oneshot::Sender<Result<MinorUnits>>,
    },

    /// Remove funds from a currency
    Withdraw {
        /// Target currency
        currency: Currency,
        /// Amount in minor units
        amount: MinorUnits,
        /// Reply channel carrying the new balance
        respond: oneshot::Sender<Result<MinorUnits>>,
    },

    /// Read a currency balance
    GetBalance {
        /// Target currency
        currency: Currency,
        /// Reply channel carrying the balance
        respond: oneshot::Sender<MinorUnits>,
    },

    /// Move funds to another account (two-phase debit/credit)
    TransferOut {
        /// Receiving account handle
        to: AccountHandle,
        /// Transfer currency
        currency: Currency,
        /// Amount in minor units
        amount: MinorUnits,
        /// How long to wait for the credit confirmation
        deadline: Duration,
        /// Reply channel carrying both post-transfer balances
        respond: oneshot::Sender<Result<TransferReceipt>>,
    },

    /// Inbound credit from another account's transfer. Carries the
    /// admission permit; dropping the message releases the slot.
    Credit {
        /// Originating transfer
        transfer_id: Uuid,
        /// Credit currency
        currency: Currency,
        /// Amount in minor units
        amount: MinorUnits,
        /// Admission slot held until this credit is done with
        permit: AdmissionPermit,
        /// Reply channel carrying the receiver's new balance
        respond: oneshot::Sender<Result<MinorUnits>>,
    },

    /// Stop the actor after the messages already queued
    Shutdown,
}

/// Actor owning one account's ledger
#[derive(Debug)]
pub struct AccountActor {
    /// Account identity (immutable once created)
    identity: UserId,

    /// Multi-currency balances
    ledger: Ledger,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<AccountMessage>,

    /// When this actor started
    started_at: DateTime<Utc>,
}

impl AccountActor {
    fn new(identity: UserId, mailbox: mpsc::Receiver<AccountMessage>) -> Self {
        Self {
            identity,
            ledger: Ledger::new(),
            mailbox,
            started_at: Utc::now(),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        tracing::debug!(identity = %self.identity, "account actor started");

        while let Some(msg) = self.mailbox.recv().await {
            if matches!(msg, AccountMessage::Shutdown) {
                break;
            }
            self.handle_message(msg).await;
        }

        let uptime_secs = (Utc::now() - self.started_at).num_seconds();
        tracing::debug!(identity = %self.identity, uptime_secs, "account actor stopped");
    }

    /// Handle a single message
    async fn handle_message(&mut self, msg: AccountMessage) {
        match msg {
            AccountMessage::Deposit {
                currency,
                amount,
                respond,
            } => {
                let result = self.ledger.deposit(&currency, amount);
                let _ = respond.send(result);
            }

            AccountMessage::Withdraw {
                currency,
                amount,
                respond,
            } => {
                let result = self.ledger.withdraw(&currency, amount);
                let _ = respond.send(result);
            }

            AccountMessage::GetBalance { currency, respond } => {
                let _ = respond.send(self.ledger.balance(&currency));
            }

            AccountMessage::TransferOut {
                to,
                currency,
                amount,
                deadline,
                respond,
            } => {
                let result = self.transfer_out(to, currency, amount, deadline).await;
                let _ = respond.send(result);
            }

            AccountMessage::Credit {
                transfer_id,
                currency,
                amount,
                permit,
                respond,
            } => {
                let result = self.ledger.deposit(&currency, amount);
                match &result {
                    Ok(balance) => tracing::debug!(
                        identity = %self.identity,
                        %transfer_id,
                        %currency,
                        amount,
                        balance = *balance,
                        "inbound credit applied"
                    ),
                    Err(err) => tracing::warn!(
                        identity = %self.identity,
                        %transfer_id,
                        %err,
                        "inbound credit refused"
                    ),
                }
                let _ = respond.send(result);
                // Single release point for the admission slot.
                drop(permit);
            }

            AccountMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }

    /// Two-phase transfer: debit locally, then push a credit to the
    /// receiver and await its confirmation under the deadline.
    async fn transfer_out(
        &mut self,
        to: AccountHandle,
        currency: Currency,
        amount: MinorUnits,
        deadline: Duration,
    ) -> Result<TransferReceipt> {
        // A self-transfer would make this actor await its own mailbox.
        if to.identity() == &self.identity {
            return Err(Error::InvalidArgument(
                "cannot transfer to the same account".to_string(),
            ));
        }

        // Debit phase: fail before any message leaves this actor.
        let sender_balance = self.ledger.withdraw(&currency, amount)?;

        let pending = PendingTransfer {
            transfer_id: Uuid::now_v7(),
            from: self.identity.clone(),
            to: to.identity().clone(),
            currency: currency.clone(),
            amount,
            started_at: Utc::now(),
            deadline,
        };
        tracing::debug!(
            transfer_id = %pending.transfer_id,
            from = %pending.from,
            to = %pending.to,
            %currency,
            amount,
            "debit applied, requesting credit"
        );

        // Credit phase: admission-gated handoff to the receiver.
        let reply = match to.try_credit(pending.transfer_id, currency.clone(), amount) {
            Ok(reply) => reply,
            Err(err) => {
                // Nothing reached the receiver; put the debit back.
                self.refund(&currency, amount);
                tracing::warn!(
                    transfer_id = %pending.transfer_id,
                    to = %pending.to,
                    %err,
                    "credit not accepted, debit reversed"
                );
                return Err(match err {
                    Error::TooManyRequestsToUser(identity) => {
                        Error::TooManyRequestsToReceiver(identity)
                    }
                    other => other,
                });
            }
        };

        match timeout(pending.deadline, reply).await {
            Ok(Ok(Ok(receiver_balance))) => {
                tracing::debug!(transfer_id = %pending.transfer_id, "transfer confirmed");
                Ok(TransferReceipt {
                    sender_balance,
                    receiver_balance,
                })
            }
            Ok(Ok(Err(err))) => {
                // The receiver refused the credit without applying it.
                self.refund(&currency, amount);
                Err(Error::TransferFailed(err.to_string()))
            }
            Ok(Err(_closed)) => {
                // Reply channel dropped without an answer: the credit
                // message was discarded unprocessed.
                self.refund(&currency, amount);
                Err(Error::TransferFailed(
                    "credit dropped before processing".to_string(),
                ))
            }
            Err(_elapsed) => {
                // The admitted credit may still land on the receiver;
                // reversing the debit here could duplicate money.
                tracing::warn!(
                    transfer_id = %pending.transfer_id,
                    to = %pending.to,
                    "credit confirmation deadline expired, debit stands"
                );
                Err(Error::TransferTimeout)
            }
        }
    }

    /// Reverse a debit after a confirmed credit failure.
    fn refund(&mut self, currency: &Currency, amount: MinorUnits) {
        // Cannot overflow: the same amount was withdrawn moments ago.
        if let Err(err) = self.ledger.deposit(currency, amount) {
            tracing::error!(identity = %self.identity, %currency, amount, %err, "refund failed");
        }
    }
}

/// Handle for sending requests to an account actor
#[derive(Debug, Clone)]
pub struct AccountHandle {
    identity: UserId,
    sender: mpsc::Sender<AccountMessage>,
    admission: AdmissionController,
}

impl AccountHandle {
    /// Identity of the account behind this handle
    pub fn identity(&self) -> &UserId {
        &self.identity
    }

    /// Deposit into the account
    pub async fn deposit(&self, currency: Currency, amount: MinorUnits) -> Result<MinorUnits> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(AccountMessage::Deposit {
                currency,
                amount,
                respond: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("account mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("response channel closed".to_string()))?
    }

    /// Withdraw from the account
    pub async fn withdraw(&self, currency: Currency, amount: MinorUnits) -> Result<MinorUnits> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(AccountMessage::Withdraw {
                currency,
                amount,
                respond: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("account mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("response channel closed".to_string()))?
    }

    /// Read a currency balance
    pub async fn balance(&self, currency: Currency) -> Result<MinorUnits> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(AccountMessage::GetBalance {
                currency,
                respond: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("account mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("response channel closed".to_string()))
    }

    /// Start a transfer to `to`; resolves when the two-phase handshake
    /// completes or fails.
    pub async fn transfer_out(
        &self,
        to: AccountHandle,
        currency: Currency,
        amount: MinorUnits,
        deadline: Duration,
    ) -> Result<TransferReceipt> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(AccountMessage::TransferOut {
                to,
                currency,
                amount,
                deadline,
                respond: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("account mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("response channel closed".to_string()))?
    }

    /// Admission-gated inbound credit: immediate reject once the account's
    /// in-flight limit is reached, otherwise the credit is queued with its
    /// permit and the reply channel is returned.
    pub(crate) fn try_credit(
        &self,
        transfer_id: Uuid,
        currency: Currency,
        amount: MinorUnits,
    ) -> Result<oneshot::Receiver<Result<MinorUnits>>> {
        let permit = self.admission.try_admit()?;
        let (tx, rx) = oneshot::channel();
        // try_send keeps the sending actor from suspending on the
        // receiver's mailbox; a dropped message releases the permit.
        self.sender
            .try_send(AccountMessage::Credit {
                transfer_id,
                currency,
                amount,
                permit,
                respond: tx,
            })
            .map_err(|_| Error::TransferFailed("receiver mailbox unavailable".to_string()))?;
        Ok(rx)
    }

    /// Ask the actor to stop after the messages already queued
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(AccountMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("account mailbox closed".to_string()))
    }

    /// Credits admitted against this account but not yet released
    pub fn in_flight(&self) -> usize {
        self.admission.in_flight()
    }
}

/// Spawn an account actor with an empty ledger.
///
/// Returns the cloneable handle and the join handle the supervisor
/// watches for abnormal termination.
pub fn spawn_account_actor(identity: UserId, config: &Config) -> (AccountHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(config.mailbox.capacity);
    let admission = AdmissionController::new(identity.clone(), config.admission.max_in_flight);
    let actor = AccountActor::new(identity.clone(), rx);

    let join = tokio::spawn(actor.run());

    (
        AccountHandle {
            identity,
            sender: tx,
            admission,
        },
        join,
    )
}
