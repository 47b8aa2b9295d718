//! Property-based tests for wallet invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Serializability: concurrent updates to one account never lose money
//! - Non-negative balances: a rejected withdraw changes nothing
//! - Money conservation: transfers preserve the total across accounts
//! - Boundary rounding: decimal amounts convert half-away-from-zero once

use futures::future::join_all;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use wallet_core::{Config, Error, Wallet};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: a sequence of deposits accumulates to the exact sum
    #[test]
    fn prop_deposits_accumulate_exactly(cents in prop::collection::vec(1i64..1_000_00, 1..20)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let wallet = Wallet::default();
            wallet.create_user("alice").unwrap();

            let mut expected = 0i64;
            for amount in &cents {
                expected += amount;
                wallet
                    .deposit("alice", Decimal::new(*amount, 2), "USD")
                    .await
                    .unwrap();
            }

            let balance = wallet.get_balance("alice", "USD").await.unwrap();
            prop_assert_eq!(balance, Decimal::new(expected, 2));
            Ok(())
        })?;
    }

    /// Property: withdraw never drives a balance below zero, and a
    /// rejected withdraw leaves the balance unchanged
    #[test]
    fn prop_withdraw_never_negative(deposit in 1i64..1_000_00, withdraw in 1i64..1_000_00) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let wallet = Wallet::default();
            wallet.create_user("alice").unwrap();
            wallet
                .deposit("alice", Decimal::new(deposit, 2), "USD")
                .await
                .unwrap();

            let result = wallet
                .withdraw("alice", Decimal::new(withdraw, 2), "USD")
                .await;
            let balance = wallet.get_balance("alice", "USD").await.unwrap();

            if withdraw <= deposit {
                prop_assert_eq!(result.unwrap(), Decimal::new(deposit - withdraw, 2));
                prop_assert_eq!(balance, Decimal::new(deposit - withdraw, 2));
            } else {
                prop_assert_eq!(result.unwrap_err(), Error::NotEnoughMoney);
                prop_assert_eq!(balance, Decimal::new(deposit, 2));
            }
            prop_assert!(balance >= Decimal::ZERO);
            Ok(())
        })?;
    }

    /// Property: a transfer conserves the total across both accounts,
    /// whether it succeeds or is rejected
    #[test]
    fn prop_transfer_conserves_total(funded in 1i64..1_000_00, amount in 1i64..1_000_00) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let wallet = Wallet::default();
            wallet.create_user("alice").unwrap();
            wallet.create_user("bob").unwrap();
            wallet
                .deposit("alice", Decimal::new(funded, 2), "USD")
                .await
                .unwrap();

            let _ = wallet
                .send("alice", "bob", Decimal::new(amount, 2), "USD")
                .await;

            let alice = wallet.get_balance("alice", "USD").await.unwrap();
            let bob = wallet.get_balance("bob", "USD").await.unwrap();
            prop_assert_eq!(alice + bob, Decimal::new(funded, 2));
            Ok(())
        })?;
    }

    /// Property: boundary conversion rounds half away from zero at two
    /// decimal places, exactly once
    #[test]
    fn prop_boundary_rounding_half_away_from_zero(millis in 5i64..10_000_000) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let wallet = Wallet::default();
            wallet.create_user("alice").unwrap();

            // millis is the amount in thousandths, e.g. 1005 → 1.005.
            let expected_cents = millis / 10 + i64::from(millis % 10 >= 5);
            let balance = wallet
                .deposit("alice", Decimal::new(millis, 3), "USD")
                .await
                .unwrap();
            prop_assert_eq!(balance, Decimal::new(expected_cents, 2));
            Ok(())
        })?;
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_300_concurrent_deposits_sum_exactly() {
        let wallet = Arc::new(Wallet::default());
        wallet.create_user("alice").unwrap();

        let deposits = (0..300).map(|_| {
            let wallet = wallet.clone();
            tokio::spawn(async move { wallet.deposit("alice", dec!(1.00), "USD").await })
        });

        for result in join_all(deposits).await {
            result.unwrap().unwrap();
        }

        assert_eq!(
            wallet.get_balance("alice", "USD").await.unwrap(),
            dec!(300.00)
        );
    }

    #[tokio::test]
    async fn test_concurrent_mixed_deposits_and_withdraws() {
        let wallet = Arc::new(Wallet::default());
        wallet.create_user("alice").unwrap();
        // Seed enough that no withdraw can fail regardless of ordering.
        wallet.deposit("alice", dec!(100.00), "USD").await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..50 {
            let wallet = wallet.clone();
            tasks.push(tokio::spawn(async move {
                wallet.deposit("alice", dec!(2.00), "USD").await
            }));
        }
        for _ in 0..50 {
            let wallet = wallet.clone();
            tasks.push(tokio::spawn(async move {
                wallet.withdraw("alice", dec!(1.00), "USD").await
            }));
        }

        for result in join_all(tasks).await {
            result.unwrap().unwrap();
        }

        // 100.00 + 50 * 2.00 - 50 * 1.00
        assert_eq!(
            wallet.get_balance("alice", "USD").await.unwrap(),
            dec!(150.00)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_user_single_winner() {
        let wallet = Arc::new(Wallet::default());

        let attempts = (0..10).map(|_| {
            let wallet = wallet.clone();
            tokio::spawn(async move { wallet.create_user("dup") })
        });

        let outcomes: Vec<_> = join_all(attempts)
            .await
            .into_iter()
            .map(|result| result.unwrap())
            .collect();

        let created = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        assert_eq!(created, 1);
        assert!(outcomes
            .iter()
            .filter(|outcome| outcome.is_err())
            .all(|outcome| {
                matches!(outcome, Err(Error::UserAlreadyExists(identity)) if identity == "dup")
            }));
        assert_eq!(wallet.user_count(), 1);
    }

    #[tokio::test]
    async fn test_transfer_flood_completes_and_drains() {
        let wallet = Arc::new(Wallet::default());
        wallet.create_user("bob").unwrap();

        for i in 0..15 {
            let sender = format!("sender-{i}");
            wallet.create_user(&sender).unwrap();
            wallet.deposit(&sender, dec!(5.00), "USD").await.unwrap();
        }

        let transfers = (0..15).map(|i| {
            let wallet = wallet.clone();
            tokio::spawn(async move {
                let sender = format!("sender-{i}");
                wallet.send(&sender, "bob", dec!(1.00), "USD").await
            })
        });

        // A responsive receiver drains credits as they arrive, so every
        // transfer completes even though the flood exceeds the limit.
        for result in join_all(transfers).await {
            result.unwrap().unwrap();
        }

        assert_eq!(
            wallet.get_balance("bob", "USD").await.unwrap(),
            dec!(15.00)
        );
        assert_eq!(wallet.in_flight_credits("bob").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_admission_rejection_surfaces_through_send() {
        let mut config = Config::default();
        config.admission.max_in_flight = 0;
        let wallet = Wallet::new(config);

        wallet.create_user("alice").unwrap();
        wallet.create_user("bob").unwrap();
        wallet.deposit("alice", dec!(10.00), "USD").await.unwrap();

        let err = wallet
            .send("alice", "bob", dec!(1.00), "USD")
            .await
            .unwrap_err();
        assert_eq!(err, Error::TooManyRequestsToReceiver("bob".to_string()));

        // The rejected transfer moved nothing on either side.
        assert_eq!(
            wallet.get_balance("alice", "USD").await.unwrap(),
            dec!(10.00)
        );
        assert_eq!(wallet.get_balance("bob", "USD").await.unwrap(), dec!(0.00));
    }

    #[tokio::test]
    async fn test_full_wallet_lifecycle() {
        let wallet = Wallet::default();

        wallet.create_user("alice").unwrap();
        wallet.create_user("bob").unwrap();

        wallet.deposit("alice", dec!(100.00), "USD").await.unwrap();
        wallet.deposit("alice", dec!(20.00), "EUR").await.unwrap();

        let (from_balance, to_balance) = wallet
            .send("alice", "bob", dec!(40.00), "USD")
            .await
            .unwrap();
        assert_eq!(from_balance, dec!(60.00));
        assert_eq!(to_balance, dec!(40.00));

        wallet.withdraw("bob", dec!(15.00), "USD").await.unwrap();

        assert_eq!(
            wallet.get_balance("alice", "USD").await.unwrap(),
            dec!(60.00)
        );
        assert_eq!(
            wallet.get_balance("alice", "EUR").await.unwrap(),
            dec!(20.00)
        );
        assert_eq!(
            wallet.get_balance("bob", "USD").await.unwrap(),
            dec!(25.00)
        );
        assert_eq!(wallet.restart_stats().restarts, 0);

        wallet.shutdown().await.unwrap();
    }
}
