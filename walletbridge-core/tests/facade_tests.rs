//! Integration tests for the wallet bridge facade
//!
//! Every operation runs against the in-memory demo node; failures are
//! injected per gateway method to exercise the classifier.
//!
//! Run with: cargo test --test facade_tests

mod common;

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::json;
use tempfile::TempDir;

use common::{create_wallet, first_account, fixture, fixture_with};
use walletbridge_core::adapters::demo::DemoGateway;
use walletbridge_core::domain::TransactionType;
use walletbridge_core::ports::{GatewayError, GatewayMethod, PreferenceStore, WalletGateway};
use walletbridge_core::services::classify::{NOT_ENOUGH_MONEY, WALLET_ALREADY_EXISTS};
use walletbridge_core::services::{
    ChangeWalletPasswordRequest, CreateTransactionRequest, CreateWalletRequest,
    RedeemAdaRequest, RedeemPaperVendedAdaRequest, RestoreWalletRequest, UpdateWalletRequest,
    TERMS_OF_USE_KEY, USER_LOCALE_KEY,
};
use walletbridge_core::{AssurancePolicy, Error, ErrorKind, OperationResult, TitlePolicy};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Wallets
// ============================================================================

#[tokio::test]
async fn test_wallet_balance_uses_conversion_constant() {
    let f = fixture_with(DemoGateway::with_sample_data(), TitlePolicy::Literal);
    let wallets = f.bridge.wallet_service.get_wallets().await.unwrap();
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].amount, dec("1250.5"));
    assert_eq!(wallets[0].assurance, AssurancePolicy::Normal);
}

#[tokio::test]
async fn test_get_wallets_failure_is_generic() {
    let f = fixture();
    f.node.fail_next(GatewayMethod::GetWallets, "node offline");
    assert_eq!(f.bridge.wallet_service.get_wallets().await, Err(Error::Generic));
}

#[tokio::test]
async fn test_create_wallet_creates_first_account() {
    let f = fixture();
    let wallet = create_wallet(&f, "Savings").await;
    assert_eq!(wallet.name, "Savings");
    assert_eq!(wallet.amount, Decimal::ZERO);
    assert!(!wallet.has_password);

    let addresses = f.bridge.address_service.get_addresses(&wallet.id).await.unwrap();
    assert!(addresses.account_id.is_some());
    assert_eq!(addresses.addresses.len(), 1);
}

#[tokio::test]
async fn test_create_wallet_account_failure_is_generic_and_resumable() {
    let f = fixture();
    f.node.fail_next(GatewayMethod::NewAccount, "account index exhausted");

    let err = f
        .bridge
        .wallet_service
        .create_wallet(CreateWalletRequest {
            name: "Half".to_string(),
            mnemonic: "one two three".to_string(),
            password: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Generic);
    let wallet_id = err.pending_wallet_id().unwrap().to_string();

    // The wallet exists on the node without an account
    let addresses = f.bridge.address_service.get_addresses(&wallet_id).await.unwrap();
    assert_eq!(addresses.account_id, None);

    let wallet = f
        .bridge
        .wallet_service
        .create_account(&wallet_id, "Half", None)
        .await
        .unwrap();
    assert_eq!(wallet.id, wallet_id);
    assert!(f
        .bridge
        .address_service
        .get_addresses(&wallet_id)
        .await
        .unwrap()
        .account_id
        .is_some());
}

#[tokio::test]
async fn test_create_wallet_never_reports_duplicate() {
    let f = fixture();
    f.node.fail_next(GatewayMethod::NewWallet, WALLET_ALREADY_EXISTS);
    let result = f
        .bridge
        .wallet_service
        .create_wallet(CreateWalletRequest {
            name: "Dup".to_string(),
            mnemonic: "x".to_string(),
            password: None,
        })
        .await;
    assert_eq!(result, Err(Error::Generic));
}

#[tokio::test]
async fn test_restore_duplicate_mnemonic() {
    let f = fixture();
    let phrase = f.bridge.node_service.generate_mnemonic().await.unwrap().join(" ");
    let request = RestoreWalletRequest {
        recovery_phrase: phrase,
        wallet_name: "Restored".to_string(),
        wallet_password: None,
    };

    let wallet = f.bridge.wallet_service.restore_wallet(request.clone()).await.unwrap();
    assert_eq!(wallet.name, "Restored");

    let err = f.bridge.wallet_service.restore_wallet(request).await.unwrap_err();
    assert_eq!(err, Error::WalletAlreadyRestored);
    assert_eq!(err.kind(), ErrorKind::WalletAlreadyRestored);
}

#[tokio::test]
async fn test_restore_other_failure_is_generic() {
    let f = fixture();
    let result = f
        .bridge
        .wallet_service
        .restore_wallet(RestoreWalletRequest {
            recovery_phrase: "too short".to_string(),
            wallet_name: "Bad".to_string(),
            wallet_password: None,
        })
        .await;
    assert_eq!(result, Err(Error::Generic));
}

#[tokio::test]
async fn test_restore_account_failure_is_pending() {
    let f = fixture();
    let phrase = f.bridge.node_service.generate_mnemonic().await.unwrap().join(" ");
    f.node.fail_next(GatewayMethod::NewAccount, "busy");

    let err = f
        .bridge
        .wallet_service
        .restore_wallet(RestoreWalletRequest {
            recovery_phrase: phrase,
            wallet_name: "R".to_string(),
            wallet_password: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AccountPending { .. }));
    assert_eq!(err.kind(), ErrorKind::Generic);
}

#[tokio::test]
async fn test_import_wallet_from_key() {
    let f = fixture();
    let temp = TempDir::new().unwrap();
    let key_path = temp.path().join("paper.key");
    std::fs::write(&key_path, "secret-key-material\n").unwrap();

    let wallet = f
        .bridge
        .wallet_service
        .import_wallet_from_key(&key_path, None)
        .await
        .unwrap();
    assert_eq!(wallet.name, "paper");
    assert!(!wallet.has_password);

    let err = f
        .bridge
        .wallet_service
        .import_wallet_from_key(&key_path, None)
        .await
        .unwrap_err();
    assert_eq!(err, Error::WalletAlreadyRestored);

    let missing = temp.path().join("missing.key");
    let err = f
        .bridge
        .wallet_service
        .import_wallet_from_key(&missing, None)
        .await
        .unwrap_err();
    assert_eq!(err, Error::WalletKeyImport);
    assert_eq!(err.kind(), ErrorKind::KeyImport);
}

#[tokio::test]
async fn test_update_and_rename_wallet() {
    let f = fixture();
    let wallet = create_wallet(&f, "Old").await;

    let updated = f
        .bridge
        .wallet_service
        .update_wallet(UpdateWalletRequest {
            wallet_id: wallet.id.clone(),
            name: "New".to_string(),
            assurance: AssurancePolicy::Strict,
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "New");
    assert_eq!(updated.assurance, AssurancePolicy::Strict);

    let renamed = f
        .bridge
        .wallet_service
        .rename_wallet(&wallet.id, "Renamed")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Renamed");
    assert_eq!(renamed.assurance, AssurancePolicy::Strict);

    f.node.fail_next(GatewayMethod::UpdateWallet, "nope");
    let result = f
        .bridge
        .wallet_service
        .update_wallet(UpdateWalletRequest {
            wallet_id: wallet.id,
            name: "x".to_string(),
            assurance: AssurancePolicy::Normal,
        })
        .await;
    assert_eq!(result, Err(Error::Generic));
}

#[tokio::test]
async fn test_wallet_passwords() {
    let f = fixture();
    let wallet = create_wallet(&f, "P").await;

    f.bridge
        .wallet_service
        .set_wallet_password(&wallet.id, "first")
        .await
        .unwrap();

    let wrong = f
        .bridge
        .wallet_service
        .change_wallet_password(ChangeWalletPasswordRequest {
            wallet_id: wallet.id.clone(),
            old_password: "wrong".to_string(),
            new_password: "second".to_string(),
        })
        .await;
    assert_eq!(wrong, Err(Error::Generic));

    f.bridge
        .wallet_service
        .change_wallet_password(ChangeWalletPasswordRequest {
            wallet_id: wallet.id.clone(),
            old_password: "first".to_string(),
            new_password: "second".to_string(),
        })
        .await
        .unwrap();

    let wallets = f.bridge.wallet_service.get_wallets().await.unwrap();
    assert!(wallets[0].has_password);
}

#[tokio::test]
async fn test_delete_wallet() {
    let f = fixture();
    let wallet = create_wallet(&f, "Gone").await;
    f.bridge.wallet_service.delete_wallet(&wallet.id).await.unwrap();
    assert!(f.bridge.wallet_service.get_wallets().await.unwrap().is_empty());
    assert_eq!(
        f.bridge.wallet_service.delete_wallet(&wallet.id).await,
        Err(Error::Generic)
    );
}

// ============================================================================
// Addresses
// ============================================================================

#[tokio::test]
async fn test_zero_accounts_yield_empty_addresses() {
    let f = fixture();
    let wallet = f
        .node
        .new_wallet("bare", AssurancePolicy::Normal, 0, "m", None)
        .await
        .unwrap();

    let result = f.bridge.address_service.get_addresses(&wallet.id).await.unwrap();
    assert_eq!(result.account_id, None);
    assert!(result.addresses.is_empty());
}

#[tokio::test]
async fn test_create_address_and_validate() {
    let f = fixture();
    let wallet = create_wallet(&f, "A").await;
    let account = first_account(&f, &wallet.id).await;

    let address = f
        .bridge
        .address_service
        .create_address(&account, None)
        .await
        .unwrap();
    assert!(!address.is_used);
    assert!(f.bridge.address_service.is_valid_address(&address.id).await.unwrap());
    assert!(!f.bridge.address_service.is_valid_address("garbage").await.unwrap());

    let addresses = f.bridge.address_service.get_addresses(&wallet.id).await.unwrap();
    assert_eq!(addresses.addresses.len(), 2);
}

#[tokio::test]
async fn test_validity_check_returns_gateway_error_verbatim() {
    let f = fixture();
    f.node.fail_next(GatewayMethod::IsValidAddress, "validator crashed");
    assert_eq!(
        f.bridge.address_service.is_valid_address("x").await,
        Err(GatewayError::new("validator crashed"))
    );
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn test_payment_is_outgoing_and_negative() {
    let f = fixture();
    let sender = create_wallet(&f, "Sender").await;
    let sender_account = first_account(&f, &sender.id).await;
    f.node.fund_account(&sender_account, 10_000_000).unwrap();

    let receiver = create_wallet(&f, "Receiver").await;
    let receiver_address = f
        .bridge
        .address_service
        .get_addresses(&receiver.id)
        .await
        .unwrap()
        .addresses[0]
        .id
        .clone();

    let tx = f
        .bridge
        .transaction_service
        .create_transaction(CreateTransactionRequest {
            sender: sender_account,
            receiver: receiver_address,
            amount: 2_500_000,
            password: None,
        })
        .await
        .unwrap();

    assert_eq!(tx.amount, dec("-2.5"));
    assert_eq!(tx.transaction_type, TransactionType::Expend);
    assert_eq!(tx.title, "Ada sent");
    assert_eq!(tx.description, "");

    let page = f
        .bridge
        .transaction_service
        .get_transactions(&receiver.id, 0, 10)
        .await
        .unwrap();
    assert_eq!(page.transactions[0].amount, dec("2.5"));
    assert_eq!(page.transactions[0].title, "Ada received");
}

#[tokio::test]
async fn test_payment_insufficient_funds() {
    let f = fixture();
    let wallet = create_wallet(&f, "Poor").await;
    let account = first_account(&f, &wallet.id).await;
    let target = f.bridge.address_service.create_address(&account, None).await.unwrap();

    let err = f
        .bridge
        .transaction_service
        .create_transaction(CreateTransactionRequest {
            sender: account,
            receiver: target.id,
            amount: 1,
            password: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err, Error::NotEnoughMoneyToSend);
    assert_eq!(err.kind(), ErrorKind::NotEnoughMoney);
}

#[tokio::test]
async fn test_payment_other_failure_is_generic() {
    let f = fixture();
    f.node.fail_next(GatewayMethod::NewPayment, "Invalid receiver address");
    let result = f
        .bridge
        .transaction_service
        .create_transaction(CreateTransactionRequest {
            sender: "a@1".to_string(),
            receiver: "b".to_string(),
            amount: 1,
            password: None,
        })
        .await;
    assert_eq!(result, Err(Error::Generic));

    f.node.fail_next(GatewayMethod::NewPayment, format!("{} (fee)", NOT_ENOUGH_MONEY));
    let result = f
        .bridge
        .transaction_service
        .create_transaction(CreateTransactionRequest {
            sender: "a@1".to_string(),
            receiver: "b".to_string(),
            amount: 1,
            password: None,
        })
        .await;
    assert_eq!(result, Err(Error::NotEnoughMoneyToSend));
}

#[tokio::test]
async fn test_pagination_passes_total_through() {
    let f = fixture();
    let wallet = create_wallet(&f, "History").await;
    for _ in 0..5 {
        let code = f.node.issue_redemption_code(1_000_000);
        f.bridge
            .redemption_service
            .redeem_ada(RedeemAdaRequest {
                redemption_code: code,
                wallet_id: wallet.id.clone(),
                wallet_password: None,
            })
            .await
            .unwrap();
    }

    let last_page = f
        .bridge
        .transaction_service
        .get_transactions(&wallet.id, 3, 10)
        .await
        .unwrap();
    assert_eq!(last_page.transactions.len(), 2);
    assert_eq!(last_page.total, 5);

    let first_page = f
        .bridge
        .transaction_service
        .get_transactions(&wallet.id, 0, 2)
        .await
        .unwrap();
    assert_eq!(first_page.transactions.len(), 2);
    assert_eq!(first_page.total, 5);
}

#[tokio::test]
async fn test_history_failure_is_generic() {
    let f = fixture();
    assert_eq!(
        f.bridge.transaction_service.get_transactions("unknown", 0, 10).await,
        Err(Error::Generic)
    );
}

// ============================================================================
// Redemption
// ============================================================================

#[tokio::test]
async fn test_redeem_ada() {
    let f = fixture();
    let wallet = create_wallet(&f, "Redeem").await;
    let code = f.node.issue_redemption_code(42_000_000);
    assert!(f
        .bridge
        .redemption_service
        .is_valid_redemption_key(&code)
        .await
        .unwrap());

    let request = RedeemAdaRequest {
        redemption_code: code,
        wallet_id: wallet.id.clone(),
        wallet_password: None,
    };
    let tx = f.bridge.redemption_service.redeem_ada(request.clone()).await.unwrap();
    assert_eq!(tx.amount, dec("42"));
    assert_eq!(tx.transaction_type, TransactionType::Income);

    let err = f.bridge.redemption_service.redeem_ada(request).await.unwrap_err();
    assert_eq!(err, Error::RedeemAda);
    assert_eq!(err.kind(), ErrorKind::Redemption);
}

#[tokio::test]
async fn test_redeem_paper_vended_ada() {
    let f = fixture();
    let wallet = create_wallet(&f, "Paper").await;
    let (key, mnemonics) = f.node.issue_paper_vend_code(5_000_000);

    let service = &f.bridge.redemption_service;
    assert!(service.is_valid_paper_vend_redemption_key(&key).await.unwrap());
    assert!(service
        .is_valid_redemption_mnemonic(&mnemonics.join(" "))
        .await
        .unwrap());

    let tx = service
        .redeem_paper_vended_ada(RedeemPaperVendedAdaRequest {
            shielded_redemption_key: key.clone(),
            mnemonics: mnemonics.clone(),
            wallet_id: wallet.id.clone(),
            wallet_password: None,
        })
        .await
        .unwrap();
    assert_eq!(tx.amount, dec("5"));

    let err = service
        .redeem_paper_vended_ada(RedeemPaperVendedAdaRequest {
            shielded_redemption_key: key,
            mnemonics,
            wallet_id: wallet.id,
            wallet_password: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err, Error::RedeemAda);
}

// ============================================================================
// Node
// ============================================================================

#[tokio::test]
async fn test_mnemonic_generation_and_validation() {
    let f = fixture();
    let words = f.bridge.node_service.generate_mnemonic().await.unwrap();
    assert_eq!(words.len(), 12);

    let phrase = words.join(" ");
    assert!(f.bridge.node_service.is_valid_mnemonic(&phrase).await.unwrap());
    assert!(!f
        .bridge
        .redemption_service
        .is_valid_redemption_mnemonic(&phrase)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_sync_progress() {
    let f = fixture();
    f.node.set_sync_progress(250, None);
    let progress = f.bridge.node_service.get_sync_progress().await.unwrap();
    assert_eq!(progress.local_difficulty, 250);
    assert_eq!(progress.network_difficulty, None);

    f.node.set_sync_progress(250, Some(1000));
    let progress = f.bridge.node_service.get_sync_progress().await.unwrap();
    assert_eq!(progress.percentage(), Some(25.0));
}

#[tokio::test]
async fn test_next_update_swallows_failures() {
    let f = fixture_with(DemoGateway::with_sample_data(), TitlePolicy::Literal);
    let update = f.bridge.node_service.next_update().await.unwrap().unwrap();
    assert_eq!(update.application_name, "cardano");
    assert_eq!(update.version, 1);

    f.node.fail_next(GatewayMethod::NextUpdate, "internal error");
    assert_eq!(f.bridge.node_service.next_update().await, Ok(None));

    f.node.set_pending_update(None);
    assert_eq!(f.bridge.node_service.next_update().await, Ok(None));
}

#[tokio::test]
async fn test_apply_update_requests_one_restart() {
    let f = fixture_with(DemoGateway::with_sample_data(), TitlePolicy::Literal);
    f.bridge.node_service.apply_update().await.unwrap();
    assert_eq!(f.host.restarts(), 1);

    // Nothing left to apply: generic failure, no further restart
    assert_eq!(f.bridge.node_service.apply_update().await, Err(Error::Generic));
    assert_eq!(f.host.restarts(), 1);
}

#[tokio::test]
async fn test_reset_clears_preferences_then_node() {
    let f = fixture_with(DemoGateway::with_sample_data(), TitlePolicy::Literal);
    f.bridge.preference_service.set_user_locale("en-US").await.unwrap();
    f.bridge
        .preference_service
        .set_terms_of_use_acceptance()
        .await
        .unwrap();

    f.bridge.node_service.test_reset().await.unwrap();

    assert_eq!(f.store.get(USER_LOCALE_KEY).await.unwrap(), None);
    assert_eq!(f.store.get(TERMS_OF_USE_KEY).await.unwrap(), None);
    assert!(f.bridge.wallet_service.get_wallets().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reset_store_failure_skips_node_reset() {
    let f = fixture_with(DemoGateway::with_sample_data(), TitlePolicy::Literal);
    f.store.fail_next("read-only filesystem");

    assert_eq!(f.bridge.node_service.test_reset().await, Err(Error::Generic));
    assert_eq!(f.bridge.wallet_service.get_wallets().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reset_node_failure_is_generic() {
    let f = fixture();
    f.node.fail_next(GatewayMethod::TestReset, "not in test mode");
    assert_eq!(f.bridge.node_service.test_reset().await, Err(Error::Generic));
}

// ============================================================================
// Preferences and result envelope
// ============================================================================

#[tokio::test]
async fn test_preferences_through_facade() {
    let f = fixture();
    let prefs = &f.bridge.preference_service;
    assert_eq!(prefs.get_user_locale().await.unwrap(), "");
    assert!(!prefs.get_terms_of_use_acceptance().await.unwrap());

    prefs.set_user_locale("ja-JP").await.unwrap();
    prefs.set_terms_of_use_acceptance().await.unwrap();
    assert_eq!(
        f.store.get(USER_LOCALE_KEY).await.unwrap(),
        Some(json!({ "locale": "ja-JP" }))
    );
    assert!(prefs.get_terms_of_use_acceptance().await.unwrap());
}

#[tokio::test]
async fn test_operation_result_envelope() {
    let f = fixture();
    f.node.fail_next(GatewayMethod::NewAccount, "later");
    let result: OperationResult<_> = f
        .bridge
        .wallet_service
        .create_wallet(CreateWalletRequest {
            name: "Env".to_string(),
            mnemonic: "m".to_string(),
            password: None,
        })
        .await
        .into();

    assert!(!result.success);
    assert!(result.data.is_none());
    assert_eq!(result.error, Some(ErrorKind::Generic));
    assert!(result.context.unwrap().contains_key("walletId"));
}

#[tokio::test]
async fn test_by_direction_titles() {
    let f = fixture_with(DemoGateway::with_sample_data(), TitlePolicy::ByDirection);
    let wallet = &f.bridge.wallet_service.get_wallets().await.unwrap()[0];
    let page = f
        .bridge
        .transaction_service
        .get_transactions(&wallet.id, 0, 10)
        .await
        .unwrap();

    for tx in page.transactions {
        let expected = if tx.is_outgoing() { "Ada sent" } else { "Ada received" };
        assert_eq!(tx.title, expected);
    }
}
