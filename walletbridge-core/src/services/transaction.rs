//! Transaction service - history paging and payments

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::result::Result;
use crate::domain::{TransactionPage, WalletTransaction};
use crate::ports::WalletGateway;
use crate::services::classify::{fail, Operation};
use crate::services::normalize::{self, TitlePolicy};

/// Payment from an account to an address
///
/// `sender` is an account id, never a wallet id. `amount` is in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub sender: String,
    pub receiver: String,
    pub amount: u64,
    pub password: Option<String>,
}

pub struct TransactionService {
    gateway: Arc<dyn WalletGateway>,
    title_policy: TitlePolicy,
}

impl TransactionService {
    pub fn new(gateway: Arc<dyn WalletGateway>, title_policy: TitlePolicy) -> Self {
        Self { gateway, title_policy }
    }

    /// One page of wallet history; the node's total is passed through
    pub async fn get_transactions(
        &self,
        wallet_id: &str,
        skip: u64,
        limit: u64,
    ) -> Result<TransactionPage> {
        debug!(wallet_id, skip, limit, "getTransactions called");
        let (transactions, total) = self
            .gateway
            .get_history_by_wallet(wallet_id, skip, limit)
            .await
            .map_err(|e| fail(Operation::GetTransactions, &e))?;
        debug!(wallet_id, page = transactions.len(), total, "getTransactions success");

        Ok(TransactionPage {
            transactions: transactions
                .into_iter()
                .map(|tx| normalize::transaction(tx, self.title_policy))
                .collect(),
            total,
        })
    }

    pub async fn create_transaction(
        &self,
        request: CreateTransactionRequest,
    ) -> Result<WalletTransaction> {
        debug!(sender = %request.sender, amount = request.amount, "createTransaction called");
        let CreateTransactionRequest {
            sender,
            receiver,
            amount,
            password,
        } = request;

        let transaction = self
            .gateway
            .new_payment(&sender, &receiver, amount, password.as_deref())
            .await
            .map_err(|e| fail(Operation::CreateTransaction, &e))?;
        debug!(transaction_id = %transaction.id, "createTransaction success");
        Ok(normalize::transaction(transaction, self.title_policy))
    }
}
