//! Transaction commands - history and payments

use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use colored::Colorize;
use rust_decimal::Decimal;
use walletbridge_core::services::normalize;
use walletbridge_core::services::CreateTransactionRequest;
use walletbridge_core::WalletTransaction;

use super::{confirm, open_session, settle};
use crate::output;

pub async fn history(wallet_id: &str, skip: u64, limit: u64, json: bool) -> Result<()> {
    let session = open_session()?;
    let result = session
        .bridge
        .transaction_service
        .get_transactions(wallet_id, skip, limit)
        .await;
    let Some(page) = settle(result, json)? else {
        return Ok(());
    };

    if page.transactions.is_empty() {
        output::info(&format!("No transactions (total {})", page.total));
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Date", "Title", "Amount", "Confirmations", "ID"]);
    for tx in &page.transactions {
        table.add_row(vec![
            tx.date.format("%Y-%m-%d %H:%M").to_string(),
            tx.title.clone(),
            colored_amount(tx),
            tx.number_of_confirmations.to_string(),
            tx.id.clone(),
        ]);
    }
    println!("{}", table);

    println!("{}", page_summary(skip, page.transactions.len(), page.total).dimmed());
    Ok(())
}

pub async fn send(
    from: String,
    to: String,
    amount: &str,
    password: Option<String>,
    yes: bool,
    json: bool,
) -> Result<()> {
    let ada = Decimal::from_str(amount.trim())
        .map_err(|_| anyhow!("Invalid amount: {}", amount))?;
    let lovelaces = normalize::to_minor_units(ada)
        .ok_or_else(|| anyhow!("Amount must be positive with at most six decimals: {}", amount))?;
    if lovelaces == 0 {
        bail!("Amount must be greater than zero");
    }

    let session = open_session()?;
    if !session.bridge.address_service.is_valid_address(&to).await? {
        bail!("Not a valid receiver address: {}", to);
    }

    let prompt = format!("Send {} to {}?", output::format_ada(ada), to);
    if !confirm(&prompt, yes || json)? {
        println!("Cancelled.");
        return Ok(());
    }

    let result = session
        .bridge
        .transaction_service
        .create_transaction(CreateTransactionRequest {
            sender: from,
            receiver: to,
            amount: lovelaces,
            password,
        })
        .await;

    if let Some(tx) = settle(result, json)? {
        output::success(&format!("{}: {}", tx.title, output::format_ada(tx.amount.abs())));
        println!("  Transaction: {}", tx.id);
    }
    Ok(())
}

/// "Showing a-b of n" for a page starting after `skip` items
fn page_summary(skip: u64, shown: usize, total: u64) -> String {
    let first = skip.saturating_add(1);
    let last = skip.saturating_add(shown as u64);
    format!("Showing {}-{} of {}", first, last, total)
}

fn colored_amount(tx: &WalletTransaction) -> String {
    let text = output::format_ada(tx.amount);
    if tx.is_outgoing() {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_summary() {
        assert_eq!(page_summary(0, 20, 45), "Showing 1-20 of 45");
        assert_eq!(page_summary(40, 5, 45), "Showing 41-45 of 45");
    }

    #[test]
    fn test_page_summary_saturates_on_huge_skip() {
        assert_eq!(
            page_summary(u64::MAX, 3, 7),
            format!("Showing {}-{} of 7", u64::MAX, u64::MAX)
        );
    }
}
