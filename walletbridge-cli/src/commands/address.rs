//! Address commands - list and create receiving addresses

use anyhow::Result;
use colored::Colorize;

use super::{open_session, settle};
use crate::output;

pub async fn list(wallet_id: &str, json: bool) -> Result<()> {
    let session = open_session()?;
    let result = session.bridge.address_service.get_addresses(wallet_id).await;
    let Some(account) = settle(result, json)? else {
        return Ok(());
    };

    let Some(account_id) = account.account_id else {
        output::warning("This wallet has no accounts yet.");
        return Ok(());
    };

    println!("{} {}", "Account:".bold(), account_id);
    let mut table = output::create_table();
    table.set_header(vec!["Address", "Balance", "Used"]);
    for address in &account.addresses {
        table.add_row(vec![
            address.id.clone(),
            output::format_ada(address.amount),
            if address.is_used { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

pub async fn create(account_id: &str, password: Option<String>, json: bool) -> Result<()> {
    let session = open_session()?;
    let result = session
        .bridge
        .address_service
        .create_address(account_id, password.as_deref())
        .await;

    if let Some(address) = settle(result, json)? {
        output::success("New receiving address");
        println!("  {}", address.id);
    }
    Ok(())
}
