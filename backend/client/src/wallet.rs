//! Wallet provider abstraction.
//!
//! A wallet is used only as an identity source. It reports accounts on request
//! and emits events when the active account or chain changes.

use std::future::Future;

use bork_core::Address;

use crate::errors::WalletError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountEvent {
    /// The wallet's account list changed; empty means the user disconnected.
    AccountsChanged(Vec<Address>),
    ChainChanged(String),
}

pub trait WalletProvider {
    /// Ask the wallet for access to its accounts.
    fn request_accounts(
        &self,
    ) -> impl Future<Output = Result<Vec<Address>, WalletError>> + Send;

    /// Accounts already authorised, without prompting.
    fn get_accounts(&self) -> impl Future<Output = Result<Vec<Address>, WalletError>> + Send;
}

/// A wallet that reports a fixed account, or no wallet at all.
#[derive(Clone, Debug, Default)]
pub struct StaticWallet {
    account: Option<Address>,
}

impl StaticWallet {
    pub fn new(account: Option<Address>) -> Self {
        Self { account }
    }

    /// Build from a raw address string; an empty value means no wallet.
    pub fn from_raw(raw: Option<&str>) -> crate::errors::Result<Self> {
        let account = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Address::parse)
            .transpose()?;
        Ok(Self { account })
    }
}

impl WalletProvider for StaticWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        match &self.account {
            Some(account) => Ok(vec![account.clone()]),
            None => Err(WalletError::Unavailable),
        }
    }

    async fn get_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(self.account.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_wallet_reports_account() {
        let wallet =
            StaticWallet::from_raw(Some("0xAbCdEf0123456789abcdef0123456789ABCDEF01")).unwrap();
        let accounts = wallet.request_accounts().await.unwrap();
        assert_eq!(
            accounts[0].as_str(),
            "0xabcdef0123456789abcdef0123456789abcdef01"
        );
    }

    #[tokio::test]
    async fn test_missing_wallet_is_unavailable() {
        let wallet = StaticWallet::from_raw(Some("  ")).unwrap();
        assert_eq!(
            wallet.request_accounts().await,
            Err(WalletError::Unavailable)
        );
        assert!(wallet.get_accounts().await.unwrap().is_empty());
    }

    #[test]
    fn test_invalid_address_rejected() {
        assert!(StaticWallet::from_raw(Some("0x1234")).is_err());
    }
}
