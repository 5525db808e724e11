//! Client: the catalog-side profile of an account

use crate::core::entity::{AuditedEntity, Model};
use crate::core::validation::{FieldChecks, validate_non_negative};
use crate::entities::Account;
use crate::impl_audited_entity;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use uuid::Uuid;

impl_audited_entity!(
    /// One per account; owns favorites and followed shops
    Client, "client", "clients", "client",
    {
        /// Owning account, one-to-one
        pub user: Uuid,
        /// Never negative
        #[serde(default)]
        pub money: Decimal,
        /// Stored photo path
        pub photo: Option<String>,
    }
);

impl Client {
    pub fn new(user: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            audit: AuditedEntity::new(now),
            user,
            money: Decimal::ZERO,
            photo: None,
        }
    }
}

impl Model for Client {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.audit.created.cmp(&other.audit.created)
    }

    fn validate_fields(&self, checks: &mut FieldChecks) {
        checks.check(validate_non_negative("money", self.money));
    }
}

/// A client together with the account fields it proxies
#[derive(Debug, Clone, Serialize)]
pub struct ClientProfile {
    #[serde(flatten)]
    pub client: Client,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// `username (first last)`
    pub display: String,
}

impl ClientProfile {
    pub fn new(client: Client, account: &Account) -> Self {
        Self {
            display: format!(
                "{} ({} {})",
                account.username, account.first_name, account.last_name
            ),
            username: account.username.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::account::Registration;

    #[test]
    fn test_money_defaults_to_zero() {
        let client = Client::new(Uuid::new_v4(), Utc::now());
        assert_eq!(client.money, Decimal::ZERO);
        assert!(client.validate(Utc::now()).is_ok());
    }

    #[test]
    fn test_negative_money_rejected() {
        let now = Utc::now();
        let mut client = Client::new(Uuid::new_v4(), now);
        client.money = Decimal::new(-150, 2);
        assert_eq!(client.validate(now).unwrap_err().fields(), vec!["money"]);
    }

    #[test]
    fn test_money_serialized_as_string() {
        let mut client = Client::new(Uuid::new_v4(), Utc::now());
        client.money = Decimal::new(1050, 2);
        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(json["money"], "10.50");
    }

    #[test]
    fn test_profile_proxies_account() {
        let now = Utc::now();
        let registration = Registration::new("jdoe", "s3cret-pass").with_names("John", "Doe");
        let account = Account::new(&registration, String::new(), now);
        let profile = ClientProfile::new(Client::new(account.id, now), &account);

        assert_eq!(profile.username, "jdoe");
        assert_eq!(profile.display, "jdoe (John Doe)");

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["user"], account.id.to_string());
        assert_eq!(json["first_name"], "John");
    }
}
