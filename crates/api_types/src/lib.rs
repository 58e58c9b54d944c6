use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod common {
    use super::*;

    /// Pagination block returned by every list endpoint.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Pagination {
        pub page: u32,
        pub total_pages: u32,
        pub total_count: u64,
    }

    /// Envelope for list responses: `{ items: [...], pagination: {...} }`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ListEnvelope<T> {
        pub items: Vec<T>,
        pub pagination: Pagination,
    }

    /// Error body the backend attaches to non-2xx responses.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: String,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum UserStatus {
        Active,
        Suspended,
        Pending,
    }

    impl UserStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Active => "active",
                Self::Suspended => "suspended",
                Self::Pending => "pending",
            }
        }
    }

    /// One row of the users panel.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserSummary {
        pub id: String,
        pub username: String,
        pub phone: String,
        pub status: UserStatus,
        /// Wallet balance in minor units (integer cents).
        pub wallet_balance_minor: i64,
        pub created_at: DateTime<Utc>,
    }

    /// Full user record, richer than the list row.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserDetail {
        pub id: String,
        pub username: String,
        pub phone: String,
        pub email: Option<String>,
        pub status: UserStatus,
        pub wallet_balance_minor: i64,
        pub kyc_level: u8,
        pub total_topups_minor: i64,
        pub total_payments_minor: i64,
        pub last_login_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Topup,
        BillPayment,
        Refund,
    }

    impl TransactionKind {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Topup => "topup",
                Self::BillPayment => "bill_payment",
                Self::Refund => "refund",
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Pending,
        Completed,
        Failed,
        Reversed,
    }

    impl TransactionStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Pending => "pending",
                Self::Completed => "completed",
                Self::Failed => "failed",
                Self::Reversed => "reversed",
            }
        }
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionSummary {
        pub id: String,
        pub user_id: String,
        pub service_code: String,
        pub kind: TransactionKind,
        pub status: TransactionStatus,
        /// Amount in minor units; always positive, the kind carries the sign.
        pub amount_minor: i64,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionDetail {
        pub id: String,
        pub user_id: String,
        pub service_code: String,
        pub kind: TransactionKind,
        pub status: TransactionStatus,
        pub amount_minor: i64,
        pub fee_minor: i64,
        /// Provider-side reference, when the provider returned one.
        pub operator_reference: Option<String>,
        pub failure_reason: Option<String>,
        pub created_at: DateTime<Utc>,
        pub completed_at: Option<DateTime<Utc>>,
    }
}

pub mod service {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ServiceCategory {
        Airtime,
        Data,
        Electricity,
        Tv,
        Water,
    }

    impl ServiceCategory {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Airtime => "airtime",
                Self::Data => "data",
                Self::Electricity => "electricity",
                Self::Tv => "tv",
                Self::Water => "water",
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ServiceStatus {
        Enabled,
        Disabled,
        Maintenance,
    }

    impl ServiceStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Enabled => "enabled",
                Self::Disabled => "disabled",
                Self::Maintenance => "maintenance",
            }
        }
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServiceSummary {
        pub id: String,
        pub code: String,
        pub name: String,
        pub category: ServiceCategory,
        pub status: ServiceStatus,
        pub provider: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServiceDetail {
        pub id: String,
        pub code: String,
        pub name: String,
        pub category: ServiceCategory,
        pub status: ServiceStatus,
        pub provider: String,
        pub min_amount_minor: i64,
        pub max_amount_minor: i64,
        /// Flat fee charged on top of the face amount, minor units.
        pub fee_minor: i64,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SettlementStatus {
        Open,
        Reconciling,
        Settled,
        Disputed,
    }

    impl SettlementStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Open => "open",
                Self::Reconciling => "reconciling",
                Self::Settled => "settled",
                Self::Disputed => "disputed",
            }
        }
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SettlementSummary {
        pub id: String,
        pub provider: String,
        pub period_start: DateTime<Utc>,
        pub period_end: DateTime<Utc>,
        pub gross_minor: i64,
        pub fees_minor: i64,
        pub net_minor: i64,
        pub status: SettlementStatus,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SettlementDetail {
        pub id: String,
        pub provider: String,
        pub period_start: DateTime<Utc>,
        pub period_end: DateTime<Utc>,
        pub gross_minor: i64,
        pub fees_minor: i64,
        pub net_minor: i64,
        pub status: SettlementStatus,
        pub transaction_count: u64,
        pub dispute_reason: Option<String>,
        pub settled_at: Option<DateTime<Utc>>,
    }
}

pub mod bulk {
    use super::*;
    use std::collections::BTreeMap;

    /// Request body for `POST /{resource}/bulk`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BulkRequest {
        pub action: String,
        pub ids: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub reason: Option<String>,
    }

    /// Per-item outcome of a bulk call.
    ///
    /// The server applies items independently; `success_count + error_count`
    /// always equals the number of ids submitted.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BulkOutcome {
        pub success_count: u32,
        pub error_count: u32,
        #[serde(default)]
        pub per_item_errors: BTreeMap<String, String>,
    }
}

pub mod ledger {
    use super::*;

    /// Request body for `POST /ledger/credit` and `POST /ledger/debit`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LedgerRequest {
        pub account_id: String,
        pub amount_minor: i64,
        pub reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub reference: Option<Uuid>,
    }

    /// Post-mutation balance as computed by the server of record.
    ///
    /// Clients must display this balance, never a locally computed one: the
    /// server may apply rounding or fees on top of the requested amount.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LedgerBalance {
        pub account_id: String,
        pub balance_minor: i64,
        pub reference: Option<Uuid>,
    }
}

#[cfg(test)]
mod tests {
    use super::bulk::BulkOutcome;
    use super::common::ListEnvelope;
    use super::user::UserSummary;

    #[test]
    fn list_envelope_matches_wire_shape() {
        let raw = r#"{
            "items": [{
                "id": "u1",
                "username": "ada",
                "phone": "+2207001122",
                "status": "active",
                "walletBalanceMinor": 125000,
                "createdAt": "2026-01-10T09:30:00Z"
            }],
            "pagination": { "page": 1, "totalPages": 4, "totalCount": 73 }
        }"#;

        let envelope: ListEnvelope<UserSummary> = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.items.len(), 1);
        assert_eq!(envelope.items[0].wallet_balance_minor, 125_000);
        assert_eq!(envelope.pagination.total_pages, 4);
    }

    #[test]
    fn bulk_outcome_defaults_missing_error_map() {
        let raw = r#"{ "successCount": 3, "errorCount": 0 }"#;
        let outcome: BulkOutcome = serde_json::from_str(raw).unwrap();
        assert_eq!(outcome.success_count, 3);
        assert!(outcome.per_item_errors.is_empty());
    }
}
