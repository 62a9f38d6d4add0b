use serde::{Deserialize, Serialize};

/// Request body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Body returned by `POST /auth/register` and `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
}

/// An account as exposed by the accounts endpoints.
///
/// All monetary values in the API are fixed-point integers in minor units
/// (cents); floating point never crosses the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i64,
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepositRequest {
    pub account_id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWithdrawalRequest {
    pub account_id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransferRequest {
    #[serde(rename = "from")]
    pub from_account_id: i64,
    #[serde(rename = "to")]
    pub to_account_id: i64,
    pub amount: i64,
}

/// One entry in the append-only transaction log.
///
/// A deposit has no `from` endpoint and a withdrawal no `to` endpoint; a
/// transfer carries both. `amount` is always positive - direction is encoded
/// by which endpoint is populated, not by sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: i64,
    #[serde(rename = "from", default, skip_serializing_if = "Option::is_none")]
    pub from_account_id: Option<i64>,
    #[serde(rename = "to", default, skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<i64>,
    pub amount: i64,
    /// RFC 3339 timestamp of when the entry was recorded.
    pub created_at: String,
}

/// Uniform error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_entry_omits_absent_endpoint() {
        let entry = TransactionResponse {
            id: 1,
            from_account_id: None,
            to_account_id: Some(7),
            amount: 1000,
            created_at: "2025-06-12T23:08:42Z".to_string(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["to"], 7);
        assert!(json.get("from").is_none());
    }

    #[test]
    fn transfer_request_uses_from_to_field_names() {
        let request: CreateTransferRequest =
            serde_json::from_str(r#"{"from": 1, "to": 2, "amount": 500}"#).unwrap();

        assert_eq!(request.from_account_id, 1);
        assert_eq!(request.to_account_id, 2);
        assert_eq!(request.amount, 500);
    }

    #[test]
    fn transfer_entry_round_trips() {
        let entry = TransactionResponse {
            id: 3,
            from_account_id: Some(1),
            to_account_id: Some(2),
            amount: 20_000,
            created_at: "2025-06-12T23:08:42Z".to_string(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        let parsed: TransactionResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
