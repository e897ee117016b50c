use serde::Deserialize;
use serde_json::Value;

// Client to Server messages, keyed by the `type` field
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ClientToServer {
    #[serde(rename = "join")]
    Join { user_id: String, username: String },

    // Bet and chat contents are relayed untouched, so they stay raw JSON
    #[serde(rename = "bet")]
    Bet {
        user_id: String,
        username: String,
        letter: Value,
        bet_amount: Value,
        balance: Value,
    },

    #[serde(rename = "message")]
    Message {
        user_id: String,
        username: String,
        message: Value,
    },

    // Round lifecycle is owned by the server; clients sending these are ignored
    #[serde(rename = "roundStart")]
    RoundStart {},
    #[serde(rename = "roundEnd")]
    RoundEnd {},

    #[serde(other)]
    Unknown,
}

impl ClientToServer {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Bet { .. } => "bet",
            Self::Message { .. } => "message",
            Self::RoundStart {} => "roundStart",
            Self::RoundEnd {} => "roundEnd",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_join() {
        let action =
            ClientToServer::from_json(r#"{"type":"join","userId":"u1","username":"Ana"}"#).unwrap();
        assert_eq!(
            action,
            ClientToServer::Join {
                user_id: "u1".into(),
                username: "Ana".into()
            }
        );
    }

    #[test]
    fn bet_fields_stay_opaque() {
        let action = ClientToServer::from_json(
            r#"{"type":"bet","userId":"u1","username":"Ana","letter":"Q","betAmount":"lots","balance":-3.5}"#,
        )
        .unwrap();
        match action {
            ClientToServer::Bet {
                letter,
                bet_amount,
                balance,
                ..
            } => {
                assert_eq!(letter, json!("Q"));
                assert_eq!(bet_amount, json!("lots"));
                assert_eq!(balance, json!(-3.5));
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn unknown_type_falls_into_unknown() {
        let action = ClientToServer::from_json(r#"{"type":"dance","moves":3}"#).unwrap();
        assert_eq!(action, ClientToServer::Unknown);
    }

    #[test]
    fn client_round_control_decodes_but_carries_nothing() {
        let action = ClientToServer::from_json(r#"{"type":"roundStart","roundNumber":99}"#).unwrap();
        assert_eq!(action, ClientToServer::RoundStart {});
        assert_eq!(action.kind(), "roundStart");
    }

    #[test]
    fn malformed_messages_fail_to_decode() {
        assert!(ClientToServer::from_json("not json").is_err());
        assert!(ClientToServer::from_json(r#"{"userId":"u1"}"#).is_err());
        assert!(ClientToServer::from_json(r#"{"type":"join","userId":"u1"}"#).is_err());
        assert!(ClientToServer::from_json(r#"{"type":"bet","userId":"u1","username":"Ana"}"#).is_err());
    }
}
