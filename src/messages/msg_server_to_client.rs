use serde::Serialize;
use serde_json::Value;

// Server to Client events
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ServerToClient {
    // Presence
    #[serde(rename = "userJoined")]
    UserJoined { user_id: String, username: String },
    #[serde(rename = "userLeft")]
    UserLeft { user_id: String, username: String },

    /// Snapshot sent only to a client that just joined
    #[serde(rename = "gameState")]
    GameState {
        round_number: u32,
        is_round_active: bool,
        time_remaining: u32,
        winning_word: Option<&'static str>,
    },

    // Relays
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

    // Round lifecycle
    #[serde(rename = "roundStart")]
    RoundStart { round_number: u32 },
    #[serde(rename = "timerUpdate")]
    TimerUpdate { time_remaining: u32 },
    #[serde(rename = "roundEnd")]
    RoundEnd {
        round_number: u32,
        winning_word: &'static str,
    },

    #[serde(rename = "serverShutdown")]
    ServerShutdown {},
}

impl ServerToClient {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize {:?}: {}", self, e);
            r#"{"type":"error","message":"Serialization failed"}"#.to_string()
        })
    }

    pub fn user_joined(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self::UserJoined {
            user_id: user_id.into(),
            username: username.into(),
        }
    }

    pub fn user_left(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self::UserLeft {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_value(event: &ServerToClient) -> Value {
        serde_json::from_str(&event.to_json()).unwrap()
    }

    #[test]
    fn game_state_uses_wire_names() {
        let event = ServerToClient::GameState {
            round_number: 2,
            is_round_active: true,
            time_remaining: 10,
            winning_word: None,
        };
        assert_eq!(
            as_value(&event),
            json!({
                "type": "gameState",
                "roundNumber": 2,
                "isRoundActive": true,
                "timeRemaining": 10,
                "winningWord": null
            })
        );
    }

    #[test]
    fn round_end_and_shutdown_shapes() {
        let end = ServerToClient::RoundEnd {
            round_number: 4,
            winning_word: "JAZZY",
        };
        assert_eq!(
            as_value(&end),
            json!({"type": "roundEnd", "roundNumber": 4, "winningWord": "JAZZY"})
        );
        assert_eq!(
            as_value(&ServerToClient::ServerShutdown {}),
            json!({"type": "serverShutdown"})
        );
    }

    #[test]
    fn presence_events_carry_identity() {
        assert_eq!(
            as_value(&ServerToClient::user_left("u7", "Kim")),
            json!({"type": "userLeft", "userId": "u7", "username": "Kim"})
        );
    }
}
