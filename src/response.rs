use axum::Json;
use serde::Serialize;

/// Success envelope: `{"status":"success","data":…}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub data: T,
}

pub fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        status: "success",
        data,
    })
}

/// Success envelope carrying a human-readable message instead of data.
#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub status: &'static str,
    pub message: String,
}

pub fn message(message: impl Into<String>) -> Json<MessageEnvelope> {
    Json(MessageEnvelope {
        status: "success",
        message: message.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let json = serde_json::to_value(&success(serde_json::json!({"n": 1})).0).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["n"], 1);
    }

    #[test]
    fn message_envelope_shape() {
        let json = serde_json::to_value(&message("Successfully logged out.").0).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Successfully logged out.");
    }
}
