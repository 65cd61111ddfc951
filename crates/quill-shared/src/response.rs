//! Plain message bodies.

use serde::{Deserialize, Serialize};

/// The `{msg}` JSON body used for every error response and for simple
/// confirmations ("Post deleted", "Comment deleted").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgBody {
    pub msg: String,
}

impl MsgBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_the_wire_shape() {
        let body = MsgBody::new("Post deleted");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"msg":"Post deleted"}"#);
    }
}
