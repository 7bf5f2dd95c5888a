use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_ignores_password_hash() {
        let user: User = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Ada",
            "email": "ada@example.com",
            "role": "admin",
            "password": "$2b$10$..."
        }))
        .unwrap();
        assert_eq!(user.role, "admin");
        let out = serde_json::to_value(&user).unwrap();
        assert!(out.get("password").is_none());
    }
}
