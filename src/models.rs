//! Domain models for the boarding API
//!
//! These structs are both the JSON request/response shapes and the stored
//! document shapes. Document ids live outside the stored document and are
//! filled in from the route or the store when a document is read back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered owner or admin account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Document id (the identity provider's user id)
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// "user" or "admin"
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A boarded pet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub pet_id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub allergy: String,
    #[serde(default)]
    pub other: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub check_in: Option<DateTime<Utc>>,
    #[serde(default)]
    pub check_out: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A status update posted for a pet (photo + caption)
///
/// The caption doubles as the pet's current status string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetUpdate {
    /// Server-assigned document id
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub pet_id: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A chat room between an owner and the boarding staff
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    #[serde(default)]
    pub id: String,
    /// Participants' user ids
    #[serde(default)]
    pub user_ids: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Server-assigned document id
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub room_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pet_json_field_names() {
        let json = r#"{
            "petId": "pet-1",
            "name": "Biscuit",
            "type": "dog",
            "gender": "f",
            "age": 3,
            "ownerId": "user-1"
        }"#;
        let pet: Pet = serde_json::from_str(json).unwrap();
        assert_eq!(pet.pet_id, "pet-1");
        assert_eq!(pet.kind, "dog");
        assert_eq!(pet.owner_id, "user-1");
        assert!(!pet.active);
        assert!(pet.created_at.is_none());

        let out = serde_json::to_value(&pet).unwrap();
        assert_eq!(out["petId"], "pet-1");
        assert_eq!(out["type"], "dog");
    }

    #[test]
    fn test_message_minimal_body() {
        let json = r#"{"senderId": "user-1", "content": "hello"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.sender_id, "user-1");
        assert!(msg.room_id.is_empty());
        assert!(msg.timestamp.is_none());
    }

    #[test]
    fn test_chat_room_defaults() {
        let room: ChatRoom = serde_json::from_str(r#"{"userIds": ["a", "b"]}"#).unwrap();
        assert_eq!(room.user_ids, vec!["a", "b"]);
        assert!(room.id.is_empty());
    }
}
