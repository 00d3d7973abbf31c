use crate::models::{GiftDetails, MemoryTile, SessionIdentity};
use memory_media::{public_id_to_filename, ContentDescriptor};
use serde::Serialize;

/// Upload result attached to the tile it came from
#[derive(Debug, Clone, PartialEq)]
pub struct TileUpload {
    pub slot: u8,
    pub title: String,
    pub period: String,
    pub description: String,
    pub descriptor: ContentDescriptor,
}

impl TileUpload {
    pub fn new(tile: &MemoryTile, descriptor: ContentDescriptor) -> Self {
        Self {
            slot: tile.slot,
            title: tile.title.trim().to_string(),
            period: tile.period.trim().to_string(),
            description: tile.description.trim().to_string(),
            descriptor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryEntry {
    pub slot: u8,
    pub title: String,
    pub date: String,
    pub description: String,
    pub secure_url: String,
    pub public_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: u64,
    pub format: Option<String>,
}

impl From<TileUpload> for MemoryEntry {
    fn from(upload: TileUpload) -> Self {
        let d = upload.descriptor;
        Self {
            slot: upload.slot,
            title: upload.title,
            date: upload.period,
            description: upload.description,
            secure_url: d.secure_url,
            public_id: d.public_id,
            width: d.width,
            height: d.height,
            bytes: d.bytes,
            format: d.format,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotEntry {
    pub secure_url: String,
    pub public_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl From<&ContentDescriptor> for SnapshotEntry {
    fn from(d: &ContentDescriptor) -> Self {
        Self {
            secure_url: d.secure_url.clone(),
            public_id: d.public_id.clone(),
            width: d.width,
            height: d.height,
        }
    }
}

/// JSON summary uploaded right before the hand-off. Built once, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDocument {
    pub session_id: Option<String>,
    pub total_memories: usize,
    pub from_name: String,
    pub to_name: String,
    pub from_email: String,
    pub send_direct: bool,
    pub to_email: String,
    pub custom_message: String,
    pub memories: Vec<MemoryEntry>,
    pub snapshot: Option<SnapshotEntry>,
}

impl SubmissionDocument {
    /// Memories end up in slot order regardless of upload order
    pub fn build(
        session: Option<&SessionIdentity>,
        gift: &GiftDetails,
        mut uploads: Vec<TileUpload>,
        snapshot: Option<&ContentDescriptor>,
    ) -> Self {
        uploads.sort_by_key(|u| u.slot);
        let gift = gift.trimmed();
        let memories: Vec<MemoryEntry> = uploads.into_iter().map(MemoryEntry::from).collect();

        Self {
            session_id: session.map(|s| s.as_str().to_string()),
            total_memories: memories.len(),
            from_name: gift.from_name,
            to_name: gift.to_name,
            from_email: gift.from_email,
            send_direct: gift.send_direct,
            to_email: if gift.send_direct {
                gift.to_email
            } else {
                String::new()
            },
            custom_message: gift.custom_message,
            memories,
            snapshot: snapshot.map(SnapshotEntry::from),
        }
    }
}

/// Values written into the hidden form fields read by the host's submit handler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandOffFields {
    pub session_id: String,
    pub json_public_id: String,
    pub json_url: String,
    pub snapshot_public_id: String,
    pub snapshot_url: String,
}

impl HandOffFields {
    pub const SESSION_ID: &'static str = "game-session-id";
    pub const JSON_PUBLIC_ID: &'static str = "cloudinary-json-public-id";
    pub const JSON_URL: &'static str = "cloudinary-json-url";
    pub const SNAPSHOT_PUBLIC_ID: &'static str = "cloudinary-snapshot-public-id";
    pub const SNAPSHOT_URL: &'static str = "cloudinary-snapshot-url";

    pub fn new(
        session: Option<&SessionIdentity>,
        summary: &ContentDescriptor,
        snapshot: Option<&ContentDescriptor>,
    ) -> Self {
        Self {
            session_id: session.map(|s| s.as_str().to_string()).unwrap_or_default(),
            json_public_id: public_id_to_filename(&summary.public_id, true),
            json_url: summary.secure_url.clone(),
            snapshot_public_id: snapshot
                .map(|s| public_id_to_filename(&s.public_id, true))
                .unwrap_or_default(),
            snapshot_url: snapshot.map(|s| s.secure_url.clone()).unwrap_or_default(),
        }
    }

    /// (name, value) pairs in render order
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            (Self::SESSION_ID, &self.session_id),
            (Self::JSON_PUBLIC_ID, &self.json_public_id),
            (Self::JSON_URL, &self.json_url),
            (Self::SNAPSHOT_PUBLIC_ID, &self.snapshot_public_id),
            (Self::SNAPSHOT_URL, &self.snapshot_url),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(public_id: &str) -> ContentDescriptor {
        ContentDescriptor {
            secure_url: format!("https://res.example.com/{}", public_id),
            public_id: public_id.to_string(),
            width: Some(800),
            height: Some(800),
            bytes: 1000,
            format: Some("jpg".to_string()),
        }
    }

    fn upload(slot: u8, period: &str) -> TileUpload {
        let mut tile = MemoryTile::new(slot);
        tile.title = format!("Memory {}", slot);
        tile.period = period.to_string();
        tile.description = "desc".to_string();
        TileUpload::new(&tile, descriptor(&format!("images/{}", slot)))
    }

    #[test]
    fn test_memories_sorted_by_slot() {
        // Chronological order would put slot 2 first
        let uploads = vec![upload(3, "2021-01"), upload(1, "2022-05"), upload(2, "2019-12")];
        let doc = SubmissionDocument::build(None, &GiftDetails::default(), uploads, None);

        let slots: Vec<u8> = doc.memories.iter().map(|m| m.slot).collect();
        assert_eq!(slots, vec![1, 2, 3]);
        assert_eq!(doc.total_memories, 3);
    }

    #[test]
    fn test_document_json_shape() {
        let session = SessionIdentity::ensure("eb-mm-abc-123456");
        let gift = GiftDetails {
            from_name: " Sam ".to_string(),
            to_name: "Alex".to_string(),
            from_email: "sam@example.com".to_string(),
            send_direct: false,
            to_email: "stale@example.com".to_string(),
            custom_message: String::new(),
        };
        let doc = SubmissionDocument::build(Some(&session), &gift, vec![upload(1, "2020-02")], None);
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["sessionId"], "eb-mm-abc-123456");
        assert_eq!(json["totalMemories"], 1);
        assert_eq!(json["fromName"], "Sam");
        assert_eq!(json["sendDirect"], false);
        assert_eq!(json["toEmail"], "");
        assert_eq!(json["memories"][0]["date"], "2020-02");
        assert_eq!(json["memories"][0]["public_id"], "images/1");
        assert!(json["snapshot"].is_null());
    }

    #[test]
    fn test_hand_off_strips_folder_and_extension() {
        let summary = descriptor("a/b/c/xyz123.json");
        let snapshot = descriptor("snapshots/snap9.jpg");
        let fields = HandOffFields::new(None, &summary, Some(&snapshot));

        assert_eq!(fields.json_public_id, "xyz123");
        assert_eq!(fields.json_url, "https://res.example.com/a/b/c/xyz123.json");
        assert_eq!(fields.snapshot_public_id, "snap9");
        assert_eq!(fields.session_id, "");
    }
}
