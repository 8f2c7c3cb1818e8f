//! Record identifiers.
//!
//! ステータス履歴の 1 レコードを指す ID。ストアが採番し、
//! 「直前のレコードを 1 件だけ削除する」ためだけに使います。
//!
//! ## ULID を使う理由
//! - 時刻でソート可能（同時刻のレコードでも採番順が残る）
//! - ファイルストアでもそのまま文字列として保存できる

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Display で使うプレフィックス
const PREFIX: &str = "rec-";

/// Opaque, store-assigned identity of a persisted status record.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Ulid);

impl RecordId {
    /// ULID から RecordId を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// 内部の ULID を取得
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for RecordId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PREFIX, self.0)
    }
}

impl FromStr for RecordId {
    type Err = ulid::DecodeError;

    /// `rec-<ulid>` と素の ULID の両方を受け付ける
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(PREFIX).unwrap_or(s);
        Ulid::from_string(raw).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_prefix() {
        let ulid = Ulid::new();
        let id = RecordId::from_ulid(ulid);

        assert_eq!(id.as_ulid(), ulid);
        assert!(id.to_string().starts_with("rec-"));
    }

    #[test]
    fn ids_are_sortable_by_creation_time() {
        let id1 = RecordId::from_ulid(Ulid::from_parts(1_000, 0));
        let id2 = RecordId::from_ulid(Ulid::from_parts(2_000, 0));

        assert!(id1 < id2);
    }

    #[test]
    fn parses_display_and_raw_forms() {
        let id = RecordId::from_ulid(Ulid::new());

        let from_display: RecordId = id.to_string().parse().unwrap();
        let from_raw: RecordId = id.as_ulid().to_string().parse().unwrap();

        assert_eq!(from_display, id);
        assert_eq!(from_raw, id);
        assert!("rec-not-a-ulid".parse::<RecordId>().is_err());
    }

    #[test]
    fn serializes_as_bare_ulid_string() {
        let ulid = Ulid::new();
        let json = serde_json::to_string(&RecordId::from_ulid(ulid)).unwrap();

        assert_eq!(json, format!("\"{}\"", ulid));
    }
}
