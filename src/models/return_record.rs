use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AppError;

/// Approval state of a return request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Pending => "Pending",
            ReturnStatus::Approved => "Approved",
            ReturnStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReturnStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ReturnStatus::Pending),
            "Approved" => Ok(ReturnStatus::Approved),
            "Rejected" => Ok(ReturnStatus::Rejected),
            other => Err(AppError::InvalidArgument(format!(
                "unknown return status '{}'",
                other
            ))),
        }
    }
}

/// Remedy granted on approval: a replacement item or a refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Item,
    Money,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Item => "item",
            Resolution::Money => "money",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = AppError;

    /// Only the two exact lowercase literals are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "item" => Ok(Resolution::Item),
            "money" => Ok(Resolution::Money),
            _ => Err(AppError::InvalidArgument(
                "resolution must be 'item' or 'money'".to_string(),
            )),
        }
    }
}

/// Wire form of an optional resolution: `""` when unset.
mod resolution_wire {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Resolution>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.map(|r| r.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Resolution>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse()
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

/// One merchandise-return request and its approval state.
///
/// Equality covers every field so a restored snapshot can be compared with the
/// record that was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub id: i64,
    pub item: String,
    pub reason: String,
    pub status: ReturnStatus,
    #[serde(with = "resolution_wire")]
    pub resolution: Option<Resolution>,
}

impl ReturnRecord {
    /// Builds a freshly created return. Status and resolution are always
    /// normalized server-side, whatever the caller sent.
    pub fn new_pending(id: i64, item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id,
            item: item.into(),
            reason: reason.into(),
            status: ReturnStatus::Pending,
            resolution: None,
        }
    }

    /// Approve with the given remedy. There is no guard on the current status,
    /// so approving again simply overwrites the resolution.
    pub fn approve(&mut self, resolution: Resolution) {
        self.status = ReturnStatus::Approved;
        self.resolution = Some(resolution);
    }

    /// Reject the return. Clears any resolution from an earlier approval.
    pub fn disapprove(&mut self) {
        self.status = ReturnStatus::Rejected;
        self.resolution = None;
    }
}

// ── Request payloads ─────────────────────────────────────────────────────────

/// Body of `POST /api/returns`. Unknown fields such as `status` or `id` are
/// accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct CreateReturn {
    pub item: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ApproveReturn {
    pub resolution: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_pending_without_resolution() {
        let r = ReturnRecord::new_pending(1, "laptop", "damaged");
        assert_eq!(r.status, ReturnStatus::Pending);
        assert_eq!(r.resolution, None);
    }

    #[test]
    fn approve_sets_status_and_resolution() {
        let mut r = ReturnRecord::new_pending(1, "laptop", "damaged");
        r.approve(Resolution::Money);
        assert_eq!(r.status, ReturnStatus::Approved);
        assert_eq!(r.resolution, Some(Resolution::Money));

        r.approve(Resolution::Item);
        assert_eq!(r.resolution, Some(Resolution::Item), "re-approval overwrites");
    }

    #[test]
    fn disapprove_after_approve_clears_resolution() {
        let mut r = ReturnRecord::new_pending(1, "laptop", "damaged");
        r.approve(Resolution::Item);
        r.disapprove();
        assert_eq!(r.status, ReturnStatus::Rejected);
        assert_eq!(r.resolution, None);
    }

    #[test]
    fn rejected_record_can_be_approved_again() {
        let mut r = ReturnRecord::new_pending(1, "laptop", "damaged");
        r.disapprove();
        r.approve(Resolution::Item);
        assert_eq!(r.status, ReturnStatus::Approved);
    }

    #[test]
    fn resolution_accepts_only_exact_literals() {
        assert_eq!("item".parse::<Resolution>().unwrap(), Resolution::Item);
        assert_eq!("money".parse::<Resolution>().unwrap(), Resolution::Money);
        for bad in ["", "Item", "MONEY", "refund", " item"] {
            assert!(
                matches!(bad.parse::<Resolution>(), Err(AppError::InvalidArgument(_))),
                "{:?} must be rejected",
                bad
            );
        }
    }

    #[test]
    fn serializes_empty_resolution_as_empty_string() {
        let r = ReturnRecord::new_pending(7, "phone", "scratched");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "item": "phone",
                "reason": "scratched",
                "status": "Pending",
                "resolution": "",
            })
        );
    }

    #[test]
    fn deserializes_approved_record() {
        let r: ReturnRecord = serde_json::from_value(serde_json::json!({
            "id": 3,
            "item": "tablet",
            "reason": "broken",
            "status": "Approved",
            "resolution": "money",
        }))
        .unwrap();
        assert_eq!(r.status, ReturnStatus::Approved);
        assert_eq!(r.resolution, Some(Resolution::Money));
    }

    #[test]
    fn status_round_trips_through_text() {
        for s in [ReturnStatus::Pending, ReturnStatus::Approved, ReturnStatus::Rejected] {
            assert_eq!(s.as_str().parse::<ReturnStatus>().unwrap(), s);
        }
        assert!("Closed".parse::<ReturnStatus>().is_err());
    }
}
