use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stay context the engine reads but never mutates: the admission instant
/// anchors the writable part of the grid, the weight feeds dose
/// computation, and the archival instant ends the stay for summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospitalization {
    pub id: Uuid,
    pub patient_ref: Uuid,
    pub admission_at: NaiveDateTime,
    pub weight_kg: Option<f64>,
    pub archived_at: Option<NaiveDateTime>,
}

impl Hospitalization {
    pub fn is_active(&self) -> bool {
        self.archived_at.is_none()
    }

    /// End instant for duration/summary purposes: archival time for
    /// archived stays, the caller-supplied "now" otherwise.
    pub fn end_instant(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.archived_at.unwrap_or(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn active_stay_ends_now() {
        let stay = Hospitalization {
            id: Uuid::new_v4(),
            patient_ref: Uuid::new_v4(),
            admission_at: at(1, 8),
            weight_kg: Some(500.0),
            archived_at: None,
        };
        assert!(stay.is_active());
        assert_eq!(stay.end_instant(at(3, 12)), at(3, 12));
    }

    #[test]
    fn archived_stay_ends_at_archival() {
        let stay = Hospitalization {
            id: Uuid::new_v4(),
            patient_ref: Uuid::new_v4(),
            admission_at: at(1, 8),
            weight_kg: None,
            archived_at: Some(at(2, 10)),
        };
        assert!(!stay.is_active());
        assert_eq!(stay.end_instant(at(3, 12)), at(2, 10));
    }
}
