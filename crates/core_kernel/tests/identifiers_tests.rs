//! Unit tests for strongly-typed identifiers

use core_kernel::{ChargeId, PatientId, PaymentId, QueueEntryId, VisitId};
use std::collections::HashSet;
use uuid::Uuid;

mod display_and_parse {
    use super::*;

    #[test]
    fn test_display_carries_prefix() {
        assert!(PatientId::new().to_string().starts_with("PAT-"));
        assert!(VisitId::new().to_string().starts_with("VIS-"));
        assert!(ChargeId::new().to_string().starts_with("CHG-"));
        assert!(PaymentId::new().to_string().starts_with("PAY-"));
        assert!(QueueEntryId::new().to_string().starts_with("QUE-"));
    }

    #[test]
    fn test_parse_with_prefix() {
        let original = ChargeId::new();
        let parsed: ChargeId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_parse_bare_uuid() {
        let uuid = Uuid::new_v4();
        let parsed: VisitId = uuid.to_string().parse().unwrap();
        assert_eq!(parsed, VisitId::from(uuid));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<PatientId>().is_err());
    }

    #[test]
    fn test_prefix_accessor() {
        assert_eq!(PatientId::prefix(), "PAT");
        assert_eq!(PaymentId::prefix(), "PAY");
    }
}

mod conversion {
    use super::*;

    #[test]
    fn test_uuid_round_trip() {
        let uuid = Uuid::new_v4();
        let id = PaymentId::from(uuid);
        let back: Uuid = id.into();
        assert_eq!(uuid, back);
    }

    #[test]
    fn test_as_uuid_borrows_inner_value() {
        let uuid = Uuid::new_v4();
        let id = ChargeId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }
}

mod uniqueness {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        let ids: HashSet<Uuid> = (0..100).map(|_| Uuid::from(PatientId::new())).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_v7_ids_are_time_ordered_format() {
        let id = VisitId::new_v7();
        assert_eq!(id.as_uuid().get_version_num(), 7);
    }
}

mod serde_format {
    use super::*;

    #[test]
    fn test_serializes_as_transparent_uuid() {
        let uuid = Uuid::new_v4();
        let id = PatientId::from_uuid(uuid);

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }

    #[test]
    fn test_deserializes_from_bare_uuid() {
        let uuid = Uuid::new_v4();
        let json = format!("\"{}\"", uuid);

        let id: ChargeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, ChargeId::from_uuid(uuid));
    }
}
