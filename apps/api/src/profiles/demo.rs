//! Hackathon host seed data for demo mode.

use chrono::Utc;

use crate::models::ProfileRecord;

pub fn demo_profiles() -> Vec<ProfileRecord> {
    let now = Utc::now();
    let tags = || vec!["hackathon".into(), "host".into(), "sponsor".into()];
    vec![
        ProfileRecord {
            id: "host_001".into(),
            name: "Sarah Chen".into(),
            title: "Senior Developer Advocate".into(),
            company: "Telnyx".into(),
            location: Some("San Francisco, CA".into()),
            education: Some(vec!["Stanford University".into()]),
            tags: tags(),
            mutual_connections: Some(3),
            source_url: Some("https://linkedin.com/in/sarahchen".into()),
            industry: Some("Technology".into()),
            insight: None,
            created_at: now,
        },
        ProfileRecord {
            id: "host_002".into(),
            name: "Michael Rodriguez".into(),
            title: "Head of Product".into(),
            company: "MemVerge".into(),
            location: Some("San Jose, CA".into()),
            education: Some(vec!["UC Berkeley".into(), "Stanford GSB".into()]),
            tags: tags(),
            mutual_connections: Some(5),
            source_url: Some("https://linkedin.com/in/mrodriguez".into()),
            industry: Some("Technology".into()),
            insight: None,
            created_at: now,
        },
        ProfileRecord {
            id: "host_003".into(),
            name: "Emily Watson".into(),
            title: "Solutions Architect".into(),
            company: "ApertureData".into(),
            location: Some("Palo Alto, CA".into()),
            education: Some(vec!["MIT".into()]),
            tags: tags(),
            mutual_connections: Some(2),
            source_url: Some("https://linkedin.com/in/emilywatson".into()),
            industry: Some("Technology".into()),
            insight: None,
            created_at: now,
        },
    ]
}
