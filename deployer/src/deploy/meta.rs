//! Job metadata tagging

use chrono::{DateTime, SecondsFormat, Utc};
use nomad_jobspec::Job;

/// Stamps a job with its tracking id and a submission nonce
pub struct MetadataTagger;

impl MetadataTagger {
    /// Metadata key holding the deployment tracking id
    pub const META_ID: &'static str = "waypoint.hashicorp.com/id";

    /// Metadata key holding the submission timestamp
    pub const META_NONCE: &'static str = "waypoint.hashicorp.com/nonce";

    /// Tag the job, taking the nonce from the current time
    pub fn tag(job: &mut Job, deployment_id: &str) {
        Self::tag_at(job, deployment_id, Utc::now());
    }

    pub fn tag_at(job: &mut Job, deployment_id: &str, now: DateTime<Utc>) {
        job.set_meta(Self::META_ID, deployment_id);
        job.set_meta(Self::META_NONCE, Self::nonce(now));
    }

    /// RFC 3339 in UTC with a fixed nine digit fraction, so nonces sort as text
    pub fn nonce(now: DateTime<Utc>) -> String {
        now.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_nonce_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(MetadataTagger::nonce(at), "2024-03-09T07:05:01.000000000Z");
    }

    #[test]
    fn test_nonces_sort_as_text() {
        let a = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let b = a + chrono::Duration::nanoseconds(1_500);
        let c = a + chrono::Duration::seconds(10);

        let (na, nb, nc) = (
            MetadataTagger::nonce(a),
            MetadataTagger::nonce(b),
            MetadataTagger::nonce(c),
        );
        assert!(na < nb && nb < nc);
    }

    #[test]
    fn test_tag_sets_both_keys_and_keeps_existing() {
        let mut job = Job::default();
        job.set_meta("team", "payments");

        MetadataTagger::tag(&mut job, "01HXYZ");

        assert_eq!(job.meta_value(MetadataTagger::META_ID), Some("01HXYZ"));
        let nonce = job.meta_value(MetadataTagger::META_NONCE).unwrap();
        assert!(DateTime::parse_from_rfc3339(nonce).is_ok());
        assert_eq!(job.meta_value("team"), Some("payments"));
    }
}
