use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, jobdb::JobExt, userdb::UserExt},
    models::{jobmodel::Job, usermodel::*},
    service::error::ServiceError,
};

const EARTH_RADIUS_KM: f64 = 6371.0;
const FULL_SCORE_DISTANCE_KM: f64 = 50.0;

const CATEGORY_POINTS: f64 = 30.0;
const ATTRIBUTE_POINTS: f64 = 40.0;
const PROXIMITY_POINTS: f64 = 30.0;

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Compatibility score between a job and a provider, in [0, 100].
///
/// Category match is worth 30, attribute overlap up to 40 (split evenly
/// across the job's required attributes), and proximity up to 30 with
/// linear decay to zero at 50 km. Deterministic and side-effect free; only
/// ever used to rank listings, never to gate an action.
pub fn match_score(job: &Job, provider: &User, capabilities: &[ProviderCategory]) -> i32 {
    let mut score = 0.0;

    let category_matches = capabilities
        .iter()
        .any(|cap| cap.category_id == job.category_id);
    if category_matches {
        score += CATEGORY_POINTS;
    }

    let required: &HashMap<String, String> = &job.attributes;
    if !required.is_empty() {
        // Union of the provider's declared attributes; the capability for
        // the job's own category wins on conflicting names.
        let mut declared: HashMap<&str, &str> = HashMap::new();
        for cap in capabilities.iter().filter(|c| c.category_id != job.category_id) {
            for (k, v) in cap.attributes.iter() {
                declared.insert(k, v);
            }
        }
        for cap in capabilities.iter().filter(|c| c.category_id == job.category_id) {
            for (k, v) in cap.attributes.iter() {
                declared.insert(k, v);
            }
        }

        let matched = required
            .iter()
            .filter(|(k, v)| declared.get(k.as_str()) == Some(&v.as_str()))
            .count();
        score += ATTRIBUTE_POINTS * matched as f64 / required.len() as f64;
    }

    if let (Some(lat), Some(lng)) = (provider.base_lat, provider.base_lng) {
        let distance = haversine_km(job.lat, job.lng, lat, lng);
        score += (PROXIMITY_POINTS * (1.0 - distance / FULL_SCORE_DISTANCE_KM)).max(0.0);
    }

    (score.round() as i32).clamp(0, 100)
}

#[derive(Debug, Serialize)]
pub struct JobMatch {
    pub score: i32,
    pub job: Job,
}

#[derive(Debug, Clone)]
pub struct MatchingService {
    db_client: Arc<DBClient>,
}

impl MatchingService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn score_job_for_provider(
        &self,
        job_id: Uuid,
        provider_id: Uuid,
    ) -> Result<i32, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        let provider = self
            .db_client
            .get_user(provider_id)
            .await?
            .ok_or(ServiceError::UserNotFound(provider_id))?;

        let capabilities = self.db_client.get_provider_categories(provider_id).await?;

        Ok(match_score(&job, &provider, &capabilities))
    }

    /// Open jobs in the provider's declared categories, best match first.
    pub async fn ranked_open_jobs(&self, provider_id: Uuid) -> Result<Vec<JobMatch>, ServiceError> {
        let provider = self
            .db_client
            .get_user(provider_id)
            .await?
            .ok_or(ServiceError::UserNotFound(provider_id))?;

        let capabilities = self.db_client.get_provider_categories(provider_id).await?;
        let category_ids: Vec<Uuid> = capabilities.iter().map(|c| c.category_id).collect();
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }

        let jobs = self
            .db_client
            .list_open_jobs_in_categories(&category_ids)
            .await?;

        let mut matches: Vec<JobMatch> = jobs
            .into_iter()
            .map(|job| JobMatch {
                score: match_score(&job, &provider, &capabilities),
                job,
            })
            .collect();

        matches.sort_by(|a, b| b.score.cmp(&a.score));

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::jobmodel::JobStatus;
    use sqlx::types::{BigDecimal, Json};

    fn job_at(category_id: Uuid, attrs: &[(&str, &str)], lat: f64, lng: f64) -> Job {
        Job {
            id: Uuid::new_v4(),
            seeker_id: Uuid::new_v4(),
            provider_id: None,
            category_id,
            category_name: "Plumbing".to_string(),
            title: "Fix kitchen sink".to_string(),
            description: "Leaking trap under the sink".to_string(),
            attributes: Json(
                attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            budget: BigDecimal::from(100),
            agreed_amount: None,
            lat,
            lng,
            status: JobStatus::Open,
            completed_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn provider_at(lat: Option<f64>, lng: Option<f64>) -> User {
        User {
            id: Uuid::new_v4(),
            subject_id: "sub_123".to_string(),
            first_name: "Palesa".to_string(),
            last_name: "Mokoena".to_string(),
            email: "palesa@example.com".to_string(),
            phone_number: None,
            role: UserRole::Provider,
            bio: None,
            profile_picture: None,
            base_lat: lat,
            base_lng: lng,
            created_at: None,
            updated_at: None,
        }
    }

    fn capability(user: &User, category_id: Uuid, attrs: &[(&str, &str)]) -> ProviderCategory {
        ProviderCategory {
            id: Uuid::new_v4(),
            user_id: user.id,
            category_id,
            attributes: Json(
                attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            created_at: None,
        }
    }

    /// Latitude offset whose haversine distance is `km` (pure north-south).
    fn lat_offset_for_km(km: f64) -> f64 {
        (km / EARTH_RADIUS_KM).to_degrees()
    }

    #[test]
    fn perfect_match_at_zero_distance_scores_100() {
        let category = Uuid::new_v4();
        let job = job_at(category, &[("pipe_type", "copper")], -24.63, 25.92);
        let provider = provider_at(Some(-24.63), Some(25.92));
        let caps = vec![capability(&provider, category, &[("pipe_type", "copper")])];
        assert_eq!(match_score(&job, &provider, &caps), 100);
    }

    #[test]
    fn total_mismatch_beyond_50_km_scores_0() {
        let job = job_at(Uuid::new_v4(), &[("pipe_type", "copper")], -24.63, 25.92);
        let provider = provider_at(Some(-24.63 + lat_offset_for_km(60.0)), Some(25.92));
        let caps = vec![capability(&provider, Uuid::new_v4(), &[("voltage", "220")])];
        assert_eq!(match_score(&job, &provider, &caps), 0);
    }

    #[test]
    fn plumbing_two_attributes_ten_km_scores_94() {
        // 30 (category) + 40 (2/2 attributes) + 30 * (1 - 10/50) = 94
        let category = Uuid::new_v4();
        let job = job_at(
            category,
            &[("pipe_type", "copper"), ("urgency", "high")],
            25.92,
            -24.63,
        );
        let provider = provider_at(Some(25.92 + lat_offset_for_km(10.0)), Some(-24.63));
        let caps = vec![capability(
            &provider,
            category,
            &[("pipe_type", "copper"), ("urgency", "high")],
        )];
        assert_eq!(match_score(&job, &provider, &caps), 94);
    }

    #[test]
    fn no_required_attributes_contributes_nothing() {
        let category = Uuid::new_v4();
        let job = job_at(category, &[], 10.0, 10.0);
        let provider = provider_at(Some(10.0), Some(10.0));
        let caps = vec![capability(&provider, category, &[("anything", "at all")])];
        // 30 category + 0 attributes + 30 proximity
        assert_eq!(match_score(&job, &provider, &caps), 60);
    }

    #[test]
    fn partial_attribute_overlap_splits_the_band_evenly() {
        let category = Uuid::new_v4();
        let job = job_at(
            category,
            &[("pipe_type", "copper"), ("urgency", "high")],
            10.0,
            10.0,
        );
        let provider = provider_at(Some(10.0), Some(10.0));
        let caps = vec![capability(&provider, category, &[("pipe_type", "copper")])];
        // 30 + 20 (1 of 2) + 30
        assert_eq!(match_score(&job, &provider, &caps), 80);
    }

    #[test]
    fn provider_without_base_location_gets_no_proximity_points() {
        let category = Uuid::new_v4();
        let job = job_at(category, &[], 10.0, 10.0);
        let provider = provider_at(None, None);
        let caps = vec![capability(&provider, category, &[])];
        assert_eq!(match_score(&job, &provider, &caps), 30);
    }

    #[test]
    fn score_is_always_within_bounds() {
        let category = Uuid::new_v4();
        for km in [0.0, 1.0, 25.0, 49.9, 50.0, 500.0] {
            let job = job_at(category, &[("a", "1")], 0.0, 0.0);
            let provider = provider_at(Some(lat_offset_for_km(km)), Some(0.0));
            let caps = vec![capability(&provider, category, &[("a", "1")])];
            let score = match_score(&job, &provider, &caps);
            assert!((0..=100).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn haversine_zero_for_identical_points() {
        assert!(haversine_km(-24.63, 25.92, -24.63, 25.92) < 1e-9);
    }

    #[test]
    fn haversine_matches_known_meridian_distance() {
        // One degree of latitude is ~111.19 km on a 6371 km sphere.
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 0.05, "got {d}");
    }
}
