//! Optional profile details, at most one per user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::now;
use crate::errors::StoreError;
use crate::store::{Entity, Record, Table};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: i64,
    pub user_id: i64,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub profile_image_url: Option<String>,
    pub time_zone: Option<String>,
    pub preferred_language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            created_at: now(),
            ..Default::default()
        }
    }
}

impl Entity for UserProfile {
    const TABLE: Table = Table::UserProfiles;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_record(&self) -> Record {
        self.empty_record()
            .with("user_id", self.user_id)
            .with("job_title", self.job_title.clone())
            .with("department", self.department.clone())
            .with("company", self.company.clone())
            .with("bio", self.bio.clone())
            .with("website", self.website.clone())
            .with("linkedin_url", self.linkedin_url.clone())
            .with("twitter_url", self.twitter_url.clone())
            .with("profile_image_url", self.profile_image_url.clone())
            .with("time_zone", self.time_zone.clone())
            .with("preferred_language", self.preferred_language.clone())
            .with("created_at", self.created_at)
            .with("updated_at", self.updated_at)
    }

    fn from_record(record: &Record) -> Result<Self, StoreError> {
        Ok(Self {
            id: record.require_id()?,
            user_id: record.take("user_id")?,
            job_title: record.take("job_title")?,
            department: record.take("department")?,
            company: record.take("company")?,
            bio: record.take("bio")?,
            website: record.take("website")?,
            linkedin_url: record.take("linkedin_url")?,
            twitter_url: record.take("twitter_url")?,
            profile_image_url: record.take("profile_image_url")?,
            time_zone: record.take("time_zone")?,
            preferred_language: record.take("preferred_language")?,
            created_at: record.take("created_at")?,
            updated_at: record.take("updated_at")?,
        })
    }
}
