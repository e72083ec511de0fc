use chrono::{DateTime, NaiveDate, Utc};
use database::entities::user_profiles;
use models::validation::ProfileDraft;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub description: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub links: Vec<String>,
    pub has_picture: bool,
    pub picture_uploaded_at: Option<DateTime<Utc>>,
    pub last_updated_at: DateTime<Utc>,
}

impl From<user_profiles::Model> for ProfileResponse {
    fn from(profile: user_profiles::Model) -> Self {
        let links = [profile.link1, profile.link2, profile.link3]
            .into_iter()
            .flatten()
            .collect();

        Self {
            user_id: profile.user_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            description: profile.description,
            birth_date: profile.birth_date,
            address_line1: profile.address_line1,
            address_line2: profile.address_line2,
            city: profile.city,
            state: profile.state,
            zip_code: profile.zip_code,
            phone: profile.phone,
            links,
            has_picture: profile.picture_data.is_some(),
            picture_uploaded_at: profile.picture_uploaded_at,
            last_updated_at: profile.updated_at,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub description: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub link1: Option<String>,
    pub link2: Option<String>,
    pub link3: Option<String>,
}

impl From<ProfileRequest> for ProfileDraft {
    fn from(request: ProfileRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            description: request.description,
            birth_date: request.birth_date,
            address_line1: request.address_line1,
            address_line2: request.address_line2,
            city: request.city,
            state: request.state,
            zip_code: request.zip_code,
            phone: request.phone,
            link1: request.link1,
            link2: request.link2,
            link3: request.link3,
        }
    }
}
