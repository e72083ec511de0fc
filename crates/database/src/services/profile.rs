use crate::{
    entities::user_profiles,
    error::{ServiceError, ServiceResult, is_unique_violation},
    storage::{FileStore, UploadedFile},
};
use chrono::Utc;
use log::info;
use models::validation::{ProfileDraft, validate_picture};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};
use uuid::Uuid;

pub struct ProfileService;

impl ProfileService {
    /// Returns the user's profile, creating an empty one on first access
    pub async fn get_or_create(
        db: &DatabaseConnection,
        user_id: &str,
    ) -> Result<user_profiles::Model, DbErr> {
        if let Some(profile) = Self::find(db, user_id).await? {
            return Ok(profile);
        }

        let now = Utc::now();
        let profile = user_profiles::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id.to_string()),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match profile.insert(db).await {
            Ok(profile) => {
                info!("Created profile for {user_id}");
                Ok(profile)
            }
            Err(err) if is_unique_violation(&err) => Self::find(db, user_id).await?.ok_or(err),
            Err(err) => Err(err),
        }
    }

    pub async fn update_profile(
        db: &DatabaseConnection,
        user_id: &str,
        draft: ProfileDraft,
    ) -> ServiceResult<user_profiles::Model> {
        draft.validate()?;
        let profile = Self::get_or_create(db, user_id).await?;

        let optional = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut profile: user_profiles::ActiveModel = profile.into();
        profile.first_name = Set(draft.first_name.trim().to_string());
        profile.last_name = Set(draft.last_name.trim().to_string());
        profile.description = Set(optional(draft.description));
        profile.birth_date = Set(draft.birth_date);
        profile.address_line1 = Set(optional(draft.address_line1));
        profile.address_line2 = Set(optional(draft.address_line2));
        profile.city = Set(optional(draft.city));
        profile.state = Set(optional(draft.state));
        profile.zip_code = Set(optional(draft.zip_code));
        profile.phone = Set(optional(draft.phone));
        profile.link1 = Set(optional(draft.link1));
        profile.link2 = Set(optional(draft.link2));
        profile.link3 = Set(optional(draft.link3));
        profile.updated_at = Set(Utc::now());

        let profile = profile.update(db).await?;
        info!("Updated profile for {user_id}");
        Ok(profile)
    }

    /// Replaces the profile picture. The previous file is removed best-effort.
    pub async fn set_picture(
        db: &DatabaseConnection,
        files: &FileStore,
        user_id: &str,
        upload: UploadedFile,
    ) -> ServiceResult<user_profiles::Model> {
        let extension = validate_picture(&upload.file_name, upload.bytes.len())?;
        let profile = Self::get_or_create(db, user_id).await?;
        let previous = profile.picture_file_name.clone();

        let now = Utc::now();
        let file_name = files
            .save_profile_picture(user_id, &extension, &upload.bytes, now)
            .await?;

        let content_type = upload
            .content_type
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or_else(|| content_type_for(&extension).to_string());

        let mut profile: user_profiles::ActiveModel = profile.into();
        profile.picture_file_name = Set(Some(file_name.clone()));
        profile.picture_data = Set(Some(upload.bytes));
        profile.picture_content_type = Set(Some(content_type));
        profile.picture_uploaded_at = Set(Some(now));
        profile.updated_at = Set(now);

        let profile = match profile.update(db).await {
            Ok(profile) => profile,
            Err(err) => {
                files.remove_quietly(&FileStore::picture_path(&file_name)).await;
                return Err(err.into());
            }
        };

        if let Some(previous) = previous.filter(|previous| *previous != file_name) {
            files.remove_quietly(&FileStore::picture_path(&previous)).await;
        }
        info!("Stored profile picture {file_name} for {user_id}");
        Ok(profile)
    }

    pub async fn remove_picture(
        db: &DatabaseConnection,
        files: &FileStore,
        user_id: &str,
    ) -> ServiceResult<user_profiles::Model> {
        let profile = Self::get_or_create(db, user_id).await?;
        let Some(file_name) = profile.picture_file_name.clone() else {
            return Ok(profile);
        };

        files.remove_quietly(&FileStore::picture_path(&file_name)).await;

        let mut profile: user_profiles::ActiveModel = profile.into();
        profile.picture_file_name = Set(None);
        profile.picture_data = Set(None);
        profile.picture_content_type = Set(None);
        profile.picture_uploaded_at = Set(None);
        profile.updated_at = Set(Utc::now());

        let profile = profile.update(db).await?;
        info!("Removed profile picture for {user_id}");
        Ok(profile)
    }

    /// Stored picture bytes and content type
    pub async fn picture(
        db: &DatabaseConnection,
        user_id: &str,
    ) -> ServiceResult<(Vec<u8>, String)> {
        let profile = Self::find(db, user_id).await?;

        profile
            .and_then(|p| p.picture_data.zip(p.picture_content_type))
            .ok_or_else(|| ServiceError::not_found("No profile picture"))
    }

    async fn find(
        db: &DatabaseConnection,
        user_id: &str,
    ) -> Result<Option<user_profiles::Model>, DbErr> {
        user_profiles::Entity::find()
            .filter(user_profiles::Column::UserId.eq(user_id))
            .one(db)
            .await
    }
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        ".png" => "image/png",
        ".gif" => "image/gif",
        _ => "image/jpeg",
    }
}
