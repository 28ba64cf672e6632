use app_core::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use super::repository::IdentityRepository;
use crate::domain::entity::identity::{ContactField, Identity, NewIdentity, Provider, ProviderAccounts};

const IDENTITIES: &str = "identities";

/// Wire shape of one identity document, kept separate from the domain
/// entity so storage concerns never leak upward.
#[derive(Debug, Serialize, Deserialize)]
struct IdentityDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    provider_accounts: ProviderAccounts,
    display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile_image_url: Option<String>,
    created_at: BsonDateTime,
    updated_at: BsonDateTime,
}

impl IdentityDocument {
    fn from_new(new_identity: NewIdentity) -> Self {
        let now = BsonDateTime::now();
        Self {
            id: ObjectId::new(),
            provider_accounts: ProviderAccounts::linked(new_identity.provider, new_identity.provider_account_id),
            display_name: new_identity.display_name,
            email: new_identity.email,
            phone: None,
            location: None,
            profile_image_url: new_identity.profile_image_url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// MongoDB-backed [`IdentityRepository`].
pub struct IdentityMongo {
    identities: Collection<IdentityDocument>,
}

impl IdentityMongo {
    pub fn new(db: &Database) -> Self {
        Self { identities: db.collection(IDENTITIES) }
    }

    fn to_identity(&self, document: IdentityDocument) -> Identity {
        Identity {
            id: document.id.to_hex(),
            provider_accounts: document.provider_accounts,
            display_name: document.display_name,
            email: document.email,
            phone: document.phone,
            location: document.location,
            profile_image_url: document.profile_image_url,
            created_at: to_chrono(document.created_at),
            updated_at: to_chrono(document.updated_at),
        }
    }
}

fn to_chrono(datetime: BsonDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(datetime.timestamp_millis()).unwrap_or_default()
}

#[async_trait]
impl IdentityRepository for IdentityMongo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, AppError> {
        // A malformed id cannot match any document; treat it as absent.
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let document = self.identities.find_one(doc! { "_id": object_id }).await?;

        Ok(document.map(|d| self.to_identity(d)))
    }

    async fn find_by_provider_account(
        &self,
        provider: Provider,
        account_id: &str,
    ) -> Result<Option<Identity>, AppError> {
        let mut filter = Document::new();
        filter.insert(format!("provider_accounts.{provider}"), account_id);

        let document = self.identities.find_one(filter).await?;

        Ok(document.map(|d| self.to_identity(d)))
    }

    async fn create(&self, new_identity: NewIdentity) -> Result<Identity, AppError> {
        let document = IdentityDocument::from_new(new_identity);
        self.identities.insert_one(&document).await?;

        Ok(self.to_identity(document))
    }

    async fn set_contact_field(&self, id: &str, field: ContactField, value: &str) -> Result<(), AppError> {
        let object_id =
            ObjectId::parse_str(id).map_err(|_| AppError::NotFound("Identity not found".to_string()))?;

        let mut changes = Document::new();
        changes.insert(field.as_str(), value);
        changes.insert("updated_at", BsonDateTime::now());

        let result = self
            .identities
            .update_one(doc! { "_id": object_id }, doc! { "$set": changes })
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound("Identity not found".to_string()));
        }

        Ok(())
    }
}
