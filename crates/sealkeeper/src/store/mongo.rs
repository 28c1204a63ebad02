//! MongoDB-backed stores.
//!
//! The seed lives in its own collection (`cryptokeys` by default). New seeds
//! are written with an upsert on a fixed `_id` using `$setOnInsert`, so racing
//! first runs converge on one document instead of inserting two. Seed
//! documents written by older deployments (with generated `_id`s) are still
//! picked up by [`SeedStore::find_all`].

use async_trait::async_trait;
use bson::doc;
use common::{AccountRecord, SeedRecord};
use mongodb::{options::ReturnDocument, Client, Collection, Database};
use tracing::{debug, warn};

use super::{AccountStore, SeedStore, StoreError};

/// `_id` of the seed document created by this crate.
pub const SEED_DOCUMENT_ID: &str = "primary";

/// Database used when neither the configuration nor the URI names one.
pub const DEFAULT_DATABASE: &str = "sealkeeper";

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError::Database(e.kind.to_string())
    }
}

/// Connect to MongoDB and confirm the server answers a `ping`.
///
/// The database is `database` if given, otherwise the default database from
/// the URI, otherwise [`DEFAULT_DATABASE`].
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the URI is invalid or the server is
/// unreachable.
pub async fn connect(uri: &str, database: Option<&str>) -> Result<Database, StoreError> {
    let client = Client::with_uri_str(uri).await?;
    let db = match database {
        Some(name) => client.database(name),
        None => client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
    };
    db.run_command(doc! { "ping": 1 }).await?;
    debug!(database = %db.name(), "mongodb ping ok");
    Ok(db)
}

/// Seed store over a MongoDB collection.
#[derive(Clone, Debug)]
pub struct MongoSeedStore {
    collection: Collection<SeedRecord>,
}

impl MongoSeedStore {
    /// Use collection `name` in `db`.
    pub fn new(db: &Database, name: &str) -> Self {
        Self {
            collection: db.collection(name),
        }
    }
}

#[async_trait]
impl SeedStore for MongoSeedStore {
    async fn find_all(&self) -> Result<Vec<SeedRecord>, StoreError> {
        let mut cursor = self.collection.find(doc! {}).await?;
        let mut seeds = Vec::new();
        while cursor.advance().await? {
            seeds.push(
                cursor
                    .deserialize_current()
                    .map_err(|e| StoreError::Decode(e.kind.to_string()))?,
            );
        }
        Ok(seeds)
    }

    async fn insert_if_absent(&self, seed: SeedRecord) -> Result<SeedRecord, StoreError> {
        let filter = doc! { "_id": SEED_DOCUMENT_ID };
        let update = doc! {
            "$setOnInsert": {
                "KEY": seed.cipher_seed.as_str(),
                "HMAC_KEY": seed.hmac_seed.as_str(),
            }
        };

        let upserted = self
            .collection
            .find_one_and_update(filter.clone(), update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(StoreError::from);

        match settle_upsert(upserted)? {
            UpsertOutcome::Stored(stored) => Ok(stored),
            UpsertOutcome::Reread(upsert_error) => {
                warn!(error = %upsert_error, "seed upsert failed; re-reading seed document");
                let found = self.collection.find_one(filter).await?;
                settle_reread(found, upsert_error)
            }
        }
    }
}

/// What to do after the seed upsert returns.
#[derive(Debug)]
enum UpsertOutcome {
    /// The upsert wrote or matched this document.
    Stored(SeedRecord),
    /// The upsert failed. Two concurrent upserts on the same `_id` can fail one
    /// side with a duplicate key error, so the document may exist anyway.
    Reread(StoreError),
}

fn settle_upsert(
    upserted: Result<Option<SeedRecord>, StoreError>,
) -> Result<UpsertOutcome, StoreError> {
    match upserted {
        Ok(Some(stored)) => Ok(UpsertOutcome::Stored(stored)),
        Ok(None) => Err(StoreError::Database(
            "seed upsert returned no document".into(),
        )),
        Err(e) => Ok(UpsertOutcome::Reread(e)),
    }
}

/// A seed found on re-read wins; otherwise the upsert's own error stands.
fn settle_reread(
    found: Option<SeedRecord>,
    upsert_error: StoreError,
) -> Result<SeedRecord, StoreError> {
    found.ok_or(upsert_error)
}

/// Account store over a MongoDB collection.
#[derive(Clone, Debug)]
pub struct MongoAccountStore {
    collection: Collection<AccountRecord>,
}

impl MongoAccountStore {
    /// Use collection `name` in `db`.
    pub fn new(db: &Database, name: &str) -> Self {
        Self {
            collection: db.collection(name),
        }
    }
}

#[async_trait]
impl AccountStore for MongoAccountStore {
    async fn find_by_user(&self, user_digest: &str) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self
            .collection
            .find_one(doc! { "user": user_digest })
            .await?)
    }

    async fn save(&self, account: AccountRecord) -> Result<(), StoreError> {
        self.collection
            .replace_one(doc! { "user": account.user.as_str() }, &account)
            .upsert(true)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_seed() -> SeedRecord {
        SeedRecord {
            cipher_seed: "aa".repeat(32),
            hmac_seed: "bb".repeat(32),
        }
    }

    #[test]
    fn successful_upsert_returns_stored_document() {
        let outcome = settle_upsert(Ok(Some(fixture_seed()))).unwrap();
        assert!(matches!(outcome, UpsertOutcome::Stored(seed) if seed == fixture_seed()));
    }

    #[test]
    fn upsert_without_document_is_database_error() {
        let err = settle_upsert(Ok(None)).unwrap_err();
        assert!(matches!(err, StoreError::Database(msg) if msg.contains("no document")));
    }

    #[test]
    fn failed_upsert_falls_back_to_reread() {
        let outcome = settle_upsert(Err(StoreError::Database("E11000 duplicate key".into())));
        assert!(matches!(outcome, Ok(UpsertOutcome::Reread(StoreError::Database(_)))));
    }

    #[test]
    fn lost_race_returns_winning_document() {
        let upsert_error = StoreError::Database("E11000 duplicate key".into());
        assert_eq!(
            settle_reread(Some(fixture_seed()), upsert_error).unwrap(),
            fixture_seed()
        );
    }

    #[test]
    fn empty_reread_keeps_upsert_error() {
        let upsert_error = StoreError::Database("not primary".into());
        let err = settle_reread(None, upsert_error).unwrap_err();
        assert!(matches!(err, StoreError::Database(msg) if msg == "not primary"));
    }

    #[test]
    fn seed_document_round_trips_through_bson() {
        let seed = fixture_seed();
        let document = bson::to_document(&seed).unwrap();
        assert_eq!(document.get_str("KEY").unwrap(), "aa".repeat(32));
        assert_eq!(document.get_str("HMAC_KEY").unwrap(), "bb".repeat(32));
        let back: SeedRecord = bson::from_document(document).unwrap();
        assert_eq!(back, seed);
    }

    #[test]
    fn legacy_seed_document_with_object_id_decodes() {
        let document = doc! {
            "_id": bson::oid::ObjectId::new(),
            "KEY": "01",
            "HMAC_KEY": "02",
        };
        let seed: SeedRecord = bson::from_document(document).unwrap();
        assert_eq!(seed.cipher_seed, "01");
    }

    #[test]
    fn account_document_stores_secret_as_string() {
        let account = AccountRecord {
            user: "ABC".into(),
            secret: "aa$bb$cc".parse().unwrap(),
        };
        let document = bson::to_document(&account).unwrap();
        assert_eq!(document.get_str("secret").unwrap(), "aa$bb$cc");
    }
}
