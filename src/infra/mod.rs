use crate::config::db::MongoConfig;
use mongodb::IndexModel;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::Client as MongoClient;
use mongodb::Database;

#[derive(Debug, Clone)]
pub struct InfraClients {
    pub mongo_db: Database,
}

pub const SNAPSHOTS_COLLECTION: &str = "rate_snapshots";

pub async fn init_infra(mongo: &MongoConfig) -> Result<Option<InfraClients>, String> {
    let Some(url) = &mongo.url else {
        return Ok(None);
    };

    let mongo_client = MongoClient::with_uri_str(url)
        .await
        .map_err(|e| format!("mongodb client init failed: {e}"))?;
    let mongo_db = mongo_client.database(&mongo.database);
    ensure_indexes(&mongo_db).await?;

    Ok(Some(InfraClients { mongo_db }))
}

async fn ensure_indexes(db: &Database) -> Result<(), String> {
    let collection = db.collection::<mongodb::bson::Document>(SNAPSHOTS_COLLECTION);

    // one snapshot per (base, day); timestamps are normalized to day starts
    let unique = IndexOptions::builder().unique(true).build();
    let index = IndexModel::builder()
        .keys(doc! { "base": 1, "timestamp": 1 })
        .options(unique)
        .build();

    collection
        .create_index(index)
        .await
        .map_err(|e| format!("mongodb index creation failed: {e}"))?;
    Ok(())
}
