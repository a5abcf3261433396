use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use std::time::Duration;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::admin::Admin;
use crate::models::otp::OtpRecord;

pub async fn get_db_client(config: &AppConfig) -> Result<Database> {
    let client = Client::with_uri_str(&config.database_url).await?;
    let db = client.database(&config.database_name);

    db.run_command(doc! { "ping": 1 }).await?;
    tracing::info!("✅ Connected to database: {}", config.database_name);

    Ok(db)
}

pub async fn ensure_indexes(db: &Database, otp_ttl: Duration) -> Result<()> {
    let admins = db.collection::<Admin>("admins");

    admins
        .create_index(unique_index(doc! { "email_address": 1 }, false))
        .await?;
    admins
        .create_index(unique_index(doc! { "phone_number": 1 }, false))
        .await?;
    // restaurant_name is optional, so uniqueness only applies where present
    admins
        .create_index(unique_index(doc! { "restaurant_name": 1 }, true))
        .await?;

    let otps = db.collection::<OtpRecord>("otps");

    otps.create_index(unique_index(doc! { "email_address": 1 }, false))
        .await?;
    // Mongo reaps expired codes in the background; reads still filter on
    // created_at, so a not-yet-reaped record cannot verify.
    otps.create_index(
        IndexModel::builder()
            .keys(doc! { "created_at": 1 })
            .options(IndexOptions::builder().expire_after(otp_ttl).build())
            .build(),
    )
    .await?;

    Ok(())
}

fn unique_index(keys: mongodb::bson::Document, sparse: bool) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .unique(true)
                .sparse(sparse)
                .build(),
        )
        .build()
}
