use mongodb::{options::IndexOptions, Client, Collection, Database};
use std::error::Error;

pub const USERS: &str = "users";
pub const DUTIES: &str = "duties";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        // Timeouts
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        let db = client.database(&database_name_from_uri(uri));

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates necessary indexes for optimal query performance
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        // users(netid) - netid é a chave primária lógica
        let users = self.database().collection::<mongodb::bson::Document>(USERS);

        let netid_index = IndexModel::builder()
            .keys(doc! { "netid": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match users.create_index(netid_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(netid) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let duties = self.database().collection::<mongodb::bson::Document>(DUTIES);

        // duties(type, date.time) - checklist por tipo, ordenado por data
        let type_index = IndexModel::builder()
            .keys(doc! { "type": 1, "date.time": 1 })
            .build();

        match duties.create_index(type_index).await {
            Ok(_) => log::info!("   ✅ Index created: duties(type, date.time)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // duties(assigned) - roster de um residente
        let assigned_index = IndexModel::builder()
            .keys(doc! { "assigned": 1 })
            .build();

        match duties.create_index(assigned_index).await {
            Ok(_) => log::info!("   ✅ Index created: duties(assigned)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn health_check(&self) -> bool {
        self.db.list_collection_names().await.is_ok()
    }
}

/// Extract database name from URI or use default
fn database_name_from_uri(uri: &str) -> String {
    uri.trim_start_matches("mongodb+srv://")
        .trim_start_matches("mongodb://")
        .split_once('/')
        .map(|(_, rest)| rest.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or("duty_roster")
        .to_string()
}
