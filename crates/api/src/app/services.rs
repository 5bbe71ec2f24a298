//! Storage backend selection and shared service wiring.

use std::sync::Arc;

use stockroom_auth::{TokenConfig, TokenService};
use stockroom_store::seed;
use stockroom_store::{
    AuthFlows, CatalogStore, IdentityStore, MemoryStore, MovementStore, PartyStore,
    TenantDirectory,
};

#[cfg(feature = "postgres")]
use stockroom_store::PostgresStore;

/// Shared handles behind every request handler. One storage backend
/// implements all five store traits; the handles are clones of it.
pub struct AppServices {
    pub tenants: Arc<dyn TenantDirectory>,
    pub identity: Arc<dyn IdentityStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub parties: Arc<dyn PartyStore>,
    pub movements: Arc<dyn MovementStore>,
    pub flows: AuthFlows,
    pub tokens: Arc<TokenService>,
}

impl AppServices {
    fn assemble<S>(store: Arc<S>, tokens: TokenService) -> Self
    where
        S: TenantDirectory + IdentityStore + CatalogStore + PartyStore + MovementStore + 'static,
    {
        let identity: Arc<dyn IdentityStore> = store.clone();
        Self {
            tenants: store.clone(),
            identity: identity.clone(),
            catalog: store.clone(),
            parties: store.clone(),
            movements: store,
            flows: AuthFlows::new(identity, tokens.clone()),
            tokens: Arc::new(tokens),
        }
    }
}

/// Build the service set, honoring `USE_PERSISTENT_STORES`. Built-in roles
/// are ensured on every start; `SEED_DEMO_DATA=true` additionally loads the
/// demo tenant.
pub async fn build_services(jwt_secret: String) -> AppServices {
    let tokens = TokenService::new(&TokenConfig::new(jwt_secret));
    let services = select_backend(tokens).await;
    seed_on_startup(&services).await;
    services
}

async fn select_backend(tokens: TokenService) -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        #[cfg(feature = "postgres")]
        {
            return build_postgres_services(tokens).await;
        }
        #[cfg(not(feature = "postgres"))]
        {
            tracing::warn!(
                "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
            );
            return build_in_memory_services(tokens);
        }
    }

    build_in_memory_services(tokens)
}

fn build_in_memory_services(tokens: TokenService) -> AppServices {
    AppServices::assemble(Arc::new(MemoryStore::new()), tokens)
}

#[cfg(feature = "postgres")]
async fn build_postgres_services(tokens: TokenService) -> AppServices {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");

    let store = PostgresStore::connect(&database_url)
        .await
        .expect("failed to connect to Postgres");
    store
        .ensure_schema()
        .await
        .expect("failed to apply database schema");

    AppServices::assemble(Arc::new(store), tokens)
}

async fn seed_on_startup(services: &AppServices) {
    seed::ensure_builtin_roles(services.identity.as_ref())
        .await
        .expect("failed to ensure built-in roles");

    let seed_demo = std::env::var("SEED_DEMO_DATA")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);
    if seed_demo {
        seed::seed_demo_data(
            services.tenants.as_ref(),
            services.identity.as_ref(),
            services.catalog.as_ref(),
        )
        .await
        .expect("failed to seed demo data");
        tracing::info!(
            tenant = seed::DEMO_TENANT_NAME,
            owner = seed::DEMO_OWNER_EMAIL,
            "demo data seeded"
        );
    }
}
