use tracing::{error, info, warn};

use forumbridge::{
    Config, ContentSource, ForumAdapter, HookRegistry, MemoryContentStore, PermalinkRouter,
    RoleBackend,
};

fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = forumbridge::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        forumbridge::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("forumbridge - Forum content-source adapter");
    info!(
        "Forums served under {}/{}",
        config.forum.site_url.trim_end_matches('/'),
        config.forum.forum_root
    );

    let (store, backend) = match &config.forum.fixtures {
        Some(path) => {
            let store = MemoryContentStore::load(path).unwrap_or_else(|e| {
                warn!("Failed to load records from {}: {}", path, e);
                MemoryContentStore::new()
            });
            let backend = RoleBackend::load(path).unwrap_or_else(|e| {
                warn!("Failed to load users from {}: {}", path, e);
                RoleBackend::new()
            });
            (store, backend)
        }
        None => (MemoryContentStore::new(), RoleBackend::new()),
    };
    info!("Loaded {} content records", store.len());

    let router = match PermalinkRouter::from_config(&store, &config.forum) {
        Ok(router) => router,
        Err(e) => {
            error!("Failed to create router: {}", e);
            std::process::exit(1);
        }
    };
    let adapter = ForumAdapter::from_config(&store, &backend, &router, &config.forum, &config.forum);

    let mut hooks = HookRegistry::new();
    adapter.register(&mut hooks);

    for url in std::env::args().skip(1) {
        match adapter.resolve_incoming_url(&url) {
            Ok(Some(found)) => info!(
                "{} -> {} {} ({})",
                url,
                found.content_type,
                found.id,
                adapter.get_link(found.content_type.as_str(), found.id)
            ),
            Ok(None) => info!("{} -> no match", url),
            Err(e) => warn!("{} -> {}", url, e),
        }
    }
}
