use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use coffer::ai::HttpCompletionClient;
use coffer::config::{CofferPaths, Settings};
use coffer::crypto::SecretString;
use coffer::models::{
    AiProvider, AiSettings, BankAccount, CategoryId, Money, TransactionId,
};
use coffer::services::{self, DemoBankLink};
use coffer::vault::{AuthMethod, HttpRemoteStore, Session, UserProfile, VaultStore};
use coffer::CofferError;

#[derive(Parser)]
#[command(
    name = "coffer",
    version,
    about = "Client-side encrypted personal finance vault",
    long_about = "Coffer keeps your transactions, budgets, and settings in a \
                  vault only your passphrase can open. Everything is encrypted \
                  on this device; remote backups only ever hold ciphertext."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new vault
    Init {
        /// Email address to associate with the vault
        email: String,
        /// Display name (defaults to the email local part)
        #[arg(long)]
        name: Option<String>,
    },

    /// Unlock the vault and show a summary
    Status,

    /// Link a demo bank account
    Link {
        /// Institution name
        #[arg(default_value = "Demo Bank")]
        institution: String,
    },

    /// Fetch new transactions, categorize them, and save the vault
    Sync,

    /// Move a transaction to a category and learn a rule from it
    #[command(alias = "recat")]
    Recategorize {
        /// Transaction id
        transaction: String,
        /// Target category slug, e.g. `groceries`
        category: String,
    },

    /// Suggest categorization rules from recurring merchants
    Suggest,

    /// Add a spending category
    Category {
        /// Display name, e.g. "Pet Care"
        name: String,
    },

    /// Set a monthly budget for a category
    Budget {
        /// Category slug
        category: String,
        /// Month, `YYYY-MM`
        month: String,
        /// Amount in whole dollars
        amount: i64,
    },

    /// Configure the AI categorization provider
    Ai {
        /// Provider: openai, anthropic, or google
        provider: String,
        /// Model override (defaults to the provider's recommended model)
        #[arg(long)]
        model: Option<String>,
        /// Disable AI categorization instead
        #[arg(long)]
        off: bool,
    },

    /// Show current configuration and paths
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = CofferPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let store = open_store(paths, &settings)?;

    match cli.command {
        Commands::Init { email, name } => init(&store, email, name).await,
        Commands::Status => status(&store).await,
        Commands::Link { institution } => link(&store, institution).await,
        Commands::Sync => sync(&store, &settings).await,
        Commands::Recategorize {
            transaction,
            category,
        } => recategorize(&store, transaction, category).await,
        Commands::Suggest => suggest(&store).await,
        Commands::Category { name } => add_category(&store, name).await,
        Commands::Budget {
            category,
            month,
            amount,
        } => set_budget(&store, category, month, amount).await,
        Commands::Ai {
            provider,
            model,
            off,
        } => configure_ai(&store, provider, model, off).await,
        Commands::Config => show_config(&store, &settings),
    }
}

fn open_store(paths: CofferPaths, settings: &Settings) -> Result<VaultStore> {
    Ok(match &settings.remote_base_url {
        Some(url) => VaultStore::with_remote(paths, Box::new(HttpRemoteStore::new(url.clone())?)),
        None => VaultStore::new(paths),
    })
}

fn prompt_secret(prompt: &str) -> Result<SecretString> {
    let raw = rpassword::prompt_password(prompt).context("failed to read passphrase")?;
    if raw.trim().is_empty() {
        bail!("passphrase must not be empty");
    }
    Ok(SecretString::from(raw))
}

async fn unlock(store: &VaultStore) -> Result<Session> {
    let profile = store
        .load_profile()?
        .context("no vault on this device; run `coffer init` first")?;
    let secret = prompt_secret("Passphrase: ")?;
    match store.unlock(profile, &secret).await {
        Ok(session) => Ok(session),
        Err(err) if err.is_authentication() => {
            // Deliberately vague: do not reveal whether the vault exists
            // remotely or which part of the secret was wrong.
            bail!("could not unlock vault")
        }
        Err(CofferError::VaultNotFound) => bail!("no vault found; run `coffer init` first"),
        Err(err) => Err(err.into()),
    }
}

async fn init(store: &VaultStore, email: String, name: Option<String>) -> Result<()> {
    if store.paths().is_initialized() {
        bail!("a vault already exists on this device; remove it before re-initializing");
    }
    let display_name = name.unwrap_or_else(|| {
        email
            .split('@')
            .next()
            .unwrap_or(email.as_str())
            .to_string()
    });
    let secret = prompt_secret("Choose a passphrase: ")?;
    let confirm = prompt_secret("Confirm passphrase: ")?;
    if secret.expose() != confirm.expose() {
        bail!("passphrases do not match");
    }

    let profile = UserProfile {
        user_id: uuid::Uuid::new_v4().to_string(),
        email,
        display_name,
        auth_method: AuthMethod::Password,
    };
    let session = store.create_vault(profile, &secret).await?;
    println!("Vault created for {}", session.profile.email);
    println!("Data directory: {}", store.paths().base_dir().display());
    Ok(())
}

async fn status(store: &VaultStore) -> Result<()> {
    let session = unlock(store).await?;
    let meta = &session.vault.metadata;
    println!("Vault for {}", session.profile.email);
    println!("  transactions:    {}", session.transactions.len());
    println!("  monthly shards:  {}", session.vault.shards.len());
    println!("  categories:      {}", meta.categories.len());
    println!("  rules:           {}", meta.rules.len());
    println!("  linked accounts: {}", meta.linked_accounts.len());
    let uncategorized = session
        .transactions
        .iter()
        .filter(|t| t.is_uncategorized())
        .count();
    println!("  uncategorized:   {}", uncategorized);
    match &meta.ai_settings {
        Some(ai) if ai.is_usable() => println!("  ai:              {:?} enabled", ai.provider),
        _ => println!("  ai:              off"),
    }
    Ok(())
}

async fn link(store: &VaultStore, institution: String) -> Result<()> {
    let mut session = unlock(store).await?;
    let account = BankAccount {
        id: coffer::models::AccountId::random(),
        provider_account_id: None,
        institution_name: institution.clone(),
        account_name: "Checking".to_string(),
        mask: "0000".to_string(),
        added_at: chrono::Utc::now(),
    };
    session.vault.metadata.linked_accounts.push(account);
    store.persist_local(&session.vault, session.key())?;
    println!("Linked {} (demo data). Run `coffer sync` to fetch.", institution);
    Ok(())
}

async fn sync(store: &VaultStore, settings: &Settings) -> Result<()> {
    let mut session = unlock(store).await?;
    if session.vault.metadata.linked_accounts.is_empty() {
        bail!("no linked accounts; run `coffer link` first");
    }
    let bank = DemoBankLink::new();
    let ai_client = HttpCompletionClient::new(settings.ai_relay_url.clone())?;
    let report = services::sync_accounts(&mut session, store, &bank, &ai_client).await?;

    println!("Fetched {} new transactions", report.new_transactions);
    if report.ai_categorized > 0 {
        println!("AI categorized {}", report.ai_categorized);
    }
    if let Some(err) = report.ai_error {
        println!("AI categorization unavailable: {}", err);
    }
    Ok(())
}

async fn recategorize(store: &VaultStore, transaction: String, category: String) -> Result<()> {
    let mut session = unlock(store).await?;
    let tx_id = TransactionId::new(transaction);
    let category_id = CategoryId::new(category);
    services::recategorize_transaction(&mut session, store, &tx_id, &category_id)?;
    let name = session
        .vault
        .metadata
        .category_name(&category_id)
        .unwrap_or("?")
        .to_string();
    println!("Moved {} to {}", tx_id, name);
    Ok(())
}

async fn suggest(store: &VaultStore) -> Result<()> {
    let session = unlock(store).await?;
    let suggestions = coffer::categorize::suggest_rules(
        &session.transactions,
        &session.vault.metadata.rules,
        &session.vault.metadata.categories,
    );
    if suggestions.is_empty() {
        println!("No rule suggestions yet.");
        return Ok(());
    }
    for s in suggestions {
        println!(
            "\"{}\" -> {} (seen {} times)",
            s.pattern, s.category_name, s.count
        );
    }
    Ok(())
}

async fn add_category(store: &VaultStore, name: String) -> Result<()> {
    let mut session = unlock(store).await?;
    let category = services::add_category(&mut session, store, &name)?;
    println!("Added category {} ({})", category.name, category.id.as_str());
    Ok(())
}

async fn set_budget(store: &VaultStore, category: String, month: String, amount: i64) -> Result<()> {
    let mut session = unlock(store).await?;
    let category_id = CategoryId::new(category);
    if session
        .vault
        .metadata
        .category_name(&category_id)
        .is_none()
    {
        bail!("unknown category: {}", category_id.as_str());
    }
    services::set_budget(
        &mut session,
        store,
        &category_id,
        &month,
        Money::from_dollars(amount),
    )?;
    println!("Budget for {} in {} set to ${}", category_id.as_str(), month, amount);
    Ok(())
}

async fn configure_ai(
    store: &VaultStore,
    provider: String,
    model: Option<String>,
    off: bool,
) -> Result<()> {
    let mut session = unlock(store).await?;
    if off {
        services::update_ai_settings(&mut session, store, None)?;
        println!("AI categorization disabled");
        return Ok(());
    }
    let provider = match provider.as_str() {
        "openai" => AiProvider::OpenAi,
        "anthropic" => AiProvider::Anthropic,
        "google" => AiProvider::Google,
        other => bail!("unknown provider: {} (expected openai, anthropic, or google)", other),
    };
    let api_key = rpassword::prompt_password("API key: ").context("failed to read API key")?;
    let settings = AiSettings {
        provider,
        api_key,
        model: model.unwrap_or_default(),
        enabled: true,
    };
    services::update_ai_settings(&mut session, store, Some(settings))?;
    println!("AI categorization enabled with {:?}", provider);
    Ok(())
}

fn show_config(store: &VaultStore, settings: &Settings) -> Result<()> {
    let paths = store.paths();
    println!("Data directory: {}", paths.base_dir().display());
    println!("Vault file:     {}", paths.vault_file().display());
    println!("Initialized:    {}", paths.is_initialized());
    println!(
        "Remote backup:  {}",
        settings.remote_base_url.as_deref().unwrap_or("(local only)")
    );
    println!(
        "AI relay:       {}",
        settings.ai_relay_url.as_deref().unwrap_or("(direct)")
    );
    Ok(())
}
