use anyhow::{Context, Result};
use bigdecimal::BigDecimal;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::env;
use std::sync::Arc;
use tracing::debug;

use wallet_fleet::chain::HttpChainClient;
use wallet_fleet::cli_utils::formatting::{print_distribution_report, print_stats, print_wallets};
use wallet_fleet::cli_utils::{
    CliError, CliResult, FleetOperation, Input, format_record, print_error, print_header, print_info, print_success,
    print_warning,
};
use wallet_fleet::distribution::{DistributionEngine, ReportWriter, TransferMode, resolve_amount};
use wallet_fleet::keys::Bip39KeyProvider;
use wallet_fleet::ledger::BalanceLedger;
use wallet_fleet::oracle::{HttpPriceOracle, fiat_to_tokens, spot_price_or_fallback};
use wallet_fleet::storage::FileStore;
use wallet_fleet::utils::app_config::FleetConfig;
use wallet_fleet::wallets::{BatchGenerator, WalletRegistry};

#[derive(Parser, Debug)]
#[command(name = "wallet-fleet", about = "Master/child wallet registry and distribution engine")]
struct Cli {
    #[command(flatten)]
    config: FleetConfig,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the registry, creating the master wallet on first run
    Init,
    /// Generate child wallets
    Create { count: u32 },
    /// Show master and child wallets
    List,
    /// Show wallet counts
    Stats,
    /// Show the master balance (on-chain plus simulated)
    Balance,
    /// Credit the simulated balance with tokens bought for a fiat amount
    Fund { fiat: BigDecimal },
    /// Split an amount across all child wallets; 0 uses 95% of the available balance
    Distribute { amount: BigDecimal },
    /// Interactive menu
    Menu,
}

/// Everything one CLI session works with
struct FleetApp {
    config: FleetConfig,
    registry: WalletRegistry<FileStore>,
    generator: BatchGenerator<Bip39KeyProvider>,
    ledger: BalanceLedger<HttpChainClient>,
    engine: DistributionEngine<HttpChainClient, FileStore>,
    oracle: HttpPriceOracle,
}

impl FleetApp {
    async fn bootstrap(config: FleetConfig) -> Result<Self> {
        let store = FileStore::new(&config.fleet_data_dir).with_context(|| {
            format!("opening data directory {}", config.fleet_data_dir.display())
        })?;

        let chain = Arc::new(
            HttpChainClient::new(&config.fleet_chain_endpoint, config.fleet_chain_api_key.clone())
                .context("building chain client")?
                .with_retry(config.fleet_retry_limit, config.fleet_retry_delay_ms),
        );
        let oracle = HttpPriceOracle::new(&config.fleet_price_endpoint)
            .context("building price oracle")?
            .with_retry(config.fleet_retry_limit, config.fleet_retry_delay_ms);

        let generator = BatchGenerator::new(Bip39KeyProvider::new(), config.generator_config());
        let mut registry = WalletRegistry::new(store.clone());
        registry
            .initialize(generator.key_provider())
            .await
            .context("initializing wallet registry")?;

        let engine = DistributionEngine::new(
            chain.clone(),
            ReportWriter::new(store),
            config.distribution_config(),
        );

        Ok(Self {
            ledger: BalanceLedger::new(chain),
            config,
            registry,
            generator,
            engine,
            oracle,
        })
    }

    fn master_address(&self) -> Result<String> {
        self.registry
            .master()
            .map(|m| m.address().to_string())
            .context("master wallet missing after initialization")
    }

    fn show_init(&self) -> Result<()> {
        let stats = self.registry.stats();
        print_success("Wallet registry ready");
        format_record(vec![
            ("Master address", self.master_address()?),
            ("Child wallets", stats.total_children.to_string()),
            ("Data directory", self.config.fleet_data_dir.display().to_string()),
            ("Transfer mode", self.engine.mode().to_string()),
        ]);
        Ok(())
    }

    async fn create(&mut self, count: u32) -> Result<()> {
        self.config
            .check_wallet_count(count)
            .context("validating wallet count")?;

        print_info(&format!("Generating {} child wallet(s)...", count));
        let created = self
            .generator
            .create_many(&mut self.registry, count, |p| {
                eprintln!(
                    "  group {}/{}: {}/{} ({:.0}%)",
                    p.group,
                    p.groups,
                    p.completed,
                    p.total,
                    p.percent()
                );
            })
            .await
            .context("creating child wallets")?;

        if let (Some(first), Some(last)) = (created.first(), created.last()) {
            print_success(&format!(
                "Created {} wallet(s), indices {}..={}",
                created.len(),
                first.index(),
                last.index()
            ));
        }
        Ok(())
    }

    fn list(&mut self) -> Result<()> {
        self.registry.reload().context("reloading wallet registry")?;
        print_wallets(&self.registry.all_wallets());
        Ok(())
    }

    fn stats(&mut self) -> Result<()> {
        self.registry.reload().context("reloading wallet registry")?;
        print_stats(&self.registry.stats());
        Ok(())
    }

    async fn balance(&self) -> Result<()> {
        let address = self.master_address()?;
        let total = self.ledger.real_plus_simulated_balance(&address).await;

        format_record(vec![
            ("Master address", address),
            ("Simulated part", self.ledger.simulated().normalized().to_plain_string()),
            ("Total balance", total.bright_green().to_string()),
        ]);
        Ok(())
    }

    async fn fund(&mut self, fiat: &BigDecimal) -> Result<()> {
        let price = spot_price_or_fallback(&self.oracle, &self.config.fleet_price_pair).await;
        let tokens = fiat_to_tokens(fiat, &price).context("converting fiat amount")?;
        self.ledger.credit(&tokens).context("crediting simulated balance")?;

        print_success(&format!(
            "Credited {} tokens for {} at {} per token",
            tokens.normalized().to_plain_string(),
            fiat,
            price
        ));
        self.balance().await
    }

    async fn distribute(&mut self, requested: &BigDecimal) -> Result<()> {
        let address = self.master_address()?;
        let available = self.ledger.total_balance(&address).await;
        let amount = resolve_amount(requested, &available).context("resolving distribution amount")?;

        if self.engine.mode() == TransferMode::Live {
            print_warning("Live mode: transfers are submitted to the chain");
        }
        print_info(&format!("Distributing {} ...", amount));

        let report = self
            .engine
            .distribute(&mut self.registry, &mut self.ledger, &amount)
            .await
            .context("distributing to child wallets")?;

        print_distribution_report(&report);
        if report.success {
            print_success("Distribution completed");
        } else {
            print_error("No transfer succeeded");
        }
        Ok(())
    }

    async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Init => self.show_init(),
            Command::Create { count } => self.create(count).await,
            Command::List => self.list(),
            Command::Stats => self.stats(),
            Command::Balance => self.balance().await,
            Command::Fund { fiat } => self.fund(&fiat).await,
            Command::Distribute { amount } => self.distribute(&amount).await,
            Command::Menu => self.menu().await,
        }
    }

    fn prompt_distribution(&self) -> CliResult<BigDecimal> {
        let amount = Input::get_amount("Amount to distribute (0 = 95% of balance)")?;
        if self.engine.mode() == TransferMode::Live
            && !Input::get_bool("Submit live transfers to every child wallet?")?
        {
            return Err(CliError::UserCancelled);
        }
        Ok(amount)
    }

    async fn menu(&mut self) -> Result<()> {
        print_banner();
        self.show_init()?;

        loop {
            println!();
            let result = match FleetOperation::select()? {
                FleetOperation::CreateWallets => {
                    match Input::get_wallet_count("How many wallets", self.config.fleet_max_wallets_per_call) {
                        Ok(count) => self.create(count).await,
                        Err(e) => Err(e.into()),
                    }
                }
                FleetOperation::ViewWallets => self.list(),
                FleetOperation::CheckBalance => self.balance().await,
                FleetOperation::FundFromFiat => match Input::get_amount("Fiat amount") {
                    Ok(fiat) => self.fund(&fiat).await,
                    Err(e) => Err(e.into()),
                },
                FleetOperation::Distribute => match self.prompt_distribution() {
                    Ok(amount) => self.distribute(&amount).await,
                    Err(e) => Err(e.into()),
                },
                FleetOperation::Stats => self.stats(),
                FleetOperation::Exit => {
                    eprintln!("{}", "Goodbye!".bright_cyan());
                    return Ok(());
                }
            };

            if let Err(e) = result {
                print_error(&format!("{:#}", e));
            }
        }
    }
}

fn print_banner() {
    eprintln!();
    eprintln!("{}", "╔═══════════════════════════════════════════════════════╗".bright_cyan());
    eprintln!("{}", "║                                                       ║".bright_cyan());
    eprintln!("{}", "║             👛  Wallet Fleet Management CLI           ║".bright_cyan());
    eprintln!("{}", "║                                                       ║".bright_cyan());
    eprintln!("{}", "╚═══════════════════════════════════════════════════════╝".bright_cyan());
    eprintln!();
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string())
                .as_str(),
        )
        .init();

    let cli = Cli::parse();
    debug!(
        "Data directory {}, transfer mode {}",
        cli.config.fleet_data_dir.display(),
        cli.config.fleet_transfer_mode
    );

    let mut app = FleetApp::bootstrap(cli.config).await?;
    let command = cli.command.unwrap_or(Command::Menu);
    if !matches!(command, Command::Menu) {
        print_header("Wallet Fleet");
    }

    if let Err(e) = app.run(command).await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
