use crate::cli_utils::CliResult;
use dialoguer::Select;

/// Interactive menu builder
pub struct Menu {
    title: String,
    items: Vec<String>,
}

impl Menu {
    /// Create a new menu with a title
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            items: Vec::new(),
        }
    }

    /// Add multiple items
    pub fn items(mut self, items: Vec<&str>) -> Self {
        self.items.extend(items.iter().map(|s| s.to_string()));
        self
    }

    /// Show the menu and get the selected index
    pub fn interact(&self) -> CliResult<usize> {
        Ok(Select::new()
            .with_prompt(&self.title)
            .items(&self.items)
            .default(0)
            .interact()?)
    }
}

/// Main menu of the fleet CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetOperation {
    CreateWallets,
    ViewWallets,
    CheckBalance,
    FundFromFiat,
    Distribute,
    Stats,
    Exit,
}

impl FleetOperation {
    const ALL: [FleetOperation; 7] = [
        FleetOperation::CreateWallets,
        FleetOperation::ViewWallets,
        FleetOperation::CheckBalance,
        FleetOperation::FundFromFiat,
        FleetOperation::Distribute,
        FleetOperation::Stats,
        FleetOperation::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FleetOperation::CreateWallets => "Create child wallets",
            FleetOperation::ViewWallets => "View all wallets",
            FleetOperation::CheckBalance => "Check master balance",
            FleetOperation::FundFromFiat => "Fund master from fiat (simulated)",
            FleetOperation::Distribute => "Distribute to child wallets",
            FleetOperation::Stats => "Fleet statistics",
            FleetOperation::Exit => "Exit",
        }
    }

    /// Show operation selection menu
    pub fn select() -> CliResult<Self> {
        let labels = Self::ALL.iter().map(FleetOperation::label).collect();
        let idx = Menu::new("Select operation").items(labels).interact()?;

        Ok(Self::ALL.get(idx).copied().unwrap_or(FleetOperation::Exit))
    }
}
