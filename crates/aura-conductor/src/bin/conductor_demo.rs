//! Scripted conductor walkthrough
//!
//! Opens a set of named screens, closes some of them, and prints the
//! lifecycle calls each screen receives along with the final state.

use anyhow::{Context, Result};
use aura_conductor::{
    Activate, CloseCallback, ConductorConfig, Deactivate, GuardClose, OneActiveConductor, Screen,
};
use clap::Parser;
use std::path::PathBuf;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "conductor-demo")]
#[command(about = "Walk a one-active screen conductor through a scripted session", long_about = None)]
struct Cli {
    /// Screens to open, in order; the last one ends up active
    #[arg(short, long, value_delimiter = ',', default_value = "home,inbox,settings")]
    screens: Vec<String>,

    /// Screens whose close guard refuses to close
    #[arg(long)]
    veto: Vec<String>,

    /// Screens to close after opening, in order
    #[arg(long)]
    close: Vec<String>,

    /// Optional configuration file (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug)]
struct NamedScreen {
    name: String,
    veto: bool,
}

impl PartialEq for NamedScreen {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Activate for NamedScreen {
    fn activate(&self) {
        println!("  {} activated", self.name);
    }
}

impl Deactivate for NamedScreen {
    fn deactivate(&self, close: bool) {
        let verb = if close { "closed" } else { "deactivated" };
        println!("  {} {verb}", self.name);
    }
}

impl GuardClose for NamedScreen {
    fn can_close(&self, callback: CloseCallback) {
        if self.veto {
            println!("  {} refuses to close", self.name);
        }
        callback(!self.veto);
    }
}

impl Screen for NamedScreen {
    fn as_activate(&self) -> Option<&dyn Activate> {
        Some(self)
    }

    fn as_deactivate(&self) -> Option<&dyn Deactivate> {
        Some(self)
    }

    fn as_guard_close(&self) -> Option<&dyn GuardClose> {
        Some(self)
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ConductorConfig> {
    let mut config = match path {
        Some(path) => ConductorConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ConductorConfig::default(),
    };
    config.merge_with_env()?;
    config.validate()?;
    Ok(config)
}

fn print_state(conductor: &OneActiveConductor<Rc<NamedScreen>>) {
    let names: Vec<String> = conductor
        .items()
        .to_vec()
        .iter()
        .map(|screen| screen.name.clone())
        .collect();
    let active = conductor
        .active_item()
        .map_or_else(|| "<none>".to_string(), |screen| screen.name.clone());
    println!("screens: [{}], active: {active}", names.join(", "));
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(cli.config.as_ref())?;
    let conductor = OneActiveConductor::with_config(config);

    for name in &cli.screens {
        println!("open {name}");
        conductor.activate_item(Some(Rc::new(NamedScreen {
            name: name.clone(),
            veto: cli.veto.contains(name),
        })));
    }
    print_state(&conductor);

    for name in &cli.close {
        let target = conductor
            .items()
            .to_vec()
            .into_iter()
            .find(|screen| &screen.name == name);
        match target {
            Some(screen) => {
                println!("close {name}");
                conductor.close_item(Some(screen));
            }
            None => println!("close {name}: no such screen"),
        }
        print_state(&conductor);
    }

    let vote = conductor.can_close_async();
    let can_close = futures::executor::block_on(vote)?;
    println!("whole collection can close: {can_close}");
    Ok(())
}
