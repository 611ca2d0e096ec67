//! Profile command handler.
//!
//! Saves, shows and lists named chunking profiles.

use super::split::unescape_separator;
use clap::{Args, Subcommand};
use ragkit_core::{config::AppConfig, AppResult};
use ragkit_splitter::{
    config::{get_profile_path, list_profiles, load_profile, save_profile},
    ChunkConfig,
};

/// Manage chunking profiles
#[derive(Args, Debug)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Create or replace a profile
    Save(ProfileSaveCommand),
    /// Print a profile as YAML (defaults when it does not exist)
    Show(ProfileShowCommand),
    /// List saved profiles
    List,
}

/// Create or replace a profile
#[derive(Args, Debug)]
pub struct ProfileSaveCommand {
    /// Profile name
    pub name: String,

    /// Maximum chunk length in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters repeated between consecutive chunks
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Separator to try, most specific first (repeatable; accepts \n and \t)
    #[arg(long = "separator")]
    pub separators: Vec<String>,

    /// Split on a regular expression instead
    #[arg(long)]
    pub regex: Option<String>,
}

/// Print a profile
#[derive(Args, Debug)]
pub struct ProfileShowCommand {
    /// Profile name
    pub name: String,
}

impl ProfileCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            ProfileAction::Save(cmd) => cmd.execute(config),
            ProfileAction::Show(cmd) => cmd.execute(config),
            ProfileAction::List => {
                for name in list_profiles(&config.workspace)? {
                    println!("{}", name);
                }
                Ok(())
            }
        }
    }
}

impl ProfileSaveCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Saving chunking profile '{}'", self.name);

        let profile = self.build(ChunkConfig::default());
        save_profile(&config.workspace, &self.name, &profile)?;

        println!(
            "Saved profile '{}' to {}",
            self.name,
            get_profile_path(&config.workspace, &self.name)?.display()
        );
        Ok(())
    }

    fn build(&self, mut profile: ChunkConfig) -> ChunkConfig {
        if let Some(size) = self.chunk_size {
            profile.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            profile.chunk_overlap = overlap;
        }
        if !self.separators.is_empty() {
            profile.separators =
                Some(self.separators.iter().map(|s| unescape_separator(s)).collect());
        }
        profile.regex = self.regex.clone();
        profile
    }
}

impl ProfileShowCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let profile = load_profile(&config.workspace, &self.name)?;
        print!("{}", serde_yaml::to_string(&profile)?);
        Ok(())
    }
}
