use clap::{Args, Subcommand};
use macromate_core::{ActivityLevel, DataManager, ProfileUpdate, Sex};

use super::{require_login, OutputFormat};

#[derive(Args)]
pub struct AccountCommand {
    #[command(subcommand)]
    pub command: AccountSubcommand,
}

#[derive(Subcommand)]
pub enum AccountSubcommand {
    /// Create an account and log in
    Register {
        /// Display name
        #[arg(long, short)]
        name: String,

        #[arg(long, short)]
        email: String,

        #[arg(long, short)]
        password: String,
    },

    /// Log in to an existing account
    Login {
        #[arg(long, short)]
        email: String,

        #[arg(long, short)]
        password: String,
    },

    /// Log out
    Logout,

    /// Show the logged-in account
    Whoami {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Change an account's email address
    Email {
        /// New email address
        new_email: String,

        /// Current address (defaults to the logged-in account)
        #[arg(long)]
        old: Option<String>,
    },

    /// Edit the logged-in account's profile
    Profile {
        #[arg(long)]
        name: Option<String>,

        /// Free-text goal, e.g. "lose 5 lb"
        #[arg(long)]
        goal: Option<String>,

        #[arg(long)]
        age: Option<u32>,

        /// male, female or other
        #[arg(long)]
        sex: Option<String>,

        /// Height in inches
        #[arg(long)]
        height: Option<f64>,

        /// Weight in pounds
        #[arg(long)]
        weight: Option<f64>,

        /// sedentary, light, moderate, very-active or extra-active
        #[arg(long)]
        activity: Option<String>,
    },
}

impl AccountCommand {
    pub fn run(&self, manager: &mut DataManager) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AccountSubcommand::Register {
                name,
                email,
                password,
            } => {
                if !manager.register_user(name, email, password) {
                    return Err(
                        "Registration failed: email must be new and password non-blank".into(),
                    );
                }
                if let Some(e) = manager.last_save_error() {
                    return Err(format!("Account created but not saved: {}", e).into());
                }
                println!("Registered and logged in as {}", email.trim().to_lowercase());
                Ok(())
            }

            AccountSubcommand::Login { email, password } => {
                let name = match manager.authenticate(email, password) {
                    Some(user) => user.name.clone(),
                    None => return Err("Invalid email or password.".into()),
                };
                manager.save_all_data()?;
                println!("Welcome back, {}", name);
                Ok(())
            }

            AccountSubcommand::Logout => {
                manager.logout();
                manager.save_all_data()?;
                println!("Logged out");
                Ok(())
            }

            AccountSubcommand::Whoami { format } => {
                let Some(user) = manager.active_user() else {
                    println!("Not logged in");
                    return Ok(());
                };
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(user)?),
                    OutputFormat::Text => println!("{}", user),
                }
                Ok(())
            }

            AccountSubcommand::Email { new_email, old } => {
                let old_email = match old {
                    Some(old) => old.clone(),
                    None => require_login(manager)?.id.clone(),
                };
                if !manager.update_account_email(&old_email, new_email) {
                    return Err(format!(
                        "Cannot change '{}' to '{}': address missing, unknown or already in use",
                        old_email, new_email
                    )
                    .into());
                }
                println!("Email changed to {}", new_email.trim().to_lowercase());
                Ok(())
            }

            AccountSubcommand::Profile {
                name,
                goal,
                age,
                sex,
                height,
                weight,
                activity,
            } => {
                require_login(manager)?;
                let sex: Option<Sex> = sex.as_deref().map(str::parse).transpose()?;
                let activity_level: Option<ActivityLevel> =
                    activity.as_deref().map(str::parse).transpose()?;

                let update = ProfileUpdate {
                    name: name.clone(),
                    goal: goal.clone(),
                    age: *age,
                    sex,
                    height_in: *height,
                    weight_lb: *weight,
                    activity_level,
                };
                if !manager.update_active_profile(update) {
                    return Err("Height and weight must be finite numbers".into());
                }
                manager.save_all_data()?;

                if let Some(user) = manager.active_user() {
                    println!("{}", user);
                }
                Ok(())
            }
        }
    }
}
