//! A gym membership terminal client.
//!
//! The client connects to the gym service, restores any persisted
//! session, walks new users through the OTP-verified signup, and then
//! drops into a role-aware command shell.

use anyhow::Result;
use fg_client::commands::{self, Command};
use fitgym::auth::{
    AccessGate, AuthError, AuthResult, GateDecision, RegistrationFlow, Role, Route, SessionCore,
    SessionService, role_home,
};
use fitgym::credentials::CredentialStore;
use fitgym::net::messages::ProfileUpdateRequest;
use fitgym::net::{ApiClient, AuthApi, AuthFailureInterceptor, Navigator};
use log::debug;
use pico_args::Arguments;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

const HELP: &str = "\
Connect to a gym membership server

USAGE:
  fg_client [OPTIONS]

OPTIONS:
  --server URL          Server URL  [default: $FITGYM_SERVER or http://localhost:8000]
  --email EMAIL         Email or phone for login
  --password PASS       Password for login
  --ephemeral           Do not remember the session across restarts
  --data-dir DIR        Directory for the persisted session file

FLAGS:
  -h, --help            Print help information
";

struct Args {
    server_url: String,
    email: Option<String>,
    password: Option<String>,
    ephemeral: bool,
    data_dir: Option<PathBuf>,
}

/// Prints forced redirects issued by the auth-failure interceptor.
struct ShellNavigator;

impl Navigator for ShellNavigator {
    fn navigate(&self, route: Route) {
        println!("\nYour session has expired - taking you to {route}.");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server_url: pargs.value_from_str("--server").unwrap_or_else(|_| {
            std::env::var("FITGYM_SERVER").unwrap_or_else(|_| "http://localhost:8000".to_string())
        }),
        email: pargs.opt_value_from_str("--email").ok().flatten(),
        password: pargs.opt_value_from_str("--password").ok().flatten(),
        ephemeral: pargs.contains("--ephemeral"),
        data_dir: pargs.opt_value_from_str("--data-dir").ok().flatten(),
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let data_dir = args.data_dir.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fitgym")
    });

    let store = CredentialStore::new(data_dir.join("session.json"));
    let core = Arc::new(SessionCore::new(store));
    let navigator: Arc<dyn Navigator> = Arc::new(ShellNavigator);
    let interceptor = Arc::new(AuthFailureInterceptor::new(Arc::clone(&core), navigator));
    let api = Arc::new(
        ApiClient::new(args.server_url.clone(), Arc::clone(&core)).with_interceptor(interceptor),
    );
    let sessions = SessionService::new(Arc::clone(&core), Arc::clone(&api) as Arc<dyn AuthApi>);
    let gate = AccessGate::new(core);

    println!("Connecting to {}...", args.server_url);
    sessions.rehydrate().await;
    debug!("rehydration resolved");

    // The sign-in screens are public-only: a restored session skips them
    // and continues to its role home.
    match gate.decide_public() {
        GateDecision::Redirect(route) => println!("Restored session - continuing to {route}."),
        GateDecision::Allow { .. } => sign_in(&sessions, &api, &args).await?,
    }

    shell(&sessions, &api, &gate).await
}

/// Interactive login/signup, mirroring the public-only views.
async fn sign_in(sessions: &SessionService, api: &Arc<ApiClient>, args: &Args) -> Result<()> {
    let remember = !args.ephemeral;

    if let (Some(email), Some(password)) = (&args.email, &args.password) {
        match sessions.login(email, password, remember).await {
            Ok(user) => {
                println!("Welcome back, {}!", user.name);
                return Ok(());
            }
            Err(error) => println!("Login failed: {}", error.client_message()),
        }
    }

    loop {
        let choice = prompt("login or signup? ")?;
        match choice.as_str() {
            "login" => {
                let identifier = prompt("Email or phone: ")?;
                let password = prompt("Password: ")?;
                match sessions.login(&identifier, &password, remember).await {
                    Ok(user) => {
                        println!("Welcome back, {}!", user.name);
                        return Ok(());
                    }
                    Err(error) => println!("Login failed: {}", error.client_message()),
                }
            }
            "signup" => {
                if register(sessions, api).await? {
                    return Ok(());
                }
            }
            _ => println!("Type 'login' or 'signup'."),
        }
    }
}

/// Two-step OTP registration: collect details, then verify the shared
/// code sent to both channels.
async fn register(sessions: &SessionService, api: &Arc<ApiClient>) -> Result<bool> {
    let mut flow = RegistrationFlow::new(Arc::clone(api) as Arc<dyn AuthApi>);
    {
        let draft = flow.draft_mut();
        draft.name = prompt("Full name: ")?;
        draft.email = prompt("Email: ")?;
        let country_code = prompt("Country code [+91]: ")?;
        draft.country_code = if country_code.is_empty() {
            "+91".to_string()
        } else {
            country_code
        };
        draft.phone_number = prompt("Phone number: ")?;
        draft.password = prompt("Password (min 6 chars): ")?;
    }

    if let Err(error) = flow.submit_details().await {
        println!("Could not start verification: {}", error.client_message());
        return Ok(false);
    }
    println!("A 6-digit code was sent to your phone and email.");

    loop {
        let input = prompt("Code (or 'resend'): ")?;
        if input == "resend" {
            match flow.resend().await {
                Ok(()) => println!("Code resent."),
                Err(error) => println!("{}", error.client_message()),
            }
            continue;
        }
        match sessions.signup_with_otp(&mut flow, &input).await {
            Ok(user) => {
                println!("Account created - welcome, {}!", user.name);
                return Ok(true);
            }
            Err(AuthError::Validation(message)) => println!("{message}"),
            Err(AuthError::OtpExpiredOrInvalid) => {
                println!("That code didn't match. Try again or type 'resend'.");
            }
            Err(error) => {
                // Terminal for this attempt (e.g. the account already
                // exists); the flow must be restarted from the details.
                println!("Signup failed: {}", error.client_message());
                return Ok(false);
            }
        }
    }
}

/// Role-aware command shell over the wrapper endpoints.
async fn shell(sessions: &SessionService, api: &Arc<ApiClient>, gate: &AccessGate) -> Result<()> {
    let Some(user) = sessions.snapshot().user else {
        return Ok(());
    };
    println!(
        "\nSigned in as {} ({}) - home: {}",
        user.name,
        user.role,
        role_home(user.role)
    );
    println!("Type 'help' for commands.");

    loop {
        let line = prompt("fitgym> ")?;
        if line.is_empty() {
            continue;
        }
        let command = match commands::parse_command(&line) {
            Ok(command) => command,
            Err(error) => {
                println!("{error}");
                continue;
            }
        };
        match command {
            Command::Help => print_help(),
            Command::Quit => return Ok(()),
            Command::Logout => {
                sessions.logout();
                println!("Logged out.");
                return Ok(());
            }
            Command::WhoAmI => {
                if let Some(user) = sessions.snapshot().user {
                    println!(
                        "{} <{}> - {} ({})",
                        user.name, user.email, user.member_id, user.role
                    );
                }
            }
            other => {
                if let Err(error) = dispatch(other, sessions, api, gate).await {
                    if error.already_announced() {
                        // The interceptor has already cleared the session
                        // and announced the redirect; a second message
                        // would contradict it.
                        return Ok(());
                    }
                    println!("{}", error.client_message());
                }
            }
        }
    }
}

async fn dispatch(
    command: Command,
    sessions: &SessionService,
    api: &Arc<ApiClient>,
    gate: &AccessGate,
) -> AuthResult<()> {
    match command {
        Command::Plans => {
            let plans = api.list_plans(true).await?;
            if plans.is_empty() {
                println!("No active plans.");
            }
            for plan in plans {
                println!("  {} - {} days - ₹{}", plan.name, plan.duration_days, plan.price);
            }
        }
        Command::Announcements => {
            for item in api.list_announcements().await? {
                println!("  [{}] {}: {}", item.created_at, item.title, item.content);
            }
        }
        Command::Members => {
            if allowed(gate, &[Role::Admin]) {
                for user in api.list_users().await? {
                    println!("  {} {} ({})", user.member_id, user.name, user.role);
                }
            }
        }
        Command::Stats => {
            if allowed(gate, &[Role::Admin]) {
                let stats = api.dashboard_stats().await?;
                println!("  Members: {}", stats.total_members);
                println!("  Active memberships: {}", stats.active_memberships);
                println!("  Today's collection: ₹{}", stats.today_collection);
                println!(
                    "  Present/absent today: {}/{}",
                    stats.present_today, stats.absent_today
                );
            }
        }
        Command::MarkAttendance(member_id) => {
            if allowed(gate, &[Role::Admin, Role::Receptionist]) {
                let record = api.mark_attendance(&member_id).await?;
                let name = record.user_name.unwrap_or_else(|| member_id.clone());
                println!("  Checked in {} at {}", name, record.check_in_time);
            }
        }
        Command::TodayAttendance => {
            if allowed(gate, &[Role::Admin, Role::Receptionist]) {
                let today = api.today_attendance().await?;
                println!(
                    "  Present: {}  Absent: {}",
                    today.present_count, today.absent_count
                );
                for record in today.present {
                    let name = record.user_name.unwrap_or_else(|| record.user_id.clone());
                    println!("    {} - {}", name, record.check_in_time);
                }
            }
        }
        Command::Rename(name) => {
            let Some(user) = sessions.snapshot().user else {
                return Ok(());
            };
            let patch = ProfileUpdateRequest {
                name: Some(name),
                ..Default::default()
            };
            api.update_user(&user.id, &patch).await?;
            if let Some(updated) = sessions.update_profile(&patch) {
                println!("  Profile updated: {}", updated.name);
            }
        }
        Command::Help | Command::WhoAmI | Command::Logout | Command::Quit => {}
    }
    Ok(())
}

/// Check a role-restricted command against the gate, explaining the
/// redirect when access is denied.
fn allowed(gate: &AccessGate, roles: &[Role]) -> bool {
    match gate.decide(Some(roles)) {
        GateDecision::Allow { .. } => true,
        GateDecision::Redirect(route) => {
            println!("Not available for your role - your home is {route}.");
            false
        }
    }
}

fn print_help() {
    println!("  whoami               show the current profile");
    println!("  plans                list active membership plans");
    println!("  announcements        list gym announcements");
    println!("  members              list members and trainers (admin)");
    println!("  stats                dashboard counters (admin)");
    println!("  attendance ID        mark a check-in (admin/receptionist)");
    println!("  today                today's check-ins (admin/receptionist)");
    println!("  rename NAME          change your profile name");
    println!("  logout               end the session");
    println!("  quit                 leave, keeping the session");
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
