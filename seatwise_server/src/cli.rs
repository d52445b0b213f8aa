use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Secrets are deliberately left off this list
    const DISPLAY_ENVS: [&str; 18] = [
        "RUST_LOG",
        "SW_HOST",
        "SW_PORT",
        "SW_DATABASE_URL",
        "SW_DB_MAX_CONNECTIONS",
        "SW_USERNAME_HEADER",
        "SW_USE_X_FORWARDED_FOR",
        "SW_USE_FORWARDED",
        "SW_SWEEP_INTERVAL",
        "SW_HOLD_TIMEOUT",
        "SW_THROTTLE_INTERVAL",
        "SW_SPAM_THRESHOLD",
        "SW_MAIL_INTERVAL",
        "SW_GATEWAY_URL",
        "SW_GATEWAY_TIMEOUT",
        "SW_MAIL_API_URL",
        "SW_MAIL_DEFAULT_SENDER",
        "SW_MAIL_TIMEOUT",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
