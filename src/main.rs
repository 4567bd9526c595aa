use anyhow::Result;
use axlekit::init_logging;
use axlekit::shell::Shell;
use axlekit_settings::SettingsPersistence;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Initialize logging
    init_logging()?;

    // Settings file: first argument, or the per-user default
    let path = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => SettingsPersistence::default_path()?,
    };
    let settings = SettingsPersistence::load_or_default(&path);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Shell::new(settings, stdin.lock(), stdout.lock()).run()
}
