use std::fs;
use std::path::Path;

use crate::auth::{generate_credentials, GeneratedCredentials};
use crate::errors::{CoinOpsError, CoinOpsResult};
use crate::logger::{self, LogTag};

/// Write fresh credentials to `output`, printing the plaintext password once
pub fn run(output: &Path, force: bool) -> CoinOpsResult<()> {
    let generated = write_env_file(output, force)?;

    eprintln!("Credentials written to {}", output.display());
    print_credentials_banner(&generated);
    Ok(())
}

/// Refuses to replace an existing file unless `force` is set
pub fn write_env_file(output: &Path, force: bool) -> CoinOpsResult<GeneratedCredentials> {
    if output.exists() && !force {
        return Err(CoinOpsError::Config(format!(
            "{} already exists; use --force to overwrite",
            output.display()
        )));
    }

    let generated = generate_credentials()?;
    fs::write(output, generated.credentials.to_env_lines())?;

    logger::info(
        LogTag::Auth,
        &format!("Generated dashboard credentials in {}", output.display()),
    );
    Ok(generated)
}

/// The only place a generated password is ever shown
pub fn print_credentials_banner(generated: &GeneratedCredentials) {
    eprintln!();
    eprintln!("============================================================");
    eprintln!("  CoinOps dashboard credentials");
    eprintln!("  Username: {}", generated.credentials.username);
    eprintln!("  Password: {}", generated.password);
    eprintln!("  Store the password now, it is not saved anywhere.");
    eprintln!("============================================================");
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use std::collections::HashMap;

    fn parse_env(content: &str) -> HashMap<String, String> {
        content
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_written_file_verifies_generated_password() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        let generated = write_env_file(&path, false).unwrap();
        let vars = parse_env(&fs::read_to_string(&path).unwrap());
        let creds = Credentials::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert!(creds.verify(&generated.credentials.username, &generated.password));
        assert!(!fs::read_to_string(&path).unwrap().contains(&generated.password));
    }

    #[test]
    fn test_existing_file_requires_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "KEEP=1\n").unwrap();

        assert!(write_env_file(&path, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "KEEP=1\n");

        write_env_file(&path, true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("BASIC_AUTH_USERNAME="));
    }
}
