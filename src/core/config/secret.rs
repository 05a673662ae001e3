use std::{fs, path::PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Reads a development signing secret from `file_name` next to the manifest,
/// generating and persisting a random one on first use.
pub(super) fn load_or_create_secret(file_name: &str) -> String {
    let path = secret_file_path(file_name);

    if let Some(existing) = read_secret(&path) {
        return existing;
    }

    let new_secret = generate_secret();

    match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;

                if let Err(err) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
                    tracing::warn!(
                        error = %err,
                        path = %path.display(),
                        "Failed to restrict secret file permissions"
                    );
                }
            }

            if let Err(err) = std::io::Write::write_all(&mut file, new_secret.as_bytes()) {
                tracing::warn!(error = %err, path = %path.display(), "Failed to persist secret");
            }
            new_secret
        }
        // Another process won the race; use its secret so tokens stay verifiable.
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            read_secret(&path).unwrap_or(new_secret)
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "Failed to create secret file");
            new_secret
        }
    }
}

fn read_secret(path: &PathBuf) -> Option<String> {
    let value = fs::read_to_string(path).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn generate_secret() -> String {
    let mut bytes = [0u8; 64];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn secret_file_path(file_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(file_name)
}
