// Caller identity sent with license checks.
// Deterministic and weak: a sharing signal, not a credential.

use sha2::{Digest, Sha256};

/// Identifier for this machine, derived from the process environment
pub fn machine_id() -> String {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get().to_string())
        .unwrap_or_default();
    machine_id_from(|name| match name {
        "NUMBER_OF_PROCESSORS" => std::env::var(name).ok().or_else(|| Some(cpus.clone())),
        _ => std::env::var(name).ok(),
    })
}

/// Same as [`machine_id`] with an explicit environment lookup
pub fn machine_id_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    let cpus = lookup("NUMBER_OF_PROCESSORS").unwrap_or_default();
    let user = lookup("USER")
        .or_else(|| lookup("USERNAME"))
        .unwrap_or_default();
    let host = lookup("HOSTNAME")
        .or_else(|| lookup("COMPUTERNAME"))
        .unwrap_or_default();

    let material = format!(
        "{}-{}-{}-{}-{}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        cpus,
        user,
        host
    );
    let digest = Sha256::digest(material.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_machine_id_is_deterministic() {
        let lookup = env(&[("USER", "ana"), ("HOSTNAME", "box-1"), ("NUMBER_OF_PROCESSORS", "8")]);
        let first = machine_id_from(&lookup);
        let second = machine_id_from(&lookup);

        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_machine_id_differs_per_host() {
        let a = machine_id_from(env(&[("USER", "ana"), ("HOSTNAME", "box-1")]));
        let b = machine_id_from(env(&[("USER", "ana"), ("HOSTNAME", "box-2")]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_windows_style_variables_are_used() {
        let unix = machine_id_from(env(&[("USER", "ana"), ("HOSTNAME", "box")]));
        let windows = machine_id_from(env(&[("USERNAME", "ana"), ("COMPUTERNAME", "box")]));
        assert_eq!(unix, windows);
    }
}
